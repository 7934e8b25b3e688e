//! Publishes domain events to NATS when a connection is configured.

use tracing::{debug, warn};

use crate::domain::events::DomainEvent;

#[derive(Clone, Default)]
pub struct EventPublisher {
    nats: Option<async_nats::Client>,
}

impl EventPublisher {
    pub fn new(nats: Option<async_nats::Client>) -> Self {
        Self { nats }
    }

    /// Publisher that drops every event.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub async fn connect(url: Option<&str>) -> Self {
        let Some(url) = url else { return Self::disabled() };
        match async_nats::connect(url).await {
            Ok(client) => {
                tracing::info!(%url, "connected to NATS");
                Self::new(Some(client))
            }
            Err(e) => {
                warn!(%url, error = %e, "NATS unavailable; domain events will not be published");
                Self::disabled()
            }
        }
    }

    /// Best effort: failures are logged and never surface to the caller.
    pub async fn publish(&self, events: Vec<DomainEvent>) {
        let Some(client) = &self.nats else { return };
        for event in events {
            let subject = event.subject();
            let payload = match event.payload() {
                Ok(p) => p,
                Err(e) => {
                    warn!(%subject, error = %e, "failed to encode domain event");
                    continue;
                }
            };
            match client.publish(subject.clone(), payload.into()).await {
                Ok(()) => debug!(%subject, "published domain event"),
                Err(e) => warn!(%subject, error = %e, "failed to publish domain event"),
            }
        }
    }
}
