//! Request extractors whose rejections go through [`StorefrontError`], so a
//! malformed body, query or path still gets the JSON envelope.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::StorefrontError;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(StorefrontError))]
pub struct Payload<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(StorefrontError))]
pub struct Query<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(StorefrontError))]
pub struct Path<T>(pub T);
