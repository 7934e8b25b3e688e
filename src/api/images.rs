//! Product image upload and removal.
//!
//! Files land under `<upload_dir>/products/<product id>/` and are served from
//! `/uploads/products/<product id>/<file>`.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use std::path::PathBuf;
use tracing::warn;
use uuid::Uuid;

use crate::api::auth::SessionUser;
use crate::api::extract::Path;
use crate::api::products::owned_product;
use crate::api::response::{ApiResponse, ApiResult};
use crate::domain::aggregates::ProductImage;
use crate::error::{Result, StorefrontError};
use crate::AppState;

pub const UPLOADS_ROUTE: &str = "/uploads";

fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

struct Upload {
    extension: &'static str,
    bytes: Vec<u8>,
    alt_text: Option<String>,
}

async fn read_upload(mut multipart: Multipart, max_bytes: usize) -> Result<Upload> {
    let mut file = None;
    let mut alt_text = None;
    while let Some(field) = multipart.next_field().await.map_err(StorefrontError::validation)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let extension = extension_for(&content_type)
                    .ok_or_else(|| StorefrontError::Validation(format!("unsupported image type: {content_type:?}")))?;
                let bytes = field.bytes().await.map_err(StorefrontError::validation)?;
                if bytes.is_empty() {
                    return Err(StorefrontError::Validation("image file is empty".into()));
                }
                if bytes.len() > max_bytes {
                    return Err(StorefrontError::Validation(format!("image exceeds {max_bytes} bytes")));
                }
                file = Some((extension, bytes.to_vec()));
            }
            Some("altText") => {
                let text = field.text().await.map_err(StorefrontError::validation)?;
                alt_text = Some(text.trim().to_string()).filter(|t| !t.is_empty());
            }
            _ => {}
        }
    }
    let (extension, bytes) = file.ok_or_else(|| StorefrontError::Validation("missing form field: file".into()))?;
    Ok(Upload { extension, bytes, alt_text })
}

fn relative_path(product_id: Uuid, image_id: Uuid, extension: &str) -> String {
    format!("products/{product_id}/{image_id}.{extension}")
}

/// Maps a stored image URL back to its file, when it points into the upload dir.
fn file_for_url(upload_dir: &std::path::Path, url: &str) -> Option<PathBuf> {
    let relative = url.strip_prefix(UPLOADS_ROUTE)?.strip_prefix('/')?;
    if relative.split('/').any(|part| part == ".." || part.is_empty()) {
        return None;
    }
    Some(upload_dir.join(relative))
}

pub async fn upload_image(user: SessionUser, State(s): State<AppState>, Path(product_id): Path<Uuid>, multipart: std::result::Result<Multipart, MultipartRejection>) -> Result<(StatusCode, Json<ApiResponse<ProductImage>>)> {
    let product = owned_product(&s, product_id, user).await?;
    let multipart = multipart?;
    let upload = read_upload(multipart, s.config.max_upload_bytes).await?;

    let image_id = Uuid::now_v7();
    let relative = relative_path(product_id, image_id, upload.extension);
    let path = s.config.upload_dir.join(&relative);
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::write(&path, &upload.bytes).await?;

    let image = ProductImage {
        id: image_id,
        product_id,
        url: format!("{UPLOADS_ROUTE}/{relative}"),
        alt_text: upload.alt_text,
        position: i32::try_from(product.images.len()).unwrap_or(i32::MAX),
        created_at: Utc::now(),
    };
    if let Err(e) = s.store.insert_image(&image).await {
        if let Err(cleanup) = tokio::fs::remove_file(&path).await {
            warn!(path = %path.display(), error = %cleanup, "failed to remove orphaned upload");
        }
        return Err(e);
    }
    tracing::info!(%product_id, image_id = %image.id, bytes = upload.bytes.len(), "product image uploaded");
    Ok((StatusCode::CREATED, ApiResponse::ok(image)))
}

pub async fn delete_image(user: SessionUser, State(s): State<AppState>, Path((product_id, image_id)): Path<(Uuid, Uuid)>) -> ApiResult<ProductImage> {
    owned_product(&s, product_id, user).await?;
    let image = s.store.delete_image(product_id, image_id).await?.ok_or(StorefrontError::NotFound("Image"))?;
    if let Some(path) = file_for_url(&s.config.upload_dir, &image.url) {
        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!(path = %path.display(), error = %e, "failed to remove image file");
        }
    }
    Ok(ApiResponse::ok(image))
}
