use std::{fmt, str::FromStr};

use anyhow::Context;
use bytes::Bytes;
use uuid::Uuid;

use crate::state::AppState;

const PRESIGN_TTL_SECS: u64 = 10 * 60;

/// Which collection an uploaded image belongs to; also its URL segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Products,
    Users,
}

impl UploadKind {
    pub fn as_str(self) -> &'static str {
        match self {
            UploadKind::Products => "products",
            UploadKind::Users => "users",
        }
    }
}

impl fmt::Display for UploadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "products" => Ok(UploadKind::Products),
            "users" => Ok(UploadKind::Users),
            other => anyhow::bail!("unknown upload kind {}", other),
        }
    }
}

pub struct UploadItem {
    pub body: Bytes,
    pub content_type: String,
}

pub fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

/// Public path under which the image is served, e.g. `/uploads/products/<uuid>.png`.
pub fn image_path(kind: UploadKind, file: &str) -> String {
    format!("/uploads/{}/{}", kind, file)
}

fn object_key(kind: UploadKind, file: &str) -> String {
    format!("uploads/{}/{}", kind, file)
}

/// Stores the image and returns its public path.
pub async fn store_image(st: &AppState, kind: UploadKind, item: UploadItem) -> anyhow::Result<String> {
    let ext = ext_from_mime(&item.content_type)
        .with_context(|| format!("unsupported content type {}", item.content_type))?;
    let file = format!("{}.{}", Uuid::new_v4(), ext);
    let key = object_key(kind, &file);
    st.storage
        .put_object(&key, item.body, &item.content_type)
        .await
        .with_context(|| format!("put_object {}", key))?;
    Ok(image_path(kind, &file))
}

pub async fn presign_image(st: &AppState, kind: UploadKind, file: &str) -> anyhow::Result<String> {
    let key = object_key(kind, file);
    st.storage
        .presign_get(&key, PRESIGN_TTL_SECS)
        .await
        .with_context(|| format!("presign url for {}", key))
}
