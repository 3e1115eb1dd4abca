use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    presigning::PresigningConfig,
    Client,
};
use aws_smithy_types::byte_stream::ByteStream;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::config::StorageConfig;

#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()>;
    async fn presign_get(&self, key: &str, seconds: u64) -> anyhow::Result<String>;
}

/// S3-compatible object store (MinIO in development).
#[derive(Clone)]
pub struct Storage {
    client: Client,
    bucket: String,
}

impl Storage {
    pub async fn new(cfg: &StorageConfig) -> anyhow::Result<Self> {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .credentials_provider(Credentials::new(
                &cfg.access_key,
                &cfg.secret_key,
                None,
                None,
                "static",
            ))
            .endpoint_url(&cfg.endpoint)
            .load()
            .await;

        let conf = S3ConfigBuilder::from(&shared)
            .endpoint_url(&cfg.endpoint)
            .force_path_style(true)
            .build();

        tracing::debug!(endpoint = %cfg.endpoint, bucket = %cfg.bucket, "object storage configured");
        Ok(Self {
            client: Client::from_conf(conf),
            bucket: cfg.bucket.clone(),
        })
    }
}

#[async_trait]
impl StorageClient for Storage {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .with_context(|| format!("store {} in bucket {}", key, self.bucket))?;
        Ok(())
    }

    async fn presign_get(&self, key: &str, seconds: u64) -> anyhow::Result<String> {
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(PresigningConfig::expires_in(std::time::Duration::from_secs(seconds))?)
            .await
            .with_context(|| format!("presign {} in bucket {}", key, self.bucket))?;
        Ok(presigned.uri().to_string())
    }
}

/// Keeps objects in process memory; backs `AppState::fake`.
#[derive(Default)]
pub struct MemoryStorage {
    objects: RwLock<HashMap<String, (Bytes, String)>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<(Bytes, String)> {
        self.objects.read().await.get(key).cloned()
    }
}

#[async_trait]
impl StorageClient for MemoryStorage {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()> {
        self.objects
            .write()
            .await
            .insert(key.to_string(), (body, content_type.to_string()));
        Ok(())
    }

    async fn presign_get(&self, key: &str, _seconds: u64) -> anyhow::Result<String> {
        anyhow::ensure!(self.objects.read().await.contains_key(key), "no such object {}", key);
        Ok(format!("https://fake.local/{}", key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_storage_put_then_presign() {
        let st = MemoryStorage::new();
        st.put_object("uploads/products/a.png", Bytes::from_static(b"png"), "image/png")
            .await
            .unwrap();
        let (body, ct) = st.get("uploads/products/a.png").await.unwrap();
        assert_eq!(&body[..], b"png");
        assert_eq!(ct, "image/png");
        let url = st.presign_get("uploads/products/a.png", 600).await.unwrap();
        assert!(url.ends_with("uploads/products/a.png"));
    }

    #[tokio::test]
    async fn memory_storage_presign_missing_fails() {
        let st = MemoryStorage::new();
        assert!(st.presign_get("nope", 600).await.is_err());
    }
}
