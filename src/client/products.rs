use tokio::sync::RwLock;
use tracing::debug;

use super::{ApiClient, ClientError, ProductDraft};
use crate::products::Product;

/// Read-through cache of the product list. Every mutation invalidates the
/// cache; successful ones reload it so it mirrors the server afterwards.
pub struct ProductsContext {
    api: ApiClient,
    cache: RwLock<Option<Vec<Product>>>,
}

impl ProductsContext {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            cache: RwLock::new(None),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Cached list, fetched from the server on first read or after invalidation.
    pub async fn products(&self) -> Result<Vec<Product>, ClientError> {
        if let Some(products) = self.cache.read().await.as_ref() {
            return Ok(products.clone());
        }
        self.refresh().await
    }

    pub async fn find(&self, id: i64) -> Result<Option<Product>, ClientError> {
        Ok(self.products().await?.into_iter().find(|p| p.id == id))
    }

    /// Cache lookup only; never touches the network.
    pub async fn cached(&self, id: i64) -> Option<Product> {
        self.cache
            .read()
            .await
            .as_ref()
            .and_then(|ps| ps.iter().find(|p| p.id == id).cloned())
    }

    pub async fn is_loaded(&self) -> bool {
        self.cache.read().await.is_some()
    }

    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }

    pub async fn refresh(&self) -> Result<Vec<Product>, ClientError> {
        let products = self.api.list_products().await?;
        debug!(count = products.len(), "product cache refreshed");
        *self.cache.write().await = Some(products.clone());
        Ok(products)
    }

    async fn after_mutation<T>(&self, res: Result<T, ClientError>) -> Result<T, ClientError> {
        self.invalidate().await;
        let value = res?;
        self.refresh().await?;
        Ok(value)
    }

    pub async fn create(&self, draft: &ProductDraft) -> Result<Product, ClientError> {
        let res = self.api.create_product(draft).await;
        self.after_mutation(res).await
    }

    pub async fn update(&self, id: i64, draft: &ProductDraft) -> Result<Product, ClientError> {
        let res = self.api.update_product(id, draft).await;
        self.after_mutation(res).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ClientError> {
        let res = self.api.delete_product(id).await;
        self.after_mutation(res).await
    }
}
