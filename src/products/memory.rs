use std::collections::BTreeMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use super::{
    repo::ProductRepository,
    repo_types::{NewProduct, Product, ProductChanges},
};
use crate::error::RepoError;

#[derive(Default)]
struct Inner {
    next_id: i64,
    products: BTreeMap<i64, Product>,
}

#[derive(Default)]
pub struct InMemoryProductRepository {
    inner: RwLock<Inner>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn get_all(&self) -> Result<Vec<Product>, RepoError> {
        Ok(self.inner.read().await.products.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Product>, RepoError> {
        Ok(self.inner.read().await.products.get(&id).cloned())
    }

    async fn create(&self, product: NewProduct) -> Result<Product, RepoError> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let product = Product {
            id: inner.next_id,
            name: product.name,
            description: product.description,
            price: product.price,
            quantity: product.quantity,
            image: product.image,
            created_at: OffsetDateTime::now_utc(),
        };
        inner.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update(
        &self,
        id: i64,
        changes: ProductChanges,
    ) -> Result<Option<Product>, RepoError> {
        let mut inner = self.inner.write().await;
        let Some(p) = inner.products.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            p.name = name;
        }
        if let Some(description) = changes.description {
            p.description = description;
        }
        if let Some(price) = changes.price {
            p.price = price;
        }
        if let Some(quantity) = changes.quantity {
            p.quantity = quantity;
        }
        if let Some(image) = changes.image {
            p.image = Some(image);
        }
        Ok(Some(p.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        Ok(self.inner.write().await.products.remove(&id).is_some())
    }
}
