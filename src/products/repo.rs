use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::{NewProduct, Product, ProductChanges};
use crate::error::RepoError;

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Product>, RepoError>;
    async fn get_by_id(&self, id: i64) -> Result<Option<Product>, RepoError>;
    async fn create(&self, product: NewProduct) -> Result<Product, RepoError>;
    async fn update(&self, id: i64, changes: ProductChanges)
        -> Result<Option<Product>, RepoError>;
    async fn delete(&self, id: i64) -> Result<bool, RepoError>;
}

const PRODUCT_COLUMNS: &str = "id, name, description, price, quantity, image, created_at";

pub struct PgProductRepository {
    db: PgPool,
}

impl PgProductRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn get_all(&self) -> Result<Vec<Product>, RepoError> {
        let rows = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Product>, RepoError> {
        let row = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn create(&self, product: NewProduct) -> Result<Product, RepoError> {
        let row = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products (name, description, price, quantity, image)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(product.name)
        .bind(product.description)
        .bind(product.price)
        .bind(product.quantity)
        .bind(product.image)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn update(
        &self,
        id: i64,
        changes: ProductChanges,
    ) -> Result<Option<Product>, RepoError> {
        let row = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products
               SET name        = COALESCE($2, name),
                   description = COALESCE($3, description),
                   price       = COALESCE($4, price),
                   quantity    = COALESCE($5, quantity),
                   image       = COALESCE($6, image)
             WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.description)
        .bind(changes.price)
        .bind(changes.quantity)
        .bind(changes.image)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
