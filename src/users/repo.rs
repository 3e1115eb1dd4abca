use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::{NewUser, User, UserChanges};
use crate::error::RepoError;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_all(&self) -> Result<Vec<User>, RepoError>;
    async fn get_by_id(&self, id: i64) -> Result<Option<User>, RepoError>;
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
    async fn create(&self, user: NewUser) -> Result<User, RepoError>;
    /// Returns `None` when no user has this id.
    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<User>, RepoError>;
    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: i64) -> Result<bool, RepoError>;
}

const USER_COLUMNS: &str = "id, name, email, password_hash, image, created_at";

pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn get_all(&self) -> Result<Vec<User>, RepoError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(users)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create(&self, user: NewUser) -> Result<User, RepoError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, image)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.name)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.image)
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }

    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
               SET name          = COALESCE($2, name),
                   email         = COALESCE($3, email),
                   password_hash = COALESCE($4, password_hash),
                   image         = COALESCE($5, image)
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.password_hash)
        .bind(changes.image)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
