use std::collections::BTreeMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use super::{
    repo::UserRepository,
    repo_types::{NewUser, User, UserChanges},
};
use crate::error::RepoError;

#[derive(Default)]
struct Inner {
    next_id: i64,
    users: BTreeMap<i64, User>,
}

/// Process-local user store with the same uniqueness rule as the `users` table.
#[derive(Default)]
pub struct InMemoryUserRepository {
    inner: RwLock<Inner>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Inner {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_all(&self) -> Result<Vec<User>, RepoError> {
        Ok(self.inner.read().await.users.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .inner
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, RepoError> {
        let mut inner = self.inner.write().await;
        if inner.email_taken(&user.email, None) {
            return Err(RepoError::Duplicate("email".into()));
        }
        inner.next_id += 1;
        let user = User {
            id: inner.next_id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            image: user.image,
            created_at: OffsetDateTime::now_utc(),
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<User>, RepoError> {
        let mut inner = self.inner.write().await;
        if let Some(email) = &changes.email {
            if inner.email_taken(email, Some(id)) {
                return Err(RepoError::Duplicate("email".into()));
            }
        }
        let Some(user) = inner.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(hash) = changes.password_hash {
            user.password_hash = hash;
        }
        if let Some(image) = changes.image {
            user.image = Some(image);
        }
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        Ok(self.inner.write().await.users.remove(&id).is_some())
    }
}
