use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    auth::JwtKeys,
    config::AppConfig,
    db,
    products::{InMemoryProductRepository, PgProductRepository, ProductRepository},
    storage::{MemoryStorage, Storage, StorageClient},
    users::{InMemoryUserRepository, PgUserRepository, UserRepository},
};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub storage: Arc<dyn StorageClient>,
    pub jwt: Arc<JwtKeys>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let pool = db::connect(&config).await?;
        db::migrate(&pool).await?;

        let storage = Arc::new(Storage::new(&config.storage).await?) as Arc<dyn StorageClient>;

        Ok(Self::from_parts(
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgProductRepository::new(pool)),
            storage,
            config,
        ))
    }

    pub fn from_parts(
        users: Arc<dyn UserRepository>,
        products: Arc<dyn ProductRepository>,
        storage: Arc<dyn StorageClient>,
        config: AppConfig,
    ) -> Self {
        Self {
            users,
            products,
            storage,
            jwt: Arc::new(JwtKeys::new(&config.jwt)),
            config: Arc::new(config),
        }
    }

    /// In-memory repositories and storage with `AppConfig::for_tests`.
    pub fn fake() -> Self {
        Self::from_parts(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryProductRepository::new()),
            Arc::new(MemoryStorage::new()),
            AppConfig::for_tests(),
        )
    }
}

impl FromRef<AppState> for Arc<JwtKeys> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}
