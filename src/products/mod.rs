mod dto;
pub mod handlers;
pub mod memory;
pub mod repo;
pub mod repo_types;

use crate::state::AppState;
use axum::Router;

pub use memory::InMemoryProductRepository;
pub use repo::{PgProductRepository, ProductRepository};
pub use repo_types::{NewProduct, Product, ProductChanges};

pub fn router() -> Router<AppState> {
    handlers::product_routes()
}
