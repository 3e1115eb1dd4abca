mod dto;
pub mod handlers;
pub mod memory;
pub mod repo;
pub mod repo_types;

use crate::state::AppState;
use axum::Router;

pub use memory::InMemoryUserRepository;
pub use repo::{PgUserRepository, UserRepository};
pub use repo_types::{NewUser, User, UserChanges};

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::user_routes())
        .merge(handlers::token_routes())
}
