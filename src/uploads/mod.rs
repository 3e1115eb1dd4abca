pub mod handlers;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use services::UploadKind;

pub fn router(max_bytes: usize) -> Router<AppState> {
    handlers::upload_routes(max_bytes)
}
