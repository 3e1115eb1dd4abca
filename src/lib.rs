pub mod app;
pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod products;
pub mod state;
pub mod storage;
pub mod uploads;
pub mod users;

pub use app::build_app;
pub use error::{AppError, AppResult};
pub use state::AppState;
