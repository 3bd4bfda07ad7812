use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod memory;
pub mod password;
pub mod repo;
pub mod repo_types;

pub use memory::InMemoryUserRepository;
pub use repo::{PgUserRepository, UserRepository};

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::user_routes())
}
