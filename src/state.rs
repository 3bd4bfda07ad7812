use std::sync::Arc;

use sqlx::PgPool;

use crate::users::{InMemoryUserRepository, PgUserRepository, UserRepository};

/// Shared handler state. Holds the injected repository, nothing mutable.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
}

impl AppState {
    pub fn new(db: PgPool) -> Self {
        Self::from_repository(Arc::new(PgUserRepository::new(db)))
    }

    pub fn from_repository(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// State backed by an empty in-memory repository.
    pub fn in_memory() -> Self {
        Self::from_repository(Arc::new(InMemoryUserRepository::new()))
    }
}
