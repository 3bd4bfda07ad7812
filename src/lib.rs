//! User registration service: create, list and password-check users stored in Postgres.

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod schema;
pub mod state;
pub mod users;
