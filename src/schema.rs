//! Idempotent schema setup run once before the server accepts traffic.

use sqlx::PgPool;
use tracing::{debug, info};

pub(crate) const CREATE_EXTENSIONS: [&str; 2] = [
    "CREATE EXTENSION IF NOT EXISTS pgcrypto",
    "CREATE EXTENSION IF NOT EXISTS citext",
];

pub(crate) const SELECT_EMAIL_DOMAIN: &str = "SELECT oid FROM pg_type WHERE typname = 'email'";

// HTML5 email grammar, kept in sync with `users::dto::EMAIL_PATTERN`.
pub(crate) const CREATE_EMAIL_DOMAIN: &str = r#"
    CREATE DOMAIN email AS citext NOT NULL
    CHECK (
        VALUE ~ '^[a-zA-Z0-9.!#$%&''*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$'
    )
"#;

pub(crate) const CREATE_USERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        email_addr EMAIL UNIQUE NOT NULL,
        first_name VARCHAR(20) NOT NULL,
        last_name VARCHAR(20) NOT NULL,
        password_hash TEXT NOT NULL
    )
"#;

/// Brings the database to the schema the service expects.
///
/// Every step is safe to repeat. The domain has no `IF NOT EXISTS` form in
/// Postgres, so its presence is checked in `pg_type` first.
pub async fn init(db: &PgPool) -> Result<(), sqlx::Error> {
    for statement in CREATE_EXTENSIONS {
        sqlx::query(statement).execute(db).await?;
    }

    let domain: Option<(sqlx::postgres::types::Oid,)> = sqlx::query_as(SELECT_EMAIL_DOMAIN)
        .fetch_optional(db)
        .await?;
    if domain.is_none() {
        sqlx::query(CREATE_EMAIL_DOMAIN).execute(db).await?;
        info!("created email domain");
    } else {
        debug!("email domain already present");
    }

    sqlx::query(CREATE_USERS_TABLE).execute(db).await?;
    info!("schema ready");
    Ok(())
}
