use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::password::hash_password;
use super::repo_types::{NewUser, RepoResult, User};

/// Storage seam for the users table. Handlers only see this trait.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user and return the assigned id.
    async fn insert_user(&self, user: NewUser) -> RepoResult<i32>;

    /// All users in insertion order, optionally capped at `limit` rows.
    async fn list_users(&self, limit: Option<i64>) -> RepoResult<Vec<User>>;

    async fn find_id_by_email(&self, email_addr: &str) -> RepoResult<Option<i32>>;

    async fn find_password_hash(&self, id: i32) -> RepoResult<Option<String>>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert_user(&self, user: NewUser) -> RepoResult<i32> {
        let password_hash = hash_password(&user.password)?;
        let (id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO users (email_addr, first_name, last_name, password_hash)
            VALUES ($1::citext, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&user.email_addr)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&password_hash)
        .fetch_one(&self.db)
        .await?;
        debug!(user_id = id, "user row inserted");
        Ok(id)
    }

    async fn list_users(&self, limit: Option<i64>) -> RepoResult<Vec<User>> {
        // NULL limit means no limit in Postgres.
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email_addr::text AS email_addr, first_name, last_name, password_hash
            FROM users
            ORDER BY id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;
        Ok(users)
    }

    async fn find_id_by_email(&self, email_addr: &str) -> RepoResult<Option<i32>> {
        let row: Option<(i32,)> =
            sqlx::query_as(r#"SELECT id FROM users WHERE email_addr = $1::citext"#)
                .bind(email_addr)
                .fetch_optional(&self.db)
                .await?;
        Ok(row.map(|(id,)| id))
    }

    async fn find_password_hash(&self, id: i32) -> RepoResult<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as(r#"SELECT password_hash FROM users WHERE id = $1"#)
                .bind(id)
                .fetch_optional(&self.db)
                .await?;
        Ok(row.map(|(hash,)| hash))
    }
}
