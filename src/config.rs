use anyhow::Context;
use sqlx::postgres::PgConnectOptions;

/// Connection parameters for the Postgres database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub db_name: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source; `from_env` passes the process env.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("DATABASE_URL").filter(|v| !v.is_empty());
        // With a full URL the individual parts are optional.
        let required = |key: &str| -> anyhow::Result<String> {
            match lookup(key) {
                Some(v) => Ok(v),
                None if url.is_some() => Ok(String::new()),
                None => anyhow::bail!("{key} must be set when DATABASE_URL is not"),
            }
        };

        let database = DatabaseConfig {
            host: lookup("POSTGRES_HOST").unwrap_or_else(|| "localhost".into()),
            port: parse_or(&lookup, "POSTGRES_PORT", 5432)?,
            username: required("POSTGRES_USER")?,
            password: required("POSTGRES_PASSWORD")?,
            db_name: required("POSTGRES_DB")?,
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            url,
        };

        Ok(Self {
            database,
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&lookup, "APP_PORT", 8080)?,
        })
    }
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> anyhow::Result<PgConnectOptions> {
        if let Some(url) = &self.url {
            return url.parse().context("parse DATABASE_URL");
        }
        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.db_name))
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(v) => v.parse::<T>().with_context(|| format!("invalid {key}: {v:?}")),
        None => Ok(default),
    }
}
