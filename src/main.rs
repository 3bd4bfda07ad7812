use std::net::SocketAddr;

use anyhow::Context;
use sqlx::PgPool;
use userbase::{app, config::AppConfig, db, schema, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "userbase=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("parse listen address")?;

    let pool = db::connect(&config.database).await?;

    // The pool is closed on every path out of here, including a failed schema init.
    let result = run(&pool, addr).await;

    db::close(&pool).await;
    if let Err(e) = &result {
        tracing::error!(error = ?e, "server stopped with error");
    }
    result
}

async fn run(pool: &PgPool, addr: SocketAddr) -> anyhow::Result<()> {
    schema::init(pool).await.context("initialize schema")?;
    let app = app::build_app(AppState::new(pool.clone()));
    app::serve(app, addr, app::shutdown_signal()).await
}
