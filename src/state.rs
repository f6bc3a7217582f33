use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::apispec::ApiSpec;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub spec: Arc<ApiSpec>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env());
        let db = connect(&config.database_url).await?;
        let spec = Arc::new(
            ApiSpec::load(&config.spec_path)
                .with_context(|| format!("load OpenAPI document {}", config.spec_path))?,
        );
        Ok(Self { db, config, spec })
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>, spec: Arc<ApiSpec>) -> Self {
        Self { db, config, spec }
    }
}

/// Opens the SQLite pool, creating the database file if it does not exist.
pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .context("parse database url")?
        .create_if_missing(true);
    let db = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await
        .context("connect to database")?;
    Ok(db)
}
