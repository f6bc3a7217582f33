//! One-shot seeding process. Drops and recreates the users table with the
//! fixture records. Never run while the service is serving traffic.

use userdir::config::AppConfig;
use userdir::{seed, state};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "userdir=debug".to_string());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = AppConfig::from_env();
    let db = state::connect(&config.database_url).await?;
    seed::rebuild(&db).await?;

    tracing::info!(database_url = %config.database_url, "seed complete");
    Ok(())
}
