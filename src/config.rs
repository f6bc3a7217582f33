use serde::Deserialize;

/// Runtime configuration. Every value has a default matching the demo
/// deployment, so the service starts with no environment at all.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub spec_path: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://userdir.db".into()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8000),
            spec_path: std::env::var("OPENAPI_SPEC").unwrap_or_else(|_| "openapi.json".into()),
        }
    }
}
