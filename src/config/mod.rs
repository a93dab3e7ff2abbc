use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::services::ad_selector::AppScope;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    /// Placeholder app id used by `/v1/serve` when the caller sends none.
    pub default_app_id: String,
    /// When set, serve requests must name an app and only that app's ads are eligible.
    pub require_app_id: bool,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub public_base_url: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 10),
            host: env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 5000),
            default_app_id: env::var("DEFAULT_APP_ID")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "demo_app".to_string()),
            require_app_id: env::var("REQUIRE_APP_ID")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./uploads")),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", 100 * 1024 * 1024),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:5000".to_string()),
        })
    }

    /// How serve requests treat the `app_id` parameter.
    pub fn app_scope(&self) -> AppScope {
        if self.require_app_id {
            AppScope::PerApp
        } else {
            AppScope::Shared {
                default_app_id: self.default_app_id.clone(),
            }
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
