//! Per-app delivery configuration persistence.
//!
//! Every write passes through [`normalize_config`], so rows in
//! `app_configs` are always complete and in range.

use serde::Serialize;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::delivery_config::{DeliveryConfig, RawDeliveryConfig};
use crate::services::config_resolver::normalize_config;

/// Configuration response for a single app.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AppDeliveryConfig {
    pub app_id: String,
    pub config: DeliveryConfig,
}

/// Stored config for `app_id`, or the defaults when none was saved yet.
pub async fn get(pool: &PgPool, app_id: &str) -> Result<AppDeliveryConfig, AppError> {
    let stored = sqlx::query_scalar::<_, Json<DeliveryConfig>>(
        "SELECT config FROM app_configs WHERE app_id = $1",
    )
    .bind(app_id)
    .fetch_optional(pool)
    .await?;

    Ok(AppDeliveryConfig {
        app_id: app_id.to_string(),
        config: stored.map(|Json(c)| c).unwrap_or_default(),
    })
}

/// Normalize `raw` and upsert it as the app's configuration.
pub async fn upsert(
    pool: &PgPool,
    app_id: &str,
    raw: &RawDeliveryConfig,
) -> Result<AppDeliveryConfig, AppError> {
    let config = normalize_config(raw);

    sqlx::query(
        r#"
        INSERT INTO app_configs (app_id, config, updated_at)
        VALUES ($1, $2, NOW())
        ON CONFLICT (app_id) DO UPDATE SET config = EXCLUDED.config, updated_at = NOW()
        "#,
    )
    .bind(app_id)
    .bind(Json(&config))
    .execute(pool)
    .await?;

    tracing::info!(
        app_id = %app_id,
        trigger = ?config.trigger,
        x_delay_seconds = config.x_delay_seconds,
        "Delivery config saved"
    );

    Ok(AppDeliveryConfig {
        app_id: app_id.to_string(),
        config,
    })
}
