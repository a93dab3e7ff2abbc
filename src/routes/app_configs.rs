//! Per-app delivery configuration routes.
//!
//! Successful bodies are the bare `{app_id, config}` object that mobile
//! clients decode; errors keep the usual envelope.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::errors::AppError;
use crate::models::delivery_config::RawDeliveryConfig;
use crate::services::delivery_configs::{self, AppDeliveryConfig};
use crate::AppState;

fn path_app_id(raw: &str) -> Result<&str, AppError> {
    let app_id = raw.trim();
    if app_id.is_empty() {
        return Err(AppError::Validation("app_id is required".to_string()));
    }
    Ok(app_id)
}

/// GET /v1/apps/{app_id}/config: stored config, or defaults if none saved.
pub async fn get(
    State(state): State<AppState>,
    Path(app_id): Path<String>,
) -> Result<Json<AppDeliveryConfig>, AppError> {
    let config = delivery_configs::get(&state.db, path_app_id(&app_id)?).await?;
    Ok(Json(config))
}

/// PUT /v1/apps/{app_id}/config: normalize and save.
///
/// Accepts the config object itself or `{"config": {...}}`. Malformed
/// fields are replaced by defaults rather than rejected.
pub async fn update(
    State(state): State<AppState>,
    Path(app_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<AppDeliveryConfig>, AppError> {
    let app_id = path_app_id(&app_id)?;
    let raw = RawDeliveryConfig::from_request_body(&body);
    let saved = delivery_configs::upsert(&state.db, app_id, &raw).await?;
    Ok(Json(saved))
}
