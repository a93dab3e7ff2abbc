//! Ad inventory routes: CRUD and creative upload.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::{ApiResponse, AppError};
use crate::models::ad::{Ad, AdFilters, CreateAd, UpdateAd};
use crate::services::{ads as ad_service, creatives};
use crate::AppState;

/// `?app_id=` selector for single-ad routes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppQuery {
    pub app_id: Option<String>,
}

/// Response body for a deletion.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: bool,
    pub app_id: String,
    pub ad_id: String,
}

/// Resolve the owning app of a request: explicit value, else the default
/// app unless the server is app-scoped.
fn owning_app(state: &AppState, app_id: Option<&str>) -> Result<String, AppError> {
    match app_id.map(str::trim).filter(|s| !s.is_empty()) {
        Some(app_id) => Ok(app_id.to_string()),
        None if state.config.require_app_id => {
            Err(AppError::Validation("app_id is required".to_string()))
        }
        None => Ok(state.config.default_app_id.clone()),
    }
}

/// GET /v1/ads: list ads, optionally filtered by app, category and status.
pub async fn list(
    State(state): State<AppState>,
    Query(filters): Query<AdFilters>,
) -> Result<Json<ApiResponse<Vec<Ad>>>, AppError> {
    let ads = ad_service::list(&state.db, &filters).await?;
    Ok(ApiResponse::success(ads))
}

/// POST /v1/ads: create an ad from JSON.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateAd>,
) -> Result<(StatusCode, Json<ApiResponse<Ad>>), AppError> {
    let app_id = owning_app(&state, body.app_id.as_deref())?;
    let new_ad = body.validate(&app_id)?;
    let ad = ad_service::create(&state.db, &new_ad).await?;
    Ok(ApiResponse::created(ad))
}

/// GET /v1/ads/{ad_id}: fetch one ad.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(ad_id): Path<String>,
    Query(query): Query<AppQuery>,
) -> Result<Json<ApiResponse<Ad>>, AppError> {
    let app_id = owning_app(&state, query.app_id.as_deref())?;
    let ad = ad_service::find(&state.db, &app_id, ad_id.trim()).await?;
    Ok(ApiResponse::success(ad))
}

/// PUT /v1/ads/{ad_id}: partial update.
pub async fn update(
    State(state): State<AppState>,
    Path(ad_id): Path<String>,
    Query(query): Query<AppQuery>,
    Json(body): Json<UpdateAd>,
) -> Result<Json<ApiResponse<Ad>>, AppError> {
    let changes = body.validate()?;
    let app_id = owning_app(&state, query.app_id.as_deref())?;
    let ad = ad_service::update(&state.db, &app_id, ad_id.trim(), &changes).await?;
    Ok(ApiResponse::success(ad))
}

/// DELETE /v1/ads/{ad_id}: delete an ad and its uploaded creative, if any.
pub async fn delete(
    State(state): State<AppState>,
    Path(ad_id): Path<String>,
    Query(query): Query<AppQuery>,
) -> Result<Json<ApiResponse<Deleted>>, AppError> {
    let app_id = owning_app(&state, query.app_id.as_deref())?;
    let ad = ad_service::delete(&state.db, &app_id, ad_id.trim()).await?;

    if let Some(ref file_ref) = ad.file_ref {
        if let Err(e) = creatives::remove(&state.config.upload_dir, file_ref).await {
            tracing::warn!(
                error = %e,
                file_ref = %file_ref,
                "Failed to remove creative of deleted ad"
            );
        }
    }

    Ok(ApiResponse::success(Deleted {
        deleted: true,
        app_id: ad.app_id,
        ad_id: ad.ad_id,
    }))
}

/// POST /v1/ads/upload: store a video creative and create its ad (multipart).
///
/// Fields: `file` plus text fields `ad_id`, `app_id`, `category_id`,
/// `title`, `click_url`, `status`.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<Ad>>), AppError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name = String::from("unknown");
    let mut body = CreateAd::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == "file" {
            if let Some(fname) = field.file_name() {
                file_name = fname.to_string();
            }
            file_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?
                    .to_vec(),
            );
            continue;
        }

        let slot = match name.as_str() {
            "ad_id" => &mut body.ad_id,
            "app_id" => &mut body.app_id,
            "category_id" => &mut body.category_id,
            "title" => &mut body.title,
            "click_url" | "target_url" => &mut body.click_url,
            "status" => &mut body.status,
            _ => continue,
        };
        *slot = Some(
            field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read {name}: {e}")))?,
        );
    }

    let data = file_data.ok_or_else(|| {
        AppError::Validation("Missing 'file' field in multipart request".to_string())
    })?;

    let app_id = owning_app(&state, body.app_id.as_deref())?;
    let stored = creatives::store(&state.config.upload_dir, &file_name, &data).await?;
    body.video_url = Some(stored.public_url(&state.config.public_base_url));

    let created = match body.validate(&app_id) {
        Ok(mut new_ad) => {
            new_ad.file_ref = Some(stored.file_ref.clone());
            ad_service::create(&state.db, &new_ad).await
        }
        Err(e) => Err(e),
    };

    match created {
        Ok(ad) => Ok(ApiResponse::created(ad)),
        Err(e) => {
            let cleanup = creatives::remove(&state.config.upload_dir, &stored.file_ref).await;
            if let Err(cleanup) = cleanup {
                tracing::warn!(
                    error = %cleanup,
                    file_ref = %stored.file_ref,
                    "Failed to remove orphaned creative"
                );
            }
            Err(e)
        }
    }
}
