//! Ad serving route.
//!
//! Mobile clients decode this body directly, so it is not wrapped in the
//! `{data, error}` envelope used by the inventory routes. Errors still are.

use axum::{
    extract::{Query, State},
    Json,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::ad::Ad;
use crate::services::ad_selector::{
    self, NoAdReason, SelectionMode, SelectionResult, ServeRequest,
};
use crate::AppState;

/// A served ad: the stored row plus `target_url`, the name clients read the
/// click-through link under.
#[derive(Debug, Serialize)]
pub struct ServedAd {
    #[serde(flatten)]
    pub ad: Ad,
    pub target_url: Option<String>,
}

impl From<Ad> for ServedAd {
    fn from(ad: Ad) -> Self {
        let target_url = ad.click_url.clone();
        Self { ad, target_url }
    }
}

#[derive(Debug, Serialize)]
pub struct ServeResponse {
    pub ad: Option<ServedAd>,
    pub mode: Option<SelectionMode>,
    pub reason: Option<NoAdReason>,
    pub app_id: String,
    pub effective_categories: Vec<String>,
    /// Same list as `effective_categories`.
    pub requested_categories: Vec<String>,
}

impl From<SelectionResult> for ServeResponse {
    fn from(result: SelectionResult) -> Self {
        Self {
            ad: result.ad.map(ServedAd::from),
            mode: result.mode,
            reason: result.reason,
            app_id: result.app_id,
            requested_categories: result.effective_categories.clone(),
            effective_categories: result.effective_categories,
        }
    }
}

/// GET /v1/serve: pick one ad for the requesting app.
///
/// An empty inventory is still a 200; the body carries `reason: "NO_FILL"`
/// together with the categories that were searched.
pub async fn serve(
    State(state): State<AppState>,
    Query(request): Query<ServeRequest>,
) -> Result<Json<ServeResponse>, AppError> {
    let mut rng = StdRng::from_entropy();
    let result = ad_selector::select_ad(
        &request,
        &state.config.app_scope(),
        &state.db,
        &state.db,
        &mut rng,
    )
    .await?;

    if result.is_no_fill() {
        tracing::info!(
            app_id = %result.app_id,
            categories = ?result.effective_categories,
            "No fill"
        );
    }

    Ok(Json(result.into()))
}
