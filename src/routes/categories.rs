use axum::{extract::State, Json};

use crate::errors::{ApiResponse, AppError};
use crate::models::category::Category;
use crate::services::categories;
use crate::AppState;

/// GET /v1/categories: all ad categories.
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Category>>>, AppError> {
    let categories = categories::list(&state.db).await?;
    Ok(ApiResponse::success(categories))
}
