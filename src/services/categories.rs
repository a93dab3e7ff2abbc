//! Category reference data queries.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::category::Category;
use crate::services::ad_selector::CategorySource;

/// List every category, ordered by id.
pub async fn list(pool: &PgPool) -> Result<Vec<Category>, AppError> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT id, display_name, description FROM categories ORDER BY id",
    )
    .fetch_all(pool)
    .await?;
    Ok(categories)
}

#[async_trait]
impl CategorySource for PgPool {
    async fn fetch_categories(&self) -> Result<Vec<String>, AppError> {
        let ids = sqlx::query_scalar::<_, String>("SELECT id FROM categories ORDER BY id")
            .fetch_all(self)
            .await?;
        Ok(ids)
    }
}
