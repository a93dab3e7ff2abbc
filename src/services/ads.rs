//! Ad inventory service: CRUD plus the candidate query used by selection.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::ad::{Ad, AdChanges, AdFilters, AdStatus, NewAd};
use crate::services::ad_selector::AdSource;

const AD_COLUMNS: &str =
    "ad_id, app_id, category_id, title, video_url, click_url, status, created_at, file_ref";

/// Insert a validated ad.
///
/// A duplicate `(app_id, ad_id)` is a conflict; an unknown category is a
/// validation error.
pub async fn create(pool: &PgPool, input: &NewAd) -> Result<Ad, AppError> {
    let sql = format!(
        "INSERT INTO ads (ad_id, app_id, category_id, title, video_url, click_url, status, file_ref)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING {AD_COLUMNS}"
    );
    let ad = sqlx::query_as::<_, Ad>(&sql)
        .bind(&input.ad_id)
        .bind(&input.app_id)
        .bind(&input.category_id)
        .bind(&input.title)
        .bind(&input.video_url)
        .bind(&input.click_url)
        .bind(input.status)
        .bind(&input.file_ref)
        .fetch_one(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(format!("ad_id '{}' already exists", input.ad_id))
            }
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::Validation(format!("Unknown category '{}'", input.category_id))
            }
            _ => AppError::Database(e),
        })?;

    tracing::info!(
        ad_id = %ad.ad_id,
        app_id = %ad.app_id,
        category_id = %ad.category_id,
        "Ad created"
    );
    Ok(ad)
}

/// List ads matching the optional filters, newest first.
pub async fn list(pool: &PgPool, filters: &AdFilters) -> Result<Vec<Ad>, AppError> {
    let app_id = filters.app();
    let category_id = filters.category();
    let status = filters.status()?;

    let mut conditions: Vec<String> = Vec::new();
    let mut param_index = 0u32;

    if app_id.is_some() {
        param_index += 1;
        conditions.push(format!("app_id = ${param_index}"));
    }
    if category_id.is_some() {
        param_index += 1;
        conditions.push(format!("category_id = ${param_index}"));
    }
    if status.is_some() {
        param_index += 1;
        conditions.push(format!("status = ${param_index}"));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    let sql = format!("SELECT {AD_COLUMNS} FROM ads {where_clause} ORDER BY created_at DESC");

    let mut query = sqlx::query_as::<_, Ad>(&sql);
    if let Some(ref app_id) = app_id {
        query = query.bind(app_id);
    }
    if let Some(ref category_id) = category_id {
        query = query.bind(category_id);
    }
    if let Some(status) = status {
        query = query.bind(status);
    }

    Ok(query.fetch_all(pool).await?)
}

/// Find a single ad within an app.
pub async fn find(pool: &PgPool, app_id: &str, ad_id: &str) -> Result<Ad, AppError> {
    let sql = format!("SELECT {AD_COLUMNS} FROM ads WHERE app_id = $1 AND ad_id = $2");
    sqlx::query_as::<_, Ad>(&sql)
        .bind(app_id)
        .bind(ad_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found(ad_id))
}

/// Apply a partial update and return the updated ad.
pub async fn update(
    pool: &PgPool,
    app_id: &str,
    ad_id: &str,
    changes: &AdChanges,
) -> Result<Ad, AppError> {
    let sql = format!(
        "UPDATE ads SET
            category_id = COALESCE($3, category_id),
            title = COALESCE($4, title),
            video_url = COALESCE($5, video_url),
            click_url = CASE WHEN $6 THEN $7 ELSE click_url END,
            status = COALESCE($8, status)
         WHERE app_id = $1 AND ad_id = $2
         RETURNING {AD_COLUMNS}"
    );
    let ad = sqlx::query_as::<_, Ad>(&sql)
        .bind(app_id)
        .bind(ad_id)
        .bind(&changes.category_id)
        .bind(&changes.title)
        .bind(&changes.video_url)
        .bind(changes.click_url.is_some())
        .bind(changes.click_url.clone().flatten())
        .bind(changes.status)
        .fetch_optional(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::Validation(format!(
                    "Unknown category '{}'",
                    changes.category_id.as_deref().unwrap_or_default()
                ))
            }
            _ => AppError::Database(e),
        })?
        .ok_or_else(|| not_found(ad_id))?;

    tracing::info!(ad_id = %ad.ad_id, app_id = %ad.app_id, "Ad updated");
    Ok(ad)
}

/// Delete an ad, returning the removed row so callers can clean up its
/// stored creative.
pub async fn delete(pool: &PgPool, app_id: &str, ad_id: &str) -> Result<Ad, AppError> {
    let sql = format!("DELETE FROM ads WHERE app_id = $1 AND ad_id = $2 RETURNING {AD_COLUMNS}");
    let ad = sqlx::query_as::<_, Ad>(&sql)
        .bind(app_id)
        .bind(ad_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found(ad_id))?;

    tracing::info!(ad_id = %ad.ad_id, app_id = %ad.app_id, "Ad deleted");
    Ok(ad)
}

fn not_found(ad_id: &str) -> AppError {
    AppError::NotFound(format!("Ad '{ad_id}' not found"))
}

#[async_trait]
impl AdSource for PgPool {
    async fn fetch_active_ads(
        &self,
        category_ids: &[String],
        app_id: Option<&str>,
    ) -> Result<Vec<Ad>, AppError> {
        let sql = format!(
            "SELECT {AD_COLUMNS} FROM ads
             WHERE status = $1
               AND category_id = ANY($2)
               AND ($3::text IS NULL OR app_id = $3)
             ORDER BY app_id, ad_id"
        );
        let ads = sqlx::query_as::<_, Ad>(&sql)
            .bind(AdStatus::Active)
            .bind(category_ids)
            .bind(app_id)
            .fetch_all(self)
            .await?;
        Ok(ads)
    }
}
