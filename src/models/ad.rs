//! Video ad model and the create/update DTOs accepted by the CRUD routes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::errors::AppError;
use crate::models::category::canonical_id;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "ad_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AdStatus {
    Active,
    Inactive,
}

impl AdStatus {
    /// Case-insensitive parse of `active` / `inactive`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }

    fn parse_field(raw: &str) -> Result<Self, AppError> {
        Self::parse(raw).ok_or_else(|| {
            AppError::Validation(format!(
                "Invalid status '{}'. Supported: active, inactive",
                raw.trim()
            ))
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Ad {
    pub ad_id: String,
    pub app_id: String,
    pub category_id: String,
    pub title: String,
    pub video_url: String,
    pub click_url: Option<String>,
    pub status: AdStatus,
    pub created_at: DateTime<Utc>,
    /// Stored creative file name, present only for uploaded ads.
    pub file_ref: Option<String>,
}

/// Raw create request. Every field is optional so that all missing ones
/// can be reported together.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateAd {
    pub ad_id: Option<String>,
    pub app_id: Option<String>,
    pub category_id: Option<String>,
    pub title: Option<String>,
    pub video_url: Option<String>,
    #[serde(alias = "target_url")]
    pub click_url: Option<String>,
    pub status: Option<String>,
}

/// A validated, normalized ad ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAd {
    pub ad_id: String,
    pub app_id: String,
    pub category_id: String,
    pub title: String,
    pub video_url: String,
    pub click_url: Option<String>,
    pub status: AdStatus,
    pub file_ref: Option<String>,
}

impl CreateAd {
    pub const REQUIRED: [&'static str; 4] = ["ad_id", "category_id", "title", "video_url"];

    /// Trim every field, uppercase the category and lowercase the status.
    /// `app_id` falls back to `default_app_id` when absent or blank.
    pub fn validate(self, default_app_id: &str) -> Result<NewAd, AppError> {
        let ad_id = non_blank(self.ad_id);
        let category_id = self.category_id.as_deref().and_then(canonical_id);
        let title = non_blank(self.title);
        let video_url = non_blank(self.video_url);

        let missing: Vec<&str> = Self::REQUIRED
            .iter()
            .zip([
                ad_id.is_none(),
                category_id.is_none(),
                title.is_none(),
                video_url.is_none(),
            ])
            .filter_map(|(name, absent)| absent.then_some(*name))
            .collect();

        match (ad_id, category_id, title, video_url) {
            (Some(ad_id), Some(category_id), Some(title), Some(video_url)) => {
                let status = match non_blank(self.status) {
                    Some(raw) => AdStatus::parse_field(&raw)?,
                    None => AdStatus::Active,
                };
                Ok(NewAd {
                    ad_id,
                    app_id: non_blank(self.app_id).unwrap_or_else(|| default_app_id.to_string()),
                    category_id,
                    title,
                    video_url,
                    click_url: non_blank(self.click_url),
                    status,
                    file_ref: None,
                })
            }
            _ => Err(AppError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            ))),
        }
    }
}

/// Raw partial update request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAd {
    pub category_id: Option<String>,
    pub title: Option<String>,
    pub video_url: Option<String>,
    #[serde(alias = "target_url")]
    pub click_url: Option<String>,
    pub status: Option<String>,
}

/// Normalized set of changes for an existing ad.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdChanges {
    pub category_id: Option<String>,
    pub title: Option<String>,
    pub video_url: Option<String>,
    /// `Some(None)` clears the click-through target.
    pub click_url: Option<Option<String>>,
    pub status: Option<AdStatus>,
}

impl UpdateAd {
    pub const ALLOWED: [&'static str; 5] =
        ["category_id", "click_url", "status", "title", "video_url"];

    pub fn validate(self) -> Result<AdChanges, AppError> {
        let changes = AdChanges {
            category_id: self
                .category_id
                .map(|raw| required_change("category_id", canonical_id(&raw)))
                .transpose()?,
            title: self
                .title
                .map(|raw| required_change("title", non_blank(Some(raw))))
                .transpose()?,
            video_url: self
                .video_url
                .map(|raw| required_change("video_url", non_blank(Some(raw))))
                .transpose()?,
            click_url: self.click_url.map(|raw| non_blank(Some(raw))),
            status: self.status.as_deref().map(AdStatus::parse_field).transpose()?,
        };

        if changes == AdChanges::default() {
            return Err(AppError::Validation(format!(
                "No valid fields to update. Allowed: {}",
                Self::ALLOWED.join(", ")
            )));
        }
        Ok(changes)
    }
}

/// Query filters for listing ads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdFilters {
    pub app_id: Option<String>,
    pub category_id: Option<String>,
    pub status: Option<String>,
}

impl AdFilters {
    pub fn category(&self) -> Option<String> {
        self.category_id.as_deref().and_then(canonical_id)
    }

    pub fn app(&self) -> Option<String> {
        non_blank(self.app_id.clone())
    }

    pub fn status(&self) -> Result<Option<AdStatus>, AppError> {
        non_blank(self.status.clone())
            .map(|raw| AdStatus::parse_field(&raw))
            .transpose()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required_change(field: &str, value: Option<String>) -> Result<String, AppError> {
    value.ok_or_else(|| AppError::Validation(format!("{field} cannot be blank")))
}
