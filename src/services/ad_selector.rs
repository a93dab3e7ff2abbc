//! Ad selection for `/v1/serve`.
//!
//! Resolves the effective category set, fetches active candidates from the
//! storage collaborators and picks one, honouring a manual ad id when it is
//! among the candidates and falling back to a uniform random pick otherwise.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::ad::Ad;
use crate::models::category::canonical_id;

/// Supplies every known category id.
#[async_trait]
pub trait CategorySource: Send + Sync {
    async fn fetch_categories(&self) -> Result<Vec<String>, AppError>;
}

/// Supplies active ads whose category is in `category_ids`, optionally
/// restricted to a single owning app.
#[async_trait]
pub trait AdSource: Send + Sync {
    async fn fetch_active_ads(
        &self,
        category_ids: &[String],
        app_id: Option<&str>,
    ) -> Result<Vec<Ad>, AppError>;
}

/// How the `app_id` parameter is treated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppScope {
    /// Ads are shared by every app; a missing app id becomes `default_app_id`.
    Shared { default_app_id: String },
    /// App id is mandatory and candidates are restricted to that app's ads.
    PerApp,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum SelectionMode {
    Random,
    Manual,
}

impl SelectionMode {
    /// Case-insensitive; anything other than `MANUAL` is `RANDOM`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|m| m.trim().to_ascii_uppercase()).as_deref() {
            Some("MANUAL") => Self::Manual,
            _ => Self::Random,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoAdReason {
    NoFill,
}

/// Query parameters of a serve request, as received.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServeRequest {
    pub app_id: Option<String>,
    /// Comma-separated category ids, e.g. `SPORT,TECH`.
    pub categories: Option<String>,
    pub mode: Option<String>,
    /// Preferred ad when `mode=MANUAL`.
    pub ad_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SelectionResult {
    pub ad: Option<Ad>,
    /// Mode actually used; differs from the requested one after a manual
    /// fallback, and is `None` when nothing was selected.
    pub mode: Option<SelectionMode>,
    pub reason: Option<NoAdReason>,
    pub app_id: String,
    pub effective_categories: Vec<String>,
}

impl SelectionResult {
    pub fn is_no_fill(&self) -> bool {
        self.reason == Some(NoAdReason::NoFill)
    }
}

/// Split a comma-separated category parameter into canonical ids.
///
/// Returns `None` when the parameter is absent or blank, meaning "all
/// known categories".
pub fn parse_category_list(raw: Option<&str>) -> Option<Vec<String>> {
    raw.filter(|s| !s.trim().is_empty())
        .map(|s| s.split(',').filter_map(canonical_id).collect())
}

/// Select one ad for a serve request.
pub async fn select_ad<C, A, R>(
    request: &ServeRequest,
    scope: &AppScope,
    categories: &C,
    ads: &A,
    rng: &mut R,
) -> Result<SelectionResult, AppError>
where
    C: CategorySource + ?Sized,
    A: AdSource + ?Sized,
    R: Rng + ?Sized,
{
    let requested_app = request
        .app_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let (app_id, app_filter) = match scope {
        AppScope::Shared { default_app_id } => (
            requested_app.unwrap_or(default_app_id.as_str()).to_string(),
            None,
        ),
        AppScope::PerApp => {
            let app_id = requested_app
                .ok_or_else(|| AppError::Validation("app_id is required".to_string()))?;
            (app_id.to_string(), Some(app_id))
        }
    };

    let effective_categories = match parse_category_list(request.categories.as_deref()) {
        Some(ids) => ids,
        None => categories.fetch_categories().await?,
    };

    let candidates = ads
        .fetch_active_ads(&effective_categories, app_filter)
        .await?;

    let mode = SelectionMode::parse(request.mode.as_deref());
    let manual_ad_id = request
        .ad_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let picked = pick(candidates, mode, manual_ad_id, rng);

    tracing::debug!(
        app_id = %app_id,
        categories = ?effective_categories,
        requested_mode = ?mode,
        mode_used = ?picked.as_ref().map(|(_, m)| *m),
        ad_id = ?picked.as_ref().map(|(ad, _)| ad.ad_id.as_str()),
        "Ad selection resolved"
    );

    Ok(match picked {
        Some((ad, mode_used)) => SelectionResult {
            ad: Some(ad),
            mode: Some(mode_used),
            reason: None,
            app_id,
            effective_categories,
        },
        None => SelectionResult {
            ad: None,
            mode: None,
            reason: Some(NoAdReason::NoFill),
            app_id,
            effective_categories,
        },
    })
}

/// Apply the manual-then-random policy to an already fetched candidate set.
pub fn pick<R: Rng + ?Sized>(
    mut candidates: Vec<Ad>,
    mode: SelectionMode,
    manual_ad_id: Option<&str>,
    rng: &mut R,
) -> Option<(Ad, SelectionMode)> {
    if candidates.is_empty() {
        return None;
    }

    if mode == SelectionMode::Manual {
        if let Some(wanted) = manual_ad_id {
            if let Some(idx) = candidates.iter().position(|ad| ad.ad_id == wanted) {
                return Some((candidates.swap_remove(idx), SelectionMode::Manual));
            }
            tracing::debug!(
                ad_id = wanted,
                "Manual ad not among candidates, falling back to random"
            );
        }
    }

    candidates
        .choose(rng)
        .cloned()
        .map(|ad| (ad, SelectionMode::Random))
}
