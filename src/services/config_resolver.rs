//! Delivery configuration normalization.
//!
//! Turns a raw, possibly partial client payload into a complete
//! [`DeliveryConfig`]. Malformed fields never fail the request; each one
//! falls back to its documented default and is then clamped into range.

use std::ops::RangeInclusive;

use serde_json::Value;

use crate::models::category::canonical_id;
use crate::models::delivery_config::{DeliveryConfig, RawDeliveryConfig, RawTrigger, Trigger};

pub const DEFAULT_CATEGORIES: [&str; 3] = ["SPORT", "FOOD", "TECH"];

pub const DEFAULT_CLICK_COUNT: i64 = 15;
pub const MIN_CLICK_COUNT: i64 = 1;

pub const DEFAULT_INTERVAL_SECONDS: i64 = 120;
pub const MIN_INTERVAL_SECONDS: i64 = 10;

pub const DEFAULT_DELAY_SECONDS: i64 = 5;
/// Two-sided clamp for `x_delay_seconds`.
pub const DELAY_RANGE: RangeInclusive<i64> = 5..=30;

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            trigger: Trigger::Clicks {
                count: DEFAULT_CLICK_COUNT,
            },
            x_delay_seconds: DEFAULT_DELAY_SECONDS,
        }
    }
}

/// Resolve a raw configuration into a complete, clamped record.
pub fn normalize_config(raw: &RawDeliveryConfig) -> DeliveryConfig {
    let defaults = DeliveryConfig::default();

    let categories = raw
        .categories
        .as_ref()
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .filter_map(canonical_id)
                .collect::<Vec<_>>()
        })
        .filter(|ids| !ids.is_empty())
        .unwrap_or(defaults.categories);

    let trigger = raw
        .trigger
        .as_ref()
        .map(|t| resolve_trigger(t, defaults.trigger))
        .unwrap_or(defaults.trigger);

    let x_delay_seconds = int_or(raw.x_delay_seconds.as_ref(), DEFAULT_DELAY_SECONDS)
        .clamp(*DELAY_RANGE.start(), *DELAY_RANGE.end());

    DeliveryConfig {
        categories,
        trigger,
        x_delay_seconds,
    }
}

fn resolve_trigger(raw: &RawTrigger, current: Trigger) -> Trigger {
    let kind = raw
        .kind
        .as_ref()
        .and_then(Value::as_str)
        .map(|s| s.trim().to_uppercase())
        .unwrap_or_else(|| trigger_kind(&current).to_string());

    if kind == "INTERVAL" {
        Trigger::Interval {
            seconds: int_or(raw.seconds.as_ref(), DEFAULT_INTERVAL_SECONDS)
                .max(MIN_INTERVAL_SECONDS),
        }
    } else {
        Trigger::Clicks {
            count: int_or(raw.count.as_ref(), DEFAULT_CLICK_COUNT).max(MIN_CLICK_COUNT),
        }
    }
}

fn trigger_kind(trigger: &Trigger) -> &'static str {
    match trigger {
        Trigger::Clicks { .. } => "CLICKS",
        Trigger::Interval { .. } => "INTERVAL",
    }
}

/// Integer coercion for loosely-typed JSON.
///
/// Integers pass through, floats truncate toward zero (saturating), and
/// strings must parse as a whole integer after trimming. Anything else is
/// `None`.
pub fn parse_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse-or-default: the literal `default` on absence or any parse failure.
pub fn int_or(value: Option<&Value>, default: i64) -> i64 {
    value.and_then(parse_int).unwrap_or(default)
}
