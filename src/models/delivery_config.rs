//! Per-app delivery configuration: which categories to request, when the
//! client should show an ad, and how long before it can be skipped.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// When a client should display an ad.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Trigger {
    /// After `count` user clicks.
    Clicks { count: i64 },
    /// Every `seconds` seconds while the app is in the foreground.
    Interval { seconds: i64 },
}

/// A fully normalized delivery configuration. Only values produced by
/// `services::config_resolver::normalize_config` are ever persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeliveryConfig {
    pub categories: Vec<String>,
    pub trigger: Trigger,
    pub x_delay_seconds: i64,
}

/// Raw, possibly partial or malformed configuration as sent by a client.
///
/// Every recognized field is kept as loose JSON so that wrong types can be
/// defaulted by the resolver instead of rejected at deserialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDeliveryConfig {
    /// Expected: array of category id strings.
    pub categories: Option<Value>,
    /// Expected: object with `type` and `count` or `seconds`.
    pub trigger: Option<RawTrigger>,
    /// Expected: integer or integer-like string.
    pub x_delay_seconds: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTrigger {
    pub kind: Option<Value>,
    pub count: Option<Value>,
    pub seconds: Option<Value>,
}

impl RawDeliveryConfig {
    /// Extract recognized fields from arbitrary JSON. Non-object input and
    /// unknown keys are ignored; JSON `null` counts as absent.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };
        Self {
            categories: present(obj.get("categories")),
            trigger: obj.get("trigger").and_then(Value::as_object).map(|t| RawTrigger {
                kind: present(t.get("type")),
                count: present(t.get("count")),
                seconds: present(t.get("seconds")),
            }),
            x_delay_seconds: present(obj.get("x_delay_seconds")),
        }
    }

    /// Accept either a bare config object or one wrapped as `{"config": {...}}`.
    pub fn from_request_body(body: &Value) -> Self {
        match body.get("config") {
            Some(inner) if inner.is_object() => Self::from_value(inner),
            _ => Self::from_value(body),
        }
    }
}

impl From<&DeliveryConfig> for RawDeliveryConfig {
    fn from(config: &DeliveryConfig) -> Self {
        Self::from_value(&serde_json::to_value(config).unwrap_or(Value::Null))
    }
}

fn present(value: Option<&Value>) -> Option<Value> {
    value.filter(|v| !v.is_null()).cloned()
}
