//! Ad category reference data.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Category {
    /// Uppercase identifier, e.g. `SPORT`.
    pub id: String,
    pub display_name: String,
    pub description: String,
}

/// Canonical form of a category identifier: trimmed and uppercased.
///
/// Returns `None` for blank input.
pub fn canonical_id(raw: &str) -> Option<String> {
    let id = raw.trim().to_uppercase();
    (!id.is_empty()).then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_id_uppercases_and_trims() {
        assert_eq!(canonical_id("  sport "), Some("SPORT".to_string()));
        assert_eq!(canonical_id("Tech"), Some("TECH".to_string()));
    }

    #[test]
    fn canonical_id_rejects_blank() {
        assert_eq!(canonical_id(""), None);
        assert_eq!(canonical_id("   "), None);
    }
}
