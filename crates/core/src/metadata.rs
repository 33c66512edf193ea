// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dynamic per-container metadata.
//!
//! Modeled as a tagged-scalar mapping rather than opaque dynamic values, per the
//! "dynamic command metadata" design note: the daemon never needs to serialize
//! or compare arbitrary nested structures, only flat key → scalar pairs copied
//! in at container creation and updated explicitly thereafter.

use std::collections::HashMap;

/// A single scalar metadata value.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MetadataValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<bool> for MetadataValue {
    fn from(v: bool) -> Self {
        MetadataValue::Bool(v)
    }
}

impl From<i64> for MetadataValue {
    fn from(v: i64) -> Self {
        MetadataValue::Int(v)
    }
}

impl From<f64> for MetadataValue {
    fn from(v: f64) -> Self {
        MetadataValue::Float(v)
    }
}

impl From<&str> for MetadataValue {
    fn from(v: &str) -> Self {
        MetadataValue::Str(v.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(v: String) -> Self {
        MetadataValue::Str(v)
    }
}

/// Free-form container metadata: copied on creation, mutable only via explicit
/// updates, frozen once the owning container reaches a terminal lifecycle state.
pub type Metadata = HashMap<String, MetadataValue>;

/// Returns true if `key` has not been touched (inserted or overwritten) since
/// `since_epoch_ms`. Used by the health monitor's suspicious-loop heuristic to
/// tell a genuinely stuck container apart from one making slow but real
/// progress via a `"progress"` metadata marker.
pub fn touched_since(touched_at_ms: &HashMap<String, u64>, key: &str, since_epoch_ms: u64) -> bool {
    touched_at_ms.get(key).is_some_and(|&t| t >= since_epoch_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_value_conversions_round_trip_through_json() {
        let v: MetadataValue = 42i64.into();
        let json = serde_json::to_string(&v).expect("serialize");
        let back: MetadataValue = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(v, back);
    }

    #[test]
    fn touched_since_is_false_when_key_missing() {
        let touched = HashMap::new();
        assert!(!touched_since(&touched, "progress", 100));
    }

    #[test]
    fn touched_since_is_true_when_touch_at_or_after_window_start() {
        let mut touched = HashMap::new();
        touched.insert("progress".to_string(), 150);
        assert!(touched_since(&touched, "progress", 100));
        assert!(!touched_since(&touched, "progress", 200));
    }
}
