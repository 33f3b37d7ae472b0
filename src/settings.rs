//! Host settings object.
//!
//! The host hands every source a bag of string-keyed values and persists it in
//! its own scene collection. Reads never fail: a missing key, or a value of the
//! wrong type, yields the type's zero value.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Settings key for the camera index
pub const KEY_CAMERA: &str = "scene_camera";
/// Settings key for the action selector
pub const KEY_ACTION: &str = "scene_action";
/// Settings key for the preset id
pub const KEY_PRESET: &str = "scene_preset";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings {
    values: Map<String, Value>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse settings from the JSON the host stores them as.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse settings JSON")
    }

    pub fn to_json(&self) -> String {
        Value::Object(self.values.clone()).to_string()
    }

    /// Integer value for `key`, or 0 when absent or not a number.
    ///
    /// Floating point values are truncated toward zero.
    pub fn get_int(&self, key: &str) -> i64 {
        match self.values.get(key) {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_u64().map(|v| v as i64))
                .or_else(|| n.as_f64().map(|v| v as i64))
                .unwrap_or(0),
            _ => 0,
        }
    }

    pub fn set_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), Value::from(value));
    }

    /// String value for `key`, or "" when absent or not a string.
    pub fn get_string(&self, key: &str) -> &str {
        self.values.get(key).and_then(Value::as_str).unwrap_or("")
    }

    pub fn set_string(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), Value::from(value));
    }
}
