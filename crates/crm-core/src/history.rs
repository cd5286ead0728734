//! Persisted history payload.
//!
//! Every history entry carries a small payload next to its URL so that page
//! data, frozen per-level queries and overlong locations survive reloads and
//! back/forward navigation. Payloads are tagged with [`SCHEMA_VERSION`];
//! anything that fails to decode or carries another version is treated as
//! absent.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::HistoryError;

/// Current payload schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// One persisted stack level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedItem {
    pub view_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default)]
    pub query: String,
}

/// The payload stored in `history.state`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryState {
    pub version: u32,
    /// Position of this entry relative to the session's first entry.
    #[serde(default)]
    pub index: u64,
    #[serde(default)]
    pub stack: Vec<PersistedItem>,
    /// Untruncated location of this entry.
    #[serde(default)]
    pub href: String,
}

impl HistoryState {
    pub fn new(index: u64, stack: Vec<PersistedItem>, href: impl Into<String>) -> Self {
        Self {
            version: SCHEMA_VERSION,
            index,
            stack,
            href: href.into(),
        }
    }

    /// Decode a JSON payload. Malformed or foreign payloads yield `None`.
    pub fn from_json(raw: &str) -> Option<Self> {
        serde_json::from_str::<Self>(raw)
            .ok()
            .filter(Self::is_current)
    }

    /// Decode an already parsed JSON value. Malformed or foreign payloads yield `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        serde_json::from_value::<Self>(value)
            .ok()
            .filter(Self::is_current)
    }

    pub fn to_json(&self) -> Result<String, HistoryError> {
        serde_json::to_string(self).map_err(|e| HistoryError::Encode(e.to_string()))
    }

    /// Whether this payload was written by the current schema.
    pub fn is_current(&self) -> bool {
        self.version == SCHEMA_VERSION
    }

    /// The persisted level at `depth`, if it belongs to `view_path`.
    pub fn item_at(&self, depth: usize, view_path: &str) -> Option<&PersistedItem> {
        self.stack
            .get(depth)
            .filter(|item| item.view_path == view_path)
    }
}
