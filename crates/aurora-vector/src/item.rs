//! Index item record.
//!
//! Items come from an external indexing subsystem and are treated as opaque
//! here: the store persists them as-is plus the embedding they were augmented
//! with on insertion.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Opaque record produced by the indexing subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexItem {
    /// Stable item identifier (unique within the subsystem)
    pub id: String,
    /// Producing subsystem (e.g. "pages", "notes")
    pub source: String,
    /// Text that gets embedded
    pub text: String,
    /// Free-form payload, passed through untouched
    #[serde(default)]
    pub payload: serde_json::Value,
    /// Creation time (ms since epoch)
    #[serde(default = "now_ms")]
    pub created_at: i64,
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

impl IndexItem {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            text: text.into(),
            payload: serde_json::Value::Null,
            created_at: now_ms(),
        }
    }

    /// Attach a payload (builder pattern).
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_passthrough() {
        let item = IndexItem::new("page:1", "pages", "hello world")
            .with_payload(serde_json::json!({"url": "https://example.com"}));
        let json = serde_json::to_string(&item).unwrap();
        let decoded: IndexItem = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.payload["url"], "https://example.com");
        assert_eq!(decoded, item);
    }
}
