//! Repository interfaces
//!
//! The durable store is an opaque string-keyed map of JSON values. Only
//! single-key reads and upserts are needed; nothing spans keys.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::errors::WidgetResult;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// `Ok(None)` when the key has never been written.
    async fn get(&self, key: &str) -> WidgetResult<Option<Value>>;

    /// Replaces any previous value stored under `key`.
    async fn set(&self, key: &str, value: Value) -> WidgetResult<()>;
}
