//! Reads and writes the "last validated" record of a page
//!
//! A missing record is a normal outcome (`Ok(None)`). Write failures are
//! returned to the caller untouched; nothing here retries.

use chrono::{DateTime, FixedOffset, Utc};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::domain::errors::{WidgetError, WidgetResult};
use crate::domain::repositories::KeyValueStore;
use crate::domain::validation_record::{
    FETCH_ERROR_STATUS, NOT_YET_VALIDATED, StoredValidation, ValidationRecord, storage_key,
};

#[derive(Clone)]
pub struct ValidationStateStore {
    store: Arc<dyn KeyValueStore>,
    display_offset: FixedOffset,
}

impl ValidationStateStore {
    pub fn new(store: Arc<dyn KeyValueStore>, display_offset: FixedOffset) -> Self {
        Self { store, display_offset }
    }

    pub const fn display_offset(&self) -> FixedOffset {
        self.display_offset
    }

    pub async fn read_validation(&self, page_id: &str) -> WidgetResult<Option<ValidationRecord>> {
        let key = storage_key(page_id);
        let Some(value) = self.store.get(&key).await? else {
            debug!("No validation record for page {}", page_id);
            return Ok(None);
        };

        let stored: StoredValidation = serde_json::from_value(value).map_err(|e| {
            error!("❌ Malformed validation record under {}: {}", key, e);
            WidgetError::storage(&key, e.to_string())
        })?;

        ValidationRecord::from_stored(page_id, stored).map(Some).map_err(|e| {
            error!("❌ Unparseable validation date under {}: {}", key, e);
            WidgetError::storage(&key, e.to_string())
        })
    }

    pub async fn write_validation(
        &self,
        page_id: &str,
        validated_at: DateTime<Utc>,
        validator_name: &str,
    ) -> WidgetResult<ValidationRecord> {
        let record = ValidationRecord::new(page_id, validated_at, validator_name);
        let key = storage_key(page_id);
        let value = serde_json::to_value(record.to_stored()).map_err(|e| WidgetError::storage(&key, e.to_string()))?;

        if let Err(e) = self.store.set(&key, value).await {
            error!("❌ Error setting last validated date for page {}: {}", page_id, e);
            return Err(e);
        }

        info!("✅ Page {} validated by {} at {}", page_id, validator_name, validated_at);
        Ok(record)
    }

    pub fn format(&self, record: &ValidationRecord) -> String {
        record.status_text(self.display_offset)
    }

    /// Status line for the widget body. Read failures are logged and shown as
    /// `FETCH_ERROR_STATUS`.
    pub async fn status_text(&self, page_id: &str) -> String {
        match self.read_validation(page_id).await {
            Ok(Some(record)) => self.format(&record),
            Ok(None) => NOT_YET_VALIDATED.to_string(),
            Err(e) => {
                error!("❌ Error fetching last validated date for page {}: {}", page_id, e);
                FETCH_ERROR_STATUS.to_string()
            }
        }
    }
}
