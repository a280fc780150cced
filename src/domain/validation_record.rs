//! Per-page validation record and the display strings derived from it
//!
//! One record per page, stored under `lastValidated-{pageId}` as
//! `{"date": "<ISO-8601>", "userName": "<name>"}`. Writing replaces the
//! previous record; there is no history.

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub const STORAGE_KEY_PREFIX: &str = "lastValidated-";

/// Status shown when a page has never been validated.
pub const NOT_YET_VALIDATED: &str = "Not yet validated";

/// Status shown when the stored record could not be read.
pub const FETCH_ERROR_STATUS: &str = "Error fetching date";

/// Label returned by the dynamic title when anything inside it fails.
pub const DYNAMIC_TITLE_ERROR: &str = "Last Validated: Error";

/// The compact title drops everything from this token onwards.
pub const TITLE_SEPARATOR: &str = " at ";

const STATUS_DATE_FORMAT: &str = "%B %-d, %Y, %-I:%M %p";

pub fn storage_key(page_id: &str) -> String {
    format!("{STORAGE_KEY_PREFIX}{page_id}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRecord {
    pub page_id: String,
    pub validated_at: DateTime<Utc>,
    pub validator_name: String,
}

/// Value shape kept in the key-value store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredValidation {
    pub date: String,
    pub user_name: String,
}

impl ValidationRecord {
    pub fn new(page_id: impl Into<String>, validated_at: DateTime<Utc>, validator_name: impl Into<String>) -> Self {
        Self {
            page_id: page_id.into(),
            validated_at,
            validator_name: validator_name.into(),
        }
    }

    pub fn to_stored(&self) -> StoredValidation {
        StoredValidation {
            date: self.validated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            user_name: self.validator_name.clone(),
        }
    }

    pub fn from_stored(page_id: &str, stored: StoredValidation) -> Result<Self, chrono::ParseError> {
        let validated_at = DateTime::parse_from_rfc3339(&stored.date)?.with_timezone(&Utc);
        Ok(Self {
            page_id: page_id.to_string(),
            validated_at,
            validator_name: stored.user_name,
        })
    }

    pub fn status_text(&self, offset: FixedOffset) -> String {
        format_status(self.validated_at, &self.validator_name, offset)
    }
}

/// `Last validated on March 5, 2024, 6:30 PM by Jane Doe`
///
/// English month names regardless of process locale; rendered in `offset`.
pub fn format_status(validated_at: DateTime<Utc>, validator_name: &str, offset: FixedOffset) -> String {
    let local = validated_at.with_timezone(&offset);
    format!(
        "Last validated on {} by {}",
        local.format(STATUS_DATE_FORMAT),
        validator_name
    )
}

/// Shortens a status for the host-rendered label.
///
/// Placeholder and error statuses pass through verbatim. Anything else is cut
/// before the first `" at "`, if there is one.
pub fn compact_title(status: &str) -> String {
    if status == NOT_YET_VALIDATED || status.starts_with("Error") {
        return status.to_string();
    }
    match status.find(TITLE_SEPARATOR) {
        Some(idx) => status[..idx].to_string(),
        None => status.to_string(),
    }
}
