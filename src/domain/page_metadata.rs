//! Typed results of host content API lookups
//!
//! The host answers with loosely shaped JSON. Each lookup gets its own
//! response type here, and `into_*` validation turns an absent or blank
//! required field into a `RemoteLookupError::MissingField` instead of letting
//! an empty value flow into the notification.

use serde::{Deserialize, Serialize};

use crate::domain::errors::RemoteLookupError;

pub const PAGE_RESOURCE: &str = "page";
pub const USER_RESOURCE: &str = "user";
pub const CONTENT_RESOURCE: &str = "content";

/// `GET /wiki/api/v2/pages/{id}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDetail {
    #[serde(default)]
    pub owner_id: Option<String>,
}

/// `GET /wiki/rest/api/user?accountId={id}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceRef {
    #[serde(default)]
    pub key: Option<String>,
}

/// `GET /wiki/rest/api/content/{id}`
///
/// The space key may arrive flat (`spaceKey`) or nested (`space.key`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDetail {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub space_key: Option<String>,
    #[serde(default)]
    pub space: Option<SpaceRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub account_id: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: String,
    pub space_key: String,
    pub link: String,
}

/// Body posted to the webhook. Field names are part of the webhook contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    #[serde(rename = "pageOwner")]
    pub page_owner_name: String,
    #[serde(rename = "pageName")]
    pub page_name: String,
    #[serde(rename = "pageLink")]
    pub page_link: String,
}

fn required(value: Option<String>, resource: &str, field: &str) -> Result<String, RemoteLookupError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(RemoteLookupError::missing_field(resource, field)),
    }
}

impl PageDetail {
    pub fn into_owner_id(self) -> Result<String, RemoteLookupError> {
        required(self.owner_id, PAGE_RESOURCE, "ownerId")
    }
}

impl UserDetail {
    pub fn into_identity(self, requested_account_id: &str) -> Result<UserIdentity, RemoteLookupError> {
        let display_name = required(self.display_name, USER_RESOURCE, "displayName")?;
        Ok(UserIdentity {
            account_id: self.account_id.unwrap_or_else(|| requested_account_id.to_string()),
            display_name,
        })
    }
}

impl ContentDetail {
    /// Builds `{base}/{spaceKey}/pages/{contentId}/{title}`.
    ///
    /// Segments are joined verbatim; the title is not percent-encoded.
    pub fn into_page_metadata(self, site_base_url: &str, content_id: &str) -> Result<PageMetadata, RemoteLookupError> {
        let title = required(self.title, CONTENT_RESOURCE, "title")?;
        let flat = self.space_key.filter(|k| !k.trim().is_empty());
        let nested = self.space.and_then(|s| s.key);
        let space_key = required(flat.or(nested), CONTENT_RESOURCE, "spaceKey")?;

        let link = format!(
            "{}/{}/pages/{}/{}",
            site_base_url.trim_end_matches('/'),
            space_key,
            content_id,
            title
        );
        Ok(PageMetadata { title, space_key, link })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_detail_owner_required() {
        let detail: PageDetail = serde_json::from_value(json!({"id": "123", "ownerId": "U1"})).unwrap();
        assert_eq!(detail.into_owner_id().unwrap(), "U1");

        let detail: PageDetail = serde_json::from_value(json!({"id": "123", "ownerId": null})).unwrap();
        assert_eq!(
            detail.into_owner_id().unwrap_err(),
            RemoteLookupError::missing_field(PAGE_RESOURCE, "ownerId")
        );
    }

    #[test]
    fn test_user_detail_blank_name_is_missing() {
        let detail: UserDetail = serde_json::from_value(json!({"displayName": "   "})).unwrap();
        assert!(matches!(
            detail.into_identity("U1"),
            Err(RemoteLookupError::MissingField { .. })
        ));
    }

    #[test]
    fn test_user_detail_falls_back_to_requested_account() {
        let detail: UserDetail = serde_json::from_value(json!({"displayName": "Alice"})).unwrap();
        let identity = detail.into_identity("U1").unwrap();
        assert_eq!(identity.account_id, "U1");
        assert_eq!(identity.display_name, "Alice");
    }

    #[test]
    fn test_content_link_construction() {
        let detail: ContentDetail =
            serde_json::from_value(json!({"id": "123", "title": "Home", "spaceKey": "SPC"})).unwrap();
        let meta = detail
            .into_page_metadata("https://example.atlassian.net/", "123")
            .unwrap();
        assert_eq!(meta.link, "https://example.atlassian.net/SPC/pages/123/Home");
        assert_eq!(meta.space_key, "SPC");
    }

    #[test]
    fn test_content_nested_space_key() {
        let detail: ContentDetail =
            serde_json::from_value(json!({"title": "Runbook", "space": {"key": "OPS"}})).unwrap();
        let meta = detail.into_page_metadata("https://wiki", "9").unwrap();
        assert_eq!(meta.link, "https://wiki/OPS/pages/9/Runbook");
    }

    #[test]
    fn test_content_without_space_fails() {
        let detail: ContentDetail = serde_json::from_value(json!({"title": "Orphan"})).unwrap();
        assert_eq!(
            detail.into_page_metadata("https://wiki", "9").unwrap_err(),
            RemoteLookupError::missing_field(CONTENT_RESOURCE, "spaceKey")
        );
    }

    #[test]
    fn test_notification_payload_field_names() {
        let payload = NotificationPayload {
            page_owner_name: "Alice".into(),
            page_name: "Home".into(),
            page_link: "https://wiki/SPC/pages/123/Home".into(),
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"pageOwner": "Alice", "pageName": "Home", "pageLink": "https://wiki/SPC/pages/123/Home"})
        );
    }
}
