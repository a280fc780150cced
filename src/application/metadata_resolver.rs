//! Resolves page owners, display names and page links through the host API
//!
//! Every call goes to the host; results are not cached between workflow
//! runs, and the first failure is returned as is.

use std::sync::Arc;
use tracing::{debug, error};

use crate::domain::errors::{RemoteLookupError, WidgetResult};
use crate::domain::page_metadata::{CONTENT_RESOURCE, PAGE_RESOURCE, PageMetadata, USER_RESOURCE, UserIdentity};
use crate::domain::services::HostContentApi;

#[derive(Clone)]
pub struct MetadataResolver {
    api: Arc<dyn HostContentApi>,
    site_base_url: String,
}

fn require_id(resource: &str, field: &str, id: &str) -> Result<(), RemoteLookupError> {
    if id.trim().is_empty() {
        error!("❌ Refusing {} lookup with an empty {}", resource, field);
        return Err(RemoteLookupError::missing_field(resource, field));
    }
    Ok(())
}

impl MetadataResolver {
    pub fn new(api: Arc<dyn HostContentApi>, site_base_url: impl Into<String>) -> Self {
        Self {
            api,
            site_base_url: site_base_url.into(),
        }
    }

    /// Account id of the page owner.
    pub async fn resolve_page_owner(&self, page_id: &str) -> WidgetResult<String> {
        require_id(PAGE_RESOURCE, "pageId", page_id)?;
        let owner = self
            .api
            .get_page(page_id)
            .await
            .and_then(|detail| detail.into_owner_id())
            .inspect_err(|e| error!("❌ Error fetching page owner for {}: {}", page_id, e))?;
        debug!("Page {} is owned by {}", page_id, owner);
        Ok(owner)
    }

    pub async fn resolve_display_name(&self, account_id: &str) -> WidgetResult<UserIdentity> {
        require_id(USER_RESOURCE, "accountId", account_id)?;
        let identity = self
            .api
            .get_user(account_id)
            .await
            .and_then(|detail| detail.into_identity(account_id))
            .inspect_err(|e| error!("❌ Error fetching user details for {}: {}", account_id, e))?;
        Ok(identity)
    }

    /// Title, space key and viewable link of a page.
    pub async fn resolve_page_info(&self, page_id: &str) -> WidgetResult<PageMetadata> {
        require_id(CONTENT_RESOURCE, "contentId", page_id)?;
        let metadata = self
            .api
            .get_content(page_id)
            .await
            .and_then(|detail| detail.into_page_metadata(&self.site_base_url, page_id))
            .inspect_err(|e| error!("❌ Error fetching page details for {}: {}", page_id, e))?;
        debug!("Page {} resolves to {}", page_id, metadata.link);
        Ok(metadata)
    }
}
