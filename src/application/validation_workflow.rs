//! Validate / request-validation orchestration
//!
//! Each action is a linear chain of awaited remote calls. The first failing
//! step ends the chain and its error is returned; nothing is retried and the
//! only state carried between runs is the stored validation record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::application::metadata_resolver::MetadataResolver;
use crate::application::state_store::ValidationStateStore;
use crate::domain::errors::WidgetResult;
use crate::domain::page_metadata::{NotificationPayload, UserIdentity};
use crate::domain::services::ValidationNotifier;
use crate::domain::validation_record::{DYNAMIC_TITLE_ERROR, ValidationRecord, compact_title};

/// Lifecycle of one action invocation: `Idle → InProgress → {Succeeded, Failed}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPhase {
    #[default]
    Idle,
    InProgress,
    Succeeded,
    Failed,
}

impl WorkflowPhase {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowAction {
    Load,
    Validate,
    RequestValidation,
}

#[derive(Clone)]
pub struct ValidationWorkflow {
    state_store: ValidationStateStore,
    resolver: MetadataResolver,
    notifier: Arc<dyn ValidationNotifier>,
}

impl ValidationWorkflow {
    pub fn new(
        state_store: ValidationStateStore,
        resolver: MetadataResolver,
        notifier: Arc<dyn ValidationNotifier>,
    ) -> Self {
        Self {
            state_store,
            resolver,
            notifier,
        }
    }

    pub const fn state_store(&self) -> &ValidationStateStore {
        &self.state_store
    }

    /// Records that `account_id` validated `page_id` now.
    pub async fn validate(&self, page_id: &str, account_id: &str) -> WidgetResult<ValidationRecord> {
        self.validate_at(page_id, account_id, Utc::now()).await
    }

    /// Name resolution happens before the write, so a lookup failure leaves
    /// the stored record untouched.
    pub async fn validate_at(
        &self,
        page_id: &str,
        account_id: &str,
        validated_at: DateTime<Utc>,
    ) -> WidgetResult<ValidationRecord> {
        debug!("[validate] page={} account={}", page_id, account_id);
        let validator = self.resolver.resolve_display_name(account_id).await?;
        self.state_store
            .write_validation(page_id, validated_at, &validator.display_name)
            .await
    }

    /// First half of a validation request: the page owner and their display name.
    pub async fn resolve_owner(&self, page_id: &str) -> WidgetResult<UserIdentity> {
        debug!("[request_validation] resolving owner of page {}", page_id);
        let owner_account_id = self.resolver.resolve_page_owner(page_id).await?;
        self.resolver.resolve_display_name(&owner_account_id).await
    }

    /// Second half: page title and link, then one webhook delivery.
    pub async fn notify_owner(&self, page_id: &str, owner: &UserIdentity) -> WidgetResult<NotificationPayload> {
        let page = self.resolver.resolve_page_info(page_id).await?;
        let payload = NotificationPayload {
            page_owner_name: owner.display_name.clone(),
            page_name: page.title,
            page_link: page.link,
        };
        self.notifier.notify(&payload).await?;
        info!("📨 Validation request for page {} sent to {}", page_id, owner.display_name);
        Ok(payload)
    }

    pub async fn request_validation(&self, page_id: &str) -> WidgetResult<NotificationPayload> {
        let owner = self.resolve_owner(page_id).await?;
        self.notify_owner(page_id, &owner).await
    }

    /// Short label for the host-rendered byline. Always yields a string.
    pub async fn dynamic_title(&self, page_id: &str) -> String {
        if page_id.trim().is_empty() {
            warn!("Dynamic title requested without a content id");
            return DYNAMIC_TITLE_ERROR.to_string();
        }
        let status = self.state_store.status_text(page_id).await;
        compact_title(&status)
    }
}
