//! Remote collaborator interfaces
//!
//! Implemented over HTTP in the infrastructure layer and by scripted fakes
//! in `test_utils`.

use async_trait::async_trait;

use crate::domain::errors::{RemoteLookupError, WidgetResult};
use crate::domain::page_metadata::{ContentDetail, NotificationPayload, PageDetail, UserDetail};

/// Read-only view of the host's content REST API, acting as the current user.
#[async_trait]
pub trait HostContentApi: Send + Sync {
    async fn get_page(&self, page_id: &str) -> Result<PageDetail, RemoteLookupError>;
    async fn get_user(&self, account_id: &str) -> Result<UserDetail, RemoteLookupError>;
    async fn get_content(&self, content_id: &str) -> Result<ContentDetail, RemoteLookupError>;
}

#[async_trait]
pub trait ValidationNotifier: Send + Sync {
    /// One delivery attempt. Completion of the HTTP exchange counts as delivered.
    async fn notify(&self, payload: &NotificationPayload) -> WidgetResult<()>;
}
