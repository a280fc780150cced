//! Widget controller state
//!
//! Holds what the host renders for one widget instance and runs the
//! workflow actions against it. Failure details go to the log; the view only
//! ever receives one of the fixed messages in `dto`.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info};

use crate::application::dto::{
    HostContext, REQUEST_FAILED_MESSAGE, VALIDATE_FAILED_MESSAGE, WidgetView,
};
use crate::application::validation_workflow::{ValidationWorkflow, WorkflowAction, WorkflowPhase};
use crate::domain::errors::WidgetError;
use crate::domain::validation_record::{FETCH_ERROR_STATUS, NOT_YET_VALIDATED};

pub struct WidgetController {
    context: HostContext,
    workflow: ValidationWorkflow,
    view: Arc<RwLock<WidgetView>>,
    /// One action at a time per widget instance
    action_lock: Mutex<()>,
}

impl WidgetController {
    pub fn new(context: HostContext, workflow: ValidationWorkflow) -> Self {
        Self {
            context,
            workflow,
            view: Arc::new(RwLock::new(WidgetView::default())),
            action_lock: Mutex::new(()),
        }
    }

    pub const fn context(&self) -> &HostContext {
        &self.context
    }

    pub const fn workflow(&self) -> &ValidationWorkflow {
        &self.workflow
    }

    /// Snapshot of the current view
    pub async fn view(&self) -> WidgetView {
        self.view.read().await.clone()
    }

    async fn begin(&self, action: WorkflowAction) {
        let mut view = self.view.write().await;
        view.phase = WorkflowPhase::InProgress;
        view.last_action = Some(action);
    }

    async fn fail(&self, action: WorkflowAction, err: &WidgetError, message: &str) -> WidgetView {
        error!(
            "❌ {:?} failed for page {} ({}): {}",
            action,
            self.context.content_id,
            err.category(),
            err
        );
        let mut view = self.view.write().await;
        view.error = Some(message.to_string());
        view.phase = WorkflowPhase::Failed;
        view.clone()
    }

    /// Initial status read when the widget is opened.
    ///
    /// A failed read only changes the status line; the action buttons stay
    /// available so an unreadable record can be overwritten by validating.
    pub async fn load(&self) -> WidgetView {
        let _guard = self.action_lock.lock().await;
        self.begin(WorkflowAction::Load).await;

        let store = self.workflow.state_store();
        match store.read_validation(&self.context.content_id).await {
            Ok(record) => {
                let status = record.map_or_else(|| NOT_YET_VALIDATED.to_string(), |r| store.format(&r));
                let mut view = self.view.write().await;
                view.status_text = status;
                view.error = None;
                view.phase = WorkflowPhase::Succeeded;
                view.clone()
            }
            Err(e) => {
                error!(
                    "❌ Error fetching last validated date for page {} ({}): {}",
                    self.context.content_id,
                    e.category(),
                    e
                );
                let mut view = self.view.write().await;
                view.status_text = FETCH_ERROR_STATUS.to_string();
                view.phase = WorkflowPhase::Failed;
                view.clone()
            }
        }
    }

    pub async fn validate(&self) -> WidgetView {
        self.validate_at(Utc::now()).await
    }

    /// Status text changes only when the record was written.
    pub async fn validate_at(&self, validated_at: DateTime<Utc>) -> WidgetView {
        let _guard = self.action_lock.lock().await;
        self.begin(WorkflowAction::Validate).await;

        let result = self
            .workflow
            .validate_at(&self.context.content_id, &self.context.account_id, validated_at)
            .await;

        match result {
            Ok(record) => {
                let status = self.workflow.state_store().format(&record);
                let mut view = self.view.write().await;
                view.status_text = status;
                view.error = None;
                view.phase = WorkflowPhase::Succeeded;
                view.clone()
            }
            Err(e) => self.fail(WorkflowAction::Validate, &e, VALIDATE_FAILED_MESSAGE).await,
        }
    }

    /// Opens the confirmation dialog once the owner is known; closes it again
    /// if a later step fails, so it never claims a request that was not sent.
    pub async fn request_validation(&self) -> WidgetView {
        let _guard = self.action_lock.lock().await;
        self.begin(WorkflowAction::RequestValidation).await;
        let page_id = &self.context.content_id;

        let owner = match self.workflow.resolve_owner(page_id).await {
            Ok(owner) => owner,
            Err(e) => return self.fail(WorkflowAction::RequestValidation, &e, REQUEST_FAILED_MESSAGE).await,
        };
        self.view.write().await.dialog_open = true;

        match self.workflow.notify_owner(page_id, &owner).await {
            Ok(_) => {
                info!("Validation request for page {} delivered", page_id);
                let mut view = self.view.write().await;
                view.error = None;
                view.phase = WorkflowPhase::Succeeded;
                view.clone()
            }
            Err(e) => {
                self.view.write().await.dialog_open = false;
                self.fail(WorkflowAction::RequestValidation, &e, REQUEST_FAILED_MESSAGE).await
            }
        }
    }
}
