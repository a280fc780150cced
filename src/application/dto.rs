//! Data transfer objects exchanged with the host shell
//!
//! The host supplies context (`HostContext`, `ExtensionContext`) and renders
//! whatever `WidgetView` / `DynamicProperties` it gets back.

use serde::{Deserialize, Serialize};

use crate::application::validation_workflow::{WorkflowAction, WorkflowPhase};

pub const LOADING_STATUS: &str = "Loading...";
pub const VALIDATE_FAILED_MESSAGE: &str = "Failed to update validation date";
pub const REQUEST_FAILED_MESSAGE: &str = "Failed to send validation request to slack";
pub const REQUEST_SENT_MESSAGE: &str = "Validation request sent to Slack Channel.";
pub const VALIDATE_BUTTON_LABEL: &str = "Validate";
pub const REQUEST_BUTTON_LABEL: &str = "Request Validation";
pub const WIDGET_HEADER: &str = "Page Validation";

/// Who is looking at which page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostContext {
    pub content_id: String,
    pub account_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionContent {
    pub id: String,
}

/// Payload of the host's dynamic-properties call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionContext {
    #[serde(default)]
    pub content: Option<ExtensionContent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicProperties {
    pub title: String,
}

/// Everything the rendering adapter needs to draw the widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetView {
    pub status_text: String,
    pub error: Option<String>,
    pub dialog_open: bool,
    pub phase: WorkflowPhase,
    pub last_action: Option<WorkflowAction>,
}

impl Default for WidgetView {
    fn default() -> Self {
        Self {
            status_text: LOADING_STATUS.to_string(),
            error: None,
            dialog_open: false,
            phase: WorkflowPhase::Idle,
            last_action: None,
        }
    }
}

impl WidgetView {
    /// Text layout of the inline dialog: the error replaces status and
    /// buttons, the confirmation line follows either.
    pub fn render_lines(&self) -> Vec<String> {
        let mut lines = vec![WIDGET_HEADER.to_string()];
        match &self.error {
            Some(error) => lines.push(error.clone()),
            None => {
                lines.push(self.status_text.clone());
                lines.push(format!("[{VALIDATE_BUTTON_LABEL}]"));
                lines.push(format!("[{REQUEST_BUTTON_LABEL}]"));
            }
        }
        if self.dialog_open {
            lines.push(REQUEST_SENT_MESSAGE.to_string());
        }
        lines
    }
}
