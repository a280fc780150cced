//! Commands invoked by the host shell for the validation widget
//!
//! Each command takes the shared state plus whatever context the host passes
//! and returns a serializable result. `Err` carries a message meant for the
//! host log only; the user-facing messages are already inside `WidgetView`.

use tracing::{info, warn};

use crate::application::dto::{DynamicProperties, ExtensionContext, HostContext, WidgetView};
use crate::application::shared_state::SharedState;
use crate::domain::validation_record::DYNAMIC_TITLE_ERROR;

fn require_context(context: &HostContext) -> Result<(), String> {
    if context.content_id.trim().is_empty() {
        return Err("Host context has no content id".to_string());
    }
    if context.account_id.trim().is_empty() {
        return Err("Host context has no account id".to_string());
    }
    Ok(())
}

/// Widget opened: read the stored status.
pub async fn get_validation_status(state: &SharedState, context: HostContext) -> Result<WidgetView, String> {
    require_context(&context)?;
    info!("Widget requesting validation status for page {}", context.content_id);
    Ok(state.controller(&context).await.load().await)
}

/// "Validate" pressed.
pub async fn validate_page(state: &SharedState, context: HostContext) -> Result<WidgetView, String> {
    require_context(&context)?;
    info!("✅ Validate pressed on page {} by {}", context.content_id, context.account_id);
    Ok(state.controller(&context).await.validate().await)
}

/// "Request Validation" pressed.
pub async fn request_page_validation(state: &SharedState, context: HostContext) -> Result<WidgetView, String> {
    require_context(&context)?;
    info!("📨 Validation request pressed on page {}", context.content_id);
    Ok(state.controller(&context).await.request_validation().await)
}

/// Current view without running an action.
pub async fn get_widget_view(state: &SharedState, context: HostContext) -> Result<WidgetView, String> {
    require_context(&context)?;
    Ok(state.controller(&context).await.view().await)
}

pub async fn close_widget(state: &SharedState, context: HostContext) -> Result<bool, String> {
    Ok(state.release(&context).await)
}

/// Byline title. Never fails: every problem collapses into the error label.
pub async fn dynamic_properties(state: &SharedState, context: ExtensionContext) -> DynamicProperties {
    let title = match context.content.map(|c| c.id) {
        Some(id) => state.workflow().dynamic_title(&id).await,
        None => {
            warn!("Dynamic properties requested without content");
            DYNAMIC_TITLE_ERROR.to_string()
        }
    };
    DynamicProperties { title }
}
