//! Validation check: exercises the widget commands from a terminal
//!
//! Usage:
//!   validation_check <content-id> [account-id] [status|validate|request]
//!
//! Loads configuration the same way the widget backend does (config files,
//! `PAGE_VALIDATION_*` and `SLACK_WEBHOOK_URL`), then prints the byline title
//! and the widget body after the chosen action.

use anyhow::bail;
use tracing::info;

use page_validation_widget_lib::application::dto::{ExtensionContent, ExtensionContext, HostContext};
use page_validation_widget_lib::infrastructure::config::AppConfig;
use page_validation_widget_lib::infrastructure::logging::init_logging_with_config;
use page_validation_widget_lib::{
    bootstrap, dynamic_properties, get_validation_status, request_page_validation, validate_page,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(content_id) = args.next() else {
        bail!("usage: validation_check <content-id> [account-id] [status|validate|request]");
    };
    let account_id = args.next().unwrap_or_default();
    let action = args.next().unwrap_or_else(|| "status".to_string());

    let config = AppConfig::load()?;
    init_logging_with_config(&config.logging, config.display.offset())?;
    info!("🔎 Probing page {} (action: {})", content_id, action);

    let state = bootstrap(config).await?;

    let title = dynamic_properties(
        &state,
        ExtensionContext {
            content: Some(ExtensionContent { id: content_id.clone() }),
        },
    )
    .await
    .title;
    println!("title: {title}");

    if account_id.is_empty() {
        return Ok(());
    }

    let context = HostContext {
        content_id,
        account_id,
    };
    let view = match action.as_str() {
        "status" => get_validation_status(&state, context).await,
        "validate" => validate_page(&state, context).await,
        "request" => request_page_validation(&state, context).await,
        other => bail!("unknown action: {other}"),
    }
    .map_err(anyhow::Error::msg)?;

    for line in view.render_lines() {
        println!("{line}");
    }
    Ok(())
}
