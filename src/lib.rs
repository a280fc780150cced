//! Page Validation Widget
//!
//! Backend of a wiki page-validation widget: records who last validated a
//! page, renders the status line and the compact byline title, and sends
//! "please validate" requests for a page to a chat webhook.

// Module declarations
pub mod application;
pub mod commands;
pub mod domain;
pub mod infrastructure;
pub mod test_utils;

pub use commands::*;

use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::{MetadataResolver, SharedState, ValidationStateStore, ValidationWorkflow};
use crate::domain::repositories::KeyValueStore;
use crate::infrastructure::config::{AppConfig, StorageBackend};
use crate::infrastructure::{
    DatabaseConnection, HttpClient, InMemoryKeyValueStore, RestContentApi, SqliteKeyValueStore, WebhookNotifier,
};

/// Opens the configured store.
pub async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            warn!("⚠️ Using in-memory storage; validation records are lost on exit");
            Ok(Arc::new(InMemoryKeyValueStore::new()))
        }
        StorageBackend::Sqlite => {
            let database_url = config.storage.resolved_database_url()?;
            let db = DatabaseConnection::new(&database_url).await?;
            db.migrate().await?;
            Ok(Arc::new(SqliteKeyValueStore::new(db.pool().clone())))
        }
    }
}

/// Wires store, host API client and notifier into the shared state the
/// commands run against.
pub async fn bootstrap(config: AppConfig) -> anyhow::Result<SharedState> {
    info!("🚀 Bootstrapping page validation widget");

    let store = open_store(&config).await.context("Failed to open validation store")?;
    let state_store = ValidationStateStore::new(store, config.display.offset());

    let http = HttpClient::with_config(config.http.clone()).context("Failed to build HTTP client")?;
    let content_api = RestContentApi::new(http.clone().with_context_label("ContentApi"), &config.host);
    let resolver = MetadataResolver::new(Arc::new(content_api), config.host.site_base_url.clone());

    let notifier = WebhookNotifier::new(
        http.with_context_label("Webhook"),
        config.notification.webhook_url.clone(),
    );
    if !notifier.is_configured() {
        warn!("⚠️ No webhook URL configured; validation requests will fail");
    }

    let workflow = ValidationWorkflow::new(state_store, resolver, Arc::new(notifier));
    Ok(SharedState::new(config, workflow))
}
