//! Infrastructure layer: configuration, logging, storage and the HTTP
//! adapters for the host API and the webhook.

pub mod config;
pub mod content_api;
pub mod database_connection;
pub mod http_client;
pub mod kv_store;
pub mod logging;
pub mod webhook_notifier;

// Re-export commonly used items
pub use config::AppConfig;
pub use content_api::RestContentApi;
pub use database_connection::DatabaseConnection;
pub use http_client::{HttpClient, HttpClientConfig};
pub use kv_store::{InMemoryKeyValueStore, SqliteKeyValueStore};
pub use logging::{get_log_directory, init_logging, init_logging_with_config};
pub use webhook_notifier::WebhookNotifier;
