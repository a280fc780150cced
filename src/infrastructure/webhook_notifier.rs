//! Webhook delivery of validation requests
//!
//! A single POST per request. The response body is logged and otherwise
//! ignored; any completed exchange counts as delivered.

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::domain::errors::{WidgetError, WidgetResult};
use crate::domain::page_metadata::NotificationPayload;
use crate::domain::services::ValidationNotifier;
use crate::infrastructure::http_client::HttpClient;

pub struct WebhookNotifier {
    http: HttpClient,
    webhook_url: Option<String>,
}

impl WebhookNotifier {
    pub const fn new(http: HttpClient, webhook_url: Option<String>) -> Self {
        Self { http, webhook_url }
    }

    pub const fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }
}

#[async_trait]
impl ValidationNotifier for WebhookNotifier {
    async fn notify(&self, payload: &NotificationPayload) -> WidgetResult<()> {
        let Some(url) = self.webhook_url.as_deref() else {
            error!("❌ Webhook URL is not configured; cannot send validation request");
            return Err(WidgetError::notification("webhook URL is not configured"));
        };

        let response = self.http.post_json(url, payload).await.map_err(|e| {
            error!("❌ Error sending webhook message: {}", e);
            WidgetError::notification(e.to_string())
        })?;

        if (200..300).contains(&response.status) {
            info!("💬 Webhook response ({}): {}", response.status, response.body);
        } else {
            warn!("💬 Webhook answered {}: {}", response.status, response.body);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{OneShotHttpServer, local_http_config};

    fn payload() -> NotificationPayload {
        NotificationPayload {
            page_owner_name: "Alice".into(),
            page_name: "Home".into(),
            page_link: "https://wiki/SPC/pages/123/Home".into(),
        }
    }

    #[tokio::test]
    async fn test_unconfigured_webhook_fails() {
        let http = HttpClient::with_config(local_http_config()).unwrap();
        let notifier = WebhookNotifier::new(http, None);
        assert!(!notifier.is_configured());
        assert!(matches!(
            notifier.notify(&payload()).await,
            Err(WidgetError::Notification { .. })
        ));
    }

    #[tokio::test]
    async fn test_posts_exact_json_body() {
        let server = OneShotHttpServer::start("200 OK", "ok").await;
        let http = HttpClient::with_config(local_http_config()).unwrap();
        let notifier = WebhookNotifier::new(http, Some(server.url("/hooks/validation")));

        notifier.notify(&payload()).await.unwrap();

        let request = server.captured_request().await;
        assert!(request.starts_with("POST /hooks/validation HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("content-type: application/json"));

        let body = request.split("\r\n\r\n").nth(1).unwrap();
        let json: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "pageOwner": "Alice",
                "pageName": "Home",
                "pageLink": "https://wiki/SPC/pages/123/Home"
            })
        );
    }

    #[tokio::test]
    async fn test_non_success_answer_still_counts_as_delivered() {
        let server = OneShotHttpServer::start("500 Internal Server Error", "invalid_payload").await;
        let http = HttpClient::with_config(local_http_config()).unwrap();
        let notifier = WebhookNotifier::new(http, Some(server.url("/hook")));

        assert!(notifier.notify(&payload()).await.is_ok());
    }
}
