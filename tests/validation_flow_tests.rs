//! End-to-end widget flows over a real SQLite file and a real webhook POST
use chrono::{FixedOffset, TimeZone, Utc};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

use page_validation_widget_lib::application::dto::HostContext;
use page_validation_widget_lib::application::{
    MetadataResolver, ValidationStateStore, ValidationWorkflow, WidgetController, WorkflowPhase,
};
use page_validation_widget_lib::domain::repositories::KeyValueStore;
use page_validation_widget_lib::domain::services::ValidationNotifier;
use page_validation_widget_lib::infrastructure::{
    DatabaseConnection, HttpClient, SqliteKeyValueStore, WebhookNotifier,
};
use page_validation_widget_lib::test_utils::{
    FakeContentApi, OneShotHttpServer, RecordingNotifier, local_http_config,
};

const BASE: &str = "https://wiki.example.com";

struct Harness {
    _dir: TempDir,
    store: Arc<SqliteKeyValueStore>,
    workflow: ValidationWorkflow,
}

async fn harness(api: FakeContentApi, notifier: Arc<dyn ValidationNotifier>) -> Harness {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite:{}", dir.path().join("widget.db").display());
    let db = DatabaseConnection::new(&url).await.unwrap();
    db.migrate().await.unwrap();

    let store = Arc::new(SqliteKeyValueStore::new(db.pool().clone()));
    let state_store = ValidationStateStore::new(store.clone(), FixedOffset::east_opt(0).unwrap());
    let resolver = MetadataResolver::new(Arc::new(api), BASE);
    Harness {
        _dir: dir,
        store,
        workflow: ValidationWorkflow::new(state_store, resolver, notifier),
    }
}

fn host() -> HostContext {
    HostContext {
        content_id: "123".into(),
        account_id: "me".into(),
    }
}

#[tokio::test]
async fn fresh_page_shows_not_yet_validated() {
    let h = harness(FakeContentApi::new(), Arc::new(RecordingNotifier::new())).await;
    let controller = WidgetController::new(host(), h.workflow.clone());

    assert_eq!(controller.load().await.status_text, "Not yet validated");
    assert_eq!(h.workflow.dynamic_title("123").await, "Not yet validated");
}

#[tokio::test]
async fn validate_persists_the_stored_shape() {
    let h = harness(
        FakeContentApi::new().with_user("me", "Jane Doe"),
        Arc::new(RecordingNotifier::new()),
    )
    .await;
    let controller = WidgetController::new(host(), h.workflow.clone());
    let at = Utc.with_ymd_and_hms(2024, 3, 5, 18, 30, 0).unwrap();

    let view = controller.validate_at(at).await;
    assert_eq!(view.status_text, "Last validated on March 5, 2024, 6:30 PM by Jane Doe");

    let stored = h.store.get("lastValidated-123").await.unwrap().unwrap();
    assert_eq!(stored, json!({"date": "2024-03-05T18:30:00.000Z", "userName": "Jane Doe"}));

    // A new widget instance sees the same record.
    let reopened = WidgetController::new(host(), h.workflow.clone());
    assert_eq!(reopened.load().await.status_text, view.status_text);
}

#[tokio::test]
async fn validating_twice_keeps_the_latest_record() {
    let h = harness(
        FakeContentApi::new().with_user("me", "Jane Doe"),
        Arc::new(RecordingNotifier::new()),
    )
    .await;
    let first = Utc.with_ymd_and_hms(2024, 3, 5, 18, 30, 0).unwrap();
    let second = Utc.with_ymd_and_hms(2024, 4, 1, 9, 5, 0).unwrap();

    h.workflow.validate_at("123", "me", first).await.unwrap();
    h.workflow.validate_at("123", "me", second).await.unwrap();

    let record = h.workflow.state_store().read_validation("123").await.unwrap().unwrap();
    assert_eq!(record.validated_at, second);
    assert_eq!(
        h.workflow.state_store().status_text("123").await,
        "Last validated on April 1, 2024, 9:05 AM by Jane Doe"
    );
}

#[tokio::test]
async fn failed_name_lookup_writes_nothing() {
    let h = harness(
        FakeContentApi::new().with_transport_down(),
        Arc::new(RecordingNotifier::new()),
    )
    .await;
    let controller = WidgetController::new(host(), h.workflow.clone());
    controller.load().await;

    let view = controller.validate().await;
    assert_eq!(view.error.as_deref(), Some("Failed to update validation date"));
    assert_eq!(view.status_text, "Not yet validated");
    assert_eq!(view.phase, WorkflowPhase::Failed);
    assert!(h.store.get("lastValidated-123").await.unwrap().is_none());
}

#[tokio::test]
async fn failed_name_lookup_keeps_the_prior_record() {
    let h = harness(
        FakeContentApi::new().with_transport_down(),
        Arc::new(RecordingNotifier::new()),
    )
    .await;
    let earlier = Utc.with_ymd_and_hms(2024, 3, 5, 18, 30, 0).unwrap();
    h.workflow
        .state_store()
        .write_validation("123", earlier, "Jane Doe")
        .await
        .unwrap();
    let stored_before = h.store.get("lastValidated-123").await.unwrap();

    let controller = WidgetController::new(host(), h.workflow.clone());
    let loaded = controller.load().await;
    assert_eq!(loaded.status_text, "Last validated on March 5, 2024, 6:30 PM by Jane Doe");

    let view = controller.validate().await;
    assert_eq!(view.error.as_deref(), Some("Failed to update validation date"));
    assert_eq!(view.status_text, loaded.status_text);

    assert_eq!(h.store.get("lastValidated-123").await.unwrap(), stored_before);
    let record = h.workflow.state_store().read_validation("123").await.unwrap().unwrap();
    assert_eq!(record.validated_at, earlier);
    assert_eq!(record.validator_name, "Jane Doe");
}

#[tokio::test]
async fn corrupt_record_shows_fetch_error() {
    let h = harness(FakeContentApi::new(), Arc::new(RecordingNotifier::new())).await;
    h.store
        .set("lastValidated-123", json!({"date": "yesterday", "userName": "Jane"}))
        .await
        .unwrap();

    let controller = WidgetController::new(host(), h.workflow.clone());
    let view = controller.load().await;
    assert_eq!(view.status_text, "Error fetching date");
    assert_eq!(view.error, None);
    assert!(view.render_lines().iter().any(|line| line == "[Validate]"));
    assert!(view.render_lines().iter().any(|line| line == "[Request Validation]"));
    assert_eq!(h.workflow.dynamic_title("123").await, "Error fetching date");
}

#[tokio::test]
async fn request_validation_posts_owner_payload_once() {
    let server = OneShotHttpServer::start("200 OK", "ok").await;
    let http = HttpClient::with_config(local_http_config()).unwrap();
    let notifier = Arc::new(WebhookNotifier::new(http, Some(server.url("/hook"))));
    let api = FakeContentApi::new()
        .with_page("123", "U1")
        .with_user("U1", "Alice")
        .with_content("123", "Home", "SPC");
    let h = harness(api, notifier).await;

    let controller = WidgetController::new(host(), h.workflow.clone());
    let view = controller.request_validation().await;
    assert!(view.dialog_open);
    assert_eq!(view.error, None);
    assert_eq!(
        view.render_lines().last().map(String::as_str),
        Some("Validation request sent to Slack Channel.")
    );

    let request = server.captured_request().await;
    let body = request.split("\r\n\r\n").nth(1).unwrap();
    let json: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(
        json,
        json!({
            "pageOwner": "Alice",
            "pageName": "Home",
            "pageLink": "https://wiki.example.com/SPC/pages/123/Home"
        })
    );
}

#[tokio::test]
async fn request_validation_without_owner_sends_nothing() {
    let notifier = Arc::new(RecordingNotifier::new());
    let h = harness(FakeContentApi::new(), notifier.clone()).await;

    let controller = WidgetController::new(host(), h.workflow.clone());
    let view = controller.request_validation().await;
    assert!(!view.dialog_open);
    assert_eq!(view.error.as_deref(), Some("Failed to send validation request to slack"));
    assert_eq!(notifier.attempts().await, 0);
}
