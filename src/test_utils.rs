//! Test utilities for the validation widget
//!
//! Scripted stand-ins for the host API, the webhook and the store, plus a
//! one-request HTTP listener for exercising the real `reqwest` clients.

use async_trait::async_trait;
use chrono::{Offset, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::application::dto::HostContext;
use crate::application::metadata_resolver::MetadataResolver;
use crate::application::state::WidgetController;
use crate::application::state_store::ValidationStateStore;
use crate::application::validation_workflow::ValidationWorkflow;
use crate::domain::errors::{RemoteLookupError, WidgetError, WidgetResult};
use crate::domain::page_metadata::{
    CONTENT_RESOURCE, ContentDetail, NotificationPayload, PAGE_RESOURCE, PageDetail, USER_RESOURCE, UserDetail,
};
use crate::domain::repositories::KeyValueStore;
use crate::domain::services::{HostContentApi, ValidationNotifier};
use crate::infrastructure::http_client::HttpClientConfig;
use crate::infrastructure::kv_store::InMemoryKeyValueStore;

pub const TEST_SITE_BASE_URL: &str = "https://wiki.example.com";

/// Host API answering from fixed tables; unknown ids get HTTP 404.
#[derive(Default)]
pub struct FakeContentApi {
    pages: HashMap<String, PageDetail>,
    users: HashMap<String, UserDetail>,
    contents: HashMap<String, ContentDetail>,
    transport_down: bool,
    calls: Mutex<Vec<String>>,
}

impl FakeContentApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page_id: &str, owner_id: &str) -> Self {
        self.pages.insert(
            page_id.to_string(),
            PageDetail {
                owner_id: Some(owner_id.to_string()),
            },
        );
        self
    }

    pub fn with_user(mut self, account_id: &str, display_name: &str) -> Self {
        self.users.insert(
            account_id.to_string(),
            UserDetail {
                account_id: Some(account_id.to_string()),
                display_name: Some(display_name.to_string()),
            },
        );
        self
    }

    pub fn with_content(mut self, content_id: &str, title: &str, space_key: &str) -> Self {
        self.contents.insert(
            content_id.to_string(),
            ContentDetail {
                title: Some(title.to_string()),
                space_key: Some(space_key.to_string()),
                space: None,
            },
        );
        self
    }

    /// Every call fails as if the network were unreachable.
    pub fn with_transport_down(mut self) -> Self {
        self.transport_down = true;
        self
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    async fn lookup<T: Clone>(
        &self,
        table: &HashMap<String, T>,
        resource: &str,
        id: &str,
    ) -> Result<T, RemoteLookupError> {
        self.calls.lock().await.push(format!("{resource}:{id}"));
        if self.transport_down {
            return Err(RemoteLookupError::transport(resource, "connection refused"));
        }
        table
            .get(id)
            .cloned()
            .ok_or_else(|| RemoteLookupError::status(resource, 404, "Not Found"))
    }
}

#[async_trait]
impl HostContentApi for FakeContentApi {
    async fn get_page(&self, page_id: &str) -> Result<PageDetail, RemoteLookupError> {
        self.lookup(&self.pages, PAGE_RESOURCE, page_id).await
    }

    async fn get_user(&self, account_id: &str) -> Result<UserDetail, RemoteLookupError> {
        self.lookup(&self.users, USER_RESOURCE, account_id).await
    }

    async fn get_content(&self, content_id: &str) -> Result<ContentDetail, RemoteLookupError> {
        self.lookup(&self.contents, CONTENT_RESOURCE, content_id).await
    }
}

/// Notifier that remembers what it delivered
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<NotificationPayload>>,
    attempts: Mutex<usize>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts attempts but never delivers
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub async fn sent(&self) -> Vec<NotificationPayload> {
        self.sent.lock().await.clone()
    }

    pub async fn attempts(&self) -> usize {
        *self.attempts.lock().await
    }
}

#[async_trait]
impl ValidationNotifier for RecordingNotifier {
    async fn notify(&self, payload: &NotificationPayload) -> WidgetResult<()> {
        *self.attempts.lock().await += 1;
        if self.fail {
            return Err(WidgetError::notification("webhook unreachable"));
        }
        self.sent.lock().await.push(payload.clone());
        Ok(())
    }
}

/// Store whose every operation fails
#[derive(Default)]
pub struct FailingKeyValueStore;

#[async_trait]
impl KeyValueStore for FailingKeyValueStore {
    async fn get(&self, key: &str) -> WidgetResult<Option<Value>> {
        Err(WidgetError::storage(key, "store unavailable"))
    }

    async fn set(&self, key: &str, _value: Value) -> WidgetResult<()> {
        Err(WidgetError::storage(key, "store unavailable"))
    }
}

/// Workflow wired to in-memory collaborators
pub struct TestContext {
    pub store: Arc<InMemoryKeyValueStore>,
    pub api: Arc<FakeContentApi>,
    pub notifier: Arc<RecordingNotifier>,
    pub workflow: ValidationWorkflow,
}

impl TestContext {
    pub fn new(api: FakeContentApi) -> Self {
        Self::with_notifier(api, RecordingNotifier::new())
    }

    pub fn with_notifier(api: FakeContentApi, notifier: RecordingNotifier) -> Self {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let api = Arc::new(api);
        let notifier = Arc::new(notifier);

        let state_store = ValidationStateStore::new(store.clone(), Utc.fix());
        let resolver = MetadataResolver::new(api.clone(), TEST_SITE_BASE_URL);
        let workflow = ValidationWorkflow::new(state_store, resolver, notifier.clone());

        Self {
            store,
            api,
            notifier,
            workflow,
        }
    }

    pub fn controller(&self, context: HostContext) -> WidgetController {
        WidgetController::new(context, self.workflow.clone())
    }
}

/// Client settings for talking to `OneShotHttpServer` (ignores proxy env vars)
pub fn local_http_config() -> HttpClientConfig {
    HttpClientConfig {
        timeout_seconds: 5,
        use_system_proxy: false,
        ..HttpClientConfig::default()
    }
}

/// Accepts exactly one HTTP request, answers it, and hands back the raw request text.
pub struct OneShotHttpServer {
    addr: SocketAddr,
    handle: JoinHandle<String>,
}

impl OneShotHttpServer {
    pub async fn start(status_line: &str, body: &str) -> Self {
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        Self::start_raw(&response).await
    }

    /// Answers with `response` byte for byte, e.g. a body shorter than its `Content-Length`.
    pub async fn start_raw(response: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");
        let response = response.to_string();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept test connection");
            let request = read_request(&mut socket).await;
            socket.write_all(response.as_bytes()).await.expect("write test response");
            let _ = socket.shutdown().await;
            request
        });

        Self { addr, handle }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    pub async fn captured_request(self) -> String {
        self.handle.await.expect("test server task")
    }
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 1024];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.expect("read request");
        if n == 0 {
            return String::from_utf8_lossy(&buf).into_owned();
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.expect("read request body");
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    String::from_utf8_lossy(&buf).into_owned()
}
