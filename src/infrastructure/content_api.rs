//! REST implementation of the host content API
//!
//! Paths follow the host platform's public REST surface:
//! - `GET /wiki/api/v2/pages/{id}` for the page owner
//! - `GET /wiki/rest/api/user?accountId={id}` for display names
//! - `GET /wiki/rest/api/content/{id}` for title and space

use async_trait::async_trait;
use reqwest::RequestBuilder;
use tracing::debug;
use url::Url;

use crate::domain::errors::RemoteLookupError;
use crate::domain::page_metadata::{CONTENT_RESOURCE, ContentDetail, PAGE_RESOURCE, PageDetail, USER_RESOURCE, UserDetail};
use crate::domain::services::HostContentApi;
use crate::infrastructure::config::HostApiConfig;
use crate::infrastructure::http_client::HttpClient;

/// How requests authenticate against the host
#[derive(Clone, PartialEq, Eq)]
pub enum HostAuth {
    Anonymous,
    Basic { email: String, api_token: String },
    Bearer(String),
}

impl std::fmt::Debug for HostAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anonymous => write!(f, "Anonymous"),
            Self::Basic { email, .. } => write!(f, "Basic({email}, ***)"),
            Self::Bearer(_) => write!(f, "Bearer(***)"),
        }
    }
}

impl HostAuth {
    pub fn from_config(config: &HostApiConfig) -> Self {
        match (&config.auth_email, &config.api_token) {
            (Some(email), Some(token)) => Self::Basic {
                email: email.clone(),
                api_token: token.clone(),
            },
            (None, Some(token)) => Self::Bearer(token.clone()),
            _ => Self::Anonymous,
        }
    }

    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::Anonymous => request,
            Self::Basic { email, api_token } => request.basic_auth(email, Some(api_token)),
            Self::Bearer(token) => request.bearer_auth(token),
        }
    }
}

pub struct RestContentApi {
    http: HttpClient,
    api_base_url: String,
    auth: HostAuth,
}

impl RestContentApi {
    pub fn new(http: HttpClient, config: &HostApiConfig) -> Self {
        Self {
            http,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            auth: HostAuth::from_config(config),
        }
    }

    /// `{api_base_url}/{segments..}`; each segment is percent-encoded, so an
    /// id can never add path levels or a query.
    fn endpoint(&self, resource: &str, segments: &[&str]) -> Result<Url, RemoteLookupError> {
        let mut url =
            Url::parse(&self.api_base_url).map_err(|e| RemoteLookupError::transport(resource, e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| RemoteLookupError::transport(resource, "API base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn page_url(&self, page_id: &str) -> Result<String, RemoteLookupError> {
        let url = self.endpoint(PAGE_RESOURCE, &["wiki", "api", "v2", "pages", page_id])?;
        Ok(url.into())
    }

    pub fn user_url(&self, account_id: &str) -> Result<String, RemoteLookupError> {
        let mut url = self.endpoint(USER_RESOURCE, &["wiki", "rest", "api", "user"])?;
        url.query_pairs_mut().append_pair("accountId", account_id);
        Ok(url.into())
    }

    pub fn content_url(&self, content_id: &str) -> Result<String, RemoteLookupError> {
        let url = self.endpoint(CONTENT_RESOURCE, &["wiki", "rest", "api", "content", content_id])?;
        Ok(url.into())
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str, resource: &str) -> Result<T, RemoteLookupError> {
        let request = self.auth.apply(self.http.get(url));
        self.http.fetch_json(request, resource, url).await
    }
}

#[async_trait]
impl HostContentApi for RestContentApi {
    async fn get_page(&self, page_id: &str) -> Result<PageDetail, RemoteLookupError> {
        let url = self.page_url(page_id)?;
        let detail: PageDetail = self.get(&url, PAGE_RESOURCE).await?;
        debug!("Page {} owner: {:?}", page_id, detail.owner_id);
        Ok(detail)
    }

    async fn get_user(&self, account_id: &str) -> Result<UserDetail, RemoteLookupError> {
        let url = self.user_url(account_id)?;
        self.get(&url, USER_RESOURCE).await
    }

    async fn get_content(&self, content_id: &str) -> Result<ContentDetail, RemoteLookupError> {
        let url = self.content_url(content_id)?;
        self.get(&url, CONTENT_RESOURCE).await
    }
}
