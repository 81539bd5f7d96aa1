// src/client/mod.rs
//! Typed client for the job-board REST API

use bytes::Bytes;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, trace};

use crate::auth::{is_expired, TokenProvider};
use crate::cache::QueryCache;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::types::envelope::{error_message, Ack, ApiEnvelope};

pub mod bookmarks;
pub mod following;
pub mod jobs;
pub mod lookups;
pub mod pitch;
pub mod profiles;

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
    cache: QueryCache,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
            cache: QueryCache::new(),
        })
    }

    pub fn from_config(
        config: &ClientConfig,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, ApiError> {
        Self::new(config.api_base_url.clone(), config.timeout(), tokens)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    pub(crate) fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        self.http.request(method, self.url(endpoint))
    }

    /// The current session token, refusing locally expired ones.
    pub async fn session_token(&self) -> Result<Option<String>, ApiError> {
        match self.tokens.bearer_token().await? {
            Some(token) if is_expired(&token, Utc::now()) => Err(ApiError::Unauthorized(
                "session expired, log in again".to_string(),
            )),
            other => Ok(other),
        }
    }

    /// Send a request and return the body of a 2xx response.
    async fn execute(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let builder = match self.session_token().await? {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };

        let request = builder.build()?;
        let method = request.method().clone();
        let url = request.url().to_string();
        debug!("{} {}", method, url);

        let response = self.http.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;
        trace!("{} {} -> {}", method, url, status);

        if status.is_success() {
            return Ok(body);
        }

        let message = error_message(&body);
        match status {
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized(message)),
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(message)),
            _ => {
                error!("{} {} failed with {}: {}", method, url, status, message);
                Err(ApiError::Status {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    pub(crate) async fn fetch<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<ApiEnvelope<T>, ApiError> {
        let body = self.execute(builder).await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub(crate) async fn ack(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        let body = self.execute(builder).await?;
        if body.trim().is_empty() {
            return Ok(());
        }
        serde_json::from_str::<Ack>(&body)?.into_result()
    }

    pub(crate) async fn get_data<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.fetch(self.request(Method::GET, endpoint))
            .await?
            .into_data()
    }

    /// GET through the query cache.
    pub(crate) async fn get_cached<T>(
        &self,
        key: &str,
        endpoint: &str,
        ttl: Duration,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Serialize,
    {
        if let Some(hit) = self.cache.get::<T>(key).await {
            trace!("Cache hit for {}", key);
            return Ok(hit);
        }
        let value: T = self.get_data(endpoint).await?;
        self.cache.put(key, &value, ttl).await;
        Ok(value)
    }

    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.fetch(self.request(method, endpoint).json(body))
            .await?
            .into_data()
    }

    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: Form,
    ) -> Result<T, ApiError> {
        self.fetch(self.request(Method::POST, endpoint).multipart(form))
            .await?
            .into_data()
    }
}

/// Build a multipart part from in-memory file contents.
pub(crate) fn file_part(
    bytes: &Bytes,
    file_name: &str,
    content_type: &str,
) -> Result<Part, ApiError> {
    let part = Part::stream_with_length(reqwest::Body::from(bytes.clone()), bytes.len() as u64)
        .file_name(file_name.to_string())
        .mime_str(content_type)?;
    Ok(part)
}
