//! TODO REST API client.
//!
//! Every call carries a fresh correlation id and the raw ID token in
//! `Authorization`. Non-success statuses become typed failures.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, Response};
use serde_json::Value;
use url::Url;

use super::types::{NewTodo, TodoItem, TodoPatch, todo_id};
use crate::auth::session::mask_token;
use crate::config::Config;
use crate::error::{RequestFailure, TodoError};

/// Header carrying the per-request tracing id.
pub const CORRELATION_HEADER: &str = "Correlation-ID";

const CORRELATION_PREFIX: &str = "todos";

/// Returns a new correlation id; never reused across requests.
pub fn new_correlation_id() -> String {
    format!("{CORRELATION_PREFIX}-{}", uuid::Uuid::new_v4())
}

#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: Url,
    http: reqwest::Client,
}

impl TodoClient {
    /// # Errors
    /// Returns an error if `base_url` is not an absolute http(s) URL or the
    /// HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url =
            Url::parse(base_url.trim()).with_context(|| format!("Invalid backend URL '{base_url}'"))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            anyhow::bail!("Backend URL must be an http(s) URL, got '{base_url}'");
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { base_url, http })
    }

    /// # Errors
    /// See [`TodoClient::new`].
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.backend_url, config.request_timeout())
    }

    /// `{base}/todos[/<id>][?user_email=<email>]`
    fn endpoint(&self, id: Option<&str>, email: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("todos");
            if let Some(id) = id {
                segments.push(id);
            }
        }
        if let Some(email) = email {
            url.query_pairs_mut().clear().append_pair("user_email", email);
        }
        url
    }

    fn request(&self, method: Method, url: Url, token: &str) -> RequestBuilder {
        self.http.request(method, url).header(AUTHORIZATION, token)
    }

    /// Sends `builder` with a fresh correlation id and checks the status.
    async fn send(&self, builder: RequestBuilder, token: &str) -> Result<Response, RequestFailure> {
        let correlation_id = new_correlation_id();
        let builder = builder.header(CORRELATION_HEADER, &correlation_id);

        tracing::debug!(%correlation_id, token = %mask_token(token), "sending todo api request");
        let response = builder.send().await.map_err(|e| {
            tracing::debug!(%correlation_id, error = %e, "todo api request failed to send");
            RequestFailure::transport(&e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(%correlation_id, status = status.as_u16(), "todo api returned an error");
            return Err(RequestFailure::http_status(status.as_u16(), &body));
        }
        tracing::debug!(%correlation_id, status = status.as_u16(), "todo api request succeeded");
        Ok(response)
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        token: &str,
    ) -> Result<T, RequestFailure> {
        self.send(builder, token)
            .await?
            .json::<T>()
            .await
            .map_err(|e| RequestFailure::transport(&e))
    }

    /// `GET /todos?user_email=<email>`
    ///
    /// # Errors
    /// `ListFailed` on transport errors, non-success statuses or bad bodies.
    pub async fn list(&self, token: &str, email: &str) -> Result<Vec<TodoItem>, TodoError> {
        let url = self.endpoint(None, Some(email));
        self.send_json(self.request(Method::GET, url, token), token)
            .await
            .map_err(TodoError::ListFailed)
    }

    /// `POST /todos`; returns the item with its server-assigned sort key.
    ///
    /// # Errors
    /// `CreateFailed` on transport errors, non-success statuses or bad bodies.
    pub async fn create(&self, token: &str, todo: &NewTodo) -> Result<TodoItem, TodoError> {
        let url = self.endpoint(None, None);
        self.send_json(self.request(Method::POST, url, token).json(todo), token)
            .await
            .map_err(TodoError::CreateFailed)
    }

    /// `DELETE /todos/<id>?user_email=<email>`
    ///
    /// # Errors
    /// `DeleteFailed` on transport errors or non-success statuses.
    pub async fn delete(&self, token: &str, sort_key: &str, email: &str) -> Result<(), TodoError> {
        let url = self.endpoint(Some(todo_id(sort_key)), Some(email));
        self.send(self.request(Method::DELETE, url, token), token)
            .await
            .map(drop)
            .map_err(TodoError::DeleteFailed)
    }

    /// `GET /todos/<id>?user_email=<email>`; the server answers `{}` for a
    /// missing item.
    ///
    /// # Errors
    /// `GetFailed` on transport errors, non-success statuses or bad bodies.
    pub async fn get(
        &self,
        token: &str,
        sort_key: &str,
        email: &str,
    ) -> Result<Option<TodoItem>, TodoError> {
        let url = self.endpoint(Some(todo_id(sort_key)), Some(email));
        let value: Value = self
            .send_json(self.request(Method::GET, url, token), token)
            .await
            .map_err(TodoError::GetFailed)?;
        parse_optional_item(value).map_err(TodoError::GetFailed)
    }

    /// `PATCH /todos/<id>?user_email=<email>` with only the set fields.
    ///
    /// # Errors
    /// `UpdateFailed` on transport errors, non-success statuses, bad bodies,
    /// or an empty answer.
    pub async fn update(
        &self,
        token: &str,
        sort_key: &str,
        email: &str,
        patch: &TodoPatch,
    ) -> Result<TodoItem, TodoError> {
        let url = self.endpoint(Some(todo_id(sort_key)), Some(email));
        let value: Value = self
            .send_json(self.request(Method::PATCH, url, token).json(patch), token)
            .await
            .map_err(TodoError::UpdateFailed)?;
        parse_optional_item(value)
            .and_then(|item| item.ok_or_else(|| RequestFailure::new("Server returned no item")))
            .map_err(TodoError::UpdateFailed)
    }
}

fn parse_optional_item(value: Value) -> Result<Option<TodoItem>, RequestFailure> {
    match &value {
        Value::Null => Ok(None),
        Value::Object(map) if map.is_empty() => Ok(None),
        _ => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| RequestFailure::new(format!("Invalid item in response: {e}"))),
    }
}
