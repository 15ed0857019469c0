//! Error taxonomy shared by the session accessor, the todo client and the
//! controllers.

use std::fmt;

use serde_json::Value;

use crate::auth::claims::ClaimsError;

/// Why a single remote call did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFailure {
    /// HTTP status, when the server answered at all.
    pub status: Option<u16>,
    /// One-line summary suitable for display.
    pub message: String,
}

impl RequestFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    /// Builds a failure from a non-success response body.
    ///
    /// JSON bodies shaped like `{"detail": ..}`, `{"message": ..}` or
    /// `{"error": {"message": ..}}` contribute their message.
    pub fn http_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|json| extract_message(&json))
            .unwrap_or_else(|| body.trim().chars().take(200).collect());
        Self {
            status: Some(status),
            message,
        }
    }

    /// Classifies a transport-level error (no usable HTTP response).
    pub fn transport(e: &reqwest::Error) -> Self {
        let message = if e.is_timeout() {
            format!("Request timed out: {e}")
        } else if e.is_connect() {
            format!("Connection failed: {e}")
        } else if e.is_decode() {
            format!("Invalid response body: {e}")
        } else if e.is_request() || e.is_builder() {
            format!("Request error: {e}")
        } else {
            format!("Network error: {e}")
        };
        Self::new(message)
    }
}

fn extract_message(json: &Value) -> Option<String> {
    let text = |v: &Value| match v {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    };
    json.get("detail")
        .and_then(text)
        .or_else(|| json.get("message").and_then(text))
        .or_else(|| {
            json.get("error")
                .and_then(|e| e.get("message"))
                .and_then(text)
        })
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.status, self.message.is_empty()) {
            (Some(status), true) => write!(f, "HTTP {status}"),
            (Some(status), false) => write!(f, "HTTP {status}: {}", self.message),
            (None, _) => f.write_str(&self.message),
        }
    }
}

/// Per-field validation messages for the login and register forms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
    pub title: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.name.is_none() && self.password.is_none() && self.title.is_none()
    }

    /// Field messages in display order.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        [&self.email, &self.name, &self.password, &self.title]
            .into_iter()
            .filter_map(|m| m.as_deref())
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self.messages().collect::<Vec<_>>().join("; ");
        f.write_str(&joined)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TodoError {
    #[error("Not signed in")]
    NoSession,

    #[error("Could not decode identity token: {0}")]
    TokenDecode(#[from] ClaimsError),

    #[error("Failed to list todos: {0}")]
    ListFailed(RequestFailure),

    #[error("Failed to create todo: {0}")]
    CreateFailed(RequestFailure),

    #[error("Failed to delete todo: {0}")]
    DeleteFailed(RequestFailure),

    #[error("Failed to fetch todo: {0}")]
    GetFailed(RequestFailure),

    #[error("Failed to update todo: {0}")]
    UpdateFailed(RequestFailure),

    #[error("{0}")]
    ValidationFailed(FieldErrors),

    /// Message from the identity provider, surfaced verbatim.
    #[error("{0}")]
    AuthFailed(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Cancelled")]
    Cancelled,
}

impl TodoError {
    /// Wraps an `anyhow` storage error, keeping its context chain.
    pub fn storage(err: &anyhow::Error) -> Self {
        Self::Storage(format!("{err:#}"))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
