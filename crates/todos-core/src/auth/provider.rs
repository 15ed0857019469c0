//! Identity provider client (Cognito user pools).
//!
//! Sign-in uses `InitiateAuth` with the `USER_PASSWORD_AUTH` flow. Registration
//! uses `SignUp` with the `email` and `name` attributes. Provider error messages
//! are surfaced verbatim.

use std::future::Future;

use anyhow::{Context, Result};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::session::AuthTokens;
use crate::config::Config;
use crate::error::{RequestFailure, TodoError};

const AMZ_JSON: &str = "application/x-amz-json-1.1";
const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";

/// Result of a successful sign-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutcome {
    pub user_sub: String,
    /// False when the account still needs the emailed confirmation code.
    pub confirmed: bool,
}

/// Something that can authenticate and register users.
pub trait IdentityProvider {
    /// Exchanges email and password for tokens.
    fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<AuthTokens, TodoError>> + Send;

    /// Registers a new account.
    fn sign_up(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> impl Future<Output = Result<SignUpOutcome, TodoError>> + Send;
}

/// Cognito user pool client.
#[derive(Debug, Clone)]
pub struct CognitoProvider {
    endpoint: String,
    client_id: String,
    http: reqwest::Client,
}

impl CognitoProvider {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        endpoint: impl Into<String>,
        client_id: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build identity provider HTTP client")?;
        Ok(Self {
            endpoint: endpoint.into(),
            client_id: client_id.into(),
            http,
        })
    }

    /// # Errors
    /// Returns an error if the client id is missing or no endpoint can be
    /// derived.
    pub fn from_config(config: &Config) -> Result<Self> {
        if config.client_id.trim().is_empty() {
            anyhow::bail!("client_id is not configured (set it in config.toml or TODOS_CLIENT_ID)");
        }
        let endpoint = config.identity_endpoint_url()?;
        Self::new(endpoint, &config.client_id, config.request_timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call<T: DeserializeOwned>(&self, action: &str, body: &Value) -> Result<T, TodoError> {
        let response = self
            .http
            .post(&self.endpoint)
            .headers(build_headers(action))
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| TodoError::AuthFailed(RequestFailure::transport(&e).to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(action, status = status.as_u16(), "identity provider rejected request");
            return Err(TodoError::AuthFailed(provider_message(status.as_u16(), &body)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| TodoError::AuthFailed(format!("Unexpected identity provider response: {e}")))
    }
}

fn build_headers(action: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(AMZ_JSON));
    headers.insert(
        "X-Amz-Target",
        HeaderValue::from_str(&format!("{TARGET_PREFIX}.{action}"))
            .unwrap_or_else(|_| HeaderValue::from_static(TARGET_PREFIX)),
    );
    headers
}

/// Picks the human-readable part of a Cognito error body
/// (`{"__type": "...", "message": "..."}`).
fn provider_message(status: u16, body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        #[serde(rename = "__type")]
        kind: Option<String>,
        #[serde(alias = "Message")]
        message: Option<String>,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            message: Some(message),
            ..
        }) if !message.is_empty() => message,
        Ok(ErrorBody {
            kind: Some(kind), ..
        }) => kind.rsplit('#').next().unwrap_or(&kind).to_string(),
        _ => RequestFailure::http_status(status, body).to_string(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    authentication_result: Option<AuthenticationResult>,
    challenge_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    id_token: String,
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SignUpResponse {
    user_sub: String,
    #[serde(default)]
    user_confirmed: bool,
}

impl IdentityProvider for CognitoProvider {
    async fn authenticate(&self, email: &str, password: &str) -> Result<AuthTokens, TodoError> {
        let body = json!({
            "AuthFlow": "USER_PASSWORD_AUTH",
            "ClientId": self.client_id,
            "AuthParameters": {
                "USERNAME": email,
                "PASSWORD": password,
            },
        });
        let response: InitiateAuthResponse = self.call("InitiateAuth", &body).await?;

        match (response.authentication_result, response.challenge_name) {
            (Some(result), _) => {
                tracing::info!(user_email = email, "authenticated");
                Ok(AuthTokens {
                    id_token: result.id_token,
                    access_token: result.access_token,
                    refresh_token: result.refresh_token,
                    expires_in: result.expires_in,
                })
            }
            (None, Some(challenge)) => Err(TodoError::AuthFailed(format!(
                "Sign-in requires the {challenge} challenge; complete it in the hosted UI"
            ))),
            (None, None) => Err(TodoError::AuthFailed(
                "Identity provider returned no tokens".to_string(),
            )),
        }
    }

    async fn sign_up(&self, email: &str, name: &str, password: &str) -> Result<SignUpOutcome, TodoError> {
        let body = json!({
            "ClientId": self.client_id,
            "Username": email,
            "Password": password,
            "UserAttributes": [
                {"Name": "email", "Value": email},
                {"Name": "name", "Value": name},
            ],
        });
        let response: SignUpResponse = self.call("SignUp", &body).await?;
        tracing::info!(user_email = email, confirmed = response.user_confirmed, "signed up");

        Ok(SignUpOutcome {
            user_sub: response.user_sub,
            confirmed: response.user_confirmed,
        })
    }
}
