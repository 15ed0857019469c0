//! Login form.

use tokio_util::sync::CancellationToken;

use super::{Route, guarded};
use crate::auth::{IdentityProvider, SessionAccessor};
use crate::error::{FieldErrors, TodoError};
use crate::interrupt;

pub const EMAIL_REQUIRED: &str = "Email is Required";
pub const PASSWORD_REQUIRED: &str = "Password is required";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginState {
    Idle,
    Validating,
    Submitting,
    /// Provider message, verbatim.
    Error(String),
}

/// Both fields are checked; every empty one gets its message.
pub fn validate(email: &str, password: &str) -> FieldErrors {
    FieldErrors {
        email: email.trim().is_empty().then(|| EMAIL_REQUIRED.to_string()),
        password: password.is_empty().then(|| PASSWORD_REQUIRED.to_string()),
        ..FieldErrors::default()
    }
}

pub struct Login<'a, P, A> {
    provider: &'a P,
    accessor: &'a A,
    email: String,
    password: String,
    field_errors: FieldErrors,
    state: LoginState,
    cancel: CancellationToken,
}

impl<'a, P: IdentityProvider, A: SessionAccessor> Login<'a, P, A> {
    pub fn new(provider: &'a P, accessor: &'a A) -> Self {
        Self {
            provider,
            accessor,
            email: String::new(),
            password: String::new(),
            field_errors: FieldErrors::default(),
            state: LoginState::Idle,
            cancel: interrupt::child_token(),
        }
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    /// Authenticates and stores the session.
    ///
    /// Invalid input makes no network call. A provider rejection leaves the
    /// controller in [`LoginState::Error`] with the provider's message.
    ///
    /// # Errors
    /// `ValidationFailed`, `AuthFailed`, `Storage` or `Cancelled`.
    pub async fn submit(&mut self) -> Result<Route, TodoError> {
        self.state = LoginState::Validating;
        self.field_errors = validate(&self.email, &self.password);
        if !self.field_errors.is_empty() {
            self.state = LoginState::Idle;
            return Err(TodoError::ValidationFailed(self.field_errors.clone()));
        }

        self.state = LoginState::Submitting;
        let email = self.email.trim().to_string();
        let result = guarded(&self.cancel, self.provider.authenticate(&email, &self.password)).await;

        let tokens = match result {
            Ok(tokens) => tokens,
            Err(TodoError::Cancelled) => {
                self.state = LoginState::Idle;
                return Err(TodoError::Cancelled);
            }
            Err(e) => {
                tracing::info!(user_email = %email, error = %e, "login failed");
                self.state = LoginState::Error(e.to_string());
                return Err(e);
            }
        };

        self.accessor.store_session(&email, &tokens).map_err(|e| {
            let err = TodoError::storage(&e);
            self.state = LoginState::Error(err.to_string());
            err
        })?;
        self.state = LoginState::Idle;
        Ok(Route::Dashboard)
    }

    pub fn state(&self) -> &LoginState {
        &self.state
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    pub fn login_error(&self) -> Option<&str> {
        match &self.state {
            LoginState::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl<P, A> Drop for Login<'_, P, A> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use tempfile::{TempDir, tempdir};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::auth::{CognitoProvider, UserPool};
    use crate::test_support::id_token;

    fn pool(dir: &TempDir) -> UserPool {
        UserPool::new("client-1", dir.path().join("session.json"))
    }

    fn provider(server: &MockServer) -> CognitoProvider {
        CognitoProvider::new(server.uri(), "client-1", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_empty_fields_make_no_network_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let dir = tempdir().unwrap();
        let (provider, pool) = (provider(&server), pool(&dir));

        let mut login = Login::new(&provider, &pool);
        let err = login.submit().await.unwrap_err();

        let errors = login.field_errors();
        assert_eq!(errors.email.as_deref(), Some(EMAIL_REQUIRED));
        assert_eq!(errors.password.as_deref(), Some(PASSWORD_REQUIRED));
        assert_eq!(err, TodoError::ValidationFailed(errors.clone()));
        assert_eq!(login.state(), &LoginState::Idle);
    }

    #[test]
    fn test_validate_single_missing_field() {
        let errors = validate("rick@example.com", "");
        assert!(errors.email.is_none());
        assert_eq!(errors.password.as_deref(), Some(PASSWORD_REQUIRED));

        let errors = validate("   ", "secret");
        assert_eq!(errors.email.as_deref(), Some(EMAIL_REQUIRED));
        assert!(errors.password.is_none());
    }

    #[tokio::test]
    async fn test_success_stores_session_and_routes_to_dashboard() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "AuthenticationResult": {
                    "IdToken": id_token("rick@example.com", "Rick"),
                    "AccessToken": "access",
                    "RefreshToken": "refresh",
                    "ExpiresIn": 3600
                }
            })))
            .expect(1)
            .mount(&server)
            .await;
        let dir = tempdir().unwrap();
        let (provider, pool) = (provider(&server), pool(&dir));

        let mut login = Login::new(&provider, &pool);
        login.set_email(" rick@example.com ");
        login.set_password("pickle-rick");
        assert_eq!(login.submit().await.unwrap(), Route::Dashboard);

        let creds = pool.credentials().unwrap();
        assert_eq!(creds.username, "rick@example.com");
        assert_eq!(creds.email(), "rick@example.com");
        assert!(login.field_errors().is_empty());
    }

    #[tokio::test]
    async fn test_provider_error_is_surfaced_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "__type": "UserNotFoundException",
                "message": "User does not exist."
            })))
            .mount(&server)
            .await;
        let dir = tempdir().unwrap();
        let (provider, pool) = (provider(&server), pool(&dir));

        let mut login = Login::new(&provider, &pool);
        login.set_email("nobody@example.com");
        login.set_password("whatever");
        let err = login.submit().await.unwrap_err();

        assert_eq!(err, TodoError::AuthFailed("User does not exist.".into()));
        assert_eq!(login.login_error(), Some("User does not exist."));
        assert!(pool.current_session().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cancelled_login_stores_nothing() {
        let server = MockServer::start().await;
        let dir = tempdir().unwrap();
        let (provider, pool) = (provider(&server), pool(&dir));

        let mut login = Login::new(&provider, &pool);
        login.set_email("rick@example.com");
        login.set_password("pickle-rick");
        login.cancellation().cancel();

        assert_eq!(login.submit().await, Err(TodoError::Cancelled));
        assert_eq!(login.state(), &LoginState::Idle);
        assert!(pool.current_session().unwrap().is_none());
    }
}
