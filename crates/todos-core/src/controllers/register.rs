//! Registration form, for when the hosted UI is not an option.

use tokio_util::sync::CancellationToken;

use super::guarded;
use super::login::{EMAIL_REQUIRED, PASSWORD_REQUIRED};
use crate::auth::{IdentityProvider, SignUpOutcome};
use crate::error::{FieldErrors, TodoError};
use crate::interrupt;

pub const NAME_REQUIRED: &str = "Name is required";
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterState {
    Idle,
    Validating,
    Submitting,
    Error(String),
    Registered(SignUpOutcome),
}

/// Checks fields in form order and reports only the first problem.
pub fn validate(email: &str, name: &str, password: &str) -> FieldErrors {
    let mut errors = FieldErrors::default();
    if email.trim().is_empty() {
        errors.email = Some(EMAIL_REQUIRED.to_string());
    } else if name.trim().is_empty() {
        errors.name = Some(NAME_REQUIRED.to_string());
    } else if password.is_empty() {
        errors.password = Some(PASSWORD_REQUIRED.to_string());
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.password = Some(PASSWORD_TOO_SHORT.to_string());
    }
    errors
}

pub struct Register<'a, P> {
    provider: &'a P,
    email: String,
    name: String,
    password: String,
    field_errors: FieldErrors,
    state: RegisterState,
    cancel: CancellationToken,
}

impl<'a, P: IdentityProvider> Register<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self {
            provider,
            email: String::new(),
            name: String::new(),
            password: String::new(),
            field_errors: FieldErrors::default(),
            state: RegisterState::Idle,
            cancel: interrupt::child_token(),
        }
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    /// # Errors
    /// `ValidationFailed`, `AuthFailed` or `Cancelled`.
    pub async fn submit(&mut self) -> Result<SignUpOutcome, TodoError> {
        self.state = RegisterState::Validating;
        self.field_errors = validate(&self.email, &self.name, &self.password);
        if !self.field_errors.is_empty() {
            self.state = RegisterState::Idle;
            return Err(TodoError::ValidationFailed(self.field_errors.clone()));
        }

        self.state = RegisterState::Submitting;
        let email = self.email.trim().to_string();
        let name = self.name.trim().to_string();
        match guarded(&self.cancel, self.provider.sign_up(&email, &name, &self.password)).await {
            Ok(outcome) => {
                self.state = RegisterState::Registered(outcome.clone());
                Ok(outcome)
            }
            Err(TodoError::Cancelled) => {
                self.state = RegisterState::Idle;
                Err(TodoError::Cancelled)
            }
            Err(e) => {
                tracing::info!(user_email = %email, error = %e, "sign-up failed");
                self.state = RegisterState::Error(e.to_string());
                Err(e)
            }
        }
    }

    pub fn state(&self) -> &RegisterState {
        &self.state
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl<P> Drop for Register<'_, P> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
