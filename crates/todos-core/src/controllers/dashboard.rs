//! Dashboard: the signed-in user's todo list.
//!
//! The local list only ever changes after the server confirms a call. Failed
//! calls leave it untouched and park an inline error until dismissed.

use tokio_util::sync::CancellationToken;

use super::{Route, guarded};
use crate::auth::{Credentials, IdentityClaims, SessionAccessor};
use crate::config::Config;
use crate::error::{FieldErrors, TodoError};
use crate::interrupt;
use crate::todos::{NewTodo, TodoClient, TodoItem, TodoPatch};

pub const TITLE_REQUIRED: &str = "Title is required";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardState {
    Loading,
    Ready,
    Mutating,
}

pub struct Dashboard<'a, A> {
    accessor: &'a A,
    client: &'a TodoClient,
    default_details: String,
    default_date: String,
    state: DashboardState,
    identity: IdentityClaims,
    items: Vec<TodoItem>,
    error: Option<TodoError>,
    cancel: CancellationToken,
}

impl<'a, A: SessionAccessor> Dashboard<'a, A> {
    pub fn new(accessor: &'a A, client: &'a TodoClient) -> Self {
        Self {
            accessor,
            client,
            default_details: Config::DEFAULT_DETAILS.to_string(),
            default_date: Config::DEFAULT_DATE.to_string(),
            state: DashboardState::Loading,
            identity: IdentityClaims::empty(),
            items: Vec::new(),
            error: None,
            cancel: interrupt::child_token(),
        }
    }

    /// Details and date used when `create` is not given any.
    #[must_use]
    pub fn with_defaults(mut self, details: impl Into<String>, date: impl Into<String>) -> Self {
        self.default_details = details.into();
        self.default_date = date.into();
        self
    }

    /// Resolves the session, decodes the identity and loads the list.
    ///
    /// Returns `Some(Route::Landing)` when nobody is signed in. An identity
    /// that cannot be decoded shows as empty and skips loading. A failed load
    /// becomes the inline error.
    ///
    /// # Errors
    /// `Storage` or `Cancelled`.
    pub async fn mount(&mut self) -> Result<Option<Route>, TodoError> {
        self.state = DashboardState::Loading;
        let creds = match self.accessor.credentials() {
            Ok(creds) => creds,
            Err(TodoError::NoSession) => return Ok(Some(Route::Landing)),
            Err(e) => {
                self.state = DashboardState::Ready;
                return Err(e);
            }
        };
        self.identity = creds.identity.clone();

        if self.identity.is_empty() {
            self.state = DashboardState::Ready;
            return Ok(None);
        }

        match self.load(&creds).await {
            Ok(()) | Err(TodoError::ListFailed(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Reloads the list from the server.
    ///
    /// # Errors
    /// `NoSession`, `ListFailed` or `Cancelled`.
    pub async fn refresh(&mut self) -> Result<(), TodoError> {
        self.state = DashboardState::Loading;
        let creds = match self.credentials() {
            Ok(creds) => creds,
            Err(e) => return self.settle(Err(e)),
        };
        self.load(&creds).await
    }

    async fn load(&mut self, creds: &Credentials) -> Result<(), TodoError> {
        let result = guarded(&self.cancel, self.client.list(&creds.token, creds.email())).await;
        let result = result.map(|items| {
            tracing::debug!(user_email = %creds.email(), count = items.len(), "loaded todos");
            self.items = items;
        });
        self.settle(result)
    }

    /// Creates an item and appends the server's copy.
    ///
    /// # Errors
    /// `ValidationFailed` for an empty title, `NoSession`, `CreateFailed` or
    /// `Cancelled`.
    pub async fn create(
        &mut self,
        title: &str,
        details: Option<&str>,
        date: Option<&str>,
    ) -> Result<TodoItem, TodoError> {
        self.state = DashboardState::Mutating;
        let result = self.try_create(title, details, date).await;
        self.settle(result)
    }

    async fn try_create(
        &mut self,
        title: &str,
        details: Option<&str>,
        date: Option<&str>,
    ) -> Result<TodoItem, TodoError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(TodoError::ValidationFailed(FieldErrors {
                title: Some(TITLE_REQUIRED.to_string()),
                ..FieldErrors::default()
            }));
        }
        let creds = self.credentials()?;
        let new = NewTodo {
            user_email: creds.email().to_string(),
            todo_title: title.to_string(),
            todo_details: details.unwrap_or(&self.default_details).to_string(),
            todo_date: date.unwrap_or(&self.default_date).to_string(),
        };

        let item = guarded(&self.cancel, self.client.create(&creds.token, &new)).await?;
        tracing::info!(user_email = %new.user_email, sort_key = %item.sort_key, "created todo");
        self.items.push(item.clone());
        Ok(item)
    }

    /// Deletes an item, then drops it from the local list.
    ///
    /// # Errors
    /// `NoSession`, `DeleteFailed` or `Cancelled`.
    pub async fn delete(&mut self, sort_key: &str) -> Result<(), TodoError> {
        self.state = DashboardState::Mutating;
        let result = self.try_delete(sort_key).await;
        self.settle(result)
    }

    async fn try_delete(&mut self, sort_key: &str) -> Result<(), TodoError> {
        let creds = self.credentials()?;
        guarded(
            &self.cancel,
            self.client.delete(&creds.token, sort_key, creds.email()),
        )
        .await?;
        tracing::info!(user_email = %creds.email(), sort_key, "deleted todo");
        self.items.retain(|item| item.sort_key != sort_key);
        Ok(())
    }

    /// Applies `patch` and replaces the local copy with the server's.
    ///
    /// # Errors
    /// `NoSession`, `UpdateFailed` or `Cancelled`.
    pub async fn update(&mut self, sort_key: &str, patch: &TodoPatch) -> Result<TodoItem, TodoError> {
        self.state = DashboardState::Mutating;
        let result = self.try_update(sort_key, patch).await;
        self.settle(result)
    }

    async fn try_update(&mut self, sort_key: &str, patch: &TodoPatch) -> Result<TodoItem, TodoError> {
        let creds = self.credentials()?;
        let item = guarded(
            &self.cancel,
            self.client.update(&creds.token, sort_key, creds.email(), patch),
        )
        .await?;
        self.replace(&item);
        Ok(item)
    }

    /// # Errors
    /// See [`Dashboard::update`].
    pub async fn set_done(&mut self, sort_key: &str, done: bool) -> Result<TodoItem, TodoError> {
        self.update(sort_key, &TodoPatch::done(done)).await
    }

    /// Fetches a single item, refreshing the local copy when present.
    ///
    /// # Errors
    /// `NoSession`, `GetFailed` or `Cancelled`.
    pub async fn fetch(&mut self, sort_key: &str) -> Result<Option<TodoItem>, TodoError> {
        self.state = DashboardState::Loading;
        let result = self.try_fetch(sort_key).await;
        self.settle(result)
    }

    async fn try_fetch(&mut self, sort_key: &str) -> Result<Option<TodoItem>, TodoError> {
        let creds = self.credentials()?;
        let item = guarded(
            &self.cancel,
            self.client.get(&creds.token, sort_key, creds.email()),
        )
        .await?;
        if let Some(item) = &item {
            self.replace(item);
        }
        Ok(item)
    }

    /// Signs out and routes back to the landing screen.
    ///
    /// # Errors
    /// `Storage` if the session storage cannot be written.
    pub fn sign_out(&mut self) -> Result<Route, TodoError> {
        self.cancel.cancel();
        self.accessor.sign_out().map_err(|e| TodoError::storage(&e))?;
        self.items.clear();
        self.identity = IdentityClaims::empty();
        Ok(Route::Landing)
    }

    /// Re-reads the session before each call; the identity on screen follows.
    fn credentials(&mut self) -> Result<Credentials, TodoError> {
        let creds = self.accessor.credentials()?;
        self.identity = creds.identity.clone();
        if creds.identity.is_empty() {
            return Err(TodoError::AuthFailed(
                "Signed-in identity has no email; sign in again".to_string(),
            ));
        }
        Ok(creds)
    }

    fn replace(&mut self, updated: &TodoItem) {
        if let Some(slot) = self.items.iter_mut().find(|i| i.sort_key == updated.sort_key) {
            *slot = updated.clone();
        }
    }

    /// Back to `Ready`; failures other than cancellation and a missing
    /// session become the inline error.
    fn settle<T>(&mut self, result: Result<T, TodoError>) -> Result<T, TodoError> {
        self.state = DashboardState::Ready;
        if let Err(e) = &result {
            match e {
                TodoError::Cancelled | TodoError::NoSession => {}
                e => {
                    tracing::info!(error = %e, "dashboard call failed");
                    self.error = Some(e.clone());
                }
            }
        }
        result
    }

    pub fn state(&self) -> DashboardState {
        self.state
    }

    pub fn identity(&self) -> &IdentityClaims {
        &self.identity
    }

    pub fn user_email(&self) -> &str {
        &self.identity.email
    }

    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    pub fn error(&self) -> Option<&TodoError> {
        self.error.as_ref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl<A> Drop for Dashboard<'_, A> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
