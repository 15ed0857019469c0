//! Session accessor.
//!
//! One place for "current session → token → claims", consumed by every
//! controller. The accessor is constructed explicitly and passed in, so
//! controllers can be exercised against a temporary storage file instead of a
//! live identity provider.

use std::path::{Path, PathBuf};

use anyhow::Result;

use super::claims::{self, IdentityClaims};
use super::storage::SessionStorage;
use crate::config::{Config, paths};
use crate::error::TodoError;

/// Storage key namespace used by the identity provider's client SDK.
pub const KEY_PREFIX: &str = "CognitoIdentityServiceProvider";

/// Token slots cached per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Id,
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Id => "idToken",
            TokenKind::Access => "accessToken",
            TokenKind::Refresh => "refreshToken",
        }
    }
}

/// `CognitoIdentityServiceProvider.<clientId>.LastAuthUser`
pub fn last_user_key(client_id: &str) -> String {
    format!("{KEY_PREFIX}.{client_id}.LastAuthUser")
}

/// `CognitoIdentityServiceProvider.<clientId>.<username>.<kind>`
pub fn token_key(client_id: &str, username: &str, kind: TokenKind) -> String {
    format!("{KEY_PREFIX}.{client_id}.{username}.{}", kind.as_str())
}

fn user_prefix(client_id: &str, username: &str) -> String {
    format!("{KEY_PREFIX}.{client_id}.{username}.")
}

/// Returns a masked version of a token for display (first 12 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.chars().count() <= 16 {
        return "***".to_string();
    }
    let head: String = token.chars().take(12).collect();
    format!("{head}...")
}

/// Tokens returned by a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthTokens {
    pub id_token: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
}

/// A snapshot of the signed-in user's storage area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    username: String,
    client_id: String,
    storage: SessionStorage,
}

impl Session {
    pub fn new(username: impl Into<String>, client_id: impl Into<String>, storage: SessionStorage) -> Self {
        Self {
            username: username.into(),
            client_id: client_id.into(),
            storage,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    fn lookup(&self, kind: TokenKind) -> Option<&str> {
        self.storage
            .get(&token_key(&self.client_id, &self.username, kind))
            .filter(|t| !t.trim().is_empty())
    }

    /// The raw ID token, or `None` when the storage key is absent or empty.
    pub fn token(&self) -> Option<&str> {
        self.lookup(TokenKind::Id)
    }

    /// Decodes the ID token's claims.
    ///
    /// # Errors
    /// `NoSession` without a token, `TokenDecode` for malformed tokens.
    pub fn claims(&self) -> Result<IdentityClaims, TodoError> {
        let token = self.token().ok_or(TodoError::NoSession)?;
        Ok(claims::decode(token)?)
    }
}

/// What a controller needs to make an authenticated call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub token: String,
    /// Empty when the token could not be decoded.
    pub identity: IdentityClaims,
}

impl Credentials {
    pub fn email(&self) -> &str {
        &self.identity.email
    }
}

/// Access to the identity provider's cached session.
pub trait SessionAccessor {
    /// Returns the cached session, if a user is signed in.
    ///
    /// # Errors
    /// Returns an error if the storage cannot be read.
    fn current_session(&self) -> Result<Option<Session>>;

    /// Caches tokens for `username` and makes them the current session.
    ///
    /// # Errors
    /// Returns an error if the storage cannot be written.
    fn store_session(&self, username: &str, tokens: &AuthTokens) -> Result<()>;

    /// Invalidates the current session. Returns whether one existed.
    ///
    /// # Errors
    /// Returns an error if the storage cannot be written.
    fn sign_out(&self) -> Result<bool>;

    /// Resolves session, token and identity in one step.
    ///
    /// A missing session or token is `NoSession`. A token that cannot be
    /// decoded degrades to the empty identity instead of failing.
    ///
    /// # Errors
    /// `NoSession`, or `Storage` when the session cannot be read.
    fn credentials(&self) -> Result<Credentials, TodoError> {
        let session = self
            .current_session()
            .map_err(|e| TodoError::storage(&e))?
            .ok_or(TodoError::NoSession)?;
        let token = session.token().ok_or(TodoError::NoSession)?.to_string();

        let identity = match claims::decode(&token) {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(username = session.username(), error = %e, "identity token could not be decoded");
                IdentityClaims::empty()
            }
        };
        tracing::debug!(
            username = session.username(),
            user_email = %identity.email,
            token = %mask_token(&token),
            "resolved session"
        );

        Ok(Credentials {
            username: session.username().to_string(),
            token,
            identity,
        })
    }
}

/// File-backed user pool session, keyed by client id.
#[derive(Debug, Clone)]
pub struct UserPool {
    client_id: String,
    storage_path: PathBuf,
}

impl UserPool {
    pub fn new(client_id: impl Into<String>, storage_path: impl Into<PathBuf>) -> Self {
        Self {
            client_id: client_id.into(),
            storage_path: storage_path.into(),
        }
    }

    /// Pool backed by `<TODOS_HOME>/session.json`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.client_id, paths::session_path())
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }
}

impl SessionAccessor for UserPool {
    fn current_session(&self) -> Result<Option<Session>> {
        let storage = SessionStorage::load_from(&self.storage_path)?;
        let Some(username) = storage
            .get(&last_user_key(&self.client_id))
            .filter(|u| !u.is_empty())
            .map(str::to_string)
        else {
            return Ok(None);
        };
        Ok(Some(Session::new(username, &self.client_id, storage)))
    }

    fn store_session(&self, username: &str, tokens: &AuthTokens) -> Result<()> {
        let mut storage = SessionStorage::load_from(&self.storage_path)?;

        // a stale refresh token from an earlier login must not linger
        storage.remove_prefixed(&user_prefix(&self.client_id, username));

        storage.set(token_key(&self.client_id, username, TokenKind::Id), &tokens.id_token);
        storage.set(
            token_key(&self.client_id, username, TokenKind::Access),
            &tokens.access_token,
        );
        if let Some(refresh) = tokens.refresh_token.as_deref() {
            storage.set(token_key(&self.client_id, username, TokenKind::Refresh), refresh);
        }
        storage.set(
            format!("{}clockDrift", user_prefix(&self.client_id, username)),
            "0",
        );
        storage.set(last_user_key(&self.client_id), username);
        storage.save_to(&self.storage_path)?;

        tracing::info!(username, "session stored");
        Ok(())
    }

    fn sign_out(&self) -> Result<bool> {
        let mut storage = SessionStorage::load_from(&self.storage_path)?;
        let last_user = last_user_key(&self.client_id);
        let Some(username) = storage.remove(&last_user) else {
            return Ok(false);
        };
        let removed = storage.remove_prefixed(&user_prefix(&self.client_id, &username));
        storage.save_to(&self.storage_path)?;

        tracing::info!(username = %username, removed, "signed out");
        Ok(true)
    }
}
