//! Identity claims read back from a provider-issued ID token.
//!
//! The signature is not verified: the token was validated by the identity
//! provider at issuance and is only read here to learn who the user is.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

/// Claims the client cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl IdentityClaims {
    /// The identity shown when the token cannot be decoded.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.email.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClaimsError {
    #[error("expected 3 dot-separated segments, found {0}")]
    Segments(usize),
    #[error("payload is not base64url: {0}")]
    Base64(String),
    #[error("payload is not a claims object: {0}")]
    Json(String),
    #[error("token carries no email claim")]
    MissingEmail,
}

/// Decodes the payload segment of `token`.
///
/// # Errors
/// Fails on anything that is not a three-segment JWT whose payload holds a
/// non-empty `email`. A partially readable token never yields a partial
/// identity.
pub fn decode(token: &str) -> Result<IdentityClaims, ClaimsError> {
    let parts: Vec<&str> = token.trim().split('.').collect();
    if parts.len() != 3 {
        return Err(ClaimsError::Segments(parts.len()));
    }

    let payload = parts[1].trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| ClaimsError::Base64(e.to_string()))?;
    let claims: IdentityClaims =
        serde_json::from_slice(&bytes).map_err(|e| ClaimsError::Json(e.to_string()))?;

    if claims.email.trim().is_empty() {
        return Err(ClaimsError::MissingEmail);
    }
    Ok(claims)
}
