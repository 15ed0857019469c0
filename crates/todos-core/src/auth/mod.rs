//! Authentication: session storage, the session accessor, identity claims and
//! the identity provider client.

pub mod claims;
pub mod provider;
pub mod session;
pub mod storage;

pub use claims::{ClaimsError, IdentityClaims};
pub use provider::{CognitoProvider, IdentityProvider, SignUpOutcome};
pub use session::{AuthTokens, Credentials, Session, SessionAccessor, UserPool};
pub use storage::SessionStorage;
