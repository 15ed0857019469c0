//! CLI command handlers.

pub mod auth;
pub mod config;
pub mod home;
pub mod todos;

use todos_core::error::TodoError;

pub const NOT_SIGNED_IN: &str = "Not signed in. Run `todos login` first.";

/// Turns a missing session into the login hint; everything else keeps its
/// type so `main` can still recognise cancellation.
pub fn cli_error(e: TodoError) -> anyhow::Error {
    match e {
        TodoError::NoSession => anyhow::anyhow!(NOT_SIGNED_IN),
        e => e.into(),
    }
}
