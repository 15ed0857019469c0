//! Ctrl+C handling.
//!
//! The first Ctrl+C cancels the root token, which every controller's token
//! descends from, so in-flight requests are abandoned and their results
//! discarded. A second Ctrl+C exits immediately with status 130.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);
static ROOT: OnceLock<CancellationToken> = OnceLock::new();

/// Installs the Ctrl+C handler. The handler only flips state; it prints
/// nothing.
///
/// # Errors
/// Returns an error if a handler is already installed.
pub fn init() -> Result<()> {
    ctrlc::set_handler(trigger).context("Error setting Ctrl+C handler")
}

/// Triggers an interrupt, force-exiting on the second one.
pub fn trigger() {
    if INTERRUPTED.swap(true, Ordering::SeqCst) {
        std::process::exit(130);
    }
    root_token().cancel();
}

/// Process-wide token cancelled by Ctrl+C.
pub fn root_token() -> &'static CancellationToken {
    ROOT.get_or_init(CancellationToken::new)
}

/// A token cancelled by Ctrl+C or by its owner, whichever comes first.
pub fn child_token() -> CancellationToken {
    root_token().child_token()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_token_is_independent_of_siblings() {
        let a = child_token();
        let b = child_token();
        a.cancel();
        assert!(a.is_cancelled());
        assert!(!b.is_cancelled());
        assert!(!root_token().is_cancelled());
    }
}
