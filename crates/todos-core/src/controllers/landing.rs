//! Landing screen: redirect signed-in users, otherwise offer login/register.

use super::Route;
use crate::auth::SessionAccessor;
use crate::error::TodoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandingState {
    Checking,
    Anonymous,
    Redirecting(Route),
}

pub struct Landing<'a, A> {
    accessor: &'a A,
    hosted_ui: Option<String>,
    state: LandingState,
}

impl<'a, A: SessionAccessor> Landing<'a, A> {
    pub fn new(accessor: &'a A, hosted_ui: Option<&str>) -> Self {
        Self {
            accessor,
            hosted_ui: hosted_ui.map(str::to_string),
            state: LandingState::Checking,
        }
    }

    /// Resolves the session. A session with a usable token redirects to the
    /// dashboard; anything else stays on the landing screen.
    ///
    /// # Errors
    /// `Storage` if the session storage cannot be read.
    pub fn mount(&mut self) -> Result<Option<Route>, TodoError> {
        self.state = LandingState::Checking;
        match self.accessor.credentials() {
            Ok(_) => {
                self.state = LandingState::Redirecting(Route::Dashboard);
                Ok(Some(Route::Dashboard))
            }
            Err(TodoError::NoSession) => {
                self.state = LandingState::Anonymous;
                Ok(None)
            }
            Err(e) => {
                self.state = LandingState::Anonymous;
                Err(e)
            }
        }
    }

    pub fn state(&self) -> LandingState {
        self.state
    }

    /// Hosted UI page where new accounts are created.
    pub fn register_url(&self) -> Option<&str> {
        self.hosted_ui.as_deref()
    }
}
