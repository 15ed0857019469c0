//! Screen controllers.
//!
//! Each controller owns its state and a cancellation token. Network calls are
//! raced against the token; a cancelled call never touches state. Dropping a
//! controller cancels whatever it still has in flight.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::TodoError;

pub mod dashboard;
pub mod landing;
pub mod login;
pub mod register;

pub use dashboard::{Dashboard, DashboardState};
pub use landing::{Landing, LandingState};
pub use login::{Login, LoginState};
pub use register::{Register, RegisterState};

/// Where a controller wants the shell to go next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Landing,
    Login,
    Register,
    Dashboard,
}

/// Runs `fut` unless `cancel` fires first.
pub(crate) async fn guarded<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T, TodoError>>,
) -> Result<T, TodoError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(TodoError::Cancelled),
        result = fut => result,
    }
}
