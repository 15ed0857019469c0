//! Tracing setup.
//!
//! Filter comes from `TODOS_LOG` (same syntax as `RUST_LOG`), defaulting to
//! `warn`. Events go to stderr so command output on stdout stays clean. With
//! `log_file`, events are also written to a daily file under
//! `<TODOS_HOME>/logs`.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::paths;

pub const LOG_ENV: &str = "TODOS_LOG";
const DEFAULT_FILTER: &str = "warn";
const LOG_FILE_PREFIX: &str = "todos.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber. Keep the returned guard alive until exit
/// so buffered file output is flushed.
///
/// Calling this twice is harmless; the second call is ignored.
pub fn init(log_file: bool) -> Option<WorkerGuard> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard) = if log_file {
        let appender = tracing_appender::rolling::daily(paths::logs_dir(), LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    let result = tracing_subscriber::registry()
        .with(env_filter())
        .with(stderr_layer)
        .with(file_layer)
        .try_init();
    if result.is_err() {
        return None;
    }
    guard
}
