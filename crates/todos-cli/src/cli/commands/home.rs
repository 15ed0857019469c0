//! Landing screen: signed-in users go straight to their list.

use anyhow::Result;
use todos_core::auth::UserPool;
use todos_core::config::Config;
use todos_core::controllers::{Landing, Route};

use super::cli_error;
use crate::cli::render;

pub async fn run(config: &Config) -> Result<()> {
    let pool = UserPool::from_config(config);
    let mut landing = Landing::new(&pool, config.hosted_ui());

    match landing.mount().map_err(cli_error)? {
        Some(Route::Dashboard) => super::todos::list(config).await,
        _ => {
            render::landing(landing.register_url());
            Ok(())
        }
    }
}
