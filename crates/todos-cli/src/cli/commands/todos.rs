//! Todo command handlers, all driven through the dashboard controller.

use anyhow::{Result, bail};
use todos_core::auth::{SessionAccessor, UserPool};
use todos_core::config::Config;
use todos_core::controllers::{Dashboard, Route};
use todos_core::todos::{TodoClient, sort_key};

use super::{NOT_SIGNED_IN, cli_error};
use crate::cli::render;

/// Resolves the session before the backend URL is looked at, so a signed-out
/// user gets the login hint whatever the backend config says.
fn signed_in(config: &Config) -> Result<(UserPool, TodoClient)> {
    let pool = UserPool::from_config(config);
    pool.credentials().map_err(cli_error)?;
    let client = TodoClient::from_config(config)?;
    Ok((pool, client))
}

fn dashboard<'a>(config: &Config, pool: &'a UserPool, client: &'a TodoClient) -> Dashboard<'a, UserPool> {
    Dashboard::new(pool, client).with_defaults(&config.default_details, &config.default_date)
}

pub async fn list(config: &Config) -> Result<()> {
    let (pool, client) = signed_in(config)?;
    let mut dashboard = dashboard(config, &pool, &client);

    if dashboard.mount().await.map_err(cli_error)? == Some(Route::Landing) {
        bail!(NOT_SIGNED_IN);
    }

    render::header(dashboard.user_email());
    if dashboard.identity().is_empty() {
        eprintln!("Your identity could not be read from the session; run `todos login` again.");
        return Ok(());
    }
    if let Some(err) = dashboard.error() {
        return Err(err.clone().into());
    }
    render::items(dashboard.items());
    Ok(())
}

pub async fn add(config: &Config, title: &str, details: Option<&str>, date: Option<&str>) -> Result<()> {
    let (pool, client) = signed_in(config)?;
    let mut dashboard = dashboard(config, &pool, &client);

    let item = dashboard.create(title, details, date).await.map_err(cli_error)?;
    println!("Created {} {}", item.sort_key, item.todo_title);
    Ok(())
}

pub async fn show(config: &Config, key: &str) -> Result<()> {
    let (pool, client) = signed_in(config)?;
    let mut dashboard = dashboard(config, &pool, &client);

    let key = sort_key(key);
    match dashboard.fetch(&key).await.map_err(cli_error)? {
        Some(item) => render::item(&item),
        None => bail!("No todo with sort key {key}"),
    }
    Ok(())
}

pub async fn done(config: &Config, key: &str, done: bool) -> Result<()> {
    let (pool, client) = signed_in(config)?;
    let mut dashboard = dashboard(config, &pool, &client);

    let key = sort_key(key);
    let item = dashboard.set_done(&key, done).await.map_err(cli_error)?;
    let status = if item.is_done { "done" } else { "not done" };
    println!("Marked {} as {status}", item.sort_key);
    Ok(())
}

pub async fn remove(config: &Config, key: &str) -> Result<()> {
    let (pool, client) = signed_in(config)?;
    let mut dashboard = dashboard(config, &pool, &client);

    let key = sort_key(key);
    dashboard.delete(&key).await.map_err(cli_error)?;
    println!("Deleted {key}");
    Ok(())
}
