//! Auth command handlers.

use anyhow::{Result, bail};
use todos_core::auth::{CognitoProvider, SessionAccessor, UserPool};
use todos_core::config::Config;
use todos_core::controllers::{Login, Register};

use super::cli_error;

/// Skips launching a browser for the hosted UI (CI, SSH sessions).
const NO_BROWSER_ENV: &str = "TODOS_NO_BROWSER";

pub async fn login(config: &Config, email: &str, password: &str) -> Result<()> {
    let provider = CognitoProvider::from_config(config)?;
    let pool = UserPool::from_config(config);

    let mut login = Login::new(&provider, &pool);
    login.set_email(email);
    login.set_password(password);
    login.submit().await.map_err(cli_error)?;

    println!("Signed in as {}", email.trim());
    Ok(())
}

pub async fn register(
    config: &Config,
    email: Option<String>,
    name: Option<String>,
    password: Option<String>,
) -> Result<()> {
    if email.is_none() && name.is_none() && password.is_none() {
        return open_hosted_ui(config);
    }

    let provider = CognitoProvider::from_config(config)?;
    let mut register = Register::new(&provider);
    register.set_email(email.unwrap_or_default());
    register.set_name(name.unwrap_or_default());
    register.set_password(password.unwrap_or_default());
    let outcome = register.submit().await.map_err(cli_error)?;

    println!("Account created.");
    if !outcome.confirmed {
        println!("Check your email for the confirmation code, then run `todos login`.");
    }
    Ok(())
}

fn open_hosted_ui(config: &Config) -> Result<()> {
    let Some(url) = config.hosted_ui() else {
        bail!(
            "hosted_ui_endpoint is not configured; pass --email, --name and --password to sign up directly"
        );
    };
    println!("Create your account at {url}");
    if std::env::var_os(NO_BROWSER_ENV).is_none()
        && let Err(e) = open::that(url)
    {
        tracing::warn!(error = %e, "could not open a browser");
    }
    Ok(())
}

pub fn logout(config: &Config) -> Result<()> {
    let pool = UserPool::from_config(config);
    if pool.sign_out()? {
        println!("Signed out.");
    } else {
        println!("Not signed in.");
    }
    Ok(())
}

pub fn whoami(config: &Config) -> Result<()> {
    let pool = UserPool::from_config(config);
    let creds = pool.credentials().map_err(cli_error)?;

    if creds.identity.is_empty() {
        println!("{} (identity could not be decoded)", creds.username);
        return Ok(());
    }
    println!("{}", creds.email());
    if !creds.identity.name.is_empty() {
        println!("name: {}", creds.identity.name);
    }
    Ok(())
}
