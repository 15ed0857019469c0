//! Configuration management for todos.
//!
//! Loads configuration from ${TODOS_HOME}/config.toml with sensible defaults,
//! then applies `TODOS_*` environment overrides.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Merges user config values into the default template.
///
/// New comments from the template are always present, while the user's
/// customized values are preserved.
fn merge_with_template(user_config: &str) -> Result<String> {
    use toml_edit::DocumentMut;

    let mut doc: DocumentMut = default_config_template()
        .parse()
        .context("Failed to parse default config template")?;

    let user_doc: DocumentMut = user_config.parse().context("Failed to parse user config")?;

    merge_items(doc.as_table_mut(), user_doc.as_table());

    Ok(doc.to_string())
}

/// Recursively merges items from source table into target table.
fn merge_items(target: &mut toml_edit::Table, source: &toml_edit::Table) {
    use toml_edit::Item;

    for (key, value) in source.iter() {
        match value {
            Item::Value(v) => {
                target[key] = Item::Value(v.clone());
            }
            Item::Table(src_table) => {
                if let Some(Item::Table(target_table)) = target.get_mut(key) {
                    merge_items(target_table, src_table);
                } else {
                    target[key] = Item::Table(src_table.clone());
                }
            }
            Item::ArrayOfTables(src_arr) => {
                target[key] = Item::ArrayOfTables(src_arr.clone());
            }
            Item::None => {}
        }
    }
}

pub mod paths {
    //! Path resolution for todos configuration and data.
    //!
    //! TODOS_HOME resolution order:
    //! 1. TODOS_HOME environment variable (if set)
    //! 2. ~/.config/todos (default)

    use std::path::PathBuf;

    /// Returns the todos home directory.
    pub fn todos_home() -> PathBuf {
        if let Ok(home) = std::env::var("TODOS_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".todos"),
            |h| h.join(".config").join("todos"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        todos_home().join("config.toml")
    }

    /// Returns the path to the session storage file.
    pub fn session_path() -> PathBuf {
        todos_home().join("session.json")
    }

    /// Returns the directory log files are written to.
    pub fn logs_dir() -> PathBuf {
        todos_home().join("logs")
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the TODO REST API
    pub backend_url: String,
    /// Cognito user pool id (`<region>_<id>`)
    pub user_pool_id: String,
    /// Cognito app client id
    pub client_id: String,
    /// Hosted UI page for sign-up
    pub hosted_ui_endpoint: String,
    /// Identity provider endpoint override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_endpoint: Option<String>,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Details sent when creating an item without explicit details
    pub default_details: String,
    /// Date sent when creating an item without an explicit date
    pub default_date: String,
}

impl Config {
    pub const DEFAULT_BACKEND_URL: &'static str = "http://localhost:8000";
    pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_DETAILS: &'static str = "Default details";
    pub const DEFAULT_DATE: &'static str = "2025-12-31";

    /// Keys accepted by [`Config::set_value`].
    pub const KEYS: &'static [&'static str] = &[
        "backend_url",
        "user_pool_id",
        "client_id",
        "hosted_ui_endpoint",
        "identity_endpoint",
        "request_timeout_secs",
        "default_details",
        "default_date",
    ];

    /// Loads configuration from the default path and applies environment
    /// overrides.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&paths::config_path())?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Applies `TODOS_*` overrides. Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("TODOS_BACKEND_URL") {
            self.backend_url = v;
        }
        if let Some(v) = get("TODOS_USER_POOL_ID") {
            self.user_pool_id = v;
        }
        if let Some(v) = get("TODOS_CLIENT_ID") {
            self.client_id = v;
        }
        if let Some(v) = get("TODOS_HOSTED_UI_ENDPOINT") {
            self.hosted_ui_endpoint = v;
        }
        if let Some(v) = get("TODOS_IDENTITY_ENDPOINT") {
            self.identity_endpoint = Some(v);
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// AWS region encoded in the user pool id (`us-east-1_AbC` -> `us-east-1`).
    pub fn region(&self) -> Option<&str> {
        self.user_pool_id
            .split_once('_')
            .map(|(region, _)| region)
            .filter(|region| !region.is_empty())
    }

    /// Resolves the identity provider endpoint.
    ///
    /// # Errors
    /// Returns an error if no override is set and the user pool id carries no
    /// region.
    pub fn identity_endpoint_url(&self) -> Result<String> {
        if let Some(endpoint) = self.identity_endpoint.as_deref() {
            return Ok(endpoint.to_string());
        }
        let region = self.region().with_context(|| {
            format!(
                "user_pool_id '{}' has no region prefix; set user_pool_id or identity_endpoint",
                self.user_pool_id
            )
        })?;
        Ok(format!("https://cognito-idp.{region}.amazonaws.com/"))
    }

    /// Returns the hosted UI endpoint if one is configured.
    pub fn hosted_ui(&self) -> Option<&str> {
        Some(self.hosted_ui_endpoint.trim()).filter(|s| !s.is_empty())
    }

    /// Creates a default config file at the given path.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Sets a single value in the config file, keeping comments intact.
    ///
    /// Creates the file from the template if it doesn't exist.
    ///
    /// # Errors
    /// Returns an error for unknown keys, invalid values, or I/O failures.
    pub fn set_value(path: &Path, key: &str, raw: &str) -> Result<()> {
        use toml_edit::{DocumentMut, value};

        if !Self::KEYS.contains(&key) {
            anyhow::bail!(
                "Unknown config key '{key}' (expected one of: {})",
                Self::KEYS.join(", ")
            );
        }

        let contents = if path.exists() {
            let user_config = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            merge_with_template(&user_config)?
        } else {
            default_config_template().to_string()
        };

        let mut doc: DocumentMut = contents.parse().context("Failed to parse config")?;
        if key == "request_timeout_secs" {
            let secs: i64 = raw
                .trim()
                .parse()
                .with_context(|| format!("'{raw}' is not a number of seconds"))?;
            doc[key] = value(secs);
        } else {
            doc[key] = value(raw);
        }

        let updated = doc.to_string();
        toml::from_str::<Config>(&updated)
            .with_context(|| format!("Invalid value for '{key}'"))?;

        Self::write_config(path, &updated)
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: Self::DEFAULT_BACKEND_URL.to_string(),
            user_pool_id: String::new(),
            client_id: String::new(),
            hosted_ui_endpoint: String::new(),
            identity_endpoint: None,
            request_timeout_secs: Self::DEFAULT_REQUEST_TIMEOUT_SECS,
            default_details: Self::DEFAULT_DETAILS.to_string(),
            default_date: Self::DEFAULT_DATE.to_string(),
        }
    }
}
