//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use todos_core::config::Config;
use todos_core::{interrupt, logging};

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "todos")]
#[command(version = "0.1")]
#[command(about = "Your TODO list, from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Also write logs to <TODOS_HOME>/logs (filter with TODOS_LOG)
    #[arg(long, global = true)]
    log_file: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Sign in with email and password
    Login {
        #[arg(short, long, default_value = "")]
        email: String,

        #[arg(short, long, env = "TODOS_PASSWORD", hide_env_values = true, default_value = "")]
        password: String,
    },
    /// Create an account (opens the hosted UI unless fields are given)
    Register {
        #[arg(short, long)]
        email: Option<String>,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long, env = "TODOS_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Sign out and forget the cached session
    Logout,
    /// Show who is signed in
    Whoami,

    /// List your todos
    List,
    /// Add a todo
    Add {
        /// Title of the new todo
        title: String,

        #[arg(long)]
        details: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
    /// Show a single todo
    Show {
        /// Sort key (TODO#<id>) or bare id
        #[arg(value_name = "SORT_KEY")]
        sort_key: String,
    },
    /// Mark a todo as done
    Done {
        #[arg(value_name = "SORT_KEY")]
        sort_key: String,

        /// Mark as not done instead
        #[arg(long)]
        undo: bool,
    },
    /// Delete a todo
    Rm {
        #[arg(value_name = "SORT_KEY")]
        sort_key: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Set a single config value, keeping comments
    Set {
        #[arg(value_name = "KEY")]
        key: String,
        #[arg(value_name = "VALUE")]
        value: String,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = logging::init(cli.log_file);
    interrupt::init()?;

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    // loaded per command so `config` subcommands work even when the file is broken
    let load = || Config::load().context("load config");

    let Some(command) = cli.command else {
        return commands::home::run(&load()?).await;
    };

    match command {
        Commands::Login { email, password } => {
            commands::auth::login(&load()?, &email, &password).await
        }
        Commands::Register {
            email,
            name,
            password,
        } => commands::auth::register(&load()?, email, name, password).await,
        Commands::Logout => commands::auth::logout(&load()?),
        Commands::Whoami => commands::auth::whoami(&load()?),

        Commands::List => commands::todos::list(&load()?).await,
        Commands::Add {
            title,
            details,
            date,
        } => commands::todos::add(&load()?, &title, details.as_deref(), date.as_deref()).await,
        Commands::Show { sort_key } => commands::todos::show(&load()?, &sort_key).await,
        Commands::Done { sort_key, undo } => {
            commands::todos::done(&load()?, &sort_key, !undo).await
        }
        Commands::Rm { sort_key } => commands::todos::remove(&load()?, &sort_key).await,

        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Set { key, value } => commands::config::set(&key, &value),
        },
    }
}
