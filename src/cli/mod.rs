pub mod context;
pub mod init;
pub mod login;
pub mod note;
pub mod notes;
pub mod output;
pub mod status;
pub mod util;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::{self, Config};

/// Stash code snippets as notes from the command line
#[derive(Parser)]
#[command(name = "codestash", version, about, long_about = None)]
pub struct Cli {
    /// Project root that holds the .codestash state directory
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Config file (default: ~/.config/codestash/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Logging verbosity for stderr (default: $RUST_LOG, else warn)
    #[arg(
        long,
        global = true,
        value_parser = ["off", "error", "warn", "info", "debug", "trace"]
    )]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Authenticate with CodeStash via device authorization
    Login(login::Args),

    /// Initialize a codestash context for the project root
    Init(init::Args),

    /// Manage codestash contexts
    Context(context::Args),

    /// Manage the active note scope
    Note(note::Args),

    /// Create, list and update notes
    Notes(notes::Args),

    /// Show current context and scope
    Status,
}

/// Invocation-wide settings shared by command handlers.
pub struct Env {
    pub root: PathBuf,
    pub config_path: Option<PathBuf>,
}

impl Env {
    pub fn config(&self) -> Result<Config> {
        config::load(self.config_path.as_deref())
    }
}

/// Install the stderr tracing subscriber.
pub fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}
