mod api;
mod auth;
mod cli;
mod config;
mod error;
mod state;
mod util;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Command, Env};
use state::State;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::init_logging(cli.log_level.as_deref());

    let root = cli::util::absolute(&cli.root)?;
    let mut state = State::load(&root)
        .with_context(|| format!("failed to load state under {}", root.display()))?;
    let env = Env {
        root,
        config_path: cli.config,
    };

    match cli.command {
        Command::Login(args) => cli::login::run(args, &env),
        Command::Init(args) => cli::init::run(args, &mut state),
        Command::Context(args) => cli::context::run(args, &mut state),
        Command::Note(args) => cli::note::run(args, &env, &mut state),
        Command::Notes(args) => cli::notes::run(args, &env, &mut state),
        Command::Status => cli::status::run(&env, &state),
    }
}
