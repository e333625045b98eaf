use anyhow::Result;
use clap::{Args as ClapArgs, Subcommand};

use crate::cli::{output, util};
use crate::state::State;

#[derive(ClapArgs)]
pub struct Args {
    #[command(subcommand)]
    pub command: ContextCommand,
}

#[derive(Subcommand)]
pub enum ContextCommand {
    /// List available contexts
    List,

    /// Switch the active context
    Switch {
        /// Context name
        name: String,
    },
}

pub fn run(args: Args, state: &mut State) -> Result<()> {
    match args.command {
        ContextCommand::List => {
            list(state);
            Ok(())
        }
        ContextCommand::Switch { name } => switch(state, &name),
    }
}

fn list(state: &State) {
    if state.contexts.is_empty() {
        output::info(
            "No contexts defined. Run `codestash init --folder <id> --collection <id>` to create one.",
        );
        return;
    }
    for (name, ctx) in &state.contexts {
        let marker = if *name == state.current_context { "*" } else { " " };
        println!(
            "{} {} (collection: {}, folder: {})",
            marker, name, ctx.collection, ctx.folder
        );
    }
}

fn switch(state: &mut State, name: &str) -> Result<()> {
    util::require_folder_scope(state)?;
    state.switch_context(name)?;
    state.save()?;
    output::success(&format!("Switched to context {:?}", name));
    Ok(())
}
