use anyhow::{bail, Result};
use clap::Args as ClapArgs;

use crate::cli::output;
use crate::state::{State, DEFAULT_CONTEXT};

/// Arguments for the `codestash init` subcommand.
#[derive(ClapArgs)]
pub struct Args {
    /// Folder ID to bind
    #[arg(long)]
    pub folder: String,

    /// Collection ID to bind
    #[arg(long)]
    pub collection: String,

    /// Context name
    #[arg(long, default_value = DEFAULT_CONTEXT)]
    pub context: String,
}

/// Bind a context to a collection and folder and make it current.
pub fn run(args: Args, state: &mut State) -> Result<()> {
    let folder = args.folder.trim();
    if folder.is_empty() {
        bail!("folder id is required (use --folder)");
    }
    let collection = args.collection.trim();
    if collection.is_empty() {
        bail!("collection id is required (use --collection)");
    }
    let name = match args.context.trim() {
        "" => DEFAULT_CONTEXT,
        name => name,
    };

    state.set_context(name, collection, folder);
    state.switch_context(name)?;
    state.save()?;

    output::success(&format!(
        "Initialized context {:?} with folder {}",
        name, folder
    ));
    Ok(())
}
