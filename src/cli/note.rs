use anyhow::{bail, Result};
use clap::{Args as ClapArgs, Subcommand};

use crate::api::{self, NoteSummary};
use crate::cli::{output, util, Env};
use crate::error::CodestashError;
use crate::state::{Scope, State};

#[derive(ClapArgs)]
pub struct Args {
    #[command(subcommand)]
    pub command: NoteCommand,
}

#[derive(Subcommand)]
pub enum NoteCommand {
    /// Enter note scope for the given note
    Switch {
        /// Note ID
        id: String,
    },

    /// Return to folder scope
    Exit,
}

pub fn run(args: Args, env: &Env, state: &mut State) -> Result<()> {
    match args.command {
        NoteCommand::Switch { id } => switch(env, state, &id),
        NoteCommand::Exit => exit(state),
    }
}

fn switch(env: &Env, state: &mut State, id: &str) -> Result<()> {
    let id = id.trim();
    if id.is_empty() {
        bail!("note id is required");
    }
    let ctx = state.current()?.clone();

    let cfg = env.config()?;
    let credential = util::require_credential(&cfg)?;
    let client = util::client(&cfg)?;

    let notes = util::runtime()?
        .block_on(client.list_notes(&credential.access_token, &ctx.collection))?;
    let selected = find_in_folder(notes, &ctx.folder, id)?;

    state.enter_note_scope(&selected.id, &selected.title)?;
    state.save()?;

    output::success(&format!(
        "Switched to note {} ({})",
        selected.title, selected.id
    ));
    Ok(())
}

/// Pick note `id` out of a collection listing, limited to `folder_id`.
fn find_in_folder(
    notes: Vec<NoteSummary>,
    folder_id: &str,
    id: &str,
) -> Result<NoteSummary, CodestashError> {
    api::filter_by_folder(notes, folder_id)
        .into_iter()
        .find(|n| n.id == id)
        .ok_or_else(|| CodestashError::NotFound(format!("note {} in current folder", id)))
}

fn exit(state: &mut State) -> Result<()> {
    if state.scope() != Scope::Note {
        output::info("Already in folder scope.");
        return Ok(());
    }
    state.enter_folder_scope();
    state.save()?;
    output::success("Exited note scope.");
    Ok(())
}
