use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::SecondsFormat;
use clap::{Args as ClapArgs, Subcommand};

use crate::api::{self, CreateNoteRequest, NoteSummary, UpdateNoteRequest};
use crate::cli::{output, util, Env};
use crate::state::State;

#[derive(ClapArgs)]
pub struct Args {
    #[command(subcommand)]
    pub command: NotesCommand,
}

#[derive(Subcommand)]
pub enum NotesCommand {
    /// Create a new note in the current context
    Create(CreateArgs),

    /// List notes in the current context
    List,

    /// Update the active note from a local file
    Update(UpdateArgs),
}

#[derive(ClapArgs)]
pub struct CreateArgs {
    /// Path to code file
    #[arg(long)]
    pub file: PathBuf,

    /// Note title
    #[arg(long)]
    pub title: String,

    /// Code language
    #[arg(long, default_value = "")]
    pub language: String,

    /// Comma-separated tags
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Path to note/description file
    #[arg(long)]
    pub note: Option<PathBuf>,
}

#[derive(ClapArgs)]
pub struct UpdateArgs {
    /// Path to code file
    #[arg(long)]
    pub file: PathBuf,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// Code language
    #[arg(long)]
    pub language: Option<String>,

    /// Comma-separated tags
    #[arg(long, value_delimiter = ',')]
    pub tags: Option<Vec<String>>,

    /// Path to note/description file
    #[arg(long)]
    pub note: Option<PathBuf>,
}

pub fn run(args: Args, env: &Env, state: &mut State) -> Result<()> {
    match args.command {
        NotesCommand::Create(args) => create(args, env, state),
        NotesCommand::List => list(env, state),
        NotesCommand::Update(args) => update(args, env, state),
    }
}

// -------------------------------------------------------------------
// notes create
// -------------------------------------------------------------------

fn create(args: CreateArgs, env: &Env, state: &mut State) -> Result<()> {
    util::require_folder_scope(state)?;
    if args.file.as_os_str().is_empty() {
        bail!("--file is required");
    }
    let title = util::non_blank(&args.title, "--title")?;
    let ctx = state.current()?.clone();

    let abs_file = util::absolute(&args.file)?;
    let code = util::read_text(&abs_file, "file")?;
    let note = match &args.note {
        Some(path) => util::read_text(&util::absolute(path)?, "note body")?,
        None => String::new(),
    };

    let rel_path = util::relative_to_root(&env.root, &abs_file);
    if let Some(existing) = state.get_file_mapping(&ctx.name, &rel_path) {
        output::warning(&format!(
            "{} is already linked to note {}; creating another note",
            rel_path, existing.note_id
        ));
    }

    let cfg = env.config()?;
    let credential = util::require_credential(&cfg)?;
    let client = util::client(&cfg)?;

    let payload = CreateNoteRequest {
        collection_id: ctx.collection.clone(),
        folder_id: ctx.folder.clone(),
        title: title.clone(),
        language: args.language.trim().to_string(),
        tags: clean_tags(args.tags),
        code,
        note,
    };
    let created = util::runtime()?
        .block_on(client.create_note(&credential.access_token, &payload))?;

    let Some(note_id) = created else {
        output::warning(
            "Note created, but the server did not return an ID. Skipping local mapping.",
        );
        return Ok(());
    };

    state.set_file_mapping(&ctx.name, &rel_path, &note_id);
    state.save()?;
    output::success(&format!("Created note {:?} (ID: {})", title, note_id));
    Ok(())
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

// -------------------------------------------------------------------
// notes list
// -------------------------------------------------------------------

fn list(env: &Env, state: &State) -> Result<()> {
    let ctx = state.current()?;

    let cfg = env.config()?;
    let credential = util::require_credential(&cfg)?;
    let client = util::client(&cfg)?;

    let notes = util::runtime()?
        .block_on(client.list_notes(&credential.access_token, &ctx.collection))?;
    let notes = api::filter_by_folder(notes, &ctx.folder);

    if notes.is_empty() {
        output::info("No notes found for this folder.");
        return Ok(());
    }
    for line in render_table(&notes) {
        println!("{}", line);
    }
    Ok(())
}

fn render_table(notes: &[NoteSummary]) -> Vec<String> {
    let mut lines = Vec::with_capacity(notes.len() + 2);
    lines.push(format!("{:<36}  {:<30}  {:<20}", "ID", "Title", "Updated"));
    lines.push("-".repeat(90));
    for note in notes {
        let updated = note
            .updated_at
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_else(|| "-".to_string());
        lines.push(format!(
            "{:<36}  {:<30}  {:<20}",
            note.id,
            output::truncate(&note.title, 30),
            updated
        ));
    }
    lines
}

// -------------------------------------------------------------------
// notes update
// -------------------------------------------------------------------

fn update(args: UpdateArgs, env: &Env, state: &mut State) -> Result<()> {
    let active = state.current_note()?;
    if args.file.as_os_str().is_empty() {
        bail!("--file is required");
    }

    let abs_file = util::absolute(&args.file)?;
    let code = util::read_text(&abs_file, "file")?;
    let note = match &args.note {
        Some(path) => Some(util::read_text(&util::absolute(path)?, "note body")?),
        None => None,
    };
    let patch = build_patch(code, &args, note)?;

    let cfg = env.config()?;
    let credential = util::require_credential(&cfg)?;
    let client = util::client(&cfg)?;

    util::runtime()?
        .block_on(client.update_note(&credential.access_token, &active.id, &patch))?;

    let ctx_name = state.current().ok().map(|ctx| ctx.name.clone());
    if let Some(ctx_name) = ctx_name {
        let rel_path = util::relative_to_root(&env.root, &abs_file);
        state.set_file_mapping(&ctx_name, &rel_path, &active.id);
        state.save()?;
    }

    output::success(&format!("Updated note {}", active.label()));
    Ok(())
}

/// Code is always sent; other fields only when given on the command line.
fn build_patch(
    code: String,
    args: &UpdateArgs,
    note: Option<String>,
) -> Result<UpdateNoteRequest> {
    let title = args
        .title
        .as_deref()
        .map(|t| util::non_blank(t, "--title"))
        .transpose()?;
    let language = args
        .language
        .as_deref()
        .map(|l| util::non_blank(l, "--language"))
        .transpose()?;

    Ok(UpdateNoteRequest {
        code: Some(code),
        title,
        language,
        tags: args.tags.clone().map(clean_tags),
        note,
    })
}
