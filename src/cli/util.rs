//! Shared CLI utility functions.
//!
//! Extracts helpers that are used by multiple subcommands to avoid duplication.

use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::api::ApiClient;
use crate::auth::{token_store, Credential};
use crate::config::Config;
use crate::state::{Scope, State};

/// Build the single-threaded runtime used for one command's network calls.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")
}

pub fn client(cfg: &Config) -> Result<ApiClient> {
    Ok(ApiClient::new(
        &cfg.api_base_url,
        &cfg.client_id,
        &cfg.client_secret,
    )?)
}

/// Load the stored credential or fail with a hint to log in.
pub fn require_credential(cfg: &Config) -> Result<Credential> {
    let credential = token_store::load(&cfg.token_path)
        .with_context(|| format!("failed to read token file {}", cfg.token_path.display()))?;
    match credential {
        Some(c) => Ok(c),
        None => bail!("not logged in; run `codestash login` first"),
    }
}

pub fn require_folder_scope(state: &State) -> Result<()> {
    if state.scope() != Scope::Folder {
        bail!(
            "this command is only available in folder scope; run `codestash note exit` to leave the current note"
        );
    }
    Ok(())
}

/// Absolute, lexically cleaned form of `path`, resolved against the working
/// directory. Symlinks are not followed.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(clean(path));
    }
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    Ok(clean(&cwd.join(path)))
}

/// Drop `.` components and fold `..` into its parent.
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root.
                if !out.pop() && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Path of `abs_path` relative to `root`, forward-slash separated.
///
/// Files outside the root get a `../` path. Only when no relative path
/// exists at all (another drive on Windows) is the absolute path kept.
pub fn relative_to_root(root: &Path, abs_path: &Path) -> String {
    let root = clean(root);
    let target = clean(abs_path);
    let rel = pathdiff::diff_paths(&target, &root).unwrap_or(target);
    let rel = if rel.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        rel
    };
    crate::util::to_slash(&rel.to_string_lossy())
}

/// Read a text file given on the command line.
pub fn read_text(path: &Path, what: &str) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {} {}", what, path.display()))
}

/// Reject a flag that was supplied with only whitespace.
pub fn non_blank(value: &str, flag: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("{} cannot be empty", flag);
    }
    Ok(trimmed.to_string())
}
