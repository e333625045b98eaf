use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CodestashError, Result};
use crate::util;

/// Directory under the project root that holds the state document.
pub const STATE_DIR: &str = ".codestash";

/// File name of the state document inside [`STATE_DIR`].
pub const STATE_FILE: &str = "state.json";

/// Context name used when none (or a blank one) is given.
pub const DEFAULT_CONTEXT: &str = "default";

/// A named binding to a remote collection and folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub name: String,
    pub collection: String,
    pub folder: String,
}

/// Whether commands operate on the whole folder or on a single note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Folder,
    Note,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Folder => write!(f, "folder"),
            Scope::Note => write!(f, "note"),
        }
    }
}

/// Link between a local file and the remote note it was pushed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMapping {
    pub note_id: String,
}

/// The note selected while in note scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveNote {
    pub id: String,
    pub title: Option<String>,
}

impl ActiveNote {
    /// `Title (id)` when a title is known, otherwise just the id.
    pub fn label(&self) -> String {
        match &self.title {
            Some(title) => format!("{} ({})", title, self.id),
            None => self.id.clone(),
        }
    }
}

/// The persisted state document at `<root>/.codestash/state.json`.
///
/// Loaded once per invocation, mutated in memory by command handlers, and
/// written back in full with [`State::save`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    #[serde(default)]
    pub contexts: BTreeMap<String, Context>,
    #[serde(default)]
    pub current_context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_scope: Option<Scope>,
    #[serde(default, rename = "current_note", skip_serializing_if = "Option::is_none")]
    pub current_note_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_note_title: Option<String>,
    #[serde(default)]
    pub files: BTreeMap<String, BTreeMap<String, FileMapping>>,
    #[serde(skip)]
    path: PathBuf,
}

/// Location of the state document for a project root.
pub fn state_path(root: &Path) -> PathBuf {
    root.join(STATE_DIR).join(STATE_FILE)
}

impl State {
    /// An empty document in folder scope, bound to `path`.
    pub fn new(path: PathBuf) -> Self {
        Self {
            contexts: BTreeMap::new(),
            current_context: String::new(),
            current_scope: Some(Scope::Folder),
            current_note_id: None,
            current_note_title: None,
            files: BTreeMap::new(),
            path,
        }
    }

    /// Read the state document under `root`.
    ///
    /// A missing file yields a fresh document. Malformed JSON is an error.
    pub fn load(root: &Path) -> Result<Self> {
        let path = state_path(root);
        let data = match std::fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no state file at {}, starting fresh", path.display());
                return Ok(Self::new(path));
            }
            Err(e) => return Err(e.into()),
        };

        let mut state: State = serde_json::from_str(&data)?;
        state.path = path;
        state.normalize();
        tracing::debug!(
            "loaded state from {} ({} contexts)",
            state.path.display(),
            state.contexts.len()
        );
        Ok(state)
    }

    /// Repair documents written by older versions or edited by hand.
    fn normalize(&mut self) {
        if self.current_scope.is_none() {
            self.current_scope = Some(Scope::Folder);
        }
        if self.scope() != Scope::Note {
            self.current_note_id = None;
            self.current_note_title = None;
        }
    }

    /// Overwrite the state document with the in-memory contents.
    pub fn save(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(CodestashError::InvalidArgument(
                "state path is not set".to_string(),
            ));
        }
        let data = serde_json::to_vec_pretty(self)?;
        util::write_private(&self.path, &data)?;
        tracing::debug!("saved state to {}", self.path.display());
        Ok(())
    }

    /// Path of the backing state document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create or overwrite a named context.
    ///
    /// The first context ever set becomes the current one.
    pub fn set_context(&mut self, name: &str, collection_id: &str, folder_id: &str) {
        let name = match name.trim() {
            "" => DEFAULT_CONTEXT,
            trimmed => trimmed,
        };
        self.contexts.insert(
            name.to_string(),
            Context {
                name: name.to_string(),
                collection: collection_id.to_string(),
                folder: folder_id.to_string(),
            },
        );
        if self.current_context.is_empty() {
            self.current_context = name.to_string();
        }
        if self.current_scope.is_none() {
            self.current_scope = Some(Scope::Folder);
        }
    }

    /// Make `name` the current context. Always leaves note scope.
    pub fn switch_context(&mut self, name: &str) -> Result<()> {
        if !self.contexts.contains_key(name) {
            return Err(CodestashError::NotFound(format!("context {:?}", name)));
        }
        self.current_context = name.to_string();
        self.enter_folder_scope();
        Ok(())
    }

    /// The current context.
    pub fn current(&self) -> Result<&Context> {
        self.contexts
            .get(&self.current_context)
            .ok_or(CodestashError::NoActiveContext)
    }

    pub fn enter_note_scope(&mut self, note_id: &str, title: &str) -> Result<()> {
        let note_id = note_id.trim();
        if note_id.is_empty() {
            return Err(CodestashError::InvalidArgument(
                "note id is required".to_string(),
            ));
        }
        let title = title.trim();
        self.current_scope = Some(Scope::Note);
        self.current_note_id = Some(note_id.to_string());
        self.current_note_title = (!title.is_empty()).then(|| title.to_string());
        Ok(())
    }

    pub fn enter_folder_scope(&mut self) {
        self.current_scope = Some(Scope::Folder);
        self.current_note_id = None;
        self.current_note_title = None;
    }

    pub fn scope(&self) -> Scope {
        self.current_scope.unwrap_or(Scope::Folder)
    }

    /// The note selected in note scope.
    pub fn current_note(&self) -> Result<ActiveNote> {
        if self.scope() != Scope::Note {
            return Err(CodestashError::NotInNoteScope);
        }
        let id = self
            .current_note_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(CodestashError::NoActiveNote)?;
        Ok(ActiveNote {
            id: id.to_string(),
            title: self.current_note_title.clone(),
        })
    }

    pub fn set_file_mapping(&mut self, ctx_name: &str, relative_path: &str, note_id: &str) {
        self.files.entry(ctx_name.to_string()).or_default().insert(
            util::to_slash(relative_path),
            FileMapping {
                note_id: note_id.to_string(),
            },
        );
    }

    pub fn get_file_mapping(&self, ctx_name: &str, relative_path: &str) -> Option<&FileMapping> {
        self.files
            .get(ctx_name)?
            .get(&util::to_slash(relative_path))
    }
}
