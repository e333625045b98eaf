pub mod schema;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use schema::FileConfig;
use schema::{DEFAULT_API_BASE_URL, DEFAULT_CLIENT_ID, DEFAULT_CLIENT_SECRET};

pub const ENV_API_BASE_URL: &str = "CODESTASH_API_BASE_URL";
pub const ENV_CLIENT_ID: &str = "CODESTASH_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "CODESTASH_CLIENT_SECRET";
pub const ENV_TOKEN_PATH: &str = "CODESTASH_TOKEN_PATH";

/// Resolved settings used by commands that talk to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_base_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub token_path: PathBuf,
}

/// Load settings: built-in defaults, overlaid by the config file, overlaid
/// by `CODESTASH_*` environment variables.
///
/// An explicit `path` must exist. The default location is optional.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let file = match path {
        Some(p) => read_file(p)?,
        None => match default_config_path() {
            Some(p) if p.exists() => read_file(&p)?,
            _ => FileConfig::default(),
        },
    };
    resolve(file, |key| std::env::var(key).ok())
}

fn read_file(path: &Path) -> Result<FileConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let file: FileConfig = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    tracing::debug!("using config file {}", path.display());
    Ok(file)
}

/// Merge file values with environment lookups and defaults.
pub fn resolve<F>(file: FileConfig, env: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let pick = |key: &str, from_file: Option<String>| {
        env(key)
            .filter(|v| !v.trim().is_empty())
            .or(from_file.filter(|v| !v.trim().is_empty()))
    };

    let token_path = match pick(ENV_TOKEN_PATH, file.token_path) {
        Some(p) => PathBuf::from(p),
        None => default_token_path()?,
    };

    Ok(Config {
        api_base_url: pick(ENV_API_BASE_URL, file.api_base_url)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        client_id: pick(ENV_CLIENT_ID, file.client_id)
            .unwrap_or_else(|| DEFAULT_CLIENT_ID.to_string()),
        client_secret: pick(ENV_CLIENT_SECRET, file.client_secret)
            .unwrap_or_else(|| DEFAULT_CLIENT_SECRET.to_string()),
        token_path,
    })
}

/// `~/.config/codestash/config.toml` (platform-appropriate).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("codestash").join("config.toml"))
}

/// `~/.config/codestash/token.json`.
pub fn default_token_path() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|h| h.join(".config").join("codestash").join("token.json"))
        .ok_or_else(|| anyhow::anyhow!("could not determine home directory — is $HOME set?"))
}
