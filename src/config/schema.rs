use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8085";
pub const DEFAULT_CLIENT_ID: &str = "7d8b1e7d-8c8d-4c7e-9f4a-2f0afc1a0f01";
pub const DEFAULT_CLIENT_SECRET: &str = "cli-device-secret";

/// Contents of `config.toml`. Every key is optional; unset keys fall back to
/// environment variables and then built-in defaults.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub api_base_url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub token_path: Option<String>,
}
