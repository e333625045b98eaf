use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CodestashError, Result};
use crate::util;

/// A credential issued by the device-authorization grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: BTreeSet<String>,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Write `credential` to `path`, replacing whatever was there.
pub fn save(path: &Path, credential: &Credential) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(CodestashError::InvalidArgument(
            "token path is empty".to_string(),
        ));
    }
    let data = serde_json::to_vec_pretty(credential)?;
    util::write_private(path, &data)?;
    tracing::debug!("credential written to {}", path.display());
    Ok(())
}

/// Read the credential at `path`. Returns `None` when no login has happened.
pub fn load(path: &Path) -> Result<Option<Credential>> {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&data)?))
}
