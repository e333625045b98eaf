//! Shared filesystem helpers.
//!
//! The token store and the state document both hold data that should only be
//! readable by the owning user, so they share the same write path.

use std::io::Write;
use std::path::Path;

/// Create `dir` and any missing parents, restricted to the owner on Unix.
pub fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        std::fs::DirBuilder::new()
            .recursive(true)
            .mode(0o700)
            .create(dir)
    }
    #[cfg(not(unix))]
    {
        std::fs::create_dir_all(dir)
    }
}

/// Overwrite `path` with `contents` and restrict it to owner read/write.
///
/// Parent directories are created with [`create_private_dir`] first.
pub fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_private_dir(parent)?;
    }

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;

    // The mode above only applies to new files; tighten existing ones before
    // any bytes land.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(contents)?;
    file.sync_all()
}

/// Normalize a relative path to forward-slash form.
pub fn to_slash(path: &str) -> String {
    path.replace('\\', "/")
}
