//! Storage initialization
//!
//! Handles first-run setup: directories, empty data files and default
//! settings.

use serde_json::json;

use crate::config::paths::PayupPaths;
use crate::config::settings::Settings;
use crate::error::PayupError;

use super::file_io::write_json_atomic;

/// Initialize storage for a fresh installation
///
/// Existing files are left untouched, so running this twice is harmless.
/// Returns true when a new settings file was written.
pub fn initialize_storage(paths: &PayupPaths) -> Result<bool, PayupError> {
    paths.ensure_directories()?;

    let empty_files = [
        (paths.members_file(), json!({ "members": [] })),
        (paths.groups_file(), json!({ "groups": [] })),
        (paths.expenses_file(), json!({ "expenses": [] })),
    ];

    for (path, contents) in empty_files.iter() {
        if !path.exists() {
            write_json_atomic(path, contents)?;
        }
    }

    if paths.settings_file().exists() {
        return Ok(false);
    }

    Settings::default().save(paths)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_creates_files_once() {
        let temp_dir = TempDir::new().unwrap();
        let paths = PayupPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert!(initialize_storage(&paths).unwrap());
        assert!(paths.members_file().exists());
        assert!(paths.groups_file().exists());
        assert!(paths.expenses_file().exists());
        assert!(paths.is_initialized());

        assert!(!initialize_storage(&paths).unwrap());
    }
}
