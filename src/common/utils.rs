//! Small shared helpers.

use std::path::Path;

/// Display a path with the home directory replaced by `~`.
///
/// Keeps user names out of logs that people paste into bug reports.
pub fn private_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(relative) = path.strip_prefix(&home)
    {
        return format!("~/{}", relative.display());
    }
    path.display().to_string()
}
