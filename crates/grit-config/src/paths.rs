//! Platform-specific paths for the setup file and user presets.
//!
//! - **User config**: `~/.config/grit/` (Linux), `~/Library/Application Support/grit/` (macOS), `%APPDATA%\grit\` (Windows)
//! - **User presets**: `<user config>/presets/`

use std::path::{Path, PathBuf};

/// Application name used for directory paths.
const APP_NAME: &str = "grit";

/// Subdirectory name for presets.
const PRESETS_SUBDIR: &str = "presets";

/// File name of the default setup file.
pub const CONFIG_FILE_NAME: &str = "grit.toml";

/// Returns the user-specific configuration directory.
///
/// Falls back to the current directory if the platform directory cannot be
/// determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the path of the default setup file.
pub fn default_config_path() -> PathBuf {
    user_config_dir().join(CONFIG_FILE_NAME)
}

/// Returns the user-specific presets directory.
pub fn user_presets_dir() -> PathBuf {
    user_config_dir().join(PRESETS_SUBDIR)
}

/// Ensure the user presets directory exists.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_user_presets_dir() -> Result<PathBuf, crate::ConfigError> {
    let dir = user_presets_dir();
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| crate::ConfigError::create_dir(&dir, e))?;
    }
    Ok(dir)
}

/// Find a preset file by path or by name in the user presets directory.
///
/// A name without an extension gets `.toml` appended.
pub fn find_preset(name: &str) -> Option<PathBuf> {
    find_preset_in(name, &user_presets_dir())
}

fn find_preset_in(name: &str, dir: &Path) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }

    let filename = if name.ends_with(".toml") {
        name.to_string()
    } else {
        format!("{name}.toml")
    };
    let candidate = dir.join(filename);
    candidate.is_file().then_some(candidate)
}

/// List the preset files in the user presets directory.
///
/// Returns an empty vector if the directory doesn't exist or can't be read.
pub fn list_user_presets() -> Vec<PathBuf> {
    list_presets_in_dir(&user_presets_dir())
}

fn list_presets_in_dir(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut presets: Vec<_> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    presets.sort();
    presets
}

/// Get the preset name from a file path.
///
/// ```rust
/// use grit_config::paths::preset_name_from_path;
/// use std::path::Path;
///
/// let name = preset_name_from_path(Path::new("/path/to/tape_hiss.toml"));
/// assert_eq!(name, Some("tape_hiss".to_string()));
/// ```
pub fn preset_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn dirs_mention_app_name() {
        assert!(user_config_dir().to_string_lossy().contains("grit"));
        assert!(default_config_path().ends_with(CONFIG_FILE_NAME));
        assert!(user_presets_dir().ends_with(PRESETS_SUBDIR));
    }

    #[test]
    fn find_by_path_and_by_name() {
        let temp_dir = TempDir::new().unwrap();
        let preset_path = temp_dir.path().join("hiss.toml");
        fs::write(&preset_path, "name = \"hiss\"").unwrap();

        assert_eq!(
            find_preset_in(preset_path.to_str().unwrap(), Path::new("/nonexistent")),
            Some(preset_path.clone())
        );
        assert_eq!(find_preset_in("hiss", temp_dir.path()), Some(preset_path));
        assert_eq!(find_preset_in("missing", temp_dir.path()), None);
    }

    #[test]
    fn lists_only_toml_files_sorted() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("b.toml"), "").unwrap();
        fs::write(temp_dir.path().join("a.toml"), "").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "").unwrap();

        let presets = list_presets_in_dir(temp_dir.path());
        let names: Vec<_> = presets
            .iter()
            .filter_map(|p| preset_name_from_path(p))
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn missing_dir_lists_nothing() {
        assert!(list_presets_in_dir(Path::new("/nonexistent/path/12345")).is_empty());
    }
}
