use std::env;
use std::path::PathBuf;

/// Default file name for a save file.
pub const DEFAULT_SAVE_FILE: &str = "save.json";

/// Return the user's home directory path.
///
/// Uses HOME on Unix-like systems and USERPROFILE on Windows.
pub fn get_home_dir() -> Result<PathBuf, String> {
    if let Some(home) = non_empty_var("HOME") {
        return Ok(PathBuf::from(home));
    }

    if let Some(profile) = non_empty_var("USERPROFILE") {
        return Ok(PathBuf::from(profile));
    }

    Err("Home directory not set".to_string())
}

/// Return the directory where `app` keeps its save data.
///
/// `$XDG_DATA_HOME/<app>` when set, otherwise `<home>/.local/share/<app>`.
pub fn get_data_dir(app: &str) -> Result<PathBuf, String> {
    if let Some(data_home) = non_empty_var("XDG_DATA_HOME") {
        return Ok(PathBuf::from(data_home).join(app));
    }

    Ok(get_home_dir()?.join(".local").join("share").join(app))
}

/// Return the default save file path for `app`.
pub fn default_save_path(app: &str) -> Result<PathBuf, String> {
    Ok(get_data_dir(app)?.join(DEFAULT_SAVE_FILE))
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}
