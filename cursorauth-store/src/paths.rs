//! Default file locations.

use std::path::PathBuf;

/// Returns the default configuration directory.
///
/// - macOS: `~/Library/Application Support/cursorauth`
/// - Linux: `~/.config/cursorauth`
/// - Windows: `%APPDATA%\cursorauth`
pub fn default_config_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        dirs::home_dir()
            .map(|h| h.join("Library").join("Application Support").join("cursorauth"))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    #[cfg(not(target_os = "macos"))]
    {
        dirs::config_dir()
            .map(|c| c.join("cursorauth"))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Returns the default configuration file path.
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.json")
}

/// Returns the default bearer token file: `~/.cursor_auth/token`.
pub fn default_token_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(home.join(".cursor_auth").join("token"))
}

/// Returns Cursor's configuration directory.
#[cfg(target_os = "macos")]
pub fn cursor_config_dir() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(home.join("Library/Application Support/Cursor"))
}

/// Returns Cursor's configuration directory.
#[cfg(target_os = "windows")]
pub fn cursor_config_dir() -> Option<PathBuf> {
    // Roaming AppData, i.e. %APPDATA%
    let app_data = dirs::config_dir()?;
    Some(app_data.join("Cursor"))
}

/// Returns Cursor's configuration directory.
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub fn cursor_config_dir() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(home.join(".config/Cursor"))
}

/// Returns the path of Cursor's `state.vscdb` SQLite database.
pub fn cursor_state_db_path() -> Option<PathBuf> {
    cursor_config_dir().map(|p| p.join("User/globalStorage/state.vscdb"))
}
