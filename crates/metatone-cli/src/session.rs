//! Session persistence between command invocations.

use std::path::Path;

use anyhow::{Context, Result};
use metatone_spec::Session;

/// Loads a session file; a missing file is an empty session.
pub fn load_session(path: &Path) -> Result<Session> {
    if !path.exists() {
        return Ok(Session::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read session file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse session file: {}", path.display()))
}

/// Writes a session file as pretty JSON.
pub fn save_session(path: &Path, session: &Session) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(session).context("Failed to serialize session")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write session file: {}", path.display()))
}
