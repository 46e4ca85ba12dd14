//! Config file discovery and command-line overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use metatone_spec::MetatoneConfig;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "METATONE_CONFIG";

/// Config file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "metatone.json";

/// Values given on the command line that win over the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub soundfont: Option<PathBuf>,
    pub svc_repo: Option<PathBuf>,
    pub svc_model: Option<PathBuf>,
    pub svc_config: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Writes every override that is set into `config`.
    pub fn apply(&self, config: &mut MetatoneConfig) {
        if let Some(ref path) = self.soundfont {
            config.soundfont = Some(path.clone());
        }
        if let Some(ref path) = self.svc_repo {
            config.voice_conversion.repo_dir = Some(path.clone());
        }
        if let Some(ref path) = self.svc_model {
            config.voice_conversion.model_path = Some(path.clone());
        }
        if let Some(ref path) = self.svc_config {
            config.voice_conversion.config_path = Some(path.clone());
        }
    }
}

/// Picks the config file: `--config`, then `METATONE_CONFIG`, then
/// `metatone.json` in `cwd` if it exists.
pub fn resolve_config_path(
    explicit: Option<&Path>,
    env_value: Option<&str>,
    cwd: &Path,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(value) = env_value.filter(|v| !v.trim().is_empty()) {
        return Some(PathBuf::from(value));
    }
    let local = cwd.join(DEFAULT_CONFIG_FILE);
    local.is_file().then_some(local)
}

/// Loads the config, applying overrides.
///
/// Returns the config together with the file it came from, if any.
pub fn load_config(
    explicit: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<(MetatoneConfig, Option<PathBuf>)> {
    let env_value = std::env::var(CONFIG_ENV).ok();
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let path = resolve_config_path(explicit, env_value.as_deref(), &cwd);

    let mut config = match path {
        Some(ref path) => MetatoneConfig::load(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => MetatoneConfig::default(),
    };
    overrides.apply(&mut config);
    Ok((config, path))
}
