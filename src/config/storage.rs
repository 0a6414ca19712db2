use crate::config::schema::RunConfig;
use crate::error::{Result, SignupError};
use std::fs;
use std::path::{Path, PathBuf};

/// Run configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "signup.toml";

pub fn get_config_path() -> PathBuf {
    PathBuf::from(CONFIG_FILE_NAME)
}

/// Load `signup.toml` from the working directory, falling back to defaults.
pub fn load_config() -> Result<RunConfig> {
    load_config_from(&get_config_path())
}

/// Load configuration from `path`. A missing file yields the built-in
/// defaults; the file is never created.
pub fn load_config_from(path: &Path) -> Result<RunConfig> {
    if !path.exists() {
        tracing::info!("Config file not found at {:?}, using defaults", path);
        return Ok(RunConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|e| {
        SignupError::Config(format!("Failed to read config from {:?}: {}", path, e))
    })?;

    let config: RunConfig = toml::from_str(&content)?;

    tracing::info!("Loaded config from {:?}", path);
    Ok(config)
}
