use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use toastline_bridge::config::SchedulerConfig;
use tokio::{
    fs::{OpenOptions, create_dir_all, read_to_string},
    io::AsyncWriteExt,
};

/// Errors that can occur while loading or resolving scheduler configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to determine the user's configuration directory. This usually
    /// occurs when required environment variables are missing (e.g., `$HOME`
    /// on Unix or `%APPDATA%` on Windows).
    #[error("failed to obtain user's directories")]
    DirectoriesNotFound,
    /// An I/O error occurred while reading or writing the configuration file.
    #[error("failed to read config: {0}")]
    IoError(#[from] std::io::Error),
    /// The configuration file contains invalid TOML or does not match the expected structure.
    #[error("failed to deserialize config: {0}")]
    DeserializeError(#[from] toml::de::Error),
    /// Failed to serialize the configuration to TOML (e.g., when saving changes).
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
    /// The file parsed, but a value is out of range.
    #[error("invalid config value for `{field}`: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: &'static str,
    },
}

fn config_path() -> Result<PathBuf, ConfigError> {
    match ProjectDirs::from("dev", "toastline", "toastline") {
        Some(dirs) => Ok(dirs.config_dir().join("config.toml")),
        None => Err(ConfigError::DirectoriesNotFound),
    }
}

/// Checks values serde cannot reject on its own.
pub fn validate(config: &SchedulerConfig) -> Result<(), ConfigError> {
    if config.presenter_buffer == 0 {
        return Err(ConfigError::InvalidValue {
            field: "presenter_buffer",
            reason: "must be at least 1",
        });
    }
    if config.default_visible_duration().is_none() {
        return Err(ConfigError::InvalidValue {
            field: "default_visible_seconds",
            reason: "must be a finite, non-negative number of seconds",
        });
    }
    Ok(())
}

/// Loads the scheduler configuration from the user's configuration directory,
/// writing the defaults there on first run.
pub async fn load_config() -> Result<SchedulerConfig, ConfigError> {
    load_config_from(&config_path()?).await
}

/// Loads the configuration like [`load_config`], logging the error and
/// returning the defaults when it cannot be read.
pub async fn load_config_or_default() -> SchedulerConfig {
    match load_config().await {
        Ok(config) => config,
        Err(error) => {
            log::error!("Failed to load scheduler config, using defaults: {error}");
            SchedulerConfig::default()
        }
    }
}

/// Loads the scheduler configuration from `config_path`. If the file does not
/// exist yet, the defaults are written to it and returned.
pub async fn load_config_from(config_path: &Path) -> Result<SchedulerConfig, ConfigError> {
    log::info!("Loading configuration from {config_path:?}");
    if config_path.exists() {
        let contents = read_to_string(config_path).await?;
        let config: SchedulerConfig = toml::from_str(&contents)?;
        validate(&config)?;
        return Ok(config);
    }

    let config = SchedulerConfig::default();
    if let Some(parent) = config_path.parent() {
        create_dir_all(parent).await?;
    }

    let contents = toml::to_string_pretty(&config)?;
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(config_path)
        .await?;
    file.write_all(contents.as_bytes()).await?;
    file.sync_all().await?;

    Ok(config)
}

/// Saves the configuration to the user's configuration directory,
/// overwriting any existing file.
pub async fn save_config(config: &SchedulerConfig) -> Result<(), ConfigError> {
    save_config_to(config, &config_path()?).await
}

/// Serializes `config` to pretty-printed TOML at `config_path`.
pub async fn save_config_to(config: &SchedulerConfig, config_path: &Path) -> Result<(), ConfigError> {
    validate(config)?;
    if let Some(parent) = config_path.parent() {
        create_dir_all(parent).await?;
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(config_path)
        .await?;

    let contents = toml::to_string_pretty(config)?;
    file.write_all(contents.as_bytes()).await?;
    file.sync_all().await?;

    Ok(())
}
