use crate::models::UserConfig;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// File name of the user configuration inside the configuration directory
pub const USER_CONFIG_FILE: &str = "wtfcopy.yaml";

/// Prefix of environment variables that override the configuration file
pub const ENV_PREFIX: &str = "WTFCOPY";

/// Configuration manager for loading and saving `wtfcopy.yaml`.
///
/// Values are layered: built-in defaults, then the YAML file when present, then
/// `WTFCOPY_*` environment variables.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    user_config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager, creating `config_dir` if needed.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            user_config_path: config_dir.join(USER_CONFIG_FILE),
            config_dir,
        })
    }

    /// The platform configuration directory (`~/.config/wtfcopy`, `%APPDATA%\wtfcopy`, ...),
    /// or `wtfcopy-data` in the working directory when there is none.
    pub fn default_dir() -> Utf8PathBuf {
        dirs::config_dir()
            .and_then(|dir| Utf8PathBuf::from_path_buf(dir).ok())
            .map(|dir| dir.join("wtfcopy"))
            .unwrap_or_else(|| Utf8PathBuf::from("wtfcopy-data"))
    }

    /// Load the user configuration.
    ///
    /// # Returns
    /// The merged UserConfig. A missing file gives the defaults.
    pub fn load_user_config(&self) -> Result<UserConfig> {
        if !self.user_config_path.exists() {
            tracing::warn!(
                "User config file not found at {}, using defaults",
                self.user_config_path
            );
        }

        let settings = config::Config::builder()
            .add_source(
                config::File::from(self.user_config_path.as_std_path())
                    .format(config::FileFormat::Yaml)
                    .required(false),
            )
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .with_context(|| format!("Failed to read user config: {}", self.user_config_path))?;

        let config: UserConfig = settings
            .try_deserialize()
            .with_context(|| format!("Failed to parse user config: {}", self.user_config_path))?;

        tracing::info!("Loaded user config from {}", self.user_config_path);
        Ok(config)
    }

    /// Save the user configuration file.
    pub fn save_user_config(&self, config: &UserConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize user config to YAML")?;

        fs::write(&self.user_config_path, yaml_string)
            .with_context(|| format!("Failed to write user config: {}", self.user_config_path))?;

        tracing::info!("Saved user config to {}", self.user_config_path);
        Ok(())
    }

    /// Record `install_directory` as the last confirmed root, if the user wants it remembered.
    pub fn remember_install_directory(&self, install_directory: &Utf8Path) -> Result<()> {
        let mut config = self.load_user_config()?;
        if !config.remember_install_directory
            || config.install_directory.as_deref() == Some(install_directory)
        {
            return Ok(());
        }

        config.install_directory = Some(install_directory.to_path_buf());
        self.save_user_config(&config)
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    /// Get the user configuration file path.
    pub fn user_config_path(&self) -> &Utf8Path {
        &self.user_config_path
    }
}
