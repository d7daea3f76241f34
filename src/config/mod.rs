//! Persistent preferences for the purchase wizard.

use serde::{Deserialize, Serialize};
use std::{
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use thiserror::Error;

const DEFAULT_DIR_NAME: &str = ".book_purchase";
const CONFIG_FILE: &str = "config.json";
const DATABASE_FILE: &str = "bookstore.sqlite";
const ERROR_LOG_FILE: &str = "stderr.txt";
const TMP_SUFFIX: &str = "tmp";

/// Environment variable overriding the application data directory.
pub const HOME_ENV: &str = "BOOK_PURCHASE_HOME";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
}

/// User-configurable preferences.
///
/// Preferences left as `None` are asked interactively when the wizard starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_log_path: Option<PathBuf>,
    /// Echo each validated entry and ask for confirmation.
    #[serde(default)]
    pub confirm_input: Option<bool>,
    /// Commit pending changes when the input stream ends mid-prompt.
    #[serde(default)]
    pub commit_on_end_of_input: Option<bool>,
    #[serde(default = "Config::default_color_output")]
    pub color_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            error_log_path: None,
            confirm_input: None,
            commit_on_end_of_input: None,
            color_output: Self::default_color_output(),
        }
    }
}

impl Config {
    pub fn default_color_output() -> bool {
        true
    }

    pub fn resolve_database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| app_data_dir().join(DATABASE_FILE))
    }

    pub fn resolve_error_log_path(&self) -> PathBuf {
        self.error_log_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(ERROR_LOG_FILE))
    }
}

/// Returns the application data directory, defaulting to `~/.book_purchase`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Loads and saves [`Config`] as JSON.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn with_base_dir(base: &Path) -> Self {
        Self::new(base.join(CONFIG_FILE))
    }

    pub fn default_location() -> Self {
        Self::with_base_dir(&app_data_dir())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
