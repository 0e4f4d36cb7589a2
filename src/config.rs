//! Configuration file handling for subtrack.
//!
//! The configuration file is stored at `$SUBTRACK_HOME/config.json` and contains the API base URL,
//! the request timeout and backup settings. The environment variable `SUBTRACK_BACKEND_URL`
//! overrides the configured API base URL; setting it to an empty value forces local-only mode.

use crate::backup::Backup;
use crate::error::{ErrorType, IntoResult, Res};
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_NAME: &str = "subtrack";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const REQUEST_TIMEOUT_SECS: u64 = 30;
const BACKUPS: &str = ".backups";
const STORE: &str = "store";
const CONFIG_JSON: &str = "config.json";

/// Overrides `api_base_url` from the config file when set.
pub const BACKEND_URL_ENV: &str = "SUBTRACK_BACKEND_URL";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$SUBTRACK_HOME` and from there it loads `$SUBTRACK_HOME/config.json`. It provides
/// paths to the on-device store and the backups directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    store: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    backend_url_override: Option<String>,
}

impl Config {
    /// Creates the home directory, its subdirectories and an initial `config.json`.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the home directory, e.g. `$HOME/subtrack`
    /// - `api_base_url` - The base URL of the API, e.g. `https://subtrack.example.com`. `None` or an
    ///   empty string configures local-only mode.
    ///
    /// # Errors
    /// - Returns an error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>, api_base_url: Option<&str>) -> Result<Self> {
        Self::create_inner(dir.into(), api_base_url)
            .await
            .pub_result(ErrorType::Config)
    }

    async fn create_inner(maybe_relative: PathBuf, api_base_url: Option<&str>) -> Res<Self> {
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the subtrack home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let backups = root.join(BACKUPS);
        utils::make_dir(&backups).await?;
        let store = root.join(STORE);
        utils::make_dir(&store).await?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile {
            api_base_url: api_base_url
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            backups,
            store,
            config_path,
            config_file,
            backend_url_override: None,
        })
    }

    /// This will
    /// - validate that `subtrack_home` exists and that the config file exists
    /// - load the config file
    /// - validate that the backups and store directories exist
    /// - apply the `SUBTRACK_BACKEND_URL` override, if set
    pub async fn load(subtrack_home: impl Into<PathBuf>) -> Result<Self> {
        Self::load_inner(subtrack_home.into())
            .await
            .pub_result(ErrorType::Config)
    }

    async fn load_inner(maybe_relative: PathBuf) -> Res<Self> {
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The subtrack home directory is missing, run 'subtrack init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let config = Self {
            root: root.clone(),
            backups: root.join(BACKUPS),
            store: root.join(STORE),
            config_path,
            config_file,
            backend_url_override: std::env::var(BACKEND_URL_ENV).ok(),
        };
        if !config.backups.is_dir() {
            bail!(
                "The backups directory is missing '{}'",
                config.backups.display()
            )
        }
        if !config.store.is_dir() {
            bail!(
                "The store directory is missing '{}'",
                config.store.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    /// The directory of the on-device store.
    pub fn store(&self) -> &Path {
        &self.store
    }

    /// The effective API base URL. `None` means local-only mode.
    pub fn api_base_url(&self) -> Option<String> {
        let url = match &self.backend_url_override {
            Some(url) => Some(url.as_str()),
            None => self.config_file.api_base_url.as_deref(),
        };
        url.map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    }

    /// Replaces the API base URL for this process only, as the environment override does.
    pub fn override_api_base_url(&mut self, url: Option<&str>) {
        self.backend_url_override = Some(url.unwrap_or_default().to_string());
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config_file.request_timeout_secs)
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(self)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "subtrack",
///   "config_version": 1,
///   "api_base_url": "https://subtrack.example.com",
///   "request_timeout_secs": 30,
///   "backup_copies": 5
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "subtrack"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Base URL of the API. Absent or empty means local-only mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_base_url: Option<String>,

    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,

    /// Number of backup copies to keep per backup file name
    #[serde(default = "default_backup_copies")]
    backup_copies: u32,
}

fn default_request_timeout_secs() -> u64 {
    REQUEST_TIMEOUT_SECS
}

fn default_backup_copies() -> u32 {
    BACKUP_COPIES
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            api_base_url: None,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            backup_copies: BACKUP_COPIES,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from `path` and checks its `app_name`.
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;
        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path, data)
            .await
            .context("Unable to write config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("subtrack_home");
        let config = Config::create(&home_dir, Some("https://api.example.com/"))
            .await
            .unwrap();
        assert!(config.backups().is_dir());
        assert!(config.store().is_dir());
        assert!(config.config_path().is_file());
        assert_eq!(
            config.api_base_url().as_deref(),
            Some("https://api.example.com/")
        );
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.backup_copies(), 5);
    }

    #[tokio::test]
    async fn test_config_create_local_only() {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path(), Some("  ")).await.unwrap();
        assert_eq!(config.api_base_url(), None);
        let json = utils::read(config.config_path()).await.unwrap();
        assert!(!json.contains("api_base_url"));
    }

    #[tokio::test]
    async fn test_override() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::create(dir.path(), Some("https://api.example.com"))
            .await
            .unwrap();
        config.override_api_base_url(None);
        assert_eq!(config.api_base_url(), None);
        config.override_api_base_url(Some("http://localhost:8001"));
        assert_eq!(
            config.api_base_url().as_deref(),
            Some("http://localhost:8001")
        );
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path().join("nope")).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{ "app_name": "subtrack", "config_version": 1 }"#;
        utils::write(&config_path, json).await.unwrap();

        let config = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(config.api_base_url, None);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.backup_copies, 5);
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{ "app_name": "budget", "config_version": 1 }"#;
        utils::write(&config_path, json).await.unwrap();

        let result = ConfigFile::load(&config_path).await;
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_config_file_save_and_load() {
        let t = TempDir::new().unwrap();
        let path = t.path().join("file.json");
        let original = ConfigFile {
            api_base_url: Some("http://localhost:8001".into()),
            request_timeout_secs: 5,
            backup_copies: 2,
            ..ConfigFile::default()
        };
        original.save(&path).await.unwrap();
        assert_eq!(original, ConfigFile::load(&path).await.unwrap());
    }
}
