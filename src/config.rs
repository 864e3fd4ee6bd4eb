//! Application configuration: which storage backend to use and where to find
//! it.
//!
//! Settings come from a TOML file, `SPENDLY_*` environment variables, and
//! command-line overrides, in increasing order of precedence. The backend is
//! selected here once at startup; it is not swappable within a session.

use std::fmt::Display;
use std::str::FromStr;

use serde::Deserialize;

use crate::Error;

const DEFAULT_CONFIG_PATH: &str = "spendly.toml";

/// The storage backend variants a session can run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// A single JSON file on local disk.
    File,
    /// A SQLite database on local disk.
    Sqlite,
    /// The remote HTTP API.
    Api,
}

impl Display for StorageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageKind::File => write!(f, "file"),
            StorageKind::Sqlite => write!(f, "sqlite"),
            StorageKind::Api => write!(f, "api"),
        }
    }
}

impl FromStr for StorageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(StorageKind::File),
            "sqlite" => Ok(StorageKind::Sqlite),
            "api" => Ok(StorageKind::Api),
            other => Err(Error::Config(format!(
                "'{other}' is not a storage backend, expected 'file', 'sqlite', or 'api'"
            ))),
        }
    }
}

/// The currencies amounts can be displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    /// United States dollar.
    Usd,
    /// Euro.
    Eur,
    /// Moroccan dirham.
    Mad,
}

impl Currency {
    /// The symbol appended to formatted amounts.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Mad => "DH",
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Currency::Usd => write!(f, "usd"),
            Currency::Eur => write!(f, "eur"),
            Currency::Mad => write!(f, "mad"),
        }
    }
}

impl FromStr for Currency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "usd" => Ok(Currency::Usd),
            "eur" => Ok(Currency::Eur),
            "mad" => Ok(Currency::Mad),
            other => Err(Error::Config(format!(
                "'{other}' is not a known currency, expected 'usd', 'eur', or 'mad'"
            ))),
        }
    }
}

/// The application settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Which storage backend to run against.
    pub backend: StorageKind,
    /// Path of the JSON data file (file backend).
    pub data_path: String,
    /// Path of the SQLite database (sqlite backend).
    pub db_path: String,
    /// Base URL of the remote API (api backend).
    pub api_url: String,
    /// Where the remote session is saved between invocations.
    pub session_path: String,
    /// Display currency for local backends; a remote login overrides it with
    /// the symbol the server returns.
    pub currency: Currency,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: StorageKind::File,
            data_path: "operations.json".to_string(),
            db_path: "spendly.db".to_string(),
            api_url: "http://127.0.0.1:8000".to_string(),
            session_path: "session.json".to_string(),
            currency: Currency::Eur,
        }
    }
}

/// Command-line overrides applied on top of the file and environment
/// settings.
#[derive(Debug, Default)]
pub struct Overrides {
    /// Alternative config file path.
    pub config: Option<String>,
    /// Override the storage backend.
    pub backend: Option<StorageKind>,
    /// Override the JSON data file path.
    pub data_path: Option<String>,
    /// Override the SQLite database path.
    pub db_path: Option<String>,
    /// Override the remote API base URL.
    pub api_url: Option<String>,
    /// Override the display currency.
    pub currency: Option<Currency>,
}

/// Load the settings, merging file, environment, and `overrides`.
///
/// A missing config file is fine; defaults apply.
///
/// # Errors
/// Returns [Error::Config] if the file or environment contain values that do
/// not deserialize.
pub fn load(overrides: Overrides) -> Result<AppConfig, Error> {
    let config_path = overrides.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);

    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("SPENDLY"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(backend) = overrides.backend {
        settings.backend = backend;
    }
    if let Some(data_path) = overrides.data_path {
        settings.data_path = data_path;
    }
    if let Some(db_path) = overrides.db_path {
        settings.db_path = db_path;
    }
    if let Some(api_url) = overrides.api_url {
        settings.api_url = api_url;
    }
    if let Some(currency) = overrides.currency {
        settings.currency = currency;
    }

    Ok(settings)
}

#[cfg(test)]
mod config_tests {
    use std::fs;
    use std::str::FromStr;

    use super::{AppConfig, Currency, Overrides, StorageKind, load};

    #[test]
    fn defaults_select_the_file_backend() {
        let config = AppConfig::default();

        assert_eq!(config.backend, StorageKind::File);
        assert_eq!(config.data_path, "operations.json");
        assert_eq!(config.currency, Currency::Eur);
    }

    #[test]
    fn a_missing_config_file_falls_back_to_defaults() {
        let config = load(Overrides {
            config: Some("/nonexistent/spendly.toml".to_string()),
            ..Overrides::default()
        })
        .unwrap();

        assert_eq!(config.backend, AppConfig::default().backend);
    }

    #[test]
    fn the_config_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spendly.toml");
        fs::write(&path, "backend = \"sqlite\"\ndb_path = \"/tmp/test.db\"\n").unwrap();

        let config = load(Overrides {
            config: Some(path.to_string_lossy().into_owned()),
            ..Overrides::default()
        })
        .unwrap();

        assert_eq!(config.backend, StorageKind::Sqlite);
        assert_eq!(config.db_path, "/tmp/test.db");
        // Untouched settings keep their defaults.
        assert_eq!(config.data_path, "operations.json");
    }

    #[test]
    fn command_line_overrides_win_over_the_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spendly.toml");
        fs::write(&path, "backend = \"sqlite\"\ncurrency = \"usd\"\n").unwrap();

        let config = load(Overrides {
            config: Some(path.to_string_lossy().into_owned()),
            backend: Some(StorageKind::Api),
            currency: Some(Currency::Mad),
            ..Overrides::default()
        })
        .unwrap();

        assert_eq!(config.backend, StorageKind::Api);
        assert_eq!(config.currency, Currency::Mad);
    }

    #[test]
    fn storage_kind_parses_case_insensitively() {
        assert_eq!(StorageKind::from_str("File"), Ok(StorageKind::File));
        assert_eq!(StorageKind::from_str("SQLITE"), Ok(StorageKind::Sqlite));
        assert!(StorageKind::from_str("postgres").is_err());
    }

    #[test]
    fn currency_symbols_match_their_currencies() {
        assert_eq!(Currency::Usd.symbol(), "$");
        assert_eq!(Currency::Eur.symbol(), "€");
        assert_eq!(Currency::Mad.symbol(), "DH");
    }
}
