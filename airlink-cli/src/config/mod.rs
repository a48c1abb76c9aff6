//! Configuration and persistence
//!
//! [`Settings`] is read from `config.toml` and environment overrides. [`Config`]
//! pairs the settings with the SQLite pool holding extension definitions and is
//! installed once per process, reachable through [`crate::global_config`].

pub mod repository;

use anyhow::{Context, Result};
use log::{debug, info};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};

use crate::api::DEFAULT_BASE_URL;
use crate::extension::{Extension, ExtensionContext};
use repository::extensions::{self, NewExtension};

const APP_DIR: &str = "airlink";
const CONFIG_FILE: &str = "config.toml";
const DATABASE_FILE: &str = "airlink.db";

static GLOBAL_CONFIG: OnceCell<Config> = OnceCell::new();

/// Everything that can be set in `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub airtable: AirtableSettings,
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub resilience: ResilienceSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirtableSettings {
    /// Personal access token; usually supplied through `AIRTABLE_API_KEY`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
    /// Schema refetches allowed while lookup fields are still unresolved
    pub lookup_resolution_tries: u32,
}

impl Default for AirtableSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            lookup_resolution_tries: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
    pub session_idle_timeout_secs: u64,
    pub eviction_interval_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8787".to_string(),
            session_idle_timeout_secs: 3600,
            eviction_interval_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// SQLite file; `:memory:` keeps everything in memory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResilienceSettings {
    pub retry_enabled: bool,
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub jitter: bool,
    pub rate_limit_enabled: bool,
    pub requests_per_second: u32,
    pub burst_capacity: u32,
    pub concurrency_enabled: bool,
    pub max_concurrent_requests: usize,
}

impl Default for ResilienceSettings {
    fn default() -> Self {
        Self {
            retry_enabled: true,
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 30_000,
            backoff_multiplier: 2.0,
            jitter: true,
            rate_limit_enabled: true,
            requests_per_second: 5,
            burst_capacity: 5,
            concurrency_enabled: true,
            max_concurrent_requests: 10,
        }
    }
}

impl Settings {
    /// Load from the default location, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut settings = match default_config_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };
        settings.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let settings = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Environment variables win over the file
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("AIRTABLE_API_KEY").filter(|v| !v.is_empty()) {
            self.airtable.api_key = Some(key);
        }
        if let Some(url) = lookup("AIRTABLE_BASE_URL").filter(|v| !v.is_empty()) {
            self.airtable.base_url = url;
        }
        if let Some(bind) = lookup("AIRLINK_BIND").filter(|v| !v.is_empty()) {
            self.server.bind = bind;
        }
        if let Some(path) = lookup("AIRLINK_DATABASE").filter(|v| !v.is_empty()) {
            self.database.path = Some(PathBuf::from(path));
        }
    }

    /// Where the extension database lives
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }
        let dir = dirs::data_dir().context("Could not determine the data directory")?;
        Ok(dir.join(APP_DIR).join(DATABASE_FILE))
    }

    /// Rendered as TOML, with the API key masked
    pub fn to_display_toml(&self) -> Result<String> {
        let mut masked = self.clone();
        if masked.airtable.api_key.is_some() {
            masked.airtable.api_key = Some("********".to_string());
        }
        Ok(toml::to_string_pretty(&masked)?)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// Loaded settings plus the extension database
#[derive(Debug, Clone)]
pub struct Config {
    pub settings: Settings,
    pool: SqlitePool,
}

impl Config {
    /// Open (and migrate) the database named by the settings
    pub async fn open(settings: Settings) -> Result<Self> {
        let path = settings.database_path()?;
        let pool = repository::connect(&path).await?;
        Ok(Self { settings, pool })
    }

    pub fn with_pool(settings: Settings, pool: SqlitePool) -> Self {
        Self { settings, pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn save_extension(&self, extension: &NewExtension) -> Result<()> {
        extensions::save_extension(&self.pool, extension).await
    }

    pub async fn get_extension(&self, id: &str) -> Result<Option<Extension>> {
        extensions::get_extension(&self.pool, id).await
    }

    pub async fn list_extensions(&self) -> Result<Vec<Extension>> {
        extensions::list_extensions(&self.pool).await
    }

    pub async fn delete_extension(&self, id: &str) -> Result<bool> {
        extensions::delete_extension(&self.pool, id).await
    }

    pub async fn get_extension_context(&self, id: &str) -> Result<ExtensionContext> {
        extensions::get_extension_context(&self.pool, id).await
    }

    pub async fn fetch_extension_and_verify_password(
        &self,
        id: &str,
        password: Option<&str>,
    ) -> Result<ExtensionContext> {
        extensions::fetch_extension_and_verify_password(&self.pool, id, password).await
    }
}

/// Install the process-wide config. Fails if called twice.
pub fn init_global_config(config: Config) -> Result<&'static Config> {
    GLOBAL_CONFIG
        .set(config)
        .map_err(|_| anyhow::anyhow!("Global config already initialized"))?;
    global_config()
}

pub fn global_config() -> Result<&'static Config> {
    GLOBAL_CONFIG
        .get()
        .context("Global config accessed before initialization")
}
