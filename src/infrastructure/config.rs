use crate::domain::error::TranslateError;
use crate::domain::model::ProviderCredentials;
use crate::infrastructure::network::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "selection-translate";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_provider")]
    pub default_provider: String,
    #[serde(default = "default_source_lang")]
    pub source_lang: String,
    #[serde(default = "default_target_lang")]
    pub target_lang: String,
    #[serde(default)]
    pub record_history: bool,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    /// Seed credentials per provider id; the credential store has the final say.
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderCredentials>,
    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Logging {
    #[serde(default = "default_enable")]
    pub enable: bool,
    pub path: Option<String>,
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    pub proxy: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

// 多维表格同步配置
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct SyncConfig {
    #[serde(default)]
    pub enable: bool,
    pub app_id: Option<String>,
    pub app_secret: Option<String>,
    pub bitable_token: Option<String>,
    pub table_id: Option<String>,
    pub api_base: Option<String>,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            enable: true,
            path: None,
            level: default_log_level(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            proxy: None,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.base_delay_ms))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            source_lang: default_source_lang(),
            target_lang: default_target_lang(),
            record_history: false,
            logging: Logging::default(),
            http: HttpConfig::default(),
            retry: RetryConfig::default(),
            providers: BTreeMap::new(),
            sync: SyncConfig::default(),
        }
    }
}

impl Config {
    /// Seed credentials configured for a provider, if any.
    pub fn provider_credentials(&self, provider_id: &str) -> Option<&ProviderCredentials> {
        self.providers
            .iter()
            .find(|(id, _)| id.eq_ignore_ascii_case(provider_id))
            .map(|(_, creds)| creds)
    }
}

// Defaults
fn default_provider() -> String {
    "kimi".to_string()
}
fn default_source_lang() -> String {
    "auto".to_string()
}
fn default_target_lang() -> String {
    "zh".to_string()
}
fn default_enable() -> bool {
    true
}
fn default_log_level() -> String {
    "WARN".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    concat!("selection-translate/", env!("CARGO_PKG_VERSION")).to_string()
}
fn default_max_retries() -> u32 {
    3
}
fn default_base_delay_ms() -> u64 {
    1000
}

pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_DIR).join("config.toml"))
}

/// Load the user config, falling back to defaults when it is missing or broken.
pub fn load_config() -> Result<Config, TranslateError> {
    if let Some(path) = get_config_path() {
        if path.exists() {
            match load_config_from(&path) {
                Ok(config) => return Ok(config),
                Err(TranslateError::Toml(e)) => {
                    tracing::warn!("Failed to parse config file: {}. Using defaults.", e);
                }
                Err(e) => return Err(e),
            }
        }
    }

    Ok(Config::default())
}

/// Strict load from an explicit path.
pub fn load_config_from(path: &Path) -> Result<Config, TranslateError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str::<Config>(&content)?)
}

pub fn generate_config_sample() -> Result<PathBuf, TranslateError> {
    let path = get_config_path()
        .ok_or_else(|| TranslateError::Config("Cannot determine config directory".to_string()))?;
    write_config_sample(&path)?;
    Ok(path)
}

/// Write a default config to `path` unless a file is already there.
/// Returns whether a file was written.
pub fn write_config_sample(path: &Path) -> Result<bool, TranslateError> {
    if path.exists() {
        tracing::info!("Config file already exists at: {}", path.display());
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let toml_content = toml::to_string_pretty(&Config::default())
        .map_err(|e| TranslateError::Config(format!("Failed to serialize config: {}", e)))?;
    fs::write(path, toml_content)
        .map_err(|e| TranslateError::Config(format!("Failed to write config file: {}", e)))?;

    // API keys end up in this file; keep it owner-only.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
    }

    tracing::info!("Generated config file at: {}", path.display());
    Ok(true)
}
