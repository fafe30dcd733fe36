use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config as cfg;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::CollectorConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    #[serde(default = "GitHubConfig::default_api_base")]
    pub api_base: String,
    /// Takes precedence over the credential environment variables.
    #[serde(default, skip_serializing)]
    pub token: Option<SecretString>,
    #[serde(default = "GitHubConfig::default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "GitHubConfig::default_user_agent")]
    pub user_agent: String,
}

impl GitHubConfig {
    fn default_api_base() -> String {
        "https://api.github.com".to_string()
    }

    fn default_timeout_secs() -> u64 {
        30
    }

    fn default_user_agent() -> String {
        format!("archmetrics/{}", env!("CARGO_PKG_VERSION"))
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: Self::default_api_base(),
            token: None,
            timeout_secs: Self::default_timeout_secs(),
            user_agent: Self::default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchitectureConfig {
    /// Owner for repositories an ADF names without one.
    #[serde(default = "ArchitectureConfig::default_org")]
    pub default_org: String,
    #[serde(default = "ArchitectureConfig::default_repo")]
    pub default_repo: String,
    #[serde(default = "ArchitectureConfig::default_branch")]
    pub default_branch: String,
    #[serde(default = "ArchitectureConfig::default_path")]
    pub default_path: String,
    /// Bundled ADF served for `default_repo` + `default_path` without a network fetch.
    /// A relative path is resolved against the configuration directory.
    #[serde(default)]
    pub local_file: Option<PathBuf>,
    #[serde(default = "ArchitectureConfig::default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl ArchitectureConfig {
    fn default_org() -> String {
        "BPMSoftwareSolutions".to_string()
    }

    fn default_repo() -> String {
        "renderx-plugins-demo".to_string()
    }

    fn default_branch() -> String {
        "main".to_string()
    }

    fn default_path() -> String {
        "adf.json".to_string()
    }

    fn default_cache_ttl_secs() -> u64 {
        300
    }
}

impl Default for ArchitectureConfig {
    fn default() -> Self {
        Self {
            default_org: Self::default_org(),
            default_repo: Self::default_repo(),
            default_branch: Self::default_branch(),
            default_path: Self::default_path(),
            local_file: None,
            cache_ttl_secs: Self::default_cache_ttl_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorSettings {
    #[serde(default = "CollectorSettings::default_max_concurrent")]
    pub max_concurrent: usize,
    #[serde(default = "CollectorSettings::default_stale_threshold_days")]
    pub stale_threshold_days: u32,
}

impl CollectorSettings {
    fn default_max_concurrent() -> usize {
        4
    }

    fn default_stale_threshold_days() -> u32 {
        30
    }

    pub fn to_collector_config(&self) -> CollectorConfig {
        CollectorConfig {
            max_concurrent: self.max_concurrent,
            stale_threshold_days: self.stale_threshold_days,
        }
    }
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            max_concurrent: Self::default_max_concurrent(),
            stale_threshold_days: Self::default_stale_threshold_days(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "archmetrics_api=debug,tower_http=debug".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "Settings::default_env")]
    pub env: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub architecture: ArchitectureConfig,
    #[serde(default)]
    pub collector: CollectorSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            env: Self::default_env(),
            server: ServerConfig::default(),
            github: GitHubConfig::default(),
            architecture: ArchitectureConfig::default(),
            collector: CollectorSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Settings {
    fn default_env() -> String {
        env::var("APP_ENV")
            .ok()
            .or_else(|| env::var("RUST_ENV").ok())
            .unwrap_or_else(|| "development".to_string())
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.server.host.trim().is_empty(),
            "server.host cannot be empty"
        );
        anyhow::ensure!(self.server.port > 0, "server.port must be > 0");
        anyhow::ensure!(
            !self.github.api_base.trim().is_empty(),
            "github.api_base cannot be empty"
        );
        anyhow::ensure!(
            self.github.timeout_secs > 0,
            "github.timeout_secs must be > 0"
        );
        anyhow::ensure!(
            !self.architecture.default_org.trim().is_empty(),
            "architecture.default_org cannot be empty"
        );
        anyhow::ensure!(
            self.architecture.cache_ttl_secs > 0,
            "architecture.cache_ttl_secs must be > 0"
        );
        anyhow::ensure!(
            (1..=32).contains(&self.collector.max_concurrent),
            "collector.max_concurrent must be 1..=32"
        );
        Ok(())
    }

    /// Loads and validates settings from the default config directory.
    pub fn load(env_override: Option<String>) -> Result<Self> {
        let env_name = env_override.unwrap_or_else(Self::default_env);
        let settings = Self::load_from_sources(&Self::default_config_dir(), &env_name)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Get the default configuration directory.
    ///
    /// Priority order:
    /// 1. ~/.archmetrics/
    /// 2. ./config/
    /// 3. Current directory
    pub fn default_config_dir() -> PathBuf {
        if let Some(home_dir) = dirs::home_dir() {
            let user_dir = home_dir.join(".archmetrics");
            if user_dir.exists() {
                info!("Using config directory: {:?}", user_dir);
                return user_dir;
            }
        }

        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let project_config = cwd.join("config");
        if project_config.exists() {
            info!("Using config directory: {:?}", project_config);
            return project_config;
        }

        info!("Using config directory: {:?}", cwd);
        cwd
    }

    pub fn load_from_sources(config_dir: &Path, env_name: &str) -> Result<Self> {
        let mut settings: Settings = cfg::Config::builder()
            .add_source(cfg::File::from(config_dir.join("default.toml")).required(false))
            .add_source(cfg::File::from(config_dir.join("default.yaml")).required(false))
            .add_source(cfg::File::from(config_dir.join("default.json")).required(false))
            .add_source(
                cfg::File::from(config_dir.join(format!("{}.toml", env_name))).required(false),
            )
            .add_source(cfg::File::from(config_dir.join("local.toml")).required(false))
            .add_source(cfg::Environment::with_prefix("ARCHMETRICS").separator("__"))
            .build()
            .context("building configuration")?
            .try_deserialize()
            .context("deserializing configuration")?;

        if let Some(file) = settings.architecture.local_file.take() {
            settings.architecture.local_file = Some(if file.is_relative() {
                config_dir.join(file)
            } else {
                file
            });
        }
        Ok(settings)
    }
}
