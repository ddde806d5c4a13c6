//! Production configuration system
//!
//! Provides centralized configuration management with:
//! - Environment variable support
//! - Config file loading (optional)
//! - Runtime defaults
//! - Validation and type safety

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// File discovery and resource-limit configuration
    pub scan: ScanConfig,

    /// Refresh cycle configuration
    pub refresh: RefreshConfig,

    /// Paths configuration
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Files larger than this are skipped without being opened.
    pub max_file_mb: u64,
    /// Cumulative bytes of file content one refresh cycle may read.
    pub max_total_mb: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Default log roots scanned when no override path is supplied.
    pub data_roots: Vec<PathBuf>,
    /// Allow-list for caller-supplied override roots.
    pub allowed_roots: Vec<PathBuf>,
    pub log_directory: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let claude_home = home.join(".claude");
        let claude_config = home.join(".config").join("claude");

        Self {
            logging: LoggingConfig {
                level: "ERROR".to_string(),
                format: "pretty".to_string(),
                output: "console".to_string(),
            },
            scan: ScanConfig {
                max_file_mb: 100,
                max_total_mb: 500,
            },
            refresh: RefreshConfig { interval_secs: 3 },
            paths: PathsConfig {
                data_roots: vec![claude_home.join("projects"), claude_config.join("projects")],
                allowed_roots: vec![claude_home, claude_config],
                log_directory: PathBuf::from("logs"),
            },
        }
    }
}

impl Config {
    /// Load configuration from environment, file, and defaults
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        // Try to load from config file if it exists
        let config_paths = [
            PathBuf::from("claude-monitor.toml"),
            PathBuf::from(".claude-monitor.toml"),
            dirs::config_dir()
                .map(|d| d.join("claude-monitor").join("config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.exists() {
                info!(config_file = %path.display(), "Loading configuration from file");
                config = Self::load_from_file(path)?;
                break;
            }
        }

        // Override with environment variables
        config.apply_env_overrides()?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        // Logging overrides
        if let Ok(val) = env::var("LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("LOG_OUTPUT") {
            self.logging.output = val;
        }

        // Scan limit overrides
        if let Ok(val) = env::var("CLAUDE_MONITOR_MAX_FILE_MB") {
            self.scan.max_file_mb = val.parse().context("Invalid CLAUDE_MONITOR_MAX_FILE_MB")?;
        }
        if let Ok(val) = env::var("CLAUDE_MONITOR_MAX_TOTAL_MB") {
            self.scan.max_total_mb = val.parse().context("Invalid CLAUDE_MONITOR_MAX_TOTAL_MB")?;
        }

        // Refresh overrides
        if let Ok(val) = env::var("CLAUDE_MONITOR_REFRESH_SECS") {
            self.refresh.interval_secs =
                val.parse().context("Invalid CLAUDE_MONITOR_REFRESH_SECS")?;
        }

        // Path overrides; a custom data dir is both scanned and trusted
        if let Ok(val) = env::var("CLAUDE_MONITOR_DATA_DIR") {
            let root = PathBuf::from(val);
            self.paths.allowed_roots = vec![root.clone()];
            self.paths.data_roots = vec![root];
        }
        if let Ok(val) = env::var("CLAUDE_MONITOR_LOG_DIR") {
            self.paths.log_directory = PathBuf::from(val);
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.scan.max_file_mb == 0 {
            return Err(anyhow::anyhow!("Per-file size cap must be greater than 0"));
        }

        if self.scan.max_total_mb < self.scan.max_file_mb {
            return Err(anyhow::anyhow!(
                "Memory budget ({}MB) must be at least the per-file cap ({}MB)",
                self.scan.max_total_mb,
                self.scan.max_file_mb
            ));
        }

        if self.refresh.interval_secs == 0 {
            return Err(anyhow::anyhow!("Refresh interval must be greater than 0"));
        }

        if self.paths.data_roots.is_empty() {
            return Err(anyhow::anyhow!("At least one data root must be configured"));
        }

        Ok(())
    }
}

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration instance
pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(|| Config::load().expect("Failed to load configuration"))
}
