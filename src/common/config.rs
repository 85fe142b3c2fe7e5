//! Configuration schema, defaults, and layered loading.
//!
//! Precedence: defaults < config file < environment < CLI
use anyhow::{ensure, Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// One week; longer links defeat the point of a one-shot server.
pub const MAX_TTL_MINUTES: u64 = 7 * 24 * 60;
const MAX_UPLOAD_MB: u64 = 64 * 1024;

pub const ENV_PREFIX: &str = "QRDROP_";

pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "qrdrop")
        .map(|p| p.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("qrdrop.toml"))
}

/// Fully resolved application configuration after all layers merge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Address to bind
    pub host: String,
    /// Listen port, 0 picks a free ephemeral port
    pub port: u16,
    /// Minutes until the link expires
    pub ttl_minutes: u64,
    /// Where uploads land
    pub upload_dir: PathBuf,
    /// Stop the server after the first successful upload or download
    pub exit_on_transfer: bool,
    /// Request body cap for uploads
    pub max_upload_mb: u64,
    /// Delay before shutdown so the last response can flush
    pub shutdown_grace_ms: u64,
    /// Cap on how long in-flight connections may drain once shutdown starts.
    /// 0 waits for every response to finish.
    pub drain_timeout_secs: u64,
    pub show_qr: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 0,
            ttl_minutes: 15,
            upload_dir: PathBuf::from("uploads"),
            exit_on_transfer: false,
            max_upload_mb: 1024,
            shutdown_grace_ms: 250,
            drain_timeout_secs: 0,
            show_qr: true,
        }
    }
}

impl AppConfig {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.ttl_minutes as i64)
    }

    pub fn max_upload_bytes(&self) -> usize {
        (self.max_upload_mb as usize).saturating_mul(1024 * 1024)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    /// `None` means no cap.
    pub fn drain_timeout(&self) -> Option<Duration> {
        (self.drain_timeout_secs > 0).then(|| Duration::from_secs(self.drain_timeout_secs))
    }

    /// Rejects values the server cannot honour.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.host.trim().is_empty(),
            "Invalid config: host must not be empty"
        );
        ensure!(
            self.ttl_minutes >= 1,
            "Invalid config: ttl_minutes must be >= 1"
        );
        ensure!(
            self.ttl_minutes <= MAX_TTL_MINUTES,
            "Invalid config: ttl_minutes must be <= {MAX_TTL_MINUTES}"
        );
        ensure!(
            self.max_upload_mb >= 1,
            "Invalid config: max_upload_mb must be >= 1"
        );
        ensure!(
            self.max_upload_mb <= MAX_UPLOAD_MB,
            "Invalid config: max_upload_mb must be <= {MAX_UPLOAD_MB}"
        );
        Ok(())
    }
}

/// Values taken from command line flags; `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub ttl_minutes: Option<u64>,
    pub upload_dir: Option<PathBuf>,
    pub exit_on_transfer: Option<bool>,
}

/// Loads config from defaults/file/env.
pub fn load_config() -> Result<AppConfig> {
    let path = config_path();

    let config: AppConfig = Figment::new()
        .merge(Serialized::defaults(AppConfig::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed(ENV_PREFIX))
        .extract()
        .context("Failed to load configuration")?;

    config.validate()?;

    Ok(config)
}

/// Applies CLI overrides to a loaded config and re-validates.
pub fn apply_overrides(mut config: AppConfig, overrides: &ConfigOverrides) -> Result<AppConfig> {
    if let Some(host) = &overrides.host {
        config.host = host.clone();
    }
    if let Some(port) = overrides.port {
        config.port = port;
    }
    if let Some(ttl) = overrides.ttl_minutes {
        config.ttl_minutes = ttl;
    }
    if let Some(dir) = &overrides.upload_dir {
        config.upload_dir = dir.clone();
    }
    if let Some(exit) = overrides.exit_on_transfer {
        config.exit_on_transfer = exit;
    }

    config.validate()?;
    Ok(config)
}
