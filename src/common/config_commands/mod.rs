//! CLI handlers for config subcommands.

mod show;

use crate::common::config::{config_path, AppConfig};
use anyhow::{Context, Result};

/// Default config rendered as TOML, used as guidance when no file exists.
pub fn defaults_toml() -> Result<String> {
    toml::to_string_pretty(&AppConfig::default()).context("Failed to serialize default config")
}

/// `qrdrop config path`
pub fn run_config_path() -> Result<()> {
    let stdout = std::io::stdout();
    let mut output = stdout.lock();
    show::write_config_path(&config_path(), &mut output)
}

/// `qrdrop config show`
pub fn run_config_show() -> Result<()> {
    let path = config_path();
    let defaults = defaults_toml()?;
    let stdout = std::io::stdout();
    let mut output = stdout.lock();
    let stderr = std::io::stderr();
    let mut err_output = stderr.lock();
    show::write_config_listing(&path, &defaults, &mut output, &mut err_output)
}
