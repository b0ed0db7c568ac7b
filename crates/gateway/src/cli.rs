//! Command-line interface: `serve` (default) plus config inspection.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use ad_domain::config::{Config, ConfigSeverity};

#[derive(Parser)]
#[command(name = "astrodesk", about = "LLM-driven astrology analysis service")]
pub struct Cli {
    /// Path to the TOML config file. Falls back to $ASTRODESK_CONFIG,
    /// then ./astrodesk.toml, then built-in defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Config inspection.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print the version and exit.
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Check the effective config and report problems.
    Validate,
    /// Print the effective config as TOML.
    Show,
}

/// Load the effective config. A missing file is not an error; the
/// built-in defaults describe a working local setup.
pub fn load_config(explicit: Option<PathBuf>) -> anyhow::Result<(Config, String)> {
    let path = explicit
        .or_else(|| std::env::var("ASTRODESK_CONFIG").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("astrodesk.toml"));

    if path.exists() {
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config =
            toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
        Ok((config, path.display().to_string()))
    } else {
        Ok((Config::default(), format!("{} (defaults)", path.display())))
    }
}

/// `config validate`: returns whether the config passed.
pub fn validate(config: &Config, source: &str) -> bool {
    let issues = config.validate();
    if issues.is_empty() {
        println!("{source}: ok");
        return true;
    }
    let mut passed = true;
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => println!("warning: {issue}"),
            ConfigSeverity::Error => {
                println!("error: {issue}");
                passed = false;
            }
        }
    }
    passed
}

/// `config show`: print the effective config.
pub fn show(config: &Config) {
    match toml::to_string_pretty(config) {
        Ok(rendered) => println!("{rendered}"),
        Err(err) => println!("failed to render config: {err}"),
    }
}
