//! Command line and environment configuration

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use reqwest::Url;

use crate::logging::DEFAULT_LOG_DIR;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_AUTH_URL: &str = "http://127.0.0.1:8000";

#[derive(Parser, Debug)]
#[command(author, version, about = "Music catalog client")]
pub struct Cli {
    /// Base URL of the catalog service (collections live under it)
    #[arg(long, env = "CATALOG_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,
    /// Base URL of the authentication service
    #[arg(long, env = "CATALOG_AUTH_URL", default_value = DEFAULT_AUTH_URL)]
    pub auth_url: String,
    #[arg(long, env = "CATALOG_LOG_DIR", default_value = DEFAULT_LOG_DIR)]
    pub log_dir: PathBuf,
    #[command(subcommand)]
    pub mode: Option<Mode>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Interactive shell (default)
    Shell,
    /// Load the reference test data into the catalog
    Seed {
        /// Delete existing entries first
        #[arg(long)]
        replace: bool,
    },
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base: String,
    pub auth_base: String,
    pub log_dir: PathBuf,
    pub mode: Mode,
}

impl AppConfig {
    pub fn from_cli(cli: Cli) -> anyhow::Result<Self> {
        Ok(Self {
            api_base: validate_base_url("api", &cli.api_url)?,
            auth_base: validate_base_url("auth", &cli.auth_url)?,
            log_dir: cli.log_dir,
            mode: cli.mode.unwrap_or(Mode::Shell),
        })
    }
}

/// Check that `raw` is an absolute http(s) URL and strip trailing slashes.
fn validate_base_url(which: &str, raw: &str) -> anyhow::Result<String> {
    let url = Url::parse(raw.trim()).with_context(|| format!("Invalid {which} URL `{raw}`"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("The {which} URL must use http or https, got `{}`", url.scheme());
    }
    Ok(raw.trim().trim_end_matches('/').to_string())
}
