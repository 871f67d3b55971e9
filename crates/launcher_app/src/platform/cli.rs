use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use launcher_core::AuthMode;

use super::logging::LogDestination;

#[derive(Debug, Parser)]
#[command(name = "launcher", version, about = "Runs a script against a remote REST API")]
pub struct Cli {
    /// Settings file restored at startup and saved after each accepted start.
    #[arg(long, default_value = "./launcher_settings.ron")]
    pub settings: PathBuf,

    /// Overrides a form field, e.g. `--set project_id=42`.
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub assignments: Vec<(String, String)>,

    #[arg(long, value_enum)]
    pub auth: Option<AuthArg>,

    /// Endpoint address of the remote API.
    #[arg(long)]
    pub url: Option<String>,

    /// Username, or client id in OAuth mode.
    #[arg(long)]
    pub user: Option<String>,

    /// Password, or client secret in OAuth mode. Never written to the settings file.
    #[arg(long, env = "LAUNCHER_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    #[arg(long, value_enum, default_value = "terminal")]
    pub log: LogDestination,

    #[arg(short, long)]
    pub verbose: bool,

    /// Validate and connect, print the parameters, but do not run the script.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AuthArg {
    Basic,
    Oauth,
}

impl From<AuthArg> for AuthMode {
    fn from(arg: AuthArg) -> Self {
        match arg {
            AuthArg::Basic => AuthMode::Basic,
            AuthArg::Oauth => AuthMode::OAuth,
        }
    }
}

fn parse_assignment(raw: &str) -> Result<(String, String)> {
    let Some((name, value)) = raw.split_once('=') else {
        bail!("expected NAME=VALUE, got `{raw}`");
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("missing field name in `{raw}`");
    }
    Ok((name.to_string(), value.to_string()))
}
