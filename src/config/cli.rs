use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "site-deploy")]
#[command(about = "Provision the web application on this host: venv, dependencies, migrations, static files, service restart")]
pub struct CliArgs {
    /// Path to TOML configuration file (defaults to ./deploy.toml, then built-in defaults)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Show the steps and commands without running anything
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run summary as JSON on success
    #[arg(long)]
    pub json: bool,

    #[arg(long, value_enum, default_value = "compact")]
    pub log_format: LogFormat,
}
