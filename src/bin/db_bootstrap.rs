use anyhow::{Context, Result};
use clap::Parser;
use site_deploy::utils::logger;
use site_deploy::{DatabaseBootstrap, DeployConfig, EnvOverlay};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "db-bootstrap")]
#[command(about = "Print the one-time SQL that creates the application database and its user")]
struct Args {
    /// Path to TOML configuration file (defaults to ./deploy.toml, then built-in defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the SQL to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let config = DeployConfig::load(args.config.as_deref()).context("loading configuration")?;

    let env_file = config.env_file();
    let overlay = EnvOverlay::load_optional(&env_file)
        .with_context(|| format!("reading {}", env_file.display()))?;

    let bootstrap = DatabaseBootstrap::resolve(&config, overlay.as_ref());
    tracing::debug!("Bootstrap values: {:?}", bootstrap);

    if bootstrap.uses_placeholder_password() {
        tracing::warn!("⚠️ Using placeholder password; edit it before running the SQL");
    }

    match args.output {
        Some(path) => {
            bootstrap
                .write_to(&path)
                .with_context(|| format!("writing bootstrap SQL to {}", path.display()))?;
            tracing::info!("📁 Bootstrap SQL written to {}", path.display());
        }
        None => {
            let sql = bootstrap.render().context("rendering bootstrap SQL")?;
            print!("{}", sql);
        }
    }

    Ok(())
}
