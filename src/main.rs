use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use subrelay::config::{Config, Credentials};
use subrelay::relay::{run_once, RunOptions};

#[derive(Parser, Debug)]
#[command(
    name = "subrelay",
    about = "Relay new subreddit feed entries to a Lemmy community"
)]
struct Args {
    /// TOML config file (missing file means defaults)
    #[arg(long, value_name = "FILE", default_value = "subrelay.toml")]
    config: PathBuf,

    /// Directory for the last-fetch marker and publish record (overrides config)
    #[arg(long, value_name = "DIR")]
    state_dir: Option<PathBuf>,

    /// Log what would be posted without posting or writing state
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    if let Some(state_dir) = args.state_dir {
        config.state_dir = state_dir;
    }

    if !config.state_dir.exists() {
        std::fs::create_dir_all(&config.state_dir).with_context(|| {
            format!(
                "Failed to create state directory {}",
                config.state_dir.display()
            )
        })?;
        tracing::info!(path = %config.state_dir.display(), "Created state directory");
    }

    let credentials = Credentials::from_env()?;

    let report = run_once(
        &config,
        &credentials,
        RunOptions {
            dry_run: args.dry_run,
        },
    )
    .await?;

    println!(
        "Published {} of {} entries ({} skipped)",
        report.published,
        report.fetched,
        report.skipped()
    );
    Ok(())
}
