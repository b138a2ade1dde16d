use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use trajviz::prelude::*;

/// Animate agent and target trajectories from a simulation run
#[derive(Parser, Debug)]
#[command(name = "plot_trajectory")]
struct Args {
    /// Also save the animation as a GIF
    #[arg(short)]
    save: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load_or_default(DEFAULT_CONFIG_PATH).context("failed to load config")?;
    trajviz::run(&config, args.save)
        .with_context(|| format!("failed to plot {}", config.input.display()))?;

    Ok(())
}
