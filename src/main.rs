use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mixotrack::report::HeaderLayout;
use mixotrack::{Pipeline, PipelineConfig};

#[derive(Debug, Parser)]
#[command(
    name = "lis-mixotrack",
    version,
    about = "Classify LIS plankton surveys against the Mixoplankton Database"
)]
struct Cli {
    /// Mixoplankton Database CSV (overrides reference_path from the config)
    #[arg(long, env = "MIXOTRACK_REFERENCE")]
    reference: Option<PathBuf>,

    /// Directory of survey CSVs
    #[arg(long, env = "MIXOTRACK_INPUTS", default_value = "inputs")]
    inputs: PathBuf,

    /// Directory for generated tables
    #[arg(long, env = "MIXOTRACK_OUT", default_value = "outputs")]
    out: PathBuf,

    /// TOML configuration file
    #[arg(long, env = "MIXOTRACK_CONFIG")]
    config: Option<PathBuf>,

    /// Split report labels into month, station and date tiers
    #[arg(long, default_value_t = false)]
    three_tier: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = PipelineConfig::load_or_default(cli.config.as_deref())
        .context("loading configuration")?;
    if let Some(reference) = cli.reference {
        config.reference_path = Some(reference);
    }
    if cli.three_tier {
        config.header_layout = HeaderLayout::ThreeTier;
    }

    let pipeline = Pipeline::from_config(config).context("loading mixoplankton database")?;
    let outcomes = pipeline
        .run_batch(&cli.inputs, &cli.out)
        .with_context(|| format!("reading {}", cli.inputs.display()))?;

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    tracing::info!(surveys = outcomes.len(), failed, "batch finished");
    if failed > 0 {
        anyhow::bail!("{failed} of {} surveys failed", outcomes.len());
    }
    Ok(())
}
