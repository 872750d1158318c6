use anyhow::{Context, Result};
use std::{env, path::PathBuf, sync::Arc};
use structopt::StructOpt;
use tracing::{info_span, Instrument};
use tracing_subscriber::{filter::LevelFilter, prelude::*, EnvFilter};
use train::config::Config;

#[derive(Debug, Clone, StructOpt)]
/// Train GAN models on dog images
struct Args {
    #[structopt(long, default_value = "train.json5")]
    /// configuration file
    pub config_file: PathBuf,
}

#[tokio::main]
pub async fn main() -> Result<()> {
    // setup tracing
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true).compact();
    let filter_layer = {
        let filter = EnvFilter::from_default_env();
        if env::var("RUST_LOG").is_err() {
            filter.add_directive(LevelFilter::INFO.into())
        } else {
            filter
        }
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    // parse arguments
    let Args { config_file } = Args::from_args();
    let config = Arc::new(
        Config::open(&config_file)
            .with_context(|| format!("failed to load config file '{}'", config_file.display()))?,
    );

    // start training program
    let run_dir = train::start(config).instrument(info_span!("train")).await?;
    tracing::info!("training finished, outputs are in '{}'", run_dir.display());

    Ok(())
}
