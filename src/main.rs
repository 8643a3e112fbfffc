use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use culex::{
    CulexConfig, CulexError,
    api::AppState,
    grain::{ForecastKey, GrainDirectory, GrainReference},
    source::{ForecastSource, StaticForecastSource},
    telemetry, web,
};

#[derive(Parser, Debug)]
#[command(
    name = "culex",
    version,
    about = "Weather forecast web API backed by a singleton forecast provider"
)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = CulexConfig::load_from_path(args.config).inspect_err(|e| {
        if let Some(err) = e.downcast_ref::<CulexError>() {
            eprintln!("{}", err.user_message());
        }
    })?;

    telemetry::init(&config.logging, args.verbose)?;
    info!("Starting culex {}", culex::VERSION);

    let forecasts = config.provider.forecasts();
    info!(count = forecasts.len(), "Loaded configured forecasts");

    let directory = Arc::new(GrainDirectory::new(
        config.provider.options(),
        move |_key| -> Box<dyn ForecastSource> {
            Box::new(StaticForecastSource::new(forecasts.clone()))
        },
    ));
    let provider = GrainReference::new(directory.clone(), ForecastKey::EMPTY);

    let served = web::run(&config.server.bind_address(), AppState::new(provider)).await;

    directory.shutdown().await;
    served
}
