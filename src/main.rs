use std::path::PathBuf;

use clap::Parser;
use klistata_risk::{Analyzer, AppError, Configuration, FileSource, HttpSource, MapSource};
use tracing::{error, Level};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Tick-borne encephalitis risk for a point in the Czech Republic",
    long_about = None
)]
struct Args {
    /// Latitude in decimal degrees
    #[arg(allow_negative_numbers = true)]
    latitude: f64,

    /// Longitude in decimal degrees
    #[arg(allow_negative_numbers = true)]
    longitude: f64,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Map URL (overrides config)
    #[arg(long, conflicts_with = "file")]
    url: Option<String>,

    /// Local map image (overrides config)
    #[arg(long)]
    file: Option<PathBuf>,

    /// Maximum RGB distance to a legend color (overrides config)
    #[arg(short, long)]
    tolerance: Option<f64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(level: Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn log_level(configuration: &Configuration, verbose: bool) -> Result<Level, AppError> {
    if verbose {
        return Ok(Level::DEBUG);
    }
    configuration.level()
}

fn map_source(args: &Args, configuration: &Configuration) -> Box<dyn MapSource> {
    if let Some(url) = &args.url {
        return Box::new(HttpSource::new(url.clone()));
    }
    if let Some(path) = &args.file {
        return Box::new(FileSource::new(path.clone()));
    }
    match &configuration.image_path {
        Some(path) => Box::new(FileSource::new(path.clone())),
        None => Box::new(HttpSource::new(configuration.image_url.clone())),
    }
}

async fn run(args: Args, configuration: Configuration) -> Result<(), AppError> {
    let source = map_source(&args, &configuration);
    let tolerance = args.tolerance.unwrap_or(configuration.tolerance);

    let analyzer = Analyzer::fetch(source.as_ref(), configuration.region, configuration.borders)
        .await?
        .with_tolerance(tolerance)?;
    let result = analyzer.analyze(args.latitude, args.longitude)?;

    let json = serde_json::to_string(&result).map_err(std::io::Error::from)?;
    println!("{json}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();
    let configuration = Configuration::load(args.config.as_deref())?;
    init_logging(log_level(&configuration, args.verbose)?);

    if let Err(e) = run(args, configuration).await {
        error!(error = %e, "analysis failed");
        return Err(e);
    }
    Ok(())
}
