use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use terrazone_render::presenter;
use terrazone_runner::{run, PipelineError, RunConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Classify merged elevation tiles into terrain zones and report their areas.
#[derive(Parser, Debug)]
#[command(name = "terrazone", version, about)]
struct Args {
    /// YAML run configuration (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory containing the elevation tiles
    #[arg(long)]
    tiles: Option<PathBuf>,

    /// GeoJSON file with the region boundary
    #[arg(long)]
    boundary: Option<PathBuf>,

    /// Directory for the figures and the JSON summary
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Create the output directory if it does not exist
    #[arg(long)]
    create_output_dir: bool,

    /// Open the saved figures in the system viewer
    #[arg(long)]
    show: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn load_config(&self) -> Result<RunConfig, PipelineError> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_yaml_file(path)?,
            None => RunConfig::default(),
        };

        if let Some(tiles) = &self.tiles {
            config.tiles.dir = tiles.clone();
        }
        if let Some(boundary) = &self.boundary {
            config.boundary = boundary.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.clone();
        }
        config.output.create_dir |= self.create_output_dir;
        config.show |= self.show;

        Ok(config)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    let result = args.load_config().and_then(|config| {
        let presenter = presenter(config.show);
        run(&config, presenter.as_ref(), &mut std::io::stdout().lock())
    });

    match result {
        Ok(summary) => {
            info!(
                "Done: {} zones over {} cells",
                summary.statistics.zones.len(),
                summary.statistics.total_count
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
