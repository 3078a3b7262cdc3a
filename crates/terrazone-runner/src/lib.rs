//! # terrazone-runner
//!
//! Configuration and orchestration of a terrain zone analysis run, plus the
//! `terrazone` binary.
//!
//! A run loads the elevation tiles, merges them, reprojects the region
//! boundary into the raster's CRS, classifies every cell into an elevation
//! zone, prints the area report and saves the zone map, the area chart and
//! a JSON summary.
//!
//! ```no_run
//! use terrazone_render::Headless;
//! use terrazone_runner::{run, RunConfig};
//!
//! let config = RunConfig::from_yaml_file("terrazone.yaml")?;
//! let summary = run(&config, &Headless, &mut std::io::stdout())?;
//! println!("{} zones", summary.statistics.zones.len());
//! # Ok::<(), terrazone_runner::PipelineError>(())
//! ```

mod config;
mod error;
mod pipeline;

pub use config::{OutputConfig, RenderConfig, RunConfig, TileSource};
pub use error::{ConfigError, PipelineError};
pub use pipeline::{run, LegendEntry, RunSummary};
