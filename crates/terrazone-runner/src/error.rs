//! Error types for configuration and the analysis pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or validating a run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid zone table: {0}")]
    Zones(#[from] terrazone_zones::ZoneError),

    #[error("Invalid render settings: {0}")]
    Render(#[from] terrazone_render::RenderError),

    #[error("Configuration error: {0}")]
    Invalid(String),
}

/// Errors that can occur during a pipeline run.
///
/// Every variant is fatal. The area report may already have been printed
/// when a later stage fails.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Elevation data error: {0}")]
    Dem(#[from] terrazone_dem::DemError),

    #[error("Boundary error: {0}")]
    Boundary(#[from] terrazone_boundary::BoundaryError),

    #[error("Zone error: {0}")]
    Zone(#[from] terrazone_zones::ZoneError),

    #[error("Render error: {0}")]
    Render(#[from] terrazone_render::RenderError),

    #[error("Raster {} has no usable coordinate reference system", path.display())]
    MissingRasterCrs { path: PathBuf },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
