//! Error types for boundary loading and reprojection.

use std::path::PathBuf;

use terrazone_dem::Crs;
use thiserror::Error;

/// Errors that can occur when loading or reprojecting a boundary.
#[derive(Debug, Error)]
pub enum BoundaryError {
    /// I/O error reading the boundary file.
    #[error("Failed to read boundary {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed GeoJSON or an unconvertible geometry.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The `crs` member could not be interpreted.
    #[error("Unrecognised boundary CRS: {0}")]
    InvalidCrs(String),

    /// Neither the registry nor the EPSG database defines the CRS.
    #[error("No projection definition available for {0}")]
    UnsupportedCrs(Crs),

    /// proj4rs rejected a definition or a coordinate.
    #[error("Projection error: {0}")]
    Projection(#[from] proj4rs::errors::Error),
}
