//! Error types for the DEM crate.

use std::path::PathBuf;

use thiserror::Error;

use crate::Crs;

/// Errors that can occur when loading or merging elevation tiles.
#[derive(Debug, Error)]
pub enum DemError {
    /// I/O error reading a file or directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TIFF decoding or encoding error.
    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    /// Invalid GeoTIFF - missing or malformed georeferencing tags.
    #[error("Invalid GeoTIFF {path}: {reason}")]
    InvalidGeoTiff {
        /// File that failed to decode.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// No tile files matched in the tile directory.
    #[error("No *.{extension} tiles found in {}", dir.display())]
    NoTiles {
        /// Directory that was scanned.
        dir: PathBuf,
        /// Extension that was searched for.
        extension: String,
    },

    /// Tiles disagree on the number of bands.
    #[error("Tile {} has {found} band(s), expected {expected}", path.display())]
    BandCountMismatch {
        /// Offending tile.
        path: PathBuf,
        /// Band count of the first tile.
        expected: usize,
        /// Band count of the offending tile.
        found: usize,
    },

    /// Tiles are in different coordinate reference systems.
    #[error("Tile {} is in {found}, expected {expected}", path.display())]
    CrsMismatch {
        /// Offending tile.
        path: PathBuf,
        /// CRS of the first tile.
        expected: Crs,
        /// CRS of the offending tile.
        found: Crs,
    },

    /// Merge was called without any tiles.
    #[error("Cannot merge an empty tile list")]
    EmptyMerge,

    /// Rotated or sheared rasters cannot be merged.
    #[error("Tile {} has a rotated geotransform", path.display())]
    UnsupportedTransform {
        /// Offending tile.
        path: PathBuf,
    },

    /// Raster has a zero-sized dimension or an inconsistent buffer.
    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Raster width in pixels.
        width: usize,
        /// Raster height in pixels.
        height: usize,
    },

    /// CRS string could not be parsed.
    #[error("Invalid CRS definition: {0}")]
    InvalidCrs(String),
}
