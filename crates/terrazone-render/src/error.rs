//! Error types for the render crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while rendering or saving figures.
#[derive(Debug, Error)]
pub enum RenderError {
    /// I/O error writing a figure or world file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// PNG encoding error.
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    /// The bundled label font could not be parsed.
    #[error("Font error: {0}")]
    Font(#[from] ab_glyph::InvalidFont),

    /// Figures are never written into a directory that does not exist.
    #[error("Output directory {} does not exist", dir.display())]
    OutputDirMissing {
        /// Missing parent directory of the output file.
        dir: PathBuf,
    },

    /// Classified and elevation grids differ in `(width, height)`.
    #[error("Classified grid is {found:?}, elevation grid is {expected:?}")]
    ShapeMismatch {
        /// Elevation grid dimensions.
        expected: (usize, usize),
        /// Classified grid dimensions.
        found: (usize, usize),
    },

    /// Raster dimensions do not fit an image buffer.
    #[error("Image of {width}x{height} pixels is too large")]
    ImageTooLarge {
        /// Raster columns.
        width: usize,
        /// Raster rows.
        height: usize,
    },

    /// A render option is out of range.
    #[error("Invalid render option: {0}")]
    InvalidOption(String),
}
