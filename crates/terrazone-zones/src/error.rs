//! Error types for the zones crate.

use thiserror::Error;

/// Errors from building a zone table or classifying a grid.
#[derive(Debug, Error)]
pub enum ZoneError {
    /// A zone table needs at least one band.
    #[error("Zone table is empty")]
    EmptyTable,

    /// Zone ids must be positive; negative ids mark unclassified cells.
    #[error("Zone id must be positive, got {0}")]
    InvalidId(i32),

    /// Two bands share an id.
    #[error("Duplicate zone id {0}")]
    DuplicateId(i32),

    /// Bounds are not finite or `low` is not below `high`.
    #[error("Zone {id} has invalid bounds [{low}, {high})")]
    InvalidBounds {
        /// Band with the bad bounds.
        id: i32,
        /// Inclusive lower bound in metres.
        low: f64,
        /// Exclusive upper bound in metres.
        high: f64,
    },

    /// Cell dimensions must be positive and finite.
    #[error("Pixel size must be positive and finite, got {x_m} x {y_m} m")]
    InvalidPixelSize {
        /// Cell width in metres.
        x_m: f64,
        /// Cell height in metres.
        y_m: f64,
    },

    /// Id buffer length does not match the grid dimensions.
    #[error("Classified grid has {found} cells, expected {expected}")]
    ShapeMismatch {
        /// `width * height`.
        expected: usize,
        /// Length of the id buffer.
        found: usize,
    },

    /// I/O error writing the area report.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
