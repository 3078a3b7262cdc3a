//! # terrazone-zones
//!
//! Terrain zone classification and area statistics.
//!
//! An elevation grid is classified against an ordered [`ZoneTable`] of
//! half-open elevation bands. The resulting [`ClassifiedGrid`] holds one
//! zone id per cell, with [`UNCLASSIFIED`] (`-1`) for nodata, NaN and
//! out-of-range cells. [`aggregate`] turns it into per-zone pixel counts and
//! areas, and [`write_report`] prints them.
//!
//! ```
//! use terrazone_dem::ElevationGrid;
//! use terrazone_zones::{aggregate, classify, PixelSize, ZoneTable};
//!
//! let values = [-5.0, 50.0, 250.0, 600.0, 1500.0, 3000.0];
//! let grid = ElevationGrid::new(3, 2, &values)?;
//! let table = ZoneTable::default();
//!
//! let classified = classify(&grid, &table);
//! assert_eq!(classified.ids(), &[-1, 1, 2, 3, 4, 5]);
//!
//! let stats = aggregate(&classified, &table, PixelSize::default());
//! assert_eq!(stats.zones.len(), 5);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod classify;
mod error;
mod report;
mod stats;
mod table;

pub use classify::{classify, ClassifiedGrid, UNCLASSIFIED};
pub use error::ZoneError;
pub use report::write_report;
pub use stats::{aggregate, PixelSize, ZoneArea, ZoneStatistics};
pub use table::{ZoneBand, ZoneTable};

/// Result type for zone operations.
pub type Result<T> = std::result::Result<T, ZoneError>;
