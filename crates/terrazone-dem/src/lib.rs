//! # terrazone-dem
//!
//! GeoTIFF elevation tile loading and mosaicking.
//!
//! This crate provides:
//! - Tile discovery in a directory, filtered by file extension
//! - GeoTIFF header decoding (size, affine transform, nodata, EPSG code)
//! - Merging any number of tiles into one raster covering their union
//! - A borrowed [`ElevationGrid`] view of the merged first band
//! - Single-band `Float32` GeoTIFF output
//! - A small CRS model (EPSG code or proj4 string) with user overrides
//!
//! ## Merge rules
//!
//! The mosaic uses the first tile's resolution and covers the union of all
//! tile extents. Where tiles overlap, the first tile (in input order) with a
//! valid sample wins, so a ground location is never counted twice. Cells no
//! tile covers are marked invalid and hold the first tile's nodata value, or
//! NaN if it declares none.
//!
//! ## Example
//!
//! ```no_run
//! use terrazone_dem::{discover_tiles, merge, open_tiles};
//!
//! let paths = discover_tiles("vancouver_aster_tiles", "tif")?;
//! let mosaic = merge(open_tiles(&paths)?)?;
//!
//! let grid = mosaic.elevation();
//! println!(
//!     "{}x{} cells, {} valid, range {:?}",
//!     grid.width(),
//!     grid.height(),
//!     mosaic.valid_count(),
//!     grid.valid_range()
//! );
//! # Ok::<(), terrazone_dem::DemError>(())
//! ```

mod crs;
mod error;
mod grid;
mod loader;
mod mosaic;
mod tile;
mod transform;
mod writer;

pub use crs::{Crs, CrsRegistry, WGS84};
pub use error::DemError;
pub use grid::ElevationGrid;
pub use loader::{discover_tiles, open_tiles};
pub use mosaic::{merge, Mosaic};
pub use tile::RasterTile;
pub use transform::{Bounds, GeoTransform};
pub use writer::write_geotiff;

/// Result type for DEM operations.
pub type Result<T> = std::result::Result<T, DemError>;
