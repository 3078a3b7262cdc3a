//! Merging tiles into one contiguous raster.

use tracing::{debug, info};

use crate::{Bounds, Crs, DemError, ElevationGrid, GeoTransform, RasterTile, Result};

/// A merged multi-band raster.
///
/// Bands are stored row-major, `width * height` values each. `valid` marks
/// cells that received data from a tile; every other cell holds
/// `fill_value`.
#[derive(Debug, Clone)]
pub struct Mosaic {
    width: usize,
    height: usize,
    bands: Vec<Vec<f32>>,
    valid: Vec<bool>,
    fill_value: f32,
    transform: GeoTransform,
    crs: Option<Crs>,
}

impl Mosaic {
    /// Assemble a mosaic from already merged parts.
    pub fn new(
        width: usize,
        height: usize,
        bands: Vec<Vec<f32>>,
        valid: Vec<bool>,
        fill_value: f32,
        transform: GeoTransform,
        crs: Option<Crs>,
    ) -> Result<Self> {
        let cells = width * height;
        if cells == 0
            || bands.is_empty()
            || valid.len() != cells
            || bands.iter().any(|band| band.len() != cells)
        {
            return Err(DemError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            bands,
            valid,
            fill_value,
            transform,
            crs,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// Band by zero-based index.
    pub fn band(&self, index: usize) -> Option<&[f32]> {
        self.bands.get(index).map(Vec::as_slice)
    }

    pub fn valid_mask(&self) -> &[bool] {
        &self.valid
    }

    /// Value written to cells no tile covered.
    pub fn fill_value(&self) -> f32 {
        self.fill_value
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn crs(&self) -> Option<&Crs> {
        self.crs.as_ref()
    }

    pub fn bounds(&self) -> Bounds {
        self.transform.bounds(self.width, self.height)
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    pub fn valid_count(&self) -> usize {
        self.valid.iter().filter(|v| **v).count()
    }

    /// Band 1 as an elevation grid, masked by cell validity.
    pub fn elevation(&self) -> ElevationGrid<'_> {
        ElevationGrid::from_parts(self.width, self.height, &self.bands[0], Some(&self.valid))
    }
}

/// Merge opened tiles into a single raster.
///
/// The output covers the union of all tile extents at the first tile's
/// resolution. Each output cell takes its values from the first tile (in
/// input order) that has a valid band-1 sample at the cell centre; cells no
/// tile covers stay invalid and hold the first tile's nodata value (NaN if
/// it has none).
///
/// Tiles are consumed: each one is decoded, pasted and dropped (closing its
/// file) before the next is read. On error the remaining tiles are dropped.
pub fn merge(tiles: Vec<RasterTile>) -> Result<Mosaic> {
    let first = tiles.first().ok_or(DemError::EmptyMerge)?;

    let band_count = first.band_count();
    let crs = first.crs().cloned();
    let fill_value = first.nodata().unwrap_or(f32::NAN);
    let (res_x, res_y) = first.transform().pixel_size();

    let mut bounds = first.bounds();
    for tile in &tiles {
        if tile.transform().is_rotated() {
            return Err(DemError::UnsupportedTransform {
                path: tile.path().to_path_buf(),
            });
        }
        if tile.band_count() != band_count {
            return Err(DemError::BandCountMismatch {
                path: tile.path().to_path_buf(),
                expected: band_count,
                found: tile.band_count(),
            });
        }
        if let (Some(expected), Some(found)) = (&crs, tile.crs()) {
            if expected != found {
                return Err(DemError::CrsMismatch {
                    path: tile.path().to_path_buf(),
                    expected: expected.clone(),
                    found: found.clone(),
                });
            }
        }
        bounds = bounds.union(&tile.bounds());
    }

    let width = ((bounds.width() / res_x).round() as usize).max(1);
    let height = ((bounds.height() / res_y).round() as usize).max(1);
    let transform = GeoTransform::north_up(bounds.left, bounds.top, res_x, res_y);
    let cells = width * height;

    info!(
        "Merging {} tile(s) into {}x{} mosaic ({} band(s), pixel {:.6} x {:.6})",
        tiles.len(),
        width,
        height,
        band_count,
        res_x,
        res_y
    );

    let mut canvas = Canvas {
        width,
        height,
        transform,
        bands: vec![vec![fill_value; cells]; band_count],
        valid: vec![false; cells],
    };

    for mut tile in tiles {
        let data = tile.read_bands()?;
        let filled = canvas.paste(&tile, &data);
        debug!(
            "Pasted {} ({} new cell(s))",
            tile.path().display(),
            filled
        );
    }

    Mosaic::new(
        width,
        height,
        canvas.bands,
        canvas.valid,
        fill_value,
        transform,
        crs,
    )
}

/// Output buffers while merging.
struct Canvas {
    width: usize,
    height: usize,
    transform: GeoTransform,
    bands: Vec<Vec<f32>>,
    valid: Vec<bool>,
}

impl Canvas {
    /// Copy the tile's samples into still-empty cells. Returns the number of
    /// cells filled.
    fn paste(&mut self, tile: &RasterTile, data: &[Vec<f32>]) -> usize {
        let (tile_width, tile_height) = tile.dimensions();
        let tile_transform = tile.transform();
        let (res_x, res_y) = self.transform.pixel_size();

        // Window of output cells that can overlap this tile
        let tb = tile.bounds();
        let col_start = (((tb.left - self.transform.c) / res_x).floor().max(0.0)) as usize;
        let col_end = (((tb.right - self.transform.c) / res_x).ceil().max(0.0) as usize).min(self.width);
        let row_start = (((self.transform.f - tb.top) / res_y).floor().max(0.0)) as usize;
        let row_end = (((self.transform.f - tb.bottom) / res_y).ceil().max(0.0) as usize).min(self.height);

        let mut filled = 0;
        for row in row_start..row_end {
            for col in col_start..col_end {
                let out = row * self.width + col;
                if self.valid[out] {
                    continue;
                }

                let (x, y) = self.transform.apply(col as f64 + 0.5, row as f64 + 0.5);
                let (tc, tr) = tile_transform.invert_north_up(x, y);
                if tc < 0.0 || tr < 0.0 {
                    continue;
                }
                let (tc, tr) = (tc.floor() as usize, tr.floor() as usize);
                if tc >= tile_width || tr >= tile_height {
                    continue;
                }

                let src = tr * tile_width + tc;
                if !tile.is_valid_value(data[0][src]) {
                    continue;
                }

                for (band, values) in self.bands.iter_mut().zip(data) {
                    band[out] = values[src];
                }
                self.valid[out] = true;
                filled += 1;
            }
        }
        filled
    }
}
