//! Per-cell zone assignment.

use terrazone_dem::ElevationGrid;
use tracing::debug;

use crate::{Result, ZoneError, ZoneTable};

/// Zone id marking cells outside every band, NaN or nodata.
pub const UNCLASSIFIED: i32 = -1;

/// Zone ids laid out like the elevation grid they were computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedGrid {
    width: usize,
    height: usize,
    ids: Vec<i32>,
}

impl ClassifiedGrid {
    /// Wrap precomputed ids (row-major, `width * height`).
    pub fn from_ids(width: usize, height: usize, ids: Vec<i32>) -> Result<Self> {
        if ids.len() != width * height {
            return Err(ZoneError::ShapeMismatch {
                expected: width * height,
                found: ids.len(),
            });
        }
        Ok(Self { width, height, ids })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn ids(&self) -> &[i32] {
        &self.ids
    }

    pub fn get(&self, row: usize, col: usize) -> i32 {
        self.ids[row * self.width + col]
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Assign every cell the id of the band containing its elevation.
///
/// Bands are applied in table order, so with overlapping bands the last one
/// wins. Invalid cells (masked or NaN) and values outside every band stay
/// [`UNCLASSIFIED`].
pub fn classify(grid: &ElevationGrid<'_>, table: &ZoneTable) -> ClassifiedGrid {
    let mut ids = vec![UNCLASSIFIED; grid.len()];

    for band in table.bands() {
        let mut assigned = 0usize;
        for (index, (id, &value)) in ids.iter_mut().zip(grid.values()).enumerate() {
            if grid.is_valid(index) && band.contains(value as f64) {
                *id = band.id;
                assigned += 1;
            }
        }
        debug!("Zone {} ({}): {} cell(s)", band.id, band.name, assigned);
    }

    ClassifiedGrid {
        width: grid.width(),
        height: grid.height(),
        ids,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ZoneBand;

    #[test]
    fn test_classify_default_bands() {
        let values = [-5.0, 50.0, 250.0, 600.0, 1500.0, 5000.0];
        let grid = ElevationGrid::new(3, 2, &values).unwrap();
        let classified = classify(&grid, &ZoneTable::default());

        assert_eq!(classified.ids(), &[-1, 1, 2, 3, 4, 6]);
        assert_eq!(classified.get(1, 0), 3);
    }

    #[test]
    fn test_band_edges() {
        let values = [0.0, 200.0, 8999.9, 9000.0, f32::NAN, -0.1];
        let grid = ElevationGrid::new(6, 1, &values).unwrap();
        let classified = classify(&grid, &ZoneTable::default());

        assert_eq!(classified.ids(), &[1, 2, 6, -1, -1, -1]);
    }

    #[test]
    fn test_masked_cells_unclassified() {
        let values = [100.0, 100.0];
        let mask = [true, false];
        let grid = ElevationGrid::new(2, 1, &values)
            .unwrap()
            .with_mask(&mask)
            .unwrap();

        let classified = classify(&grid, &ZoneTable::default());
        assert_eq!(classified.ids(), &[1, UNCLASSIFIED]);
    }

    #[test]
    fn test_overlap_last_band_wins() {
        let table = ZoneTable::new(vec![
            ZoneBand::new(1, "wide", 0.0, 100.0),
            ZoneBand::new(2, "narrow", 50.0, 60.0),
        ])
        .unwrap();
        let values = [10.0, 55.0, 70.0];
        let grid = ElevationGrid::new(3, 1, &values).unwrap();

        assert_eq!(classify(&grid, &table).ids(), &[1, 2, 1]);
    }

    #[test]
    fn test_idempotent() {
        let values: Vec<f32> = (0..100).map(|i| i as f32 * 97.0 - 300.0).collect();
        let grid = ElevationGrid::new(10, 10, &values).unwrap();
        let table = ZoneTable::default();

        assert_eq!(classify(&grid, &table), classify(&grid, &table));
    }

    #[test]
    fn test_from_ids_shape() {
        assert!(ClassifiedGrid::from_ids(2, 2, vec![1, 2, 3]).is_err());
        assert_eq!(ClassifiedGrid::from_ids(1, 2, vec![1, -1]).unwrap().len(), 2);
    }
}
