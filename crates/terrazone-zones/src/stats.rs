//! Pixel counting and area conversion.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ClassifiedGrid, Result, ZoneError, ZoneTable};

/// Ground size of one raster cell in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PixelSize {
    pub x_m: f64,
    pub y_m: f64,
}

impl Default for PixelSize {
    /// ASTER GDEM's nominal 30 m posting.
    fn default() -> Self {
        Self { x_m: 30.0, y_m: 30.0 }
    }
}

impl PixelSize {
    pub fn new(x_m: f64, y_m: f64) -> Result<Self> {
        let size = Self { x_m, y_m };
        size.validate()?;
        Ok(size)
    }

    pub fn validate(&self) -> Result<()> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if ok(self.x_m) && ok(self.y_m) {
            Ok(())
        } else {
            Err(ZoneError::InvalidPixelSize {
                x_m: self.x_m,
                y_m: self.y_m,
            })
        }
    }

    /// Cell area in km².
    pub fn area_km2(&self) -> f64 {
        self.x_m * self.y_m / 1e6
    }
}

/// Cell count and area of one zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneArea {
    pub id: i32,
    pub name: String,
    pub pixel_count: u64,
    pub area_km2: f64,
}

/// Area summary of a classified grid.
///
/// `zones` lists only ids that occur, in ascending id order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneStatistics {
    pub zones: Vec<ZoneArea>,
    pub unclassified_count: u64,
    pub total_count: u64,
    pub pixel_area_km2: f64,
}

impl ZoneStatistics {
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Sum of all zone areas in km².
    pub fn classified_area_km2(&self) -> f64 {
        self.zones.iter().map(|zone| zone.area_km2).sum()
    }

    pub fn zone(&self, id: i32) -> Option<&ZoneArea> {
        self.zones.iter().find(|zone| zone.id == id)
    }
}

/// Count cells per zone and convert the counts to km².
///
/// Cells with an id of zero or below are counted as unclassified. Areas are
/// not rounded.
pub fn aggregate(classified: &ClassifiedGrid, table: &ZoneTable, pixel: PixelSize) -> ZoneStatistics {
    let mut counts: BTreeMap<i32, u64> = BTreeMap::new();
    let mut unclassified_count = 0u64;

    for &id in classified.ids() {
        if id > 0 {
            *counts.entry(id).or_default() += 1;
        } else {
            unclassified_count += 1;
        }
    }

    let pixel_area_km2 = pixel.area_km2();
    let zones = counts
        .into_iter()
        .map(|(id, pixel_count)| ZoneArea {
            id,
            name: table.name(id).to_string(),
            pixel_count,
            area_km2: pixel_count as f64 * pixel_area_km2,
        })
        .collect();

    ZoneStatistics {
        zones,
        unclassified_count,
        total_count: classified.len() as u64,
        pixel_area_km2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pixel_area() {
        assert_relative_eq!(PixelSize::default().area_km2(), 0.0009);
        assert!(PixelSize::new(0.0, 30.0).is_err());
        assert!(PixelSize::new(30.0, f64::NAN).is_err());
    }

    #[test]
    fn test_aggregate_counts() {
        let grid = ClassifiedGrid::from_ids(3, 2, vec![-1, 1, 2, 3, 4, 5]).unwrap();
        let stats = aggregate(&grid, &ZoneTable::default(), PixelSize::default());

        let ids: Vec<i32> = stats.zones.iter().map(|z| z.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        for zone in &stats.zones {
            assert_eq!(zone.pixel_count, 1);
            assert_relative_eq!(zone.area_km2, 0.0009);
        }
        assert_eq!(stats.unclassified_count, 1);
        assert_eq!(stats.total_count, 6);
    }

    #[test]
    fn test_counts_partition_total() {
        let ids = vec![3, 3, -1, 1, 6, 6, 6, -1, 2, 0];
        let grid = ClassifiedGrid::from_ids(5, 2, ids).unwrap();
        let stats = aggregate(&grid, &ZoneTable::default(), PixelSize::default());

        let classified: u64 = stats.zones.iter().map(|z| z.pixel_count).sum();
        assert_eq!(classified + stats.unclassified_count, stats.total_count);
        assert_eq!(stats.zone(6).unwrap().pixel_count, 3);
        assert_relative_eq!(stats.classified_area_km2(), 7.0 * 0.0009, epsilon = 1e-12);
    }

    #[test]
    fn test_unknown_zone_name() {
        let grid = ClassifiedGrid::from_ids(2, 1, vec![1, 17]).unwrap();
        let stats = aggregate(&grid, &ZoneTable::default(), PixelSize::default());
        assert_eq!(stats.zone(17).unwrap().name, "Unknown");
    }

    #[test]
    fn test_all_unclassified() {
        let grid = ClassifiedGrid::from_ids(2, 2, vec![-1; 4]).unwrap();
        let stats = aggregate(&grid, &ZoneTable::default(), PixelSize::new(10.0, 10.0).unwrap());
        assert!(stats.is_empty());
        assert_eq!(stats.unclassified_count, 4);
        assert_relative_eq!(stats.pixel_area_km2, 0.0001);
    }
}
