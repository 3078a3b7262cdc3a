//! Elevation band definitions.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::{Result, ZoneError};

/// One elevation band: cells with `low <= elevation < high` get `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZoneBand {
    pub id: i32,
    pub name: String,
    /// Inclusive lower bound in metres.
    pub low: f64,
    /// Exclusive upper bound in metres.
    pub high: f64,
}

impl ZoneBand {
    pub fn new(id: i32, name: impl Into<String>, low: f64, high: f64) -> Self {
        Self {
            id,
            name: name.into(),
            low,
            high,
        }
    }

    /// True when `elevation` falls in `[low, high)`. NaN never matches.
    pub fn contains(&self, elevation: f64) -> bool {
        elevation >= self.low && elevation < self.high
    }

    fn overlaps(&self, other: &ZoneBand) -> bool {
        self.low < other.high && other.low < self.high
    }
}

/// Ordered, validated list of zone bands.
///
/// Order matters: when bands overlap, the later band wins during
/// classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ZoneTable {
    bands: Vec<ZoneBand>,
}

impl ZoneTable {
    /// Validate and build a table.
    ///
    /// Ids must be positive and unique, bounds finite with `low < high`.
    /// Overlapping bands are accepted with a warning.
    pub fn new(bands: Vec<ZoneBand>) -> Result<Self> {
        if bands.is_empty() {
            return Err(ZoneError::EmptyTable);
        }

        let mut seen = HashSet::new();
        for band in &bands {
            if band.id <= 0 {
                return Err(ZoneError::InvalidId(band.id));
            }
            if !seen.insert(band.id) {
                return Err(ZoneError::DuplicateId(band.id));
            }
            if !band.low.is_finite() || !band.high.is_finite() || band.low >= band.high {
                return Err(ZoneError::InvalidBounds {
                    id: band.id,
                    low: band.low,
                    high: band.high,
                });
            }
        }

        for (i, a) in bands.iter().enumerate() {
            for b in &bands[i + 1..] {
                if a.overlaps(b) {
                    warn!(
                        "Zones {} ({}) and {} ({}) overlap; {} takes precedence",
                        a.id, a.name, b.id, b.name, b.name
                    );
                }
            }
        }

        Ok(Self { bands })
    }

    pub fn bands(&self) -> &[ZoneBand] {
        &self.bands
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    pub fn get(&self, id: i32) -> Option<&ZoneBand> {
        self.bands.iter().find(|band| band.id == id)
    }

    /// Position of zone `id` in table order.
    pub fn position(&self, id: i32) -> Option<usize> {
        self.bands.iter().position(|band| band.id == id)
    }

    /// Display name for `id`, `"Unknown"` if the table does not define it.
    pub fn name(&self, id: i32) -> &str {
        self.get(id).map_or("Unknown", |band| band.name.as_str())
    }
}

impl Default for ZoneTable {
    /// The six Vancouver-area bands from sea level to 9000 m.
    fn default() -> Self {
        Self {
            bands: vec![
                ZoneBand::new(1, "Lowlands", 0.0, 200.0),
                ZoneBand::new(2, "Uplands", 200.0, 500.0),
                ZoneBand::new(3, "Highlands", 500.0, 1000.0),
                ZoneBand::new(4, "Hills", 1000.0, 2000.0),
                ZoneBand::new(5, "Mountains", 2000.0, 4000.0),
                ZoneBand::new(6, "High Mountains", 4000.0, 9000.0),
            ],
        }
    }
}

impl TryFrom<Vec<ZoneBand>> for ZoneTable {
    type Error = ZoneError;

    fn try_from(bands: Vec<ZoneBand>) -> Result<Self> {
        Self::new(bands)
    }
}

impl<'de> Deserialize<'de> for ZoneTable {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bands = Vec::<ZoneBand>::deserialize(deserializer)?;
        ZoneTable::new(bands).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let table = ZoneTable::default();
        assert_eq!(table.len(), 6);
        assert_eq!(table.name(4), "Hills");
        assert_eq!(table.name(42), "Unknown");
        assert_eq!(table.position(6), Some(5));
        // The default table passes its own validation
        assert_eq!(ZoneTable::new(table.bands().to_vec()).unwrap(), table);
    }

    #[test]
    fn test_band_bounds() {
        let band = ZoneBand::new(1, "Lowlands", 0.0, 200.0);
        assert!(band.contains(0.0));
        assert!(band.contains(199.999));
        assert!(!band.contains(200.0));
        assert!(!band.contains(-0.5));
        assert!(!band.contains(f64::NAN));
    }

    #[test]
    fn test_validation() {
        assert!(matches!(ZoneTable::new(vec![]), Err(ZoneError::EmptyTable)));
        assert!(matches!(
            ZoneTable::new(vec![ZoneBand::new(0, "zero", 0.0, 1.0)]),
            Err(ZoneError::InvalidId(0))
        ));
        assert!(matches!(
            ZoneTable::new(vec![
                ZoneBand::new(1, "a", 0.0, 1.0),
                ZoneBand::new(1, "b", 1.0, 2.0)
            ]),
            Err(ZoneError::DuplicateId(1))
        ));
        assert!(matches!(
            ZoneTable::new(vec![ZoneBand::new(1, "flat", 5.0, 5.0)]),
            Err(ZoneError::InvalidBounds { id: 1, .. })
        ));
        assert!(matches!(
            ZoneTable::new(vec![ZoneBand::new(1, "inf", 0.0, f64::INFINITY)]),
            Err(ZoneError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn test_overlap_allowed() {
        let table = ZoneTable::new(vec![
            ZoneBand::new(1, "wide", 0.0, 100.0),
            ZoneBand::new(2, "narrow", 50.0, 60.0),
        ]);
        assert!(table.is_ok());
    }

    #[test]
    fn test_yaml_roundtrip_validates() {
        let yaml = "- { id: 1, name: Low, low: 0, high: 10 }\n- { id: 2, name: High, low: 10, high: 20 }\n";
        let table: ZoneTable = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(table.name(2), "High");

        let back = serde_yaml::to_string(&table).unwrap();
        assert_eq!(serde_yaml::from_str::<ZoneTable>(&back).unwrap(), table);

        let bad = "- { id: -3, name: Neg, low: 0, high: 10 }\n";
        assert!(serde_yaml::from_str::<ZoneTable>(bad).is_err());
    }
}
