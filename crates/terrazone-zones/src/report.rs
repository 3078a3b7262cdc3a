//! Plain-text area report.

use std::io::Write;

use crate::{Result, ZoneStatistics};

/// Write the area report for `region`.
///
/// ```text
/// Area per Terrain Zone (Vancouver Region)
///
/// Lowlands: 512.37 km²
/// Uplands: 204.10 km²
/// ```
///
/// A statistics value without zones produces the header and blank line only.
pub fn write_report<W: Write>(out: &mut W, stats: &ZoneStatistics, region: &str) -> Result<()> {
    writeln!(out, "Area per Terrain Zone ({})", region)?;
    writeln!(out)?;
    for zone in &stats.zones {
        writeln!(out, "{}: {:.2} km²", zone.name, zone.area_km2)?;
    }
    out.flush()?;
    Ok(())
}
