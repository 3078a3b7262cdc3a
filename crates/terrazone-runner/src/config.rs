//! Run configuration.
//!
//! Every field has a default, so an empty YAML document (or no file at all)
//! reproduces the Vancouver analysis:
//!
//! ```yaml
//! region: Vancouver Region
//! boundary: local-area-boundary.geojson
//! tiles:
//!   dir: vancouver_aster_tiles
//!   extension: tif
//! output:
//!   dir: figures
//!   map: terrain_map.png
//!   chart: terrain_area.png
//!   summary: terrain_area.json
//!   create_dir: false
//! pixel_size: { x_m: 30.0, y_m: 30.0 }
//! render:
//!   azimuth_deg: 315.0
//!   altitude_deg: 45.0
//!   hillshade_alpha: 0.5
//!   unclassified_color: [128, 128, 128]
//!   chart_width: 1000
//!   chart_height: 600
//! show: false
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use terrazone_dem::CrsRegistry;
use terrazone_render::{ChartOptions, MapOptions};
use terrazone_zones::{PixelSize, ZoneTable};

use crate::ConfigError;

/// Where to find the elevation tiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TileSource {
    pub dir: PathBuf,
    /// File extension without the dot, matched case-insensitively.
    pub extension: String,
}

impl Default for TileSource {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("vancouver_aster_tiles"),
            extension: "tif".to_string(),
        }
    }
}

/// Output file locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub map: String,
    pub chart: String,
    pub summary: String,
    /// Also write the merged elevation mosaic as a GeoTIFF.
    pub mosaic: Option<String>,
    /// Create `dir` if missing instead of failing.
    pub create_dir: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("figures"),
            map: "terrain_map.png".to_string(),
            chart: "terrain_area.png".to_string(),
            summary: "terrain_area.json".to_string(),
            mosaic: None,
            create_dir: false,
        }
    }
}

impl OutputConfig {
    pub fn map_path(&self) -> PathBuf {
        self.dir.join(&self.map)
    }

    pub fn chart_path(&self) -> PathBuf {
        self.dir.join(&self.chart)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.dir.join(&self.summary)
    }

    pub fn mosaic_path(&self) -> Option<PathBuf> {
        self.mosaic.as_ref().map(|name| self.dir.join(name))
    }
}

/// Figure appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub azimuth_deg: f64,
    pub altitude_deg: f64,
    pub hillshade_alpha: f64,
    pub unclassified_color: [u8; 3],
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let map = MapOptions::default();
        let chart = ChartOptions::default();
        Self {
            azimuth_deg: map.azimuth_deg,
            altitude_deg: map.altitude_deg,
            hillshade_alpha: map.hillshade_alpha,
            unclassified_color: map.unclassified_color,
            chart_width: chart.width,
            chart_height: chart.height,
        }
    }
}

/// Complete configuration of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Region name used in the report header.
    pub region: String,
    /// GeoJSON boundary file.
    pub boundary: PathBuf,
    pub tiles: TileSource,
    pub output: OutputConfig,
    pub pixel_size: PixelSize,
    pub zones: ZoneTable,
    pub render: RenderConfig,
    /// Open the figures in the system viewer after saving.
    pub show: bool,
    /// Extra proj4 definitions by EPSG code.
    pub crs_definitions: BTreeMap<u16, String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            region: "Vancouver Region".to_string(),
            boundary: PathBuf::from("local-area-boundary.geojson"),
            tiles: TileSource::default(),
            output: OutputConfig::default(),
            pixel_size: PixelSize::default(),
            zones: ZoneTable::default(),
            render: RenderConfig::default(),
            show: false,
            crs_definitions: BTreeMap::new(),
        }
    }
}

impl RunConfig {
    /// Load from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Parse YAML. An empty document yields the defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Check the settings that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pixel_size.validate()?;
        self.map_options().validate()?;
        self.chart_options().validate()?;

        if self.tiles.extension.trim_start_matches('.').is_empty() {
            return Err(ConfigError::Invalid("tiles.extension is empty".into()));
        }
        for (field, name) in [
            ("output.map", &self.output.map),
            ("output.chart", &self.output.chart),
            ("output.summary", &self.output.summary),
        ] {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} is empty", field)));
            }
        }
        for (code, definition) in &self.crs_definitions {
            if !definition.trim_start().starts_with('+') {
                return Err(ConfigError::Invalid(format!(
                    "crs_definitions.{} is not a proj4 string: {}",
                    code, definition
                )));
            }
        }
        Ok(())
    }

    /// CRS registry with the configured definitions added.
    pub fn registry(&self) -> CrsRegistry {
        self.crs_definitions
            .iter()
            .fold(CrsRegistry::new(), |registry, (code, definition)| {
                registry.with_definition(*code, definition.clone())
            })
    }

    pub fn map_options(&self) -> MapOptions {
        MapOptions {
            azimuth_deg: self.render.azimuth_deg,
            altitude_deg: self.render.altitude_deg,
            hillshade_alpha: self.render.hillshade_alpha,
            unclassified_color: self.render.unclassified_color,
            title: Some(format!("Terrain Zones – {}", self.region)),
            ..MapOptions::default()
        }
    }

    pub fn chart_options(&self) -> ChartOptions {
        ChartOptions {
            width: self.render.chart_width,
            height: self.render.chart_height,
            fallback_color: self.render.unclassified_color,
            title: Some(format!("Terrain Zone Area – {}", self.region)),
            ..ChartOptions::default()
        }
    }
}
