//! # terrazone-boundary
//!
//! Vector boundary loading from GeoJSON and reprojection with `proj4rs`.
//!
//! GeoJSON coordinates are WGS 84 longitude/latitude unless the document
//! carries a legacy `crs` member, which is honoured when present:
//!
//! ```json
//! { "type": "FeatureCollection",
//!   "crs": { "type": "name", "properties": { "name": "urn:ogc:def:crs:EPSG::26910" } },
//!   "features": [ ... ] }
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use terrazone_boundary::Boundary;
//! use terrazone_dem::{Crs, CrsRegistry};
//!
//! let mut boundary = Boundary::from_geojson_file("local-area-boundary.geojson")?;
//! let changed = boundary.reproject_in_place(&Crs::Epsg(32610), &CrsRegistry::new())?;
//! println!("reprojected: {}, extent: {:?}", changed, boundary.bounding_rect());
//! # Ok::<(), terrazone_boundary::BoundaryError>(())
//! ```

mod error;

use std::path::Path;

use geo_types::{Coord, Geometry, Rect};
use geojson::{GeoJson, JsonObject};
use proj4rs::transform::{transform, Transform};
use proj4rs::Proj;
use terrazone_dem::{Crs, CrsRegistry, WGS84};
use tracing::{debug, info, warn};

pub use error::BoundaryError;

/// Result type for boundary operations.
pub type Result<T> = std::result::Result<T, BoundaryError>;

/// A set of geometries sharing one coordinate reference system.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    geometries: Vec<Geometry<f64>>,
    crs: Crs,
}

impl Boundary {
    pub fn new(geometries: Vec<Geometry<f64>>, crs: Crs) -> Self {
        Self { geometries, crs }
    }

    /// Load a boundary from a GeoJSON file.
    pub fn from_geojson_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| BoundaryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let boundary = Self::from_geojson_str(&text)?;
        info!(
            "Loaded boundary {} ({} geometr{}, {})",
            path.display(),
            boundary.len(),
            if boundary.len() == 1 { "y" } else { "ies" },
            boundary.crs
        );
        Ok(boundary)
    }

    /// Parse a FeatureCollection, a single Feature or a bare Geometry.
    ///
    /// Features without geometry are skipped.
    pub fn from_geojson_str(text: &str) -> Result<Self> {
        let geojson: GeoJson = text.parse()?;

        let (raw, members) = match geojson {
            GeoJson::FeatureCollection(collection) => {
                let mut geometries = Vec::with_capacity(collection.features.len());
                for (index, feature) in collection.features.into_iter().enumerate() {
                    match feature.geometry {
                        Some(geometry) => geometries.push(geometry),
                        None => warn!("Skipping boundary feature {} without geometry", index),
                    }
                }
                (geometries, collection.foreign_members)
            }
            GeoJson::Feature(feature) => match feature.geometry {
                Some(geometry) => (vec![geometry], feature.foreign_members),
                None => {
                    warn!("Boundary feature has no geometry");
                    (Vec::new(), feature.foreign_members)
                }
            },
            GeoJson::Geometry(geometry) => {
                let members = geometry.foreign_members.clone();
                (vec![geometry], members)
            }
        };

        let crs = match members.as_ref().and_then(|m| m.get("crs")) {
            Some(_) => crs_from_members(members.as_ref())?,
            None => WGS84,
        };

        let geometries = raw
            .into_iter()
            .map(Geometry::<f64>::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!("Parsed {} boundary geometries in {}", geometries.len(), crs);
        Ok(Self { geometries, crs })
    }

    pub fn geometries(&self) -> &[Geometry<f64>] {
        &self.geometries
    }

    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    /// Total number of vertices over all geometries.
    pub fn vertex_count(&self) -> usize {
        let mut count = 0;
        self.for_each_vertex(|_, _| count += 1);
        count
    }

    /// Extent of all vertices, `None` for an empty boundary.
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        let mut extent: Option<(Coord<f64>, Coord<f64>)> = None;
        self.for_each_vertex(|x, y| {
            extent = Some(match extent {
                Some((min, max)) => (
                    Coord { x: min.x.min(x), y: min.y.min(y) },
                    Coord { x: max.x.max(x), y: max.y.max(y) },
                ),
                None => (Coord { x, y }, Coord { x, y }),
            });
        });
        extent.map(|(min, max)| Rect::new(min, max))
    }

    /// Reproject every vertex into `target`.
    ///
    /// EPSG codes resolve through `registry` first, then through the EPSG
    /// database bundled with proj4rs. Returns `false` without touching any
    /// coordinate when the boundary is already in `target`. On error the
    /// boundary may be partially transformed and should be discarded.
    pub fn reproject_in_place(&mut self, target: &Crs, registry: &CrsRegistry) -> Result<bool> {
        if &self.crs == target {
            debug!("Boundary already in {}, no reprojection needed", target);
            return Ok(false);
        }

        let source = resolve(&self.crs, registry)?;
        let destination = resolve(target, registry)?;
        let (from_degrees, to_degrees) = (source.is_latlong(), destination.is_latlong());

        // proj4rs works in radians for geographic systems
        let mut project = |x: f64, y: f64, z: f64| -> proj4rs::errors::Result<(f64, f64, f64)> {
            let mut point = if from_degrees {
                (x.to_radians(), y.to_radians(), z)
            } else {
                (x, y, z)
            };
            transform(&source, &destination, &mut point)?;
            if to_degrees {
                point.0 = point.0.to_degrees();
                point.1 = point.1.to_degrees();
            }
            Ok(point)
        };
        for geometry in &mut self.geometries {
            geometry.transform_coordinates(&mut project)?;
        }

        info!("Reprojected boundary from {} to {}", self.crs, target);
        self.crs = target.clone();
        Ok(true)
    }

    fn for_each_vertex<F: FnMut(f64, f64)>(&self, mut f: F) {
        let mut visit = |x: f64, y: f64, z: f64| -> proj4rs::errors::Result<(f64, f64, f64)> {
            f(x, y);
            Ok((x, y, z))
        };
        for geometry in &self.geometries {
            // The visitor never fails and leaves the copy unchanged
            let _ = geometry.clone().transform_coordinates(&mut visit);
        }
    }
}

/// Projection for `crs`: a registered or inline proj4 definition, else the
/// EPSG database.
fn resolve(crs: &Crs, registry: &CrsRegistry) -> Result<Proj> {
    if let Some(definition) = registry.definition(crs) {
        return Ok(Proj::from_proj_string(definition)?);
    }
    let code = crs
        .epsg()
        .ok_or_else(|| BoundaryError::UnsupportedCrs(crs.clone()))?;
    Proj::from_epsg_code(code).map_err(|e| match e {
        proj4rs::errors::Error::ProjectionNotFound => BoundaryError::UnsupportedCrs(crs.clone()),
        other => other.into(),
    })
}

/// Read the legacy `crs` member: `{"type": "name", "properties": {"name": ...}}`.
fn crs_from_members(members: Option<&JsonObject>) -> Result<Crs> {
    let member = members.and_then(|m| m.get("crs"));
    let name = member
        .and_then(|crs| crs.get("properties"))
        .and_then(|properties| properties.get("name"))
        .and_then(|name| name.as_str())
        .ok_or_else(|| {
            BoundaryError::InvalidCrs(member.map(|m| m.to_string()).unwrap_or_default())
        })?;

    name.parse::<Crs>()
        .map_err(|_| BoundaryError::InvalidCrs(name.to_string()))
}
