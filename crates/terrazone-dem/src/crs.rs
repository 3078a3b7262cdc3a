//! Coordinate reference systems and their proj4 definitions.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::{DemError, Result};

/// A coordinate reference system, identified by EPSG code or proj4 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Crs {
    /// EPSG registry code.
    Epsg(u16),
    /// Raw proj4 definition.
    Proj(String),
}

/// WGS 84 geographic, the GeoJSON default.
pub const WGS84: Crs = Crs::Epsg(4326);

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crs::Epsg(code) => write!(f, "EPSG:{}", code),
            Crs::Proj(def) => write!(f, "{}", def),
        }
    }
}

impl FromStr for Crs {
    type Err = DemError;

    /// Parse `EPSG:3857`, OGC URNs (`urn:ogc:def:crs:EPSG::3857`,
    /// `urn:ogc:def:crs:OGC:1.3:CRS84`) or a proj4 string.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.starts_with('+') {
            return Ok(Crs::Proj(s.to_string()));
        }

        let upper = s.to_ascii_uppercase();
        if upper.ends_with("CRS84") {
            return Ok(WGS84);
        }

        // Last colon-separated field is the code for both EPSG:XXXX and URNs
        if upper.starts_with("EPSG:") || upper.starts_with("URN:OGC:DEF:CRS:EPSG:") {
            let code = upper
                .rsplit(':')
                .next()
                .and_then(|c| c.parse::<u16>().ok())
                .ok_or_else(|| DemError::InvalidCrs(s.to_string()))?;
            return Ok(Crs::Epsg(code));
        }

        Err(DemError::InvalidCrs(s.to_string()))
    }
}

impl Crs {
    /// EPSG code, if this CRS is registry-based.
    pub fn epsg(&self) -> Option<u16> {
        match self {
            Crs::Epsg(code) => Some(*code),
            Crs::Proj(_) => None,
        }
    }
}

/// User-supplied proj4 definitions that take precedence over the EPSG
/// database bundled with the projection library.
///
/// Only codes registered with [`CrsRegistry::with_definition`] are resolved
/// here; every other EPSG code is left to the projection backend.
#[derive(Debug, Clone, Default)]
pub struct CrsRegistry {
    definitions: HashMap<u16, String>,
}

impl CrsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or override) the proj4 definition of an EPSG code.
    pub fn with_definition(mut self, code: u16, proj: impl Into<String>) -> Self {
        self.definitions.insert(code, proj.into());
        self
    }

    /// Explicit proj4 definition for `crs`: the string itself for
    /// [`Crs::Proj`], a registered override for [`Crs::Epsg`], otherwise
    /// `None`.
    pub fn definition<'a>(&'a self, crs: &'a Crs) -> Option<&'a str> {
        match crs {
            Crs::Proj(def) => Some(def.as_str()),
            Crs::Epsg(code) => self.definitions.get(code).map(String::as_str),
        }
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_crs() {
        assert_eq!("EPSG:3857".parse::<Crs>().unwrap(), Crs::Epsg(3857));
        assert_eq!("epsg:32610".parse::<Crs>().unwrap(), Crs::Epsg(32610));
        assert_eq!(
            "urn:ogc:def:crs:EPSG::26910".parse::<Crs>().unwrap(),
            Crs::Epsg(26910)
        );
        assert_eq!(
            "urn:ogc:def:crs:EPSG:6.6:4326".parse::<Crs>().unwrap(),
            WGS84
        );
        assert_eq!("urn:ogc:def:crs:OGC:1.3:CRS84".parse::<Crs>().unwrap(), WGS84);
        assert_eq!(
            "+proj=longlat +datum=WGS84".parse::<Crs>().unwrap(),
            Crs::Proj("+proj=longlat +datum=WGS84".to_string())
        );
        assert!("EPSG:abc".parse::<Crs>().is_err());
        assert!("mystery".parse::<Crs>().is_err());
    }

    #[test]
    fn test_registry_only_resolves_overrides() {
        let registry = CrsRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.definition(&Crs::Epsg(32610)), None);

        let proj = Crs::Proj("+proj=longlat +datum=WGS84".to_string());
        assert_eq!(registry.definition(&proj), Some("+proj=longlat +datum=WGS84"));
    }

    #[test]
    fn test_registry_override() {
        let registry = CrsRegistry::new().with_definition(2056, "+proj=somerc +custom");
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.definition(&Crs::Epsg(2056)),
            Some("+proj=somerc +custom")
        );
        assert_eq!(registry.definition(&Crs::Epsg(2057)), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Crs::Epsg(4326).to_string(), "EPSG:4326");
    }
}
