//! Single GeoTIFF elevation tile.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::tags::Tag;
use tracing::debug;

use crate::{Bounds, Crs, DemError, GeoTransform, Result};

const GT_RASTER_TYPE_GEO_KEY: u16 = 1025;
const GEOGRAPHIC_TYPE_GEO_KEY: u16 = 2048;
const PROJECTED_CS_TYPE_GEO_KEY: u16 = 3072;
const RASTER_PIXEL_IS_POINT: u16 = 2;
const USER_DEFINED: u16 = 32767;

/// An opened GeoTIFF tile.
///
/// Opening decodes only the header (size, georeferencing, nodata, CRS); the
/// pixels are decoded by [`RasterTile::read_bands`]. The underlying file stays
/// open for the lifetime of the value and is closed when it is dropped.
pub struct RasterTile {
    path: PathBuf,
    decoder: Decoder<BufReader<File>>,
    width: usize,
    height: usize,
    band_count: usize,
    transform: GeoTransform,
    nodata: Option<f32>,
    crs: Option<Crs>,
}

impl fmt::Debug for RasterTile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterTile")
            .field("path", &self.path)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("band_count", &self.band_count)
            .field("transform", &self.transform)
            .field("nodata", &self.nodata)
            .field("crs", &self.crs)
            .finish()
    }
}

impl RasterTile {
    /// Open a GeoTIFF tile and decode its header.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut decoder = Decoder::new(BufReader::new(file))?;

        // ASTER and USGS tiles can be several hundred MB decoded
        let mut limits = Limits::default();
        limits.decoding_buffer_size = 1024 * 1024 * 1024; // 1 GB
        limits.intermediate_buffer_size = 1024 * 1024 * 1024; // 1 GB
        limits.ifd_value_size = 1024 * 1024 * 1024;
        decoder = decoder.with_limits(limits);

        let (width, height) = decoder.dimensions()?;
        let (width, height) = (width as usize, height as usize);
        if width == 0 || height == 0 {
            return Err(DemError::InvalidDimensions { width, height });
        }

        let samples = decoder
            .find_tag_unsigned::<u16>(Tag::SamplesPerPixel)?
            .unwrap_or(1) as usize;
        let planar = decoder
            .find_tag_unsigned::<u16>(Tag::PlanarConfiguration)?
            .unwrap_or(1)
            == 2;
        // The decoder only exposes the first plane of planar images
        let band_count = if planar { 1 } else { samples.max(1) };

        let geo_keys = read_geo_keys(&mut decoder);
        let transform = read_transform(&mut decoder, &geo_keys, path)?;
        let nodata = read_nodata_value(&mut decoder);
        let crs = crs_from_geo_keys(&geo_keys);

        debug!(
            path = %path.display(),
            width,
            height,
            band_count,
            ?nodata,
            ?crs,
            "opened tile"
        );

        Ok(Self {
            path: path.to_path_buf(),
            decoder,
            width,
            height,
            band_count,
            transform,
            nodata,
            crs,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size in pixels as `(width, height)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn band_count(&self) -> usize {
        self.band_count
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    /// Value marking missing cells, from the `GDAL_NODATA` tag.
    pub fn nodata(&self) -> Option<f32> {
        self.nodata
    }

    /// CRS declared by the GeoKey directory, if any.
    pub fn crs(&self) -> Option<&Crs> {
        self.crs.as_ref()
    }

    pub fn bounds(&self) -> Bounds {
        self.transform.bounds(self.width, self.height)
    }

    /// True for values that hold a real measurement.
    pub fn is_valid_value(&self, value: f32) -> bool {
        if value.is_nan() {
            return false;
        }
        match self.nodata {
            Some(nodata) => value != nodata,
            None => true,
        }
    }

    /// Decode all pixels, returning one row-major `Vec<f32>` per band.
    pub fn read_bands(&mut self) -> Result<Vec<Vec<f32>>> {
        let samples = decode_samples(&mut self.decoder)?;
        let cells = self.width * self.height;

        if samples.len() < cells * self.band_count {
            return Err(DemError::InvalidGeoTiff {
                path: self.path.clone(),
                reason: format!(
                    "decoded {} samples, expected {}",
                    samples.len(),
                    cells * self.band_count
                ),
            });
        }

        if self.band_count == 1 {
            let mut samples = samples;
            samples.truncate(cells);
            return Ok(vec![samples]);
        }

        let mut bands = vec![Vec::with_capacity(cells); self.band_count];
        for pixel in samples.chunks_exact(self.band_count).take(cells) {
            for (band, &value) in bands.iter_mut().zip(pixel) {
                band.push(value);
            }
        }
        Ok(bands)
    }
}

/// Decode the image samples, converting any sample type to `f32`.
fn decode_samples<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<Vec<f32>> {
    let result = decoder.read_image()?;

    match result {
        DecodingResult::F32(data) => Ok(data),
        DecodingResult::F64(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
        DecodingResult::I16(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
        DecodingResult::I32(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
        DecodingResult::U16(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
        DecodingResult::U32(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
        DecodingResult::U8(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
        DecodingResult::I8(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
        DecodingResult::U64(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
        DecodingResult::I64(data) => Ok(data.into_iter().map(|v| v as f32).collect()),
    }
}

/// GeoKey directory entries with inline (short) values, as `(key, value)`.
fn read_geo_keys<R: Read + Seek>(decoder: &mut Decoder<R>) -> Vec<(u16, u16)> {
    let Ok(directory) = decoder.get_tag_u16_vec(Tag::GeoKeyDirectoryTag) else {
        return Vec::new();
    };

    // Header: version, revision, minor revision, number of keys
    if directory.len() < 4 {
        return Vec::new();
    }
    let key_count = directory[3] as usize;

    directory[4..]
        .chunks_exact(4)
        .take(key_count)
        // Location 0 means the value is stored inline in the offset field
        .filter(|entry| entry[1] == 0)
        .map(|entry| (entry[0], entry[3]))
        .collect()
}

fn geo_key(keys: &[(u16, u16)], id: u16) -> Option<u16> {
    keys.iter().find(|(key, _)| *key == id).map(|(_, value)| *value)
}

fn crs_from_geo_keys(keys: &[(u16, u16)]) -> Option<Crs> {
    geo_key(keys, PROJECTED_CS_TYPE_GEO_KEY)
        .or_else(|| geo_key(keys, GEOGRAPHIC_TYPE_GEO_KEY))
        .filter(|code| *code != 0 && *code != USER_DEFINED)
        .map(Crs::Epsg)
}

/// Read the affine transform from the GeoTIFF model tags.
fn read_transform<R: Read + Seek>(
    decoder: &mut Decoder<R>,
    geo_keys: &[(u16, u16)],
    path: &Path,
) -> Result<GeoTransform> {
    let from_matrix = decoder
        .get_tag_f64_vec(Tag::ModelTransformationTag)
        .ok()
        .and_then(|m| GeoTransform::from_model_transformation(&m));

    let transform = match from_matrix {
        Some(t) => Some(t),
        None => {
            let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag);
            let pixel_scale = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag);
            match (tiepoint, pixel_scale) {
                (Ok(tiepoint), Ok(scale)) => GeoTransform::from_tiepoint(&tiepoint, &scale),
                _ => None,
            }
        }
    };

    let transform = transform.ok_or_else(|| DemError::InvalidGeoTiff {
        path: path.to_path_buf(),
        reason: "missing ModelTransformation or ModelTiepoint/ModelPixelScale tags".to_string(),
    })?;

    if geo_key(geo_keys, GT_RASTER_TYPE_GEO_KEY) == Some(RASTER_PIXEL_IS_POINT) {
        Ok(transform.shifted_half_pixel())
    } else {
        Ok(transform)
    }
}

/// Read the no-data value from the GDAL_NODATA tag (ASCII).
fn read_nodata_value<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<f32> {
    decoder
        .get_tag_ascii_string(Tag::GdalNodata)
        .ok()
        .and_then(|s| s.trim_matches(char::from(0)).trim().parse().ok())
}
