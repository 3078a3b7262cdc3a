//! Single-band float GeoTIFF output.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;
use tracing::info;

use crate::{Crs, DemError, GeoTransform, Mosaic, Result};

const MODEL_TYPE_PROJECTED: u16 = 1;
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const RASTER_PIXEL_IS_AREA: u16 = 1;

/// Write `values` (row-major, `width * height`) as a `Float32` GeoTIFF.
///
/// The transform must be north-up. Georeferencing is stored as a
/// tiepoint/pixel-scale pair, the CRS as a GeoKey directory (EPSG codes
/// only) and `nodata` as a `GDAL_NODATA` tag.
pub fn write_geotiff<P: AsRef<Path>>(
    path: P,
    width: usize,
    height: usize,
    values: &[f32],
    transform: &GeoTransform,
    crs: Option<&Crs>,
    nodata: Option<f32>,
) -> Result<()> {
    let path = path.as_ref();
    if width == 0 || height == 0 || values.len() != width * height {
        return Err(DemError::InvalidDimensions { width, height });
    }
    if transform.is_rotated() {
        return Err(DemError::UnsupportedTransform {
            path: path.to_path_buf(),
        });
    }

    let file = BufWriter::new(File::create(path)?);
    let mut encoder = TiffEncoder::new(file)?;
    let mut image = encoder.new_image::<colortype::Gray32Float>(width as u32, height as u32)?;

    let (pixel_width, pixel_height) = transform.pixel_size();
    let directory = image.encoder();
    directory.write_tag(Tag::ModelPixelScaleTag, &[pixel_width, pixel_height, 0.0][..])?;
    directory.write_tag(
        Tag::ModelTiepointTag,
        &[0.0, 0.0, 0.0, transform.c, transform.f, 0.0][..],
    )?;
    if let Some(keys) = crs.and_then(geo_key_directory) {
        directory.write_tag(Tag::GeoKeyDirectoryTag, &keys[..])?;
    }
    if let Some(nodata) = nodata {
        directory.write_tag(Tag::GdalNodata, nodata.to_string().as_str())?;
    }

    image.write_data(values)?;

    info!("Wrote {}x{} GeoTIFF to {}", width, height, path.display());
    Ok(())
}

impl Mosaic {
    /// Write band 1 as a GeoTIFF. Uncovered cells carry the fill value.
    pub fn write_geotiff<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let nodata = if self.valid_count() < self.cell_count() || !self.fill_value().is_nan() {
            Some(self.fill_value())
        } else {
            None
        };
        write_geotiff(
            path,
            self.width(),
            self.height(),
            self.elevation().values(),
            self.transform(),
            self.crs(),
            nodata,
        )
    }
}

/// GeoKey directory for an EPSG code; `None` for raw proj4 definitions.
fn geo_key_directory(crs: &Crs) -> Option<Vec<u16>> {
    let code = crs.epsg()?;
    // EPSG geographic 2D systems live in 4000..5000
    let (model_type, cs_key) = if (4000..5000).contains(&code) {
        (MODEL_TYPE_GEOGRAPHIC, 2048)
    } else {
        (MODEL_TYPE_PROJECTED, 3072)
    };
    Some(vec![
        1, 1, 0, 3, // version, revision, minor, key count
        1024, 0, 1, model_type, //
        1025, 0, 1, RASTER_PIXEL_IS_AREA, //
        cs_key, 0, 1, code,
    ])
}
