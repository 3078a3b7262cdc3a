//! PNG and world file output.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use terrazone_dem::GeoTransform;
use tracing::info;

use crate::{RenderError, Result};

/// Save `img` as an RGB PNG.
///
/// The parent directory must already exist; it is never created here.
pub fn save_png<P: AsRef<Path>>(img: &RgbImage, path: P) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_exists(path)?;

    let writer = BufWriter::new(File::create(path)?);
    let encoder = PngEncoder::new_with_quality(writer, CompressionType::Default, FilterType::Adaptive);
    encoder.write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgb8)?;

    info!("Saved {}x{} image to {}", img.width(), img.height(), path.display());
    Ok(())
}

/// World file path for an image: `map.png` -> `map.pgw`.
pub fn world_file_path(image_path: &Path) -> PathBuf {
    let ext = image_path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            // First and last letter of the image extension plus "w"
            let mut chars = ext.chars();
            match (chars.next(), chars.last()) {
                (Some(first), Some(last)) => format!("{}{}w", first, last),
                _ => "wld".to_string(),
            }
        })
        .unwrap_or_else(|| "wld".to_string());
    image_path.with_extension(ext)
}

/// Write the world file georeferencing the image at `image_path`.
///
/// Returns the path written.
pub fn write_world_file(image_path: &Path, transform: &GeoTransform) -> Result<PathBuf> {
    let path = world_file_path(image_path);
    ensure_parent_exists(&path)?;
    std::fs::write(&path, transform.to_world_file())?;
    info!("Wrote world file {}", path.display());
    Ok(path)
}

fn ensure_parent_exists(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.is_dir() => {
            Err(RenderError::OutputDirMissing {
                dir: dir.to_path_buf(),
            })
        }
        _ => Ok(()),
    }
}
