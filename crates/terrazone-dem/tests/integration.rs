//! Integration tests for terrazone-dem using small generated GeoTIFFs.

use std::fs::File;
use std::path::{Path, PathBuf};

use approx::assert_relative_eq;
use terrazone_dem::{
    discover_tiles, merge, open_tiles, write_geotiff, Crs, DemError, GeoTransform, RasterTile,
};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

const NODATA: f32 = -9999.0;

/// Write a `width` x `height` tile with 1-unit pixels and its upper-left
/// corner at (`left`, `top`).
fn write_tile(
    dir: &Path,
    name: &str,
    left: f64,
    top: f64,
    width: usize,
    values: &[f32],
    crs: Option<&Crs>,
) -> PathBuf {
    let path = dir.join(name);
    let height = values.len() / width;
    let transform = GeoTransform::north_up(left, top, 1.0, 1.0);
    write_geotiff(&path, width, height, values, &transform, crs, Some(NODATA))
        .expect("Failed to write tile");
    path
}

fn write_rgb_tile(dir: &Path, name: &str, left: f64, top: f64) -> PathBuf {
    let path = dir.join(name);
    let file = File::create(&path).unwrap();
    let mut encoder = TiffEncoder::new(file).unwrap();
    let mut image = encoder.new_image::<colortype::RGB32Float>(2, 1).unwrap();
    image
        .encoder()
        .write_tag(Tag::ModelPixelScaleTag, &[1.0, 1.0, 0.0][..])
        .unwrap();
    image
        .encoder()
        .write_tag(Tag::ModelTiepointTag, &[0.0, 0.0, 0.0, left, top, 0.0][..])
        .unwrap();
    image
        .write_data(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
        .unwrap();
    path
}

fn open(paths: &[PathBuf]) -> Vec<RasterTile> {
    open_tiles(paths).expect("Failed to open tiles")
}

#[test]
fn test_tile_header_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let utm = Crs::Epsg(32610);
    let path = write_tile(dir.path(), "a.tif", 490000.0, 5460000.0, 3, &[1.0; 6], Some(&utm));

    let tile = RasterTile::open(&path).unwrap();
    assert_eq!(tile.dimensions(), (3, 2));
    assert_eq!(tile.band_count(), 1);
    assert_eq!(tile.nodata(), Some(NODATA));
    assert_eq!(tile.crs(), Some(&utm));

    let bounds = tile.bounds();
    assert_relative_eq!(bounds.left, 490000.0);
    assert_relative_eq!(bounds.right, 490003.0);
    assert_relative_eq!(bounds.top, 5460000.0);
    assert_relative_eq!(bounds.bottom, 5459998.0);
}

#[test]
fn test_merge_side_by_side() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_tile(dir.path(), "a.tif", 0.0, 2.0, 2, &[1.0, 2.0, 3.0, 4.0], None);
    let b = write_tile(dir.path(), "b.tif", 2.0, 2.0, 2, &[5.0, 6.0, 7.0, 8.0], None);

    let mosaic = merge(open(&[a, b])).unwrap();
    assert_eq!((mosaic.width(), mosaic.height()), (4, 2));
    assert_eq!(mosaic.valid_count(), 8);
    assert_eq!(
        mosaic.band(0).unwrap(),
        &[1.0, 2.0, 5.0, 6.0, 3.0, 4.0, 7.0, 8.0]
    );
}

#[test]
fn test_merge_overlap_first_tile_wins() {
    let dir = tempfile::tempdir().unwrap();
    // a covers x 0..3, b covers x 2..5; column 2 is shared
    let a = write_tile(dir.path(), "a.tif", 0.0, 1.0, 3, &[1.0, 1.0, 1.0], None);
    let b = write_tile(dir.path(), "b.tif", 2.0, 1.0, 3, &[2.0, 2.0, 2.0], None);

    let mosaic = merge(open(&[a, b])).unwrap();
    assert_eq!(mosaic.width(), 5);
    // Shared cell counted once
    assert_eq!(mosaic.valid_count(), 5);
    assert_eq!(mosaic.band(0).unwrap(), &[1.0, 1.0, 1.0, 2.0, 2.0]);
}

#[test]
fn test_merge_nodata_falls_through() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_tile(dir.path(), "a.tif", 0.0, 1.0, 3, &[1.0, 1.0, NODATA], None);
    let b = write_tile(dir.path(), "b.tif", 2.0, 1.0, 3, &[2.0, 2.0, 2.0], None);

    let mosaic = merge(open(&[a, b])).unwrap();
    assert_eq!(mosaic.band(0).unwrap(), &[1.0, 1.0, 2.0, 2.0, 2.0]);
}

#[test]
fn test_merge_gap_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_tile(dir.path(), "a.tif", 0.0, 1.0, 2, &[1.0, 1.0], None);
    let b = write_tile(dir.path(), "b.tif", 3.0, 1.0, 2, &[2.0, 2.0], None);

    let mosaic = merge(open(&[a, b])).unwrap();
    assert_eq!(mosaic.width(), 5);
    assert_eq!(mosaic.valid_mask(), &[true, true, false, true, true]);
    assert_eq!(mosaic.band(0).unwrap()[2], NODATA);
    assert_eq!(mosaic.fill_value(), NODATA);

    let grid = mosaic.elevation();
    assert!(!grid.is_valid(2));
    assert_eq!(grid.valid_range(), Some((1.0, 2.0)));
}

#[test]
fn test_merge_discovered_directory() {
    let dir = tempfile::tempdir().unwrap();
    // Written out of order; discovery sorts by name so "a" takes precedence
    write_tile(dir.path(), "b.tif", 0.0, 1.0, 1, &[20.0], None);
    write_tile(dir.path(), "a.tif", 0.0, 1.0, 1, &[10.0], None);

    let paths = discover_tiles(dir.path(), "tif").unwrap();
    let mosaic = merge(open(&paths)).unwrap();
    assert_eq!(mosaic.band(0).unwrap(), &[10.0]);
}

#[test]
fn test_merge_crs_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_tile(dir.path(), "a.tif", 0.0, 1.0, 1, &[1.0], Some(&Crs::Epsg(32610)));
    let b = write_tile(dir.path(), "b.tif", 1.0, 1.0, 1, &[1.0], Some(&Crs::Epsg(32611)));

    let err = merge(open(&[a, b])).unwrap_err();
    assert!(matches!(err, DemError::CrsMismatch { .. }));
}

#[test]
fn test_merge_empty() {
    assert!(matches!(merge(Vec::new()), Err(DemError::EmptyMerge)));
}

#[test]
fn test_multi_band_tile() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rgb_tile(dir.path(), "rgb.tif", 0.0, 1.0);

    let mut tile = RasterTile::open(&path).unwrap();
    assert_eq!(tile.band_count(), 3);
    let bands = tile.read_bands().unwrap();
    assert_eq!(bands, vec![vec![1.0, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]]);

    let mosaic = merge(vec![tile]).unwrap();
    assert_eq!(mosaic.band_count(), 3);
    assert_eq!(mosaic.band(2).unwrap(), &[3.0, 6.0]);
    // Elevation is band 1
    assert_eq!(mosaic.elevation().values(), &[1.0, 4.0]);
}

#[test]
fn test_merge_band_count_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_tile(dir.path(), "a.tif", 0.0, 1.0, 1, &[1.0], None);
    let b = write_rgb_tile(dir.path(), "b.tif", 1.0, 1.0);

    let err = merge(open(&[a, b])).unwrap_err();
    assert!(matches!(
        err,
        DemError::BandCountMismatch {
            expected: 1,
            found: 3,
            ..
        }
    ));
}

#[test]
fn test_mosaic_written_and_reloaded() {
    let dir = tempfile::tempdir().unwrap();
    let crs = Crs::Epsg(4326);
    let a = write_tile(dir.path(), "a.tif", 0.0, 1.0, 2, &[1.0, 1.0], Some(&crs));
    let b = write_tile(dir.path(), "b.tif", 3.0, 1.0, 2, &[2.0, 2.0], Some(&crs));
    let mosaic = merge(open(&[a, b])).unwrap();

    let out = dir.path().join("merged.tif");
    mosaic.write_geotiff(&out).unwrap();

    let mut tile = RasterTile::open(&out).unwrap();
    assert_eq!(tile.dimensions(), (5, 1));
    assert_eq!(tile.crs(), Some(&crs));
    assert_eq!(tile.nodata(), Some(NODATA));
    assert_eq!(
        tile.read_bands().unwrap(),
        vec![vec![1.0, 1.0, NODATA, 2.0, 2.0]]
    );
}
