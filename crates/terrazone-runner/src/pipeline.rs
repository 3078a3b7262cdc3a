//! One terrain zone analysis run, top to bottom.

use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;
use terrazone_boundary::Boundary;
use terrazone_dem::{discover_tiles, merge, open_tiles, Bounds};
use terrazone_render::{
    render_area_chart, render_zone_map, save_png, write_world_file, Presenter, ZonePalette,
};
use terrazone_zones::{aggregate, classify, write_report, ZoneStatistics};
use tracing::{info, warn};

use crate::{PipelineError, RunConfig};

/// Colour assigned to one zone in both figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub id: i32,
    pub name: String,
    pub color: [u8; 3],
}

/// Everything a run produced, written as the JSON summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub region: String,
    pub crs: String,
    pub width: usize,
    pub height: usize,
    pub valid_cells: usize,
    /// Raster extent as `[left, right, bottom, top]`.
    pub extent: [f64; 4],
    pub tile_count: usize,
    pub boundary_reprojected: bool,
    pub statistics: ZoneStatistics,
    pub legend: Vec<LegendEntry>,
    pub map: PathBuf,
    pub chart: PathBuf,
    pub mosaic: Option<PathBuf>,
}

/// Run the analysis described by `config`.
///
/// The area report goes to `out` as soon as it is computed, so it may have
/// been written when a later stage (such as saving figures) fails.
pub fn run<W: Write>(
    config: &RunConfig,
    presenter: &dyn Presenter,
    out: &mut W,
) -> Result<RunSummary, PipelineError> {
    config.validate()?;
    let registry = config.registry();

    // ========================================================================
    // Tiles
    // ========================================================================
    let paths = discover_tiles(&config.tiles.dir, &config.tiles.extension)?;
    // The merged raster takes its CRS from the first tile
    let reference = paths
        .first()
        .cloned()
        .unwrap_or_else(|| config.tiles.dir.clone());
    let tile_count = paths.len();
    info!("Merging {} tiles from {}", tile_count, config.tiles.dir.display());

    let mosaic = merge(open_tiles(&paths)?)?;
    let raster_crs = mosaic
        .crs()
        .cloned()
        .ok_or(PipelineError::MissingRasterCrs { path: reference })?;
    let extent = mosaic.bounds();
    info!(
        "Mosaic {}x{} in {}, {} of {} cells valid",
        mosaic.width(),
        mosaic.height(),
        raster_crs,
        mosaic.valid_count(),
        mosaic.cell_count()
    );

    // ========================================================================
    // Boundary
    // ========================================================================
    let mut boundary = Boundary::from_geojson_file(&config.boundary)?;
    let boundary_reprojected = boundary.reproject_in_place(&raster_crs, &registry)?;
    match boundary.bounding_rect() {
        Some(rect) => {
            let boundary_extent = Bounds {
                left: rect.min().x,
                right: rect.max().x,
                bottom: rect.min().y,
                top: rect.max().y,
            };
            if !boundary_extent.intersects(&extent) {
                warn!(
                    "Boundary extent {:?} does not overlap the raster extent {:?}",
                    boundary_extent, extent
                );
            }
        }
        None => warn!("Boundary {} has no vertices", config.boundary.display()),
    }

    // ========================================================================
    // Classification and statistics
    // ========================================================================
    let grid = mosaic.elevation();
    let classified = classify(&grid, &config.zones);
    let statistics = aggregate(&classified, &config.zones, config.pixel_size);
    info!(
        "{} zones present, {} cells unclassified",
        statistics.zones.len(),
        statistics.unclassified_count
    );

    write_report(out, &statistics, &config.region)?;
    out.flush()?;

    // ========================================================================
    // Figures
    // ========================================================================
    if config.output.create_dir && !config.output.dir.is_dir() {
        info!("Creating output directory {}", config.output.dir.display());
        std::fs::create_dir_all(&config.output.dir)?;
    }

    let palette = ZonePalette::for_table(&config.zones);

    let map_options = config.map_options();
    let map = render_zone_map(&classified, &grid, &config.zones, &palette, &map_options)?;
    let map_path = config.output.map_path();
    save_png(&map, &map_path)?;
    // The world file georeferences the whole figure, frame included
    let (left, top) = map_options.plot_origin();
    write_world_file(
        &map_path,
        &mosaic.transform().shifted(-f64::from(left), -f64::from(top)),
    )?;
    info!("Saved zone map to {}", map_path.display());
    presenter.present(&map_path);

    let chart = render_area_chart(&statistics, &config.zones, &palette, &config.chart_options())?;
    let chart_path = config.output.chart_path();
    save_png(&chart, &chart_path)?;
    info!("Saved area chart to {}", chart_path.display());
    presenter.present(&chart_path);

    // ========================================================================
    // Summary and optional mosaic
    // ========================================================================
    let mosaic_path = config.output.mosaic_path();
    if let Some(path) = &mosaic_path {
        mosaic.write_geotiff(path)?;
        info!("Saved merged elevation to {}", path.display());
    }

    let legend = config
        .zones
        .bands()
        .iter()
        .zip(palette.colors())
        .map(|(band, color)| LegendEntry {
            id: band.id,
            name: band.name.clone(),
            color: *color,
        })
        .collect();

    let summary = RunSummary {
        region: config.region.clone(),
        crs: raster_crs.to_string(),
        width: mosaic.width(),
        height: mosaic.height(),
        valid_cells: mosaic.valid_count(),
        extent: [extent.left, extent.right, extent.bottom, extent.top],
        tile_count,
        boundary_reprojected,
        statistics,
        legend,
        map: map_path,
        chart: chart_path,
        mosaic: mosaic_path,
    };

    let summary_path = config.output.summary_path();
    std::fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)?;
    info!("Saved summary to {}", summary_path.display());

    Ok(summary)
}
