//! Zone map rendering.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use terrazone_dem::ElevationGrid;
use terrazone_zones::{ClassifiedGrid, ZoneTable};
use tracing::debug;

use crate::colormap::to_u8;
use crate::hillshade::{hillshade, shade_overlay};
use crate::text::{self, Pen};
use crate::{RenderError, Result, ZonePalette};

/// Space around each text line.
const PAD: u32 = 4;

/// Options for zone map rendering.
#[derive(Debug, Clone)]
pub struct MapOptions {
    /// Light source direction, degrees clockwise from north.
    pub azimuth_deg: f64,
    /// Light source elevation above the horizon, degrees.
    pub altitude_deg: f64,
    /// Opacity of the shaded relief over the zone colours.
    pub hillshade_alpha: f64,
    /// Colour of cells outside every zone. Neutral grey, which no terrain
    /// palette entry uses.
    pub unclassified_color: [u8; 3],
    /// Colour-bar strip width in pixels; 0 disables it.
    pub legend_width: u32,
    /// Blank space between the map and the colour bar.
    pub legend_gap: u32,
    pub title: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    /// Label size in pixels; the title is drawn larger.
    pub font_size: f32,
    pub text_color: [u8; 3],
    pub background: [u8; 3],
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            azimuth_deg: 315.0,
            altitude_deg: 45.0,
            hillshade_alpha: 0.5,
            unclassified_color: [128, 128, 128],
            legend_width: 24,
            legend_gap: 8,
            title: Some("Terrain Zones".to_string()),
            x_label: Some("Longitude".to_string()),
            y_label: Some("Latitude".to_string()),
            font_size: 12.0,
            text_color: [0, 0, 0],
            background: [255, 255, 255],
        }
    }
}

impl MapOptions {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.hillshade_alpha) {
            return Err(RenderError::InvalidOption(format!(
                "hillshade_alpha must be in [0, 1], got {}",
                self.hillshade_alpha
            )));
        }
        if !(0.0..=90.0).contains(&self.altitude_deg) {
            return Err(RenderError::InvalidOption(format!(
                "altitude_deg must be in [0, 90], got {}",
                self.altitude_deg
            )));
        }
        if !self.azimuth_deg.is_finite() {
            return Err(RenderError::InvalidOption("azimuth_deg must be finite".into()));
        }
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(RenderError::InvalidOption(format!(
                "font_size must be positive, got {}",
                self.font_size
            )));
        }
        Ok(())
    }

    fn line_height(&self) -> u32 {
        self.font_size.ceil() as u32
    }

    fn title_size(&self) -> f32 {
        self.font_size * 1.3
    }

    /// Image pixel of raster cell (0, 0), after the title band and the
    /// y-axis label.
    pub fn plot_origin(&self) -> (u32, u32) {
        let left = match self.y_label {
            Some(_) => self.line_height() + 2 * PAD,
            None => 0,
        };
        let top = match self.title {
            Some(_) => self.title_size().ceil() as u32 + 2 * PAD,
            None => 0,
        };
        (left, top)
    }
}

/// Render the zone map, one pixel per cell, framed by the title, the axis
/// labels and a labelled colour bar on the right.
///
/// Valid cells show their zone colour composited with the overlay-shaded
/// relief at `hillshade_alpha`; invalid cells show `unclassified_color`.
/// The colour bar stacks the palette in table order, first zone at the
/// bottom, with each zone's name beside its slot. Cell (0, 0) lands at
/// [`MapOptions::plot_origin`].
pub fn render_zone_map(
    classified: &ClassifiedGrid,
    grid: &ElevationGrid<'_>,
    table: &ZoneTable,
    palette: &ZonePalette,
    options: &MapOptions,
) -> Result<RgbImage> {
    options.validate()?;
    if (classified.width(), classified.height()) != (grid.width(), grid.height()) {
        return Err(RenderError::ShapeMismatch {
            expected: (grid.width(), grid.height()),
            found: (classified.width(), classified.height()),
        });
    }

    let font = text::font()?;
    let pen = Pen::new(&font, options.font_size, options.text_color);
    let title_pen = Pen::new(&font, options.title_size(), options.text_color);

    let (map_width, map_height) = (grid.width(), grid.height());
    let too_large = || RenderError::ImageTooLarge {
        width: map_width,
        height: map_height,
    };
    let map_w = u32::try_from(map_width).map_err(|_| too_large())?;
    let map_h = u32::try_from(map_height).map_err(|_| too_large())?;

    // Layout
    let (left, top) = options.plot_origin();
    let line = options.line_height();
    let names: Vec<&str> = table
        .bands()
        .iter()
        .take(palette.len())
        .map(|band| band.name.as_str())
        .collect();
    let with_legend = options.legend_width > 0 && !names.is_empty();
    let (legend, bar_h) = if with_legend {
        let label_w = names.iter().map(|name| pen.measure(name).0).max().unwrap_or(0);
        let bar_h = map_h.max(names.len() as u32 * (line + 2));
        (options.legend_gap + options.legend_width + PAD + label_w + PAD, bar_h)
    } else {
        (0, 0)
    };
    let body_h = map_h.max(bar_h);
    let bottom = match options.x_label {
        Some(_) => line + 2 * PAD,
        None => 0,
    };
    let title_w = options
        .title
        .as_deref()
        .map(|title| title_pen.measure(title).0 + 2 * PAD)
        .unwrap_or(0);

    let width = u64::from(left) + u64::from(map_w) + u64::from(legend);
    let height = u64::from(top) + u64::from(body_h) + u64::from(bottom);
    let (width_px, height_px) = match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => (w.max(title_w), h),
        _ => return Err(too_large()),
    };

    let intensity = hillshade(grid, options.azimuth_deg, options.altitude_deg);
    let relief = shade_overlay(grid, &intensity);
    let alpha = options.hillshade_alpha;

    let mut img = RgbImage::from_pixel(width_px, height_px, Rgb(options.background));

    for (index, &id) in classified.ids().iter().enumerate() {
        let zone = palette
            .zone_color(table, id)
            .unwrap_or(options.unclassified_color);

        let color = match relief[index] {
            Some(shade) => {
                let mut out = [0u8; 3];
                for channel in 0..3 {
                    let base = zone[channel] as f64 / 255.0;
                    out[channel] = to_u8(base * (1.0 - alpha) + shade[channel] * alpha);
                }
                out
            }
            None => options.unclassified_color,
        };

        let (x, y) = ((index % map_width) as u32, (index / map_width) as u32);
        img.put_pixel(left + x, top + y, Rgb(color));
    }

    if with_legend {
        let bar_x = left + map_w + options.legend_gap;
        draw_colour_bar(&mut img, (bar_x, top), (options.legend_width, bar_h), palette);

        let n = names.len() as u32;
        let label_x = (bar_x + options.legend_width + PAD) as i32;
        for (i, name) in names.iter().enumerate() {
            // First zone at the bottom
            let slot = n - 1 - i as u32;
            let centre = top + (2 * slot + 1) * bar_h / (2 * n);
            pen.draw(&mut img, label_x, centre as i32 - (line / 2) as i32, name);
        }
    }

    if let Some(title) = &options.title {
        title_pen.draw_centered(&mut img, (width_px / 2) as i32, PAD as i32, title);
    }
    if let Some(label) = &options.x_label {
        let cx = (left + map_w / 2) as i32;
        pen.draw_centered(&mut img, cx, (top + body_h + PAD) as i32, label);
    }
    if let Some(label) = &options.y_label {
        let at = (left as f32 / 2.0, top as f32 + map_h as f32 / 2.0);
        pen.draw_rotated(&mut img, at, 90.0, 0.5, label);
    }

    debug!("Rendered {}x{} zone map", width_px, height_px);
    Ok(img)
}

/// Palette strip with the first zone at the bottom.
fn draw_colour_bar(img: &mut RgbImage, origin: (u32, u32), size: (u32, u32), palette: &ZonePalette) {
    let (x0, y0) = origin;
    let (bar_w, bar_h) = size;
    let n = palette.len() as u32;
    if n == 0 || bar_w == 0 || bar_h == 0 {
        return;
    }
    for slot in 0..n {
        let top = slot * bar_h / n;
        let next = (slot + 1) * bar_h / n;
        if next == top {
            continue;
        }
        // Slot 0 is the top of the bar, which holds the last zone
        if let Some(color) = palette.color((n - 1 - slot) as usize) {
            draw_filled_rect_mut(
                img,
                Rect::at(x0 as i32, (y0 + top) as i32).of_size(bar_w, next - top),
                Rgb(color),
            );
        }
    }
}
