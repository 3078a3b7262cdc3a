//! Area bar chart.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use terrazone_zones::{ZoneStatistics, ZoneTable};
use tracing::debug;

use crate::text::{self, Pen};
use crate::{RenderError, Result, ZonePalette};

/// Options for the area bar chart.
#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
    /// Margins around the plot area as `(left, right, top, bottom)`. They
    /// hold the title, the axis label and the tick labels.
    pub margins: (u32, u32, u32, u32),
    /// Fraction of each slot covered by its bar.
    pub bar_fill: f64,
    pub title: Option<String>,
    pub y_label: String,
    /// Tick label size in pixels; the title is drawn larger.
    pub font_size: f32,
    pub background: [u8; 3],
    pub axis_color: [u8; 3],
    pub grid_color: [u8; 3],
    /// Bar colour for zones missing from the table.
    pub fallback_color: [u8; 3],
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            margins: (80, 20, 40, 120),
            bar_fill: 0.8,
            title: Some("Terrain Zone Area".to_string()),
            y_label: "Area (km²)".to_string(),
            font_size: 14.0,
            background: [255, 255, 255],
            axis_color: [0, 0, 0],
            grid_color: [220, 220, 220],
            fallback_color: [128, 128, 128],
        }
    }
}

impl ChartOptions {
    pub fn validate(&self) -> Result<()> {
        let (left, right, top, bottom) = self.margins;
        if self.width <= left + right + 1 || self.height <= top + bottom + 1 {
            return Err(RenderError::InvalidOption(format!(
                "chart of {}x{} leaves no room for the plot area inside margins {:?}",
                self.width, self.height, self.margins
            )));
        }
        if !(self.bar_fill > 0.0 && self.bar_fill <= 1.0) {
            return Err(RenderError::InvalidOption(format!(
                "bar_fill must be in (0, 1], got {}",
                self.bar_fill
            )));
        }
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(RenderError::InvalidOption(format!(
                "font_size must be positive, got {}",
                self.font_size
            )));
        }
        Ok(())
    }
}

/// Round `raw` up to 1, 2 or 5 times a power of ten.
pub fn nice_step(raw: f64) -> f64 {
    if !(raw.is_finite() && raw > 0.0) {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let fraction = raw / magnitude;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Tick step and axis maximum for values up to `max`, aiming at about five
/// gridlines.
pub fn axis_scale(max: f64) -> (f64, f64) {
    let step = nice_step(max / 5.0);
    let top = ((max / step).ceil() * step).max(step);
    (step, top)
}

/// Tick label with as many decimals as `step` needs.
fn tick_label(value: f64, step: f64) -> String {
    let decimals = (-step.log10().floor()).max(0.0) as usize;
    format!("{:.*}", decimals, value)
}

/// Render one bar per zone present in `stats`, in ascending id order.
///
/// Bar heights are proportional to area, colours match the zone map and
/// horizontal gridlines mark the labelled axis ticks. Zone names sit under
/// the bars turned 45 degrees, the y axis carries `y_label` and the title
/// is centred above the plot.
pub fn render_area_chart(
    stats: &ZoneStatistics,
    table: &ZoneTable,
    palette: &ZonePalette,
    options: &ChartOptions,
) -> Result<RgbImage> {
    options.validate()?;
    let font = text::font()?;
    let pen = Pen::new(&font, options.font_size, options.axis_color);
    let title_pen = Pen::new(&font, options.font_size * 1.3, options.axis_color);

    let (left, right, top, bottom) = options.margins;
    let mut img = RgbImage::from_pixel(options.width, options.height, Rgb(options.background));

    let plot_left = left;
    let plot_right = options.width - right;
    let plot_top = top;
    let plot_bottom = options.height - bottom;
    let plot_width = (plot_right - plot_left) as f64;
    let plot_height = (plot_bottom - plot_top) as f64;

    let max_area = stats
        .zones
        .iter()
        .map(|zone| zone.area_km2)
        .fold(0.0, f64::max);
    let (step, axis_top) = axis_scale(max_area);
    let y_of = |value: f64| -> u32 {
        let y = plot_bottom as f64 - value / axis_top * plot_height;
        y.round().clamp(plot_top as f64, plot_bottom as f64) as u32
    };
    let axis = Rgb(options.axis_color);

    // Gridlines, tick marks and tick labels
    let mut i = 0;
    loop {
        let tick = step * i as f64;
        if tick > axis_top + step * 1e-9 {
            break;
        }
        let y = y_of(tick) as f32;
        if i > 0 {
            draw_line_segment_mut(
                &mut img,
                (plot_left as f32 + 1.0, y),
                (plot_right as f32, y),
                Rgb(options.grid_color),
            );
        }
        draw_line_segment_mut(&mut img, (plot_left as f32 - 5.0, y), (plot_left as f32, y), axis);
        let label = tick_label(tick, step);
        let (w, h) = pen.measure(&label);
        pen.draw(&mut img, plot_left as i32 - 8 - w as i32, y as i32 - (h / 2) as i32, &label);
        i += 1;
    }

    // Bars and their zone names
    let n = stats.zones.len();
    if n > 0 {
        let slot = plot_width / n as f64;
        let bar = (slot * options.bar_fill).max(1.0);
        for (i, zone) in stats.zones.iter().enumerate() {
            let color = palette
                .zone_color(table, zone.id)
                .unwrap_or(options.fallback_color);
            let centre = plot_left as f64 + slot * (i as f64 + 0.5);
            let x0 = (centre - bar / 2.0).round().max(plot_left as f64 + 1.0) as u32;
            let x1 = ((centre + bar / 2.0).round() as u32).min(plot_right);
            let y0 = y_of(zone.area_km2);
            if x1 > x0 && plot_bottom > y0 {
                draw_filled_rect_mut(
                    &mut img,
                    Rect::at(x0 as i32, y0 as i32).of_size(x1 - x0, plot_bottom - y0),
                    Rgb(color),
                );
            }

            let x = centre as f32;
            draw_line_segment_mut(
                &mut img,
                (x, plot_bottom as f32),
                (x, plot_bottom as f32 + 5.0),
                axis,
            );
            let half_line = pen.line_height() as f32 / 2.0;
            pen.draw_rotated(
                &mut img,
                (x, plot_bottom as f32 + 8.0 + half_line),
                45.0,
                1.0,
                &zone.name,
            );
        }
    }

    // Axes
    draw_line_segment_mut(
        &mut img,
        (plot_left as f32, plot_bottom as f32),
        (plot_right as f32, plot_bottom as f32),
        axis,
    );
    draw_line_segment_mut(
        &mut img,
        (plot_left as f32, plot_top as f32),
        (plot_left as f32, plot_bottom as f32),
        axis,
    );

    // Axis label and title
    let label_x = pen.line_height() as f32 / 2.0 + 4.0;
    let label_y = (plot_top + plot_bottom) as f32 / 2.0;
    pen.draw_rotated(&mut img, (label_x, label_y), 90.0, 0.5, &options.y_label);
    if let Some(title) = &options.title {
        let y = (plot_top.saturating_sub(title_pen.line_height()) / 2) as i32;
        title_pen.draw_centered(&mut img, (options.width / 2) as i32, y, title);
    }

    debug!(
        "Rendered area chart: {} bar(s), axis 0..{} km² step {}",
        n, axis_top, step
    );
    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use terrazone_zones::ZoneArea;

    fn stats(areas: &[(i32, f64)]) -> ZoneStatistics {
        let table = ZoneTable::default();
        ZoneStatistics {
            zones: areas
                .iter()
                .map(|&(id, area_km2)| ZoneArea {
                    id,
                    name: table.name(id).to_string(),
                    pixel_count: (area_km2 / 0.0009).round() as u64,
                    area_km2,
                })
                .collect(),
            unclassified_count: 0,
            total_count: 0,
            pixel_area_km2: 0.0009,
        }
    }

    #[test]
    fn test_nice_step() {
        assert_relative_eq!(nice_step(0.7), 1.0);
        assert_relative_eq!(nice_step(1.3), 2.0);
        assert_relative_eq!(nice_step(3.0), 5.0);
        assert_relative_eq!(nice_step(7.5), 10.0);
        assert_relative_eq!(nice_step(120.0), 200.0);
        assert_relative_eq!(nice_step(0.0), 1.0);
    }

    #[test]
    fn test_axis_scale() {
        let (step, top) = axis_scale(512.37);
        assert_relative_eq!(step, 200.0);
        assert_relative_eq!(top, 600.0);

        let (step, top) = axis_scale(0.0);
        assert_relative_eq!(step, 1.0);
        assert_relative_eq!(top, 1.0);
    }

    fn has_ink(img: &RgbImage, xs: std::ops::Range<u32>, ys: std::ops::Range<u32>) -> bool {
        ys.flat_map(|y| xs.clone().map(move |x| (x, y)))
            .any(|(x, y)| img.get_pixel(x, y).0 != [255, 255, 255])
    }

    #[test]
    fn test_tick_label_decimals() {
        assert_eq!(tick_label(200.0, 100.0), "200");
        assert_eq!(tick_label(0.5, 0.5), "0.5");
        assert_eq!(tick_label(0.04, 0.02), "0.04");
    }

    #[test]
    fn test_bars_coloured_and_ordered() {
        let table = ZoneTable::default();
        let palette = ZonePalette::for_table(&table);
        let options = ChartOptions::default();
        let stats = stats(&[(1, 500.0), (3, 250.0)]);

        let img = render_area_chart(&stats, &table, &palette, &options).unwrap();
        assert_eq!(img.dimensions(), (1000, 600));

        // Plot area is x 80..980, y 40..480; two slots of 450 px
        let just_above_axis = 475;
        assert_eq!(img.get_pixel(305, just_above_axis).0, palette.color(0).unwrap());
        assert_eq!(img.get_pixel(755, just_above_axis).0, palette.color(2).unwrap());

        // Axis top is 600 km²: the 500 km² bar is taller than the 250 km² one
        let tall_top = (0..480).find(|&y| img.get_pixel(305, y).0 == palette.color(0).unwrap());
        let short_top = (0..480).find(|&y| img.get_pixel(755, y).0 == palette.color(2).unwrap());
        assert!(tall_top.unwrap() < short_top.unwrap());
    }

    #[test]
    fn test_title_and_labels_drawn() {
        let table = ZoneTable::default();
        let palette = ZonePalette::for_table(&table);
        let areas: Vec<_> = (1..=6).map(|id| (id, 100.0 * id as f64)).collect();
        let options = ChartOptions {
            title: Some("Terrain Zone Area – Vancouver Region".into()),
            ..ChartOptions::default()
        };

        let img = render_area_chart(&stats(&areas), &table, &palette, &options).unwrap();

        // Title band above the plot
        assert!(has_ink(&img, 300..700, 0..40));
        // Zone names under the axis
        assert!(has_ink(&img, 80..980, 490..600));
        // Rotated y label left of the tick labels
        assert!(has_ink(&img, 0..24, 200..320));
        // Tick labels left of the axis
        assert!(has_ink(&img, 30..75, 40..480));
    }

    #[test]
    fn test_untitled_chart_leaves_top_band_blank() {
        let table = ZoneTable::default();
        let options = ChartOptions {
            title: None,
            ..ChartOptions::default()
        };
        let img = render_area_chart(
            &stats(&[(2, 10.0)]),
            &table,
            &ZonePalette::for_table(&table),
            &options,
        )
        .unwrap();
        assert!(!has_ink(&img, 0..1000, 0..30));
    }

    #[test]
    fn test_empty_statistics_draws_axes_only() {
        let table = ZoneTable::default();
        let img = render_area_chart(
            &stats(&[]),
            &table,
            &ZonePalette::for_table(&table),
            &ChartOptions::default(),
        )
        .unwrap();
        assert_eq!(img.get_pixel(80, 300).0, [0, 0, 0]);
        assert_eq!(img.get_pixel(500, 480).0, [0, 0, 0]);
        assert_eq!(img.get_pixel(500, 300).0, [255, 255, 255]);
        assert!(!has_ink(&img, 81..980, 490..600));
    }

    #[test]
    fn test_too_small_chart() {
        let table = ZoneTable::default();
        let options = ChartOptions {
            width: 50,
            ..ChartOptions::default()
        };
        assert!(options.validate().is_err());
        assert!(render_area_chart(&stats(&[]), &table, &ZonePalette::for_table(&table), &options)
            .is_err());
    }
}
