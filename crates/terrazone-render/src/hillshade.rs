//! Lambertian hillshading and overlay blending.
//!
//! Follows the conventions of matplotlib's `LightSource`: azimuth is measured
//! clockwise from north, gradients are central differences over unit cell
//! spacing with row 0 at the top, and intensities are stretched to `[0, 1]`.

use terrazone_dem::ElevationGrid;

use crate::colormap::terrain_color;

/// Illumination intensity per cell in `[0, 1]`; NaN for invalid cells.
///
/// Invalid neighbours are replaced by the centre value when computing
/// gradients, so nodata holes do not produce artificial cliffs.
pub fn hillshade(grid: &ElevationGrid<'_>, azimuth_deg: f64, altitude_deg: f64) -> Vec<f32> {
    let (width, height) = (grid.width(), grid.height());
    let azimuth = (90.0 - azimuth_deg).to_radians();
    let altitude = altitude_deg.to_radians();
    let light = [
        azimuth.cos() * altitude.cos(),
        azimuth.sin() * altitude.cos(),
        altitude.sin(),
    ];

    let mut intensity = vec![f64::NAN; grid.len()];
    let mut range: Option<(f64, f64)> = None;

    for row in 0..height {
        for col in 0..width {
            let index = row * width + col;
            if !grid.is_valid(index) {
                continue;
            }
            let centre = grid.get(row, col) as f64;
            let at = |r: usize, c: usize| -> f64 {
                let i = r * width + c;
                if grid.is_valid(i) {
                    grid.get(r, c) as f64
                } else {
                    centre
                }
            };

            let dz_dx = gradient(col, width, |c| at(row, c));
            // Rows grow southwards, so the northward slope is negated
            let dz_dy = -gradient(row, height, |r| at(r, col));

            let normal = [-dz_dx, -dz_dy, 1.0];
            let norm = (normal[0] * normal[0] + normal[1] * normal[1] + 1.0).sqrt();
            let value = (normal[0] * light[0] + normal[1] * light[1] + normal[2] * light[2]) / norm;

            intensity[index] = value;
            range = Some(match range {
                Some((lo, hi)) => (lo.min(value), hi.max(value)),
                None => (value, value),
            });
        }
    }

    let stretch = range.filter(|(lo, hi)| hi - lo > 1e-6);
    intensity
        .into_iter()
        .map(|value| {
            if value.is_nan() {
                return f32::NAN;
            }
            let value = match stretch {
                Some((lo, hi)) => (value - lo) / (hi - lo),
                None => value,
            };
            value.clamp(0.0, 1.0) as f32
        })
        .collect()
}

/// numpy-style gradient along one axis: central inside, one-sided at edges.
fn gradient(i: usize, len: usize, value: impl Fn(usize) -> f64) -> f64 {
    if len < 2 {
        0.0
    } else if i == 0 {
        value(1) - value(0)
    } else if i == len - 1 {
        value(i) - value(i - 1)
    } else {
        (value(i + 1) - value(i - 1)) / 2.0
    }
}

/// Overlay blend of a base colour with an intensity, all in `[0, 1]`.
pub fn overlay(base: f64, intensity: f64) -> f64 {
    if base <= 0.5 {
        2.0 * intensity * base
    } else {
        1.0 - 2.0 * (1.0 - intensity) * (1.0 - base)
    }
}

/// Elevation coloured through the terrain colormap and overlay-shaded.
///
/// Elevations are normalised over valid cells. Invalid cells (or a NaN
/// intensity) yield `None`.
pub fn shade_overlay(grid: &ElevationGrid<'_>, intensity: &[f32]) -> Vec<Option<[f64; 3]>> {
    let (lo, hi) = grid.valid_range().map_or((0.0, 1.0), |(lo, hi)| (lo as f64, hi as f64));
    let span = hi - lo;

    grid.values()
        .iter()
        .zip(intensity)
        .enumerate()
        .map(|(index, (&value, &shade))| {
            if !grid.is_valid(index) || shade.is_nan() {
                return None;
            }
            let t = if span > 0.0 { (value as f64 - lo) / span } else { 0.0 };
            let base = terrain_color(t);
            let shade = shade as f64;
            Some(base.map(|channel| overlay(channel, shade)))
        })
        .collect()
}
