//! Affine raster georeferencing.

/// Six-parameter affine transform mapping pixel (col, row) to map coordinates.
///
/// Uses the rasterio/affine coefficient naming:
///
/// ```text
/// x = a * col + b * row + c
/// y = d * col + e * row + f
/// ```
///
/// For north-up rasters `b == d == 0`, `a` is the pixel width and `e` is the
/// negated pixel height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

/// Map-space extent of a raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

impl Bounds {
    /// Smallest extent covering both `self` and `other`.
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            left: self.left.min(other.left),
            right: self.right.max(other.right),
            bottom: self.bottom.min(other.bottom),
            top: self.top.max(other.top),
        }
    }

    /// True when the two extents share any area or edge.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.left <= other.right
            && other.left <= self.right
            && self.bottom <= other.top
            && other.bottom <= self.top
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }
}

impl GeoTransform {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// North-up transform with the upper-left corner at (`left`, `top`).
    pub fn north_up(left: f64, top: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self::new(pixel_width, 0.0, left, 0.0, -pixel_height, top)
    }

    /// Build from a GeoTIFF `ModelTiepointTag` + `ModelPixelScaleTag` pair.
    ///
    /// Tiepoint format is `[i, j, k, x, y, z]`: raster point (i, j) maps to
    /// model point (x, y). Only the first tiepoint is used.
    pub fn from_tiepoint(tiepoint: &[f64], scale: &[f64]) -> Option<Self> {
        if tiepoint.len() < 6 || scale.len() < 2 {
            return None;
        }
        let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
        let (sx, sy) = (scale[0], scale[1]);
        if sx == 0.0 || sy == 0.0 {
            return None;
        }
        Some(Self::new(sx, 0.0, x - i * sx, 0.0, -sy, y + j * sy))
    }

    /// Build from a GeoTIFF `ModelTransformationTag` (4x4 row-major matrix).
    pub fn from_model_transformation(matrix: &[f64]) -> Option<Self> {
        if matrix.len() < 16 {
            return None;
        }
        let t = Self::new(matrix[0], matrix[1], matrix[3], matrix[4], matrix[5], matrix[7]);
        if t.a * t.e - t.b * t.d == 0.0 {
            return None;
        }
        Some(t)
    }

    /// Shift the origin by half a pixel.
    ///
    /// GeoTIFFs tagged `PixelIsPoint` reference pixel centres; this converts
    /// them to the corner convention used everywhere else.
    pub fn shifted_half_pixel(&self) -> Self {
        Self {
            c: self.c - 0.5 * self.a - 0.5 * self.b,
            f: self.f - 0.5 * self.d - 0.5 * self.e,
            ..*self
        }
    }

    /// Move the origin to pixel (`cols`, `rows`) of the current grid.
    ///
    /// Negative offsets describe an image that starts before the raster,
    /// such as a figure with a margin around the map.
    pub fn shifted(&self, cols: f64, rows: f64) -> Self {
        let (c, f) = self.apply(cols, rows);
        Self { c, f, ..*self }
    }

    /// Map coordinates of the pixel-space point (`col`, `row`).
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.a * col + self.b * row + self.c,
            self.d * col + self.e * row + self.f,
        )
    }

    /// Fractional (col, row) of a map coordinate. North-up transforms only.
    pub fn invert_north_up(&self, x: f64, y: f64) -> (f64, f64) {
        ((x - self.c) / self.a, (y - self.f) / self.e)
    }

    pub fn is_rotated(&self) -> bool {
        self.b != 0.0 || self.d != 0.0
    }

    /// Absolute pixel size `(width, height)` in map units.
    pub fn pixel_size(&self) -> (f64, f64) {
        (
            (self.a * self.a + self.d * self.d).sqrt(),
            (self.b * self.b + self.e * self.e).sqrt(),
        )
    }

    /// Extent of a `width` x `height` raster placed by this transform.
    pub fn bounds(&self, width: usize, height: usize) -> Bounds {
        let (w, h) = (width as f64, height as f64);
        let corners = [
            self.apply(0.0, 0.0),
            self.apply(w, 0.0),
            self.apply(0.0, h),
            self.apply(w, h),
        ];
        let mut bounds = Bounds {
            left: f64::INFINITY,
            right: f64::NEG_INFINITY,
            bottom: f64::INFINITY,
            top: f64::NEG_INFINITY,
        };
        for (x, y) in corners {
            bounds.left = bounds.left.min(x);
            bounds.right = bounds.right.max(x);
            bounds.bottom = bounds.bottom.min(y);
            bounds.top = bounds.top.max(y);
        }
        bounds
    }

    /// ESRI world file contents (`.pgw`, `.tfw`, ...).
    ///
    /// World files reference the centre of the upper-left pixel.
    pub fn to_world_file(&self) -> String {
        let (x, y) = self.apply(0.5, 0.5);
        format!(
            "{}\n{}\n{}\n{}\n{}\n{}\n",
            self.a, self.d, self.b, self.e, x, y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_tiepoint() {
        let t = GeoTransform::from_tiepoint(&[0.0, 0.0, 0.0, -123.0, 50.0, 0.0], &[0.5, 0.25, 0.0])
            .unwrap();
        assert_eq!(t, GeoTransform::north_up(-123.0, 50.0, 0.5, 0.25));

        // Tiepoint away from the origin pixel
        let t = GeoTransform::from_tiepoint(&[2.0, 4.0, 0.0, 10.0, 20.0, 0.0], &[1.0, 1.0, 0.0])
            .unwrap();
        assert_relative_eq!(t.c, 8.0);
        assert_relative_eq!(t.f, 24.0);

        assert!(GeoTransform::from_tiepoint(&[0.0; 3], &[1.0, 1.0]).is_none());
    }

    #[test]
    fn test_model_transformation() {
        let m = [
            2.0, 0.0, 0.0, 100.0, //
            0.0, -2.0, 0.0, 200.0, //
            0.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ];
        let t = GeoTransform::from_model_transformation(&m).unwrap();
        assert_eq!(t, GeoTransform::north_up(100.0, 200.0, 2.0, 2.0));
    }

    #[test]
    fn test_bounds() {
        let t = GeoTransform::north_up(-123.5, 49.5, 0.001, 0.002);
        let b = t.bounds(1000, 500);
        assert_relative_eq!(b.left, -123.5);
        assert_relative_eq!(b.right, -122.5);
        assert_relative_eq!(b.top, 49.5);
        assert_relative_eq!(b.bottom, 48.5);
    }

    #[test]
    fn test_half_pixel_shift() {
        let t = GeoTransform::north_up(0.0, 10.0, 2.0, 2.0).shifted_half_pixel();
        assert_relative_eq!(t.c, -1.0);
        assert_relative_eq!(t.f, 11.0);
    }

    #[test]
    fn test_shift_for_margin() {
        let t = GeoTransform::north_up(100.0, 200.0, 30.0, 30.0).shifted(-20.0, -24.0);
        assert_relative_eq!(t.c, 100.0 - 600.0);
        assert_relative_eq!(t.f, 200.0 + 720.0);
        assert_relative_eq!(t.a, 30.0);
    }

    #[test]
    fn test_world_file() {
        let t = GeoTransform::north_up(100.0, 200.0, 30.0, 30.0);
        let lines: Vec<f64> = t
            .to_world_file()
            .lines()
            .map(|l| l.parse().unwrap())
            .collect();
        assert_eq!(lines, vec![30.0, 0.0, 0.0, -30.0, 115.0, 185.0]);
    }

    #[test]
    fn test_bounds_intersects() {
        let a = Bounds { left: 0.0, right: 10.0, bottom: 0.0, top: 10.0 };
        let b = Bounds { left: 5.0, right: 15.0, bottom: 5.0, top: 15.0 };
        let c = Bounds { left: 20.0, right: 30.0, bottom: 0.0, top: 10.0 };
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert_eq!(a.union(&c).width(), 30.0);
    }
}
