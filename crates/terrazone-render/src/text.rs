//! Figure text: titles, axis labels and tick labels.
//!
//! Glyphs come from DejaVu Sans, bundled with the crate so figures look the
//! same on every machine.

use ab_glyph::{FontRef, PxScale};
use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use imageproc::pixelops::interpolate;

use crate::Result;

static DEJAVU_SANS: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// The bundled label face.
pub(crate) fn font() -> Result<FontRef<'static>> {
    Ok(FontRef::try_from_slice(DEJAVU_SANS)?)
}

/// Writes text in one face, size and colour.
pub(crate) struct Pen<'f> {
    font: &'f FontRef<'static>,
    scale: PxScale,
    color: [u8; 3],
}

impl<'f> Pen<'f> {
    pub(crate) fn new(font: &'f FontRef<'static>, size: f32, color: [u8; 3]) -> Self {
        Self {
            font,
            scale: PxScale::from(size),
            color,
        }
    }

    /// Rendered `(width, height)` of `text` in pixels.
    pub(crate) fn measure(&self, text: &str) -> (u32, u32) {
        text_size(self.scale, self.font, text)
    }

    /// Line height, independent of the text drawn.
    pub(crate) fn line_height(&self) -> u32 {
        self.scale.y.ceil() as u32
    }

    /// Draw with the top-left corner of the text box at (`x`, `y`).
    pub(crate) fn draw(&self, img: &mut RgbImage, x: i32, y: i32, text: &str) {
        draw_text_mut(img, Rgb(self.color), x, y, self.scale, self.font, text);
    }

    /// Draw horizontally centred on `cx`.
    pub(crate) fn draw_centered(&self, img: &mut RgbImage, cx: i32, y: i32, text: &str) {
        let (w, _) = self.measure(text);
        self.draw(img, cx - (w / 2) as i32, y, text);
    }

    /// Draw turned `degrees` counter-clockwise.
    ///
    /// `pivot` picks a point on the text's horizontal centre line, from 0.0
    /// at the start to 1.0 at the end; that point lands on `at`.
    pub(crate) fn draw_rotated(
        &self,
        img: &mut RgbImage,
        at: (f32, f32),
        degrees: f32,
        pivot: f32,
        text: &str,
    ) {
        let (w, h) = self.measure(text);
        if w == 0 || h == 0 {
            return;
        }
        // Any rotation of a w x h box fits in a square of side w + h
        let side = w + h + 2;
        let mut mask = GrayImage::new(side, side);
        draw_text_mut(
            &mut mask,
            Luma([255]),
            ((side - w) / 2) as i32,
            ((side - h) / 2) as i32,
            self.scale,
            self.font,
            text,
        );

        let theta = degrees.to_radians();
        // imageproc turns clockwise for positive angles
        let turned = rotate_about_center(&mask, -theta, Interpolation::Bilinear, Luma([0]));

        let centre = side as f32 / 2.0;
        let along = (pivot - 0.5) * w as f32;
        let pivot_x = centre + along * theta.cos();
        let pivot_y = centre - along * theta.sin();
        let x0 = (at.0 - pivot_x).round() as i64;
        let y0 = (at.1 - pivot_y).round() as i64;

        for (mx, my, Luma([coverage])) in turned.enumerate_pixels() {
            if *coverage == 0 {
                continue;
            }
            let (x, y) = (x0 + mx as i64, y0 + my as i64);
            if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 {
                continue;
            }
            let pixel = img.get_pixel_mut(x as u32, y as u32);
            *pixel = interpolate(Rgb(self.color), *pixel, *coverage as f32 / 255.0);
        }
    }
}
