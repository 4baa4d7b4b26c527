use image::{ImageBuffer, Rgba, RgbaImage};

use crate::render::composite::Rect;

/// Output pixel buffer the raster passes paint into
///
/// A thin wrapper around an RGBA image buffer with the blending helpers the
/// layer passes need. Coordinates are output pixels.
#[derive(Clone, Debug)]
pub struct Canvas {
    buffer: RgbaImage,
}

impl Canvas {
    /// Create a canvas filled with the given color
    pub fn new_filled(width: u32, height: u32, color: Rgba<u8>) -> Self {
        Self { buffer: ImageBuffer::from_pixel(width, height, color) }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.buffer.get_pixel(x, y)
    }

    /// Source-over blend `color` at `opacity` onto one pixel
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: Rgba<u8>, opacity: f32) {
        if x >= self.width() || y >= self.height() {
            return;
        }
        let alpha = (color[3] as f32 / 255.0) * opacity.clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }
        let dst = self.buffer.get_pixel_mut(x, y);
        *dst = source_over(*dst, color, alpha);
    }

    /// Blend a solid color over every pixel whose center lies inside `rect`
    pub fn fill_rect(&mut self, rect: Rect, color: Rgba<u8>) {
        let Some((x0, y0, x1, y1)) = self.pixel_bounds(rect) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend_pixel(x, y, color, 1.0);
            }
        }
    }

    /// Clip a rectangle to whole pixel bounds `(x0, y0, x1, y1)`, end-exclusive
    pub fn pixel_bounds(&self, rect: Rect) -> Option<(u32, u32, u32, u32)> {
        let x0 = rect.x.round().max(0.0) as u32;
        let y0 = rect.y.round().max(0.0) as u32;
        let x1 = (rect.right().round().max(0.0) as u32).min(self.width());
        let y1 = (rect.bottom().round().max(0.0) as u32).min(self.height());
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }

    /// Copy `image` into the canvas with its top-left corner at `(x, y)`
    ///
    /// Pixels falling outside the canvas are dropped; the image's own alpha
    /// is honored.
    pub fn draw_image(&mut self, image: &RgbaImage, x: u32, y: u32, opacity: f32) {
        for (ix, iy, pixel) in image.enumerate_pixels() {
            self.blend_pixel(x + ix, y + iy, *pixel, opacity);
        }
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.buffer
    }

    pub fn as_image_mut(&mut self) -> &mut RgbaImage {
        &mut self.buffer
    }

    pub fn into_image(self) -> RgbaImage {
        self.buffer
    }
}

/// Non-premultiplied source-over for one pixel
pub fn source_over(dst: Rgba<u8>, src: Rgba<u8>, alpha: f32) -> Rgba<u8> {
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = alpha + dst_a * (1.0 - alpha);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let mix = |s: u8, d: u8| {
        let c = (s as f32 * alpha + d as f32 * dst_a * (1.0 - alpha)) / out_a;
        c.round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        mix(src[0], dst[0]),
        mix(src[1], dst[1]),
        mix(src[2], dst[2]),
        (out_a * 255.0).round() as u8,
    ])
}
