use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::{
    error::{ExportError, Result},
    render::{
        canvas::Canvas,
        composite::{Composite, Layer, PhotoLayer, TextItem},
        effects,
        text::TextRenderer,
    },
    source::SourceImage,
};

/// Output pixels per card unit for exported prints
pub const EXPORT_SCALE: u32 = 2;

/// Turns a [`Composite`] into pixels at a fixed output scale
pub struct Rasterizer {
    scale: u32,
    text: TextRenderer,
}

impl Rasterizer {
    pub fn new(scale: u32, text: TextRenderer) -> Self {
        Self { scale: scale.max(1), text }
    }

    /// Paint every layer back to front
    ///
    /// The photo must be embedded. A remote source is refused before any
    /// pixel work starts; without a source the image box shows bare paper.
    pub fn rasterize(&self, composite: &Composite, source: Option<&SourceImage>) -> Result<RgbaImage> {
        let pixels = match source {
            Some(SourceImage::Remote { url }) => {
                return Err(ExportError::CrossOrigin { url: url.clone() }.into());
            }
            Some(SourceImage::Embedded(image)) => Some(image.pixels()),
            None => None,
        };

        let scale = self.scale as f32;
        let width = (composite.width * scale).round() as u32;
        let height = (composite.height * scale).round() as u32;
        if width == 0 || height == 0 {
            return Err(ExportError::EmptyOutput.into());
        }
        debug!("Rasterizing {}x{} at {}x", width, height, self.scale);

        let mut canvas = Canvas::new_filled(width, height, Rgba([0, 0, 0, 0]));
        let mut pending_text: Vec<&TextItem> = Vec::new();

        for layer in &composite.layers {
            if let Layer::Text(item) = layer {
                pending_text.push(item);
                continue;
            }
            self.flush_text(&mut canvas, &mut pending_text, composite, scale)?;

            match layer {
                Layer::Background { color } => {
                    canvas = Canvas::new_filled(width, height, *color);
                }
                Layer::Grain(grain) => effects::apply_grain(&mut canvas, grain, scale),
                Layer::Photo(photo) => {
                    if let Some(pixels) = pixels {
                        draw_photo(&mut canvas, photo, pixels, scale);
                    }
                }
                Layer::Frame(frame) => effects::draw_frame(&mut canvas, frame, scale),
                Layer::Text(_) => {}
            }
        }
        self.flush_text(&mut canvas, &mut pending_text, composite, scale)?;

        Ok(canvas.into_image())
    }

    fn flush_text(
        &self,
        canvas: &mut Canvas,
        pending: &mut Vec<&TextItem>,
        composite: &Composite,
        scale: f32,
    ) -> Result<()> {
        if pending.is_empty() {
            return Ok(());
        }
        self.text.render(canvas, pending, (composite.width, composite.height), scale)?;
        pending.clear();
        Ok(())
    }
}

fn draw_photo(canvas: &mut Canvas, photo: &PhotoLayer, source: &RgbaImage, scale: f32) {
    let Some(crop) = photo.crop else {
        return;
    };
    let Some((x0, y0, x1, y1)) = canvas.pixel_bounds(photo.rect.scaled(scale)) else {
        return;
    };

    let mut fitted = effects::crop_and_fit(source, crop, x1 - x0, y1 - y0);
    effects::apply_filter(&mut fitted, &photo.filter);
    effects::apply_vignette(&mut fitted, photo.vignette, scale);
    canvas.draw_image(&fitted, x0, y0, 1.0);
}
