//! Pixel passes for the non-text layers.
//!
//! Each pass works on a [`Canvas`] region in output pixels. Per-pixel color
//! work is split across rows with rayon; nothing here touches session state.

use image::{imageops, imageops::FilterType, Rgba, RgbaImage};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use rayon::prelude::*;

use crate::{
    catalog::{
        frame::{FILM_BAND, SPROCKET_HOLE, SPROCKET_PITCH},
        FilterChain, FrameBorder,
    },
    render::{
        canvas::Canvas,
        composite::{CropBox, FrameLayer, GrainLayer, Rect, Vignette},
    },
};

/// Side of the square grain tile, in output pixels
pub const GRAIN_TILE: u32 = 200;

/// Cut the cropped region out of the source and resample it to the box size
pub fn crop_and_fit(source: &RgbaImage, crop: CropBox, width: u32, height: u32) -> RgbaImage {
    let (src_w, src_h) = source.dimensions();
    let x = (crop.x.round().max(0.0) as u32).min(src_w.saturating_sub(1));
    let y = (crop.y.round().max(0.0) as u32).min(src_h.saturating_sub(1));
    let w = (crop.width.round().max(1.0) as u32).min(src_w - x);
    let h = (crop.height.round().max(1.0) as u32).min(src_h - y);

    let region = imageops::crop_imm(source, x, y, w, h).to_image();
    if (w, h) == (width, height) {
        return region;
    }
    imageops::resize(&region, width.max(1), height.max(1), FilterType::Triangle)
}

/// Run a filter chain over every pixel, keeping alpha
pub fn apply_filter(image: &mut RgbaImage, filter: &FilterChain) {
    if filter.is_identity() {
        return;
    }
    let row = image.width() as usize * 4;
    if row == 0 {
        return;
    }

    image.par_chunks_mut(row).for_each(|line| {
        for px in line.chunks_exact_mut(4) {
            let [r, g, b] = filter.apply_u8([px[0], px[1], px[2]]);
            px[0] = r;
            px[1] = g;
            px[2] = b;
        }
    });
}

/// Darken the edges of an image with a blurred inset shadow
///
/// `blur` is in output pixels. The shadow is black at `alpha`, half strength
/// on the edge itself and falling off like a Gaussian of sigma `blur / 2`.
pub fn apply_vignette(image: &mut RgbaImage, vignette: Vignette, scale: f32) {
    if !vignette.is_visible() {
        return;
    }
    let (width, height) = image.dimensions();
    let sigma = (vignette.blur * scale / 2.0).max(0.5);
    let alpha = vignette.alpha.clamp(0.0, 1.0);
    let row = width as usize * 4;
    if row == 0 {
        return;
    }

    image.par_chunks_mut(row).enumerate().for_each(|(y, line)| {
        let cy = edge_coverage(y as f32 + 0.5, height as f32, sigma);
        for (x, px) in line.chunks_exact_mut(4).enumerate() {
            let cx = edge_coverage(x as f32 + 0.5, width as f32, sigma);
            let shade = 1.0 - alpha * (1.0 - (1.0 - cx) * (1.0 - cy));
            for c in &mut px[..3] {
                *c = (*c as f32 * shade).round() as u8;
            }
        }
    });
}

/// Shadow coverage at `pos` from the two edges of a span of length `len`
fn edge_coverage(pos: f32, len: f32, sigma: f32) -> f32 {
    let from_edge = |d: f32| 0.5 * erfc(d / (sigma * std::f32::consts::SQRT_2));
    let near = from_edge(pos);
    let far = from_edge(len - pos);
    1.0 - (1.0 - near) * (1.0 - far)
}

/// Complementary error function, Abramowitz and Stegun 7.1.26
fn erfc(x: f32) -> f32 {
    if x < 0.0 {
        return 2.0 - erfc(-x);
    }
    let t = 1.0 / (1.0 + 0.327_591_1 * x);
    let poly = t
        * (0.254_829_6 + t * (-0.284_496_7 + t * (1.421_413_7 + t * (-1.453_152 + t * 1.061_405_4))));
    poly * (-x * x).exp()
}

/// Deterministic grey noise tile for a seed
pub fn grain_tile(seed: u64) -> Vec<u8> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..GRAIN_TILE * GRAIN_TILE).map(|_| rng.gen::<u8>()).collect()
}

/// Overlay blend of one channel, both in `[0, 1]`
fn overlay(base: f32, blend: f32) -> f32 {
    if base < 0.5 {
        2.0 * base * blend
    } else {
        1.0 - 2.0 * (1.0 - base) * (1.0 - blend)
    }
}

/// Overlay the tiled grain texture on a region of the canvas
pub fn apply_grain(canvas: &mut Canvas, layer: &GrainLayer, scale: f32) {
    let opacity = layer.opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 {
        return;
    }
    let Some((x0, y0, x1, y1)) = canvas.pixel_bounds(layer.rect.scaled(scale)) else {
        return;
    };

    let tile = grain_tile(layer.seed);
    let width = canvas.width() as usize;
    let image = canvas.as_image_mut();

    image
        .par_chunks_mut(width * 4)
        .enumerate()
        .skip(y0 as usize)
        .take((y1 - y0) as usize)
        .for_each(|(y, line)| {
            let tile_row = (y as u32 % GRAIN_TILE) * GRAIN_TILE;
            for x in x0..x1 {
                let noise = tile[(tile_row + x % GRAIN_TILE) as usize] as f32 / 255.0;
                let px = &mut line[x as usize * 4..x as usize * 4 + 3];
                for c in px.iter_mut() {
                    let base = *c as f32 / 255.0;
                    let mixed = base + (overlay(base, noise) - base) * opacity;
                    *c = (mixed * 255.0).round().clamp(0.0, 255.0) as u8;
                }
            }
        });
}

/// Draw the frame decoration
pub fn draw_frame(canvas: &mut Canvas, layer: &FrameLayer, scale: f32) {
    let card = layer.rect;
    match layer.border {
        FrameBorder::None => {}
        FrameBorder::Keyline { inset, width } => {
            let inner = Rect::new(
                card.x + inset,
                card.y + inset,
                card.width - 2.0 * inset,
                card.height - 2.0 * inset,
            );
            stroke_rect(canvas, inner.scaled(scale), (width * scale).max(1.0), layer.border_color);
        }
        FrameBorder::Instant => {
            stroke_rect(canvas, card.scaled(scale), scale.max(1.0), layer.border_color);
        }
        FrameBorder::FilmStripVertical => {
            let left = Rect::new(card.x, card.y, FILM_BAND, card.height);
            let right = Rect::new(card.right() - FILM_BAND, card.y, FILM_BAND, card.height);
            for band in [left, right] {
                canvas.fill_rect(band.scaled(scale), layer.border_color);
                for hole in sprocket_holes(band, false) {
                    canvas.fill_rect(hole.scaled(scale), layer.hole_color);
                }
            }
        }
        FrameBorder::FilmStripHorizontal => {
            let top = Rect::new(card.x, card.y, card.width, FILM_BAND);
            let bottom = Rect::new(card.x, card.bottom() - FILM_BAND, card.width, FILM_BAND);
            for band in [top, bottom] {
                canvas.fill_rect(band.scaled(scale), layer.border_color);
                for hole in sprocket_holes(band, true) {
                    canvas.fill_rect(hole.scaled(scale), layer.hole_color);
                }
            }
        }
    }
}

/// Sprocket holes centered across a band, repeating along it
pub fn sprocket_holes(band: Rect, horizontal: bool) -> Vec<Rect> {
    let (along, across) = SPROCKET_HOLE;
    let length = if horizontal { band.width } else { band.height };
    let count = (length / SPROCKET_PITCH).floor() as usize;
    let start = (length - count as f32 * SPROCKET_PITCH + SPROCKET_PITCH - along) / 2.0;

    (0..count)
        .map(|i| {
            let offset = start + i as f32 * SPROCKET_PITCH;
            if horizontal {
                Rect::new(band.x + offset, band.y + (band.height - across) / 2.0, along, across)
            } else {
                Rect::new(band.x + (band.width - across) / 2.0, band.y + offset, across, along)
            }
        })
        .collect()
}

fn stroke_rect(canvas: &mut Canvas, rect: Rect, width: f32, color: Rgba<u8>) {
    let edges = [
        Rect::new(rect.x, rect.y, rect.width, width),
        Rect::new(rect.x, rect.bottom() - width, rect.width, width),
        Rect::new(rect.x, rect.y + width, width, rect.height - 2.0 * width),
        Rect::new(rect.right() - width, rect.y + width, width, rect.height - 2.0 * width),
    ];
    for edge in edges {
        canvas.fill_rect(edge, color);
    }
}
