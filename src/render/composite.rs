use image::Rgba;

use crate::catalog::{FilterChain, FrameBorder};

/// Axis-aligned rectangle in card units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Scale every coordinate, e.g. from card units to output pixels
    pub fn scaled(&self, factor: f32) -> Rect {
        Rect::new(self.x * factor, self.y * factor, self.width * factor, self.height * factor)
    }
}

/// How a layer combines with what is below it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    Normal,
    Overlay,
}

/// Region of the source photo, in source pixels, that fills the image box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Inset shadow darkening the photo's edges
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vignette {
    /// Blur radius in card units
    pub blur: f32,
    /// Shadow opacity in `[0, 1]`
    pub alpha: f32,
}

impl Vignette {
    pub fn is_visible(&self) -> bool {
        self.blur > 0.0 && self.alpha > 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhotoLayer {
    /// Image box on the card
    pub rect: Rect,
    /// Visible part of the source; `None` while the source size is unknown
    pub crop: Option<CropBox>,
    pub filter: FilterChain,
    pub vignette: Vignette,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrainLayer {
    pub rect: Rect,
    pub opacity: f32,
    pub blend: BlendMode,
    pub seed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameLayer {
    pub rect: Rect,
    pub border: FrameBorder,
    pub border_color: Rgba<u8>,
    pub hole_color: Rgba<u8>,
}

/// Generic font family, resolved against whatever fonts are installed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontClass {
    Monospace,
    Serif,
    Cursive,
}

impl FontClass {
    pub fn css_name(&self) -> &'static str {
        match self {
            FontClass::Monospace => "monospace",
            FontClass::Serif => "serif",
            FontClass::Cursive => "cursive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

/// One line of text placed on the card
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub text: String,
    /// Anchor point; `y` is the baseline
    pub x: f32,
    pub y: f32,
    pub anchor: TextAnchor,
    pub size: f32,
    pub font: FontClass,
    pub italic: bool,
    /// Extra spacing between letters, in em
    pub tracking: f32,
    pub color: Rgba<u8>,
    pub opacity: f32,
    /// Clockwise rotation in degrees about the anchor point
    pub rotation: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Background { color: Rgba<u8> },
    Grain(GrainLayer),
    Photo(PhotoLayer),
    Frame(FrameLayer),
    Text(TextItem),
}

/// The print as an ordered stack of layers, back to front
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    pub width: f32,
    pub height: f32,
    pub layers: Vec<Layer>,
}

impl Composite {
    pub fn background(&self) -> Option<Rgba<u8>> {
        self.layers.iter().find_map(|layer| match layer {
            Layer::Background { color } => Some(*color),
            _ => None,
        })
    }

    pub fn grain(&self) -> Option<&GrainLayer> {
        self.layers.iter().find_map(|layer| match layer {
            Layer::Grain(grain) => Some(grain),
            _ => None,
        })
    }

    pub fn photo(&self) -> Option<&PhotoLayer> {
        self.layers.iter().find_map(|layer| match layer {
            Layer::Photo(photo) => Some(photo),
            _ => None,
        })
    }

    pub fn frame(&self) -> Option<&FrameLayer> {
        self.layers.iter().find_map(|layer| match layer {
            Layer::Frame(frame) => Some(frame),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &TextItem> {
        self.layers.iter().filter_map(|layer| match layer {
            Layer::Text(item) => Some(item),
            _ => None,
        })
    }
}
