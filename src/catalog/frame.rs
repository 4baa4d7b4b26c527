use crate::catalog::{
    ratio::AspectRatio,
    traits::{impl_from_str, CatalogEntry},
};

/// Broad frame family; decides how the footer is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameCategory {
    Paper,
    Film,
    Polaroid,
}

/// Border decoration drawn over the card
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameBorder {
    /// Plain paper, nothing drawn
    None,
    /// Thin mat line inset from the card edge
    Keyline { inset: f32, width: f32 },
    /// Sprocket bands along the left and right edges
    FilmStripVertical,
    /// Sprocket bands along the top and bottom edges
    FilmStripHorizontal,
    /// Hairline around an instant-print card
    Instant,
}

/// Decorative frame around the print
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrameType {
    #[default]
    Classic,
    Gallery,
    FilmStrip,
    Polaroid,
}

/// Film-strip band thickness, in card units
pub const FILM_BAND: f32 = 24.0;
/// Sprocket hole size (along the band, across the band)
pub const SPROCKET_HOLE: (f32, f32) = (10.0, 14.0);
/// Distance between sprocket hole starts
pub const SPROCKET_PITCH: f32 = 28.0;

impl FrameType {
    pub fn category(&self) -> FrameCategory {
        match self {
            FrameType::Classic | FrameType::Gallery => FrameCategory::Paper,
            FrameType::FilmStrip => FrameCategory::Film,
            FrameType::Polaroid => FrameCategory::Polaroid,
        }
    }

    pub fn is_polaroid(&self) -> bool {
        self.category() == FrameCategory::Polaroid
    }

    /// Card padding around the image box: (top, right, bottom, left)
    pub fn padding(&self) -> (f32, f32, f32, f32) {
        match self {
            FrameType::Polaroid => (24.0, 24.0, 24.0, 24.0),
            _ => (48.0, 48.0, 48.0, 48.0),
        }
    }

    /// Border variant for the given format
    pub fn border(&self, ratio: AspectRatio) -> FrameBorder {
        match self {
            FrameType::Classic => FrameBorder::None,
            FrameType::Gallery => FrameBorder::Keyline { inset: 16.0, width: 1.0 },
            FrameType::FilmStrip if ratio.is_landscape() => FrameBorder::FilmStripHorizontal,
            FrameType::FilmStrip => FrameBorder::FilmStripVertical,
            FrameType::Polaroid => FrameBorder::Instant,
        }
    }
}

impl CatalogEntry for FrameType {
    const KIND: &'static str = "frame";

    fn all() -> &'static [Self] {
        &[
            FrameType::Classic,
            FrameType::Gallery,
            FrameType::FilmStrip,
            FrameType::Polaroid,
        ]
    }

    fn id(&self) -> &'static str {
        match self {
            FrameType::Classic => "classic",
            FrameType::Gallery => "gallery",
            FrameType::FilmStrip => "film-strip",
            FrameType::Polaroid => "polaroid",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            FrameType::Classic => "Classic",
            FrameType::Gallery => "Gallery Mat",
            FrameType::FilmStrip => "Film Strip",
            FrameType::Polaroid => "Instant",
        }
    }
}

impl_from_str!(FrameType);
