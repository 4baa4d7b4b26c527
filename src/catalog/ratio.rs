use crate::catalog::traits::{impl_from_str, CatalogEntry};

/// Print format; the image box is cropped to this width/height ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AspectRatio {
    Square,
    Portrait4x5,
    Widescreen16x9,
    Portrait2x3,
    Landscape3x2,
    Landscape4x3,
    Landscape5x4,
}

impl Default for AspectRatio {
    fn default() -> Self {
        AspectRatio::Portrait4x5
    }
}

impl AspectRatio {
    pub fn label(&self) -> &'static str {
        self.id()
    }

    /// Width divided by height
    pub fn ratio(&self) -> f32 {
        match self {
            AspectRatio::Square => 1.0,
            AspectRatio::Portrait4x5 => 4.0 / 5.0,
            AspectRatio::Widescreen16x9 => 16.0 / 9.0,
            AspectRatio::Portrait2x3 => 2.0 / 3.0,
            AspectRatio::Landscape3x2 => 3.0 / 2.0,
            AspectRatio::Landscape4x3 => 4.0 / 3.0,
            AspectRatio::Landscape5x4 => 5.0 / 4.0,
        }
    }

    /// Landscape formats get horizontal film-strip bands
    pub fn is_landscape(&self) -> bool {
        matches!(self.id(), "3:2" | "4:3" | "16:9" | "5:4")
    }

    /// Size of the crop box for a given box width
    pub fn box_size(&self, width: f32) -> (f32, f32) {
        (width, width / self.ratio())
    }
}

impl CatalogEntry for AspectRatio {
    const KIND: &'static str = "aspect ratio";

    fn all() -> &'static [Self] {
        &[
            AspectRatio::Square,
            AspectRatio::Portrait4x5,
            AspectRatio::Widescreen16x9,
            AspectRatio::Portrait2x3,
            AspectRatio::Landscape3x2,
            AspectRatio::Landscape4x3,
            AspectRatio::Landscape5x4,
        ]
    }

    fn id(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait4x5 => "4:5",
            AspectRatio::Widescreen16x9 => "16:9",
            AspectRatio::Portrait2x3 => "2:3",
            AspectRatio::Landscape3x2 => "3:2",
            AspectRatio::Landscape4x3 => "4:3",
            AspectRatio::Landscape5x4 => "5:4",
        }
    }

    fn name(&self) -> &'static str {
        self.id()
    }
}

impl_from_str!(AspectRatio);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_index_one() {
        assert_eq!(AspectRatio::at(1), Some(AspectRatio::default()));
        assert_eq!(AspectRatio::default().id(), "4:5");
    }

    #[test]
    fn test_landscape_classification() {
        let landscape: Vec<_> = AspectRatio::all()
            .iter()
            .filter(|r| r.is_landscape())
            .map(|r| r.id())
            .collect();
        assert_eq!(landscape, vec!["16:9", "3:2", "4:3", "5:4"]);
        assert!(!AspectRatio::Square.is_landscape());
        assert!(!AspectRatio::Portrait2x3.is_landscape());
    }

    #[test]
    fn test_box_size() {
        let (w, h) = AspectRatio::Portrait4x5.box_size(384.0);
        assert_eq!(w, 384.0);
        assert!((h - 480.0).abs() < 1e-3);
    }
}
