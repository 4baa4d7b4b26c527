use image::Rgba;

use crate::catalog::traits::{impl_from_str, CatalogEntry};

/// Print paper: background color plus the base strength of its texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PaperType {
    #[default]
    Alabaster,
    ExhibitionWhite,
    MatteBlack,
    Kraft,
}

impl PaperType {
    pub fn color(&self) -> Rgba<u8> {
        match self {
            PaperType::Alabaster => Rgba([0xF4, 0xF2, 0xED, 0xFF]),
            PaperType::ExhibitionWhite => Rgba([0xFF, 0xFF, 0xFF, 0xFF]),
            PaperType::MatteBlack => Rgba([0x1C, 0x1C, 0x1C, 0xFF]),
            PaperType::Kraft => Rgba([0xD6, 0xC6, 0xB9, 0xFF]),
        }
    }

    /// Grain opacity before the grain slider adds to it
    pub fn texture_opacity(&self) -> f32 {
        match self {
            PaperType::Alabaster => 0.05,
            PaperType::ExhibitionWhite => 0.02,
            PaperType::MatteBlack => 0.1,
            PaperType::Kraft => 0.15,
        }
    }

    /// Dark papers take light ink
    pub fn is_dark(&self) -> bool {
        matches!(self, PaperType::MatteBlack)
    }

    /// Ink for the caption
    pub fn text_color(&self) -> Rgba<u8> {
        if self.is_dark() {
            Rgba([0xD4, 0xD4, 0xD4, 0xFF])
        } else {
            Rgba([0x1C, 0x1C, 0x1C, 0xFF])
        }
    }

    /// Ink for metadata and dates
    pub fn secondary_color(&self) -> Rgba<u8> {
        if self.is_dark() {
            Rgba([0x73, 0x73, 0x73, 0xFF])
        } else {
            Rgba([0xA3, 0xA3, 0xA3, 0xFF])
        }
    }

    /// Sprocket hole fill for film-strip frames
    pub fn hole_color(&self) -> Rgba<u8> {
        if self.is_dark() {
            Rgba([0xFF, 0xFF, 0xFF, 102])
        } else {
            Rgba([0x00, 0x00, 0x00, 51])
        }
    }

    /// Keyline and band color for decorated frames
    pub fn border_color(&self) -> Rgba<u8> {
        if self.is_dark() {
            Rgba([0xFF, 0xFF, 0xFF, 51])
        } else {
            Rgba([0x00, 0x00, 0x00, 26])
        }
    }
}

impl CatalogEntry for PaperType {
    const KIND: &'static str = "paper";

    fn all() -> &'static [Self] {
        &[
            PaperType::Alabaster,
            PaperType::ExhibitionWhite,
            PaperType::MatteBlack,
            PaperType::Kraft,
        ]
    }

    fn id(&self) -> &'static str {
        match self {
            PaperType::Alabaster => "alabaster",
            PaperType::ExhibitionWhite => "pure-white",
            PaperType::MatteBlack => "matte-black",
            PaperType::Kraft => "kraft",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            PaperType::Alabaster => "Alabaster",
            PaperType::ExhibitionWhite => "Exhibition White",
            PaperType::MatteBlack => "Matte Black",
            PaperType::Kraft => "Kraft",
        }
    }
}

impl_from_str!(PaperType);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_matte_black_is_dark() {
        for paper in PaperType::all() {
            assert_eq!(paper.is_dark(), *paper == PaperType::MatteBlack);
        }
        assert_eq!(PaperType::MatteBlack.text_color(), Rgba([0xD4, 0xD4, 0xD4, 0xFF]));
        assert_eq!(PaperType::Kraft.text_color(), Rgba([0x1C, 0x1C, 0x1C, 0xFF]));
    }

    #[test]
    fn test_default_is_first_entry() {
        assert_eq!(PaperType::at(0), Some(PaperType::default()));
        assert_eq!(PaperType::from_id("kraft").unwrap().texture_opacity(), 0.15);
    }
}
