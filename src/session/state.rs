use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    catalog::{AspectRatio, CatalogEntry, FilmStock, FrameType, PaperType},
    error::{CatalogError, MemoirError},
};

/// Maximum caption length, in characters
pub const CAPTION_MAX_CHARS: usize = 40;

/// Caption a fresh session starts with
pub const DEFAULT_CAPTION: &str = "Memoir. No. 001";

/// Step used by the position nudge buttons
pub const NUDGE_STEP: u8 = 10;

/// Slider value in `[0, 100]`
///
/// Construction clamps, so a stored value is always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct Percent(u8);

impl Percent {
    pub const MIN: Percent = Percent(0);
    pub const HALF: Percent = Percent(50);
    pub const MAX: Percent = Percent(100);

    /// Clamp any integer into range
    pub fn new(value: i64) -> Self {
        Percent(value.clamp(0, 100) as u8)
    }

    /// Clamp a float into range, rounding to the nearest step
    pub fn from_f32(value: f32) -> Self {
        if value.is_nan() {
            return Percent::MIN;
        }
        Percent(value.round().clamp(0.0, 100.0) as u8)
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// Value as a fraction in `[0, 1]`
    pub fn fraction(&self) -> f32 {
        self.0 as f32 / 100.0
    }

    pub fn saturating_add(self, delta: i64) -> Self {
        Percent::new(self.0 as i64 + delta)
    }
}

impl From<i64> for Percent {
    fn from(value: i64) -> Self {
        Percent::new(value)
    }
}

impl From<Percent> for u8 {
    fn from(value: Percent) -> Self {
        value.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caption text bounded at [`CAPTION_MAX_CHARS`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Caption(String);

impl Caption {
    /// Truncate to the maximum length, counting characters rather than bytes
    pub fn new(text: &str) -> Self {
        Caption(text.chars().take(CAPTION_MAX_CHARS).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Caption {
    fn from(text: String) -> Self {
        Caption::new(&text)
    }
}

impl From<Caption> for String {
    fn from(caption: Caption) -> Self {
        caption.0
    }
}

impl Default for Caption {
    fn default() -> Self {
        Caption::new(DEFAULT_CAPTION)
    }
}

/// Typographic treatment of the caption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    Mono,
    #[default]
    Serif,
    Script,
}

impl FontFamily {
    pub const ALL: [FontFamily; 3] = [FontFamily::Mono, FontFamily::Serif, FontFamily::Script];

    pub fn id(&self) -> &'static str {
        match self {
            FontFamily::Mono => "mono",
            FontFamily::Serif => "serif",
            FontFamily::Script => "script",
        }
    }
}

impl FromStr for FontFamily {
    type Err = MemoirError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FontFamily::ALL
            .into_iter()
            .find(|font| font.id() == s)
            .ok_or_else(|| CatalogError::UnknownEntry { kind: "font", id: s.to_string() }.into())
    }
}

/// Which slider a field belongs to; used for labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Vertical,
    Horizontal,
}

/// Every style choice of the current print
///
/// Fields are private; setters are the only way in and they clamp, so the
/// invariants hold for any value a caller can produce.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositionState {
    film_stock: FilmStock,
    paper: PaperType,
    aspect_ratio: AspectRatio,
    caption: Caption,
    font_family: FontFamily,
    vertical_position: Percent,
    horizontal_position: Percent,
    grain: Percent,
    vignette: Percent,
    warmth: Percent,
    frame: FrameType,
}

impl Default for CompositionState {
    fn default() -> Self {
        Self {
            film_stock: FilmStock::all()[0],
            paper: PaperType::all()[0],
            aspect_ratio: AspectRatio::all()[1],
            caption: Caption::default(),
            font_family: FontFamily::Serif,
            vertical_position: Percent::HALF,
            horizontal_position: Percent::HALF,
            grain: Percent::new(50),
            vignette: Percent::new(20),
            warmth: Percent::MIN,
            frame: FrameType::all()[0],
        }
    }
}

impl CompositionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore every field to its documented default
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn film_stock(&self) -> FilmStock { self.film_stock }
    pub fn paper(&self) -> PaperType { self.paper }
    pub fn aspect_ratio(&self) -> AspectRatio { self.aspect_ratio }
    pub fn caption(&self) -> &Caption { &self.caption }
    pub fn font_family(&self) -> FontFamily { self.font_family }
    pub fn vertical_position(&self) -> Percent { self.vertical_position }
    pub fn horizontal_position(&self) -> Percent { self.horizontal_position }
    pub fn grain(&self) -> Percent { self.grain }
    pub fn vignette(&self) -> Percent { self.vignette }
    pub fn warmth(&self) -> Percent { self.warmth }
    pub fn frame(&self) -> FrameType { self.frame }

    pub fn set_film_stock(&mut self, stock: FilmStock) {
        self.film_stock = stock;
    }

    pub fn set_paper(&mut self, paper: PaperType) {
        self.paper = paper;
    }

    pub fn set_aspect_ratio(&mut self, ratio: AspectRatio) {
        self.aspect_ratio = ratio;
    }

    pub fn set_caption(&mut self, text: &str) {
        self.caption = Caption::new(text);
    }

    pub fn set_font_family(&mut self, font: FontFamily) {
        self.font_family = font;
    }

    pub fn set_vertical_position(&mut self, value: i64) {
        self.vertical_position = Percent::new(value);
    }

    pub fn set_horizontal_position(&mut self, value: i64) {
        self.horizontal_position = Percent::new(value);
    }

    pub fn set_grain(&mut self, value: i64) {
        self.grain = Percent::new(value);
    }

    pub fn set_vignette(&mut self, value: i64) {
        self.vignette = Percent::new(value);
    }

    pub fn set_warmth(&mut self, value: i64) {
        self.warmth = Percent::new(value);
    }

    pub fn set_frame(&mut self, frame: FrameType) {
        self.frame = frame;
    }

    /// Move a position slider by whole steps, e.g. `-1` for one step up/left
    pub fn nudge(&mut self, axis: Axis, steps: i64) {
        let delta = steps * NUDGE_STEP as i64;
        match axis {
            Axis::Vertical => self.vertical_position = self.vertical_position.saturating_add(delta),
            Axis::Horizontal => {
                self.horizontal_position = self.horizontal_position.saturating_add(delta)
            }
        }
    }

    /// Slider readout such as `"Vertical: Top (30%)"`
    pub fn position_label(&self, axis: Axis) -> String {
        let (name, value, low, high) = match axis {
            Axis::Vertical => ("Vertical", self.vertical_position.get(), "Top", "Bottom"),
            Axis::Horizontal => ("Horizontal", self.horizontal_position.get(), "Left", "Right"),
        };
        match value {
            50 => format!("{}: Center", name),
            v if v < 50 => format!("{}: {} ({}%)", name, low, v),
            v => format!("{}: {} ({}%)", name, high, v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_fields_are_clamped() {
        let mut state = CompositionState::new();
        for value in [-500_i64, -1, 0, 37, 100, 101, i64::MAX] {
            state.set_grain(value);
            state.set_vignette(value);
            state.set_warmth(value);
            state.set_vertical_position(value);
            state.set_horizontal_position(value);
            for field in [
                state.grain(),
                state.vignette(),
                state.warmth(),
                state.vertical_position(),
                state.horizontal_position(),
            ] {
                assert!(field.get() <= 100);
            }
        }
        state.set_grain(150);
        assert_eq!(state.grain(), Percent::MAX);
        state.set_warmth(-3);
        assert_eq!(state.warmth(), Percent::MIN);
        assert_eq!(Percent::from_f32(f32::NAN), Percent::MIN);
        assert_eq!(Percent::from_f32(49.6).get(), 50);
    }

    #[test]
    fn test_caption_is_bounded() {
        let mut state = CompositionState::new();
        let long = "x".repeat(CAPTION_MAX_CHARS + 25);
        state.set_caption(&long);
        assert_eq!(state.caption().as_str().chars().count(), CAPTION_MAX_CHARS);

        // Multi-byte characters count once each
        let accented = "é".repeat(45);
        state.set_caption(&accented);
        assert_eq!(state.caption().as_str().chars().count(), CAPTION_MAX_CHARS);

        state.set_caption("Short");
        assert_eq!(state.caption().as_str(), "Short");
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut state = CompositionState::new();
        state.set_film_stock(FilmStock::Ektar100);
        state.set_paper(PaperType::Kraft);
        state.set_aspect_ratio(AspectRatio::Square);
        state.set_caption("Summer");
        state.set_font_family(FontFamily::Mono);
        state.set_vertical_position(3);
        state.set_horizontal_position(97);
        state.set_grain(0);
        state.set_vignette(99);
        state.set_warmth(70);
        state.set_frame(FrameType::Polaroid);

        state.reset();

        assert_eq!(state, CompositionState::default());
        assert_eq!(state.film_stock(), FilmStock::Standard);
        assert_eq!(state.paper(), PaperType::Alabaster);
        assert_eq!(state.aspect_ratio(), AspectRatio::Portrait4x5);
        assert_eq!(state.caption().as_str(), "Memoir. No. 001");
        assert_eq!(state.font_family(), FontFamily::Serif);
        assert_eq!(state.vertical_position().get(), 50);
        assert_eq!(state.horizontal_position().get(), 50);
        assert_eq!(state.grain().get(), 50);
        assert_eq!(state.vignette().get(), 20);
        assert_eq!(state.warmth().get(), 0);
        assert_eq!(state.frame(), FrameType::Classic);
    }

    #[test]
    fn test_nudge_and_labels() {
        let mut state = CompositionState::new();
        assert_eq!(state.position_label(Axis::Vertical), "Vertical: Center");

        state.nudge(Axis::Vertical, -2);
        assert_eq!(state.position_label(Axis::Vertical), "Vertical: Top (30%)");

        state.nudge(Axis::Horizontal, 9);
        assert_eq!(state.horizontal_position(), Percent::MAX);
        assert_eq!(state.position_label(Axis::Horizontal), "Horizontal: Right (100%)");
    }

    #[test]
    fn test_font_family_parse() {
        assert_eq!("script".parse::<FontFamily>().unwrap(), FontFamily::Script);
        assert!("cursive".parse::<FontFamily>().is_err());
    }
}
