//! Maps a composition to its layer stack.
//!
//! Everything here is a pure function of the composition state, the footer
//! metadata and the source image size. Units are card units: the card is
//! [`CARD_WIDTH`] wide and the exporter multiplies by its output scale.

use crate::{
    catalog::{CatalogEntry, FilterOp},
    render::composite::{
        BlendMode, Composite, CropBox, FontClass, FrameLayer, GrainLayer, Layer, PhotoLayer, Rect,
        TextAnchor, TextItem, Vignette,
    },
    session::{metadata::PhotoMetadata, state::{CompositionState, FontFamily}},
    source::SourceImage,
};

/// Width of the printed card
pub const CARD_WIDTH: f32 = 480.0;

/// Seed of the fixed paper-grain texture
pub const GRAIN_SEED: u64 = 0x6d65_6d6f_6972;

/// Extra grain opacity at the top of the grain slider
pub const GRAIN_SLIDER_RANGE: f32 = 0.3;

const CAPTION_SIZE: f32 = 20.0;
const CAPTION_LINE: f32 = 25.0;
const POLAROID_CAPTION_SIZE: f32 = 18.0;
const POLAROID_CAPTION_LINE: f32 = 23.0;
const META_SIZE: f32 = 8.0;
const META_LINE: f32 = 12.0;
const META_TRACKING: f32 = 0.2;

/// Share of the photo width a caption line may take
pub const CAPTION_MAX_SHARE: f32 = 0.7;

/// Average glyph advance in em, before tracking
const GLYPH_EM: f32 = 0.62;

/// Grain opacity for a paper base opacity and a grain slider fraction
pub fn grain_opacity(texture_opacity: f32, grain_fraction: f32) -> f32 {
    texture_opacity + grain_fraction * GRAIN_SLIDER_RANGE
}

/// Source region shown when a `src_w`×`src_h` image covers a `box_w`×`box_h`
/// box, positioned at fractional offsets `pos_x`, `pos_y`
pub fn cover_crop(src_w: f32, src_h: f32, box_w: f32, box_h: f32, pos_x: f32, pos_y: f32) -> CropBox {
    let scale = (box_w / src_w).max(box_h / src_h);
    let width = (box_w / scale).min(src_w);
    let height = (box_h / scale).min(src_h);

    CropBox {
        x: (src_w - width) * pos_x.clamp(0.0, 1.0),
        y: (src_h - height) * pos_y.clamp(0.0, 1.0),
        width,
        height,
    }
}

/// Build the layer stack for the current composition
pub fn render(state: &CompositionState, metadata: &PhotoMetadata, source: Option<&SourceImage>) -> Composite {
    let paper = state.paper();
    let frame = state.frame();
    let (pad_top, pad_right, _pad_bottom, pad_left) = frame.padding();

    let box_width = CARD_WIDTH - pad_left - pad_right;
    let (_, box_height) = state.aspect_ratio().box_size(box_width);
    let photo_rect = Rect::new(pad_left, pad_top, box_width, box_height);

    let (texts, footer_bottom) = if frame.is_polaroid() {
        polaroid_footer(state, metadata, &photo_rect)
    } else {
        standard_footer(state, metadata, &photo_rect)
    };
    let height = footer_bottom + frame.padding().2;
    let card = Rect::new(0.0, 0.0, CARD_WIDTH, height);

    let crop = source.and_then(SourceImage::dimensions).map(|(w, h)| {
        cover_crop(
            w as f32,
            h as f32,
            photo_rect.width,
            photo_rect.height,
            state.horizontal_position().fraction(),
            state.vertical_position().fraction(),
        )
    });

    let vignette = state.vignette().get() as f32;
    let mut layers = vec![
        Layer::Background { color: paper.color() },
        Layer::Grain(GrainLayer {
            rect: card,
            opacity: grain_opacity(paper.texture_opacity(), state.grain().fraction()),
            blend: BlendMode::Overlay,
            seed: GRAIN_SEED,
        }),
        Layer::Photo(PhotoLayer {
            rect: photo_rect,
            crop,
            filter: state
                .film_stock()
                .effect()
                .then(FilterOp::Sepia(state.warmth().fraction())),
            vignette: Vignette { blur: vignette * 2.0, alpha: vignette / 120.0 },
        }),
        Layer::Frame(FrameLayer {
            rect: card,
            border: frame.border(state.aspect_ratio()),
            border_color: paper.border_color(),
            hole_color: paper.hole_color(),
        }),
    ];
    layers.extend(texts.into_iter().map(Layer::Text));

    Composite { width: CARD_WIDTH, height, layers }
}

/// Estimated advance width of one line of text, in card units
pub fn text_advance(text: &str, size: f32, tracking: f32) -> f32 {
    text.chars().count() as f32 * size * (GLYPH_EM + tracking)
}

/// Greedy word wrap to `max_width`; words longer than a line are split
pub fn wrap_text(text: &str, max_width: f32, size: f32, tracking: f32) -> Vec<String> {
    let per_char = size * (GLYPH_EM + tracking);
    let max_chars = ((max_width / per_char).floor() as usize).max(1);

    let mut lines = Vec::new();
    let mut line: Vec<char> = Vec::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !line.is_empty() {
                lines.push(line.drain(..).collect());
            }
            lines.push(word.drain(..max_chars).collect());
        }
        if word.is_empty() {
            continue;
        }
        if !line.is_empty() && line.len() + 1 + word.len() > max_chars {
            lines.push(line.drain(..).collect());
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.extend(word);
    }
    if !line.is_empty() {
        lines.push(line.into_iter().collect());
    }
    lines
}

/// One item per wrapped caption line, baselines `line_height` apart
fn caption_items(
    state: &CompositionState,
    x: f32,
    first_baseline: f32,
    max_width: f32,
    anchor: TextAnchor,
    (size, line_height): (f32, f32),
) -> Vec<TextItem> {
    let (font, italic, tracking, text) = match state.font_family() {
        FontFamily::Mono => (FontClass::Monospace, false, 0.1, state.caption().as_str().to_uppercase()),
        FontFamily::Serif => (FontClass::Serif, true, 0.0, state.caption().as_str().to_string()),
        FontFamily::Script => (FontClass::Cursive, true, 0.0, state.caption().as_str().to_string()),
    };

    wrap_text(&text, max_width, size, tracking)
        .into_iter()
        .enumerate()
        .map(|(i, line)| TextItem {
            text: line,
            x,
            y: first_baseline + i as f32 * line_height,
            anchor,
            size,
            font,
            italic,
            tracking,
            color: state.paper().text_color(),
            opacity: 1.0,
            rotation: 0.0,
        })
        .collect()
}

fn meta_item(state: &CompositionState, text: String, x: f32, y: f32, anchor: TextAnchor) -> TextItem {
    TextItem {
        text,
        x,
        y,
        anchor,
        size: META_SIZE,
        font: FontClass::Monospace,
        italic: false,
        tracking: META_TRACKING,
        color: state.paper().secondary_color(),
        opacity: 1.0,
        rotation: 0.0,
    }
}

/// Caption, then stock/ISO/aperture on the left; the date runs up the right edge
///
/// The footer is at least as tall as the rotated date.
fn standard_footer(state: &CompositionState, metadata: &PhotoMetadata, photo: &Rect) -> (Vec<TextItem>, f32) {
    let left = photo.x + 4.0;
    let footer_top = photo.bottom() + 4.0;
    let mut cursor = footer_top + 16.0;

    let mut items = caption_items(
        state,
        left,
        cursor + 4.0 + CAPTION_SIZE,
        photo.width * CAPTION_MAX_SHARE,
        TextAnchor::Start,
        (CAPTION_SIZE, CAPTION_LINE),
    );
    if !items.is_empty() {
        cursor += 4.0 + CAPTION_LINE * items.len() as f32;
    }

    cursor += 8.0;
    let line = format!(
        "{}  •  {}  •  {}",
        state.film_stock().name().to_uppercase(),
        metadata.iso,
        metadata.aperture
    );
    items.push(meta_item(state, line, left, cursor + META_SIZE, TextAnchor::Start));
    cursor += META_LINE;
    cursor = cursor.max(footer_top + text_advance(&metadata.date, META_SIZE, META_TRACKING));

    let mut date = meta_item(state, metadata.date.clone(), photo.right() - 4.0, cursor, TextAnchor::Start);
    date.opacity = 0.6;
    date.rotation = -90.0;
    items.push(date);

    (items, cursor)
}

/// Caption and date centered in the chin; no exposure data
fn polaroid_footer(state: &CompositionState, metadata: &PhotoMetadata, photo: &Rect) -> (Vec<TextItem>, f32) {
    let center = photo.x + photo.width / 2.0;
    let mut cursor = photo.bottom() + 16.0;

    let mut items = caption_items(
        state,
        center,
        cursor + POLAROID_CAPTION_SIZE,
        photo.width * CAPTION_MAX_SHARE,
        TextAnchor::Middle,
        (POLAROID_CAPTION_SIZE, POLAROID_CAPTION_LINE),
    );
    if !items.is_empty() {
        cursor += POLAROID_CAPTION_LINE * items.len() as f32 + 8.0;
    }

    items.push(meta_item(state, metadata.date.clone(), center, cursor + META_SIZE, TextAnchor::Middle));
    cursor += META_LINE + 8.0;

    (items, cursor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AspectRatio, FilmStock, FrameBorder, FrameType, PaperType};
    use chrono::NaiveDate;

    fn metadata() -> PhotoMetadata {
        PhotoMetadata::defaults(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
    }

    fn layer_kinds(composite: &Composite) -> Vec<&'static str> {
        composite
            .layers
            .iter()
            .map(|layer| match layer {
                Layer::Background { .. } => "background",
                Layer::Grain(_) => "grain",
                Layer::Photo(_) => "photo",
                Layer::Frame(_) => "frame",
                Layer::Text(_) => "text",
            })
            .collect()
    }

    #[test]
    fn test_layer_order() {
        let composite = render(&CompositionState::new(), &metadata(), None);
        assert_eq!(
            layer_kinds(&composite),
            vec!["background", "grain", "photo", "frame", "text", "text", "text"]
        );
        assert_eq!(composite.background(), Some(PaperType::Alabaster.color()));
    }

    #[test]
    fn test_grain_opacity_tracks_paper_and_slider() {
        let mut state = CompositionState::new();
        let composite = render(&state, &metadata(), None);
        let opacity = composite.grain().unwrap().opacity;
        assert!((opacity - (0.05 + 0.15)).abs() < 1e-6);
        assert_eq!(composite.grain().unwrap().blend, BlendMode::Overlay);

        state.set_paper(PaperType::Kraft);
        state.set_grain(100);
        let opacity = render(&state, &metadata(), None).grain().unwrap().opacity;
        assert!((opacity - 0.45).abs() < 1e-6);
    }

    #[test]
    fn test_photo_filter_appends_warmth() {
        let mut state = CompositionState::new();
        state.set_film_stock(FilmStock::IlfordHp5);
        state.set_warmth(40);
        let composite = render(&state, &metadata(), None);
        assert_eq!(
            composite.photo().unwrap().filter.to_string(),
            "grayscale(1) contrast(1.2) brightness(0.9) sepia(0.4)"
        );
    }

    #[test]
    fn test_vignette_scales_with_slider() {
        let mut state = CompositionState::new();
        state.set_vignette(60);
        let vignette = render(&state, &metadata(), None).photo().unwrap().vignette;
        assert_eq!(vignette.blur, 120.0);
        assert!((vignette.alpha - 0.5).abs() < 1e-6);

        state.set_vignette(0);
        assert!(!render(&state, &metadata(), None).photo().unwrap().vignette.is_visible());
    }

    #[test]
    fn test_photo_box_follows_aspect_ratio() {
        let mut state = CompositionState::new();
        state.set_aspect_ratio(AspectRatio::Square);
        let photo = render(&state, &metadata(), None).photo().unwrap().rect;
        assert_eq!(photo, Rect::new(48.0, 48.0, 384.0, 384.0));
    }

    #[test]
    fn test_cover_crop() {
        // Portrait source into a square box: full width, vertical slack
        let crop = cover_crop(800.0, 1000.0, 384.0, 384.0, 0.5, 0.0);
        assert!((crop.width - 800.0).abs() < 1e-3);
        assert!((crop.height - 800.0).abs() < 1e-3);
        assert_eq!(crop.x, 0.0);
        assert_eq!(crop.y, 0.0);

        let crop = cover_crop(800.0, 1000.0, 384.0, 384.0, 0.5, 1.0);
        assert!((crop.y - 200.0).abs() < 1e-3);

        // Wide source into a tall box: horizontal slack only
        let crop = cover_crop(1600.0, 900.0, 200.0, 300.0, 0.25, 0.5);
        assert!((crop.height - 900.0).abs() < 1e-3);
        assert!((crop.x - (1600.0 - 600.0) * 0.25).abs() < 1e-2);
    }

    #[test]
    fn test_standard_footer_content() {
        let mut state = CompositionState::new();
        state.set_film_stock(FilmStock::Portra400);
        let composite = render(&state, &metadata(), None);
        let texts: Vec<_> = composite.texts().collect();

        assert_eq!(texts[0].text, "Memoir. No. 001");
        assert!(texts[0].italic);
        assert_eq!(texts[0].anchor, TextAnchor::Start);
        assert_eq!(texts[1].text, "PORTRA 400  •  ISO 400  •  ƒ/2.8");
        assert_eq!(texts[2].text, "JAN 2, 2024");
        assert_eq!(texts[2].rotation, -90.0);
    }

    #[test]
    fn test_polaroid_footer_is_centered_without_exposure() {
        let mut state = CompositionState::new();
        state.set_frame(FrameType::Polaroid);
        let composite = render(&state, &metadata(), None);
        let texts: Vec<_> = composite.texts().collect();

        assert_eq!(texts.len(), 2);
        assert!(texts.iter().all(|t| t.anchor == TextAnchor::Middle));
        assert!(texts.iter().all(|t| !t.text.contains("ISO")));
        assert_eq!(texts[1].text, "JAN 2, 2024");
        assert_eq!(composite.frame().unwrap().border, FrameBorder::Instant);
    }

    #[test]
    fn test_empty_caption_is_omitted() {
        let mut state = CompositionState::new();
        state.set_caption("");
        let with_caption = render(&CompositionState::new(), &metadata(), None);
        let without = render(&state, &metadata(), None);
        assert_eq!(without.texts().count(), 2);
        assert!(without.height <= with_caption.height);
    }

    #[test]
    fn test_date_never_reaches_into_photo() {
        let mut state = CompositionState::new();
        state.set_caption("");
        let composite = render(&state, &metadata(), None);
        let photo = composite.photo().unwrap().rect;
        let date = composite.texts().find(|t| t.rotation != 0.0).unwrap();

        let top = date.y - text_advance(&date.text, date.size, date.tracking);
        assert!(top >= photo.bottom(), "date top {} above photo bottom {}", top, photo.bottom());
        assert!(composite.height >= date.y);
    }

    #[test]
    fn test_long_caption_wraps_clear_of_date() {
        let mut state = CompositionState::new();
        state.set_font_family(FontFamily::Mono);
        state.set_caption(&"W".repeat(40));
        let composite = render(&state, &metadata(), None);
        let photo = composite.photo().unwrap().rect;
        let texts: Vec<_> = composite.texts().collect();

        let captions: Vec<_> = texts.iter().filter(|t| t.font == FontClass::Monospace && t.size == 20.0).collect();
        assert!(captions.len() > 1);
        assert_eq!(captions.iter().map(|t| t.text.chars().count()).sum::<usize>(), 40);

        let date = texts.iter().find(|t| t.rotation != 0.0).unwrap();
        for caption in &captions {
            let right = caption.x + text_advance(&caption.text, caption.size, caption.tracking);
            assert!(right <= photo.x + 4.0 + photo.width * CAPTION_MAX_SHARE + 1e-3);
            assert!(right < date.x - date.size);
        }

        // Lines stack downward and the meta line sits below the last one
        let meta = texts.iter().find(|t| t.text.contains("ISO")).unwrap();
        assert!(captions.windows(2).all(|w| w[1].y > w[0].y));
        assert!(meta.y > captions.last().unwrap().y);
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("roll two", 1000.0, 10.0, 0.0), vec!["roll two"]);
        // 65 card units fit ten glyphs at size 10
        assert_eq!(wrap_text("lisbon in june", 65.0, 10.0, 0.0), vec!["lisbon in", "june"]);
        assert_eq!(wrap_text("abcdefghijkl", 65.0, 10.0, 0.0), vec!["abcdefghij", "kl"]);
        assert!(wrap_text("   ", 65.0, 10.0, 0.0).is_empty());
    }

    #[test]
    fn test_font_treatments() {
        let mut state = CompositionState::new();
        state.set_caption("roll two");

        state.set_font_family(FontFamily::Mono);
        let item = render(&state, &metadata(), None).texts().next().cloned().unwrap();
        assert_eq!(item.text, "ROLL TWO");
        assert_eq!(item.font, FontClass::Monospace);
        assert!(!item.italic);

        state.set_font_family(FontFamily::Script);
        let item = render(&state, &metadata(), None).texts().next().cloned().unwrap();
        assert_eq!(item.font, FontClass::Cursive);
        assert!(item.italic);
    }

    #[test]
    fn test_dark_paper_uses_light_ink() {
        let mut state = CompositionState::new();
        state.set_paper(PaperType::MatteBlack);
        let composite = render(&state, &metadata(), None);
        let texts: Vec<_> = composite.texts().collect();
        assert_eq!(texts[0].color, PaperType::MatteBlack.text_color());
        assert_eq!(texts[1].color, PaperType::MatteBlack.secondary_color());
    }

    #[test]
    fn test_crop_uses_source_dimensions() {
        use crate::source::EmbeddedImage;
        use crate::source::types::tests::png_bytes;

        let source = SourceImage::Embedded(EmbeddedImage::decode(png_bytes(100, 50, [0, 0, 0, 255])).unwrap());
        let mut state = CompositionState::new();
        state.set_aspect_ratio(AspectRatio::Square);
        state.set_horizontal_position(0);

        let crop = render(&state, &metadata(), Some(&source)).photo().unwrap().crop.unwrap();
        assert!((crop.width - 50.0).abs() < 1e-3);
        assert_eq!(crop.x, 0.0);

        let remote = SourceImage::Remote { url: "https://example.com/p.jpg".into() };
        assert!(render(&state, &metadata(), Some(&remote)).photo().unwrap().crop.is_none());
    }
}
