use std::fmt::Write as _;
use std::sync::Arc;

use image::Rgba;
use resvg::tiny_skia;
use tracing::{debug, warn};
use usvg::fontdb::{Database, Family, Query, Stretch, Style, Weight};

use crate::{
    error::{ExportError, Result},
    render::{
        canvas::Canvas,
        composite::{TextAnchor, TextItem},
    },
};

/// Installed faces tried, in order, for each generic family
const SERIF_FACES: &[&str] = &[
    "DejaVu Serif",
    "Liberation Serif",
    "Noto Serif",
    "FreeSerif",
    "Times New Roman",
    "Georgia",
];
const MONOSPACE_FACES: &[&str] = &[
    "DejaVu Sans Mono",
    "Liberation Mono",
    "Noto Sans Mono",
    "FreeMono",
    "Courier New",
    "Menlo",
];
const CURSIVE_FACES: &[&str] = &[
    "Comic Sans MS",
    "URW Chancery L",
    "Z003",
    "Apple Chancery",
    "Brush Script MT",
];

/// Rasterizes footer text through SVG and the installed fonts
pub struct TextRenderer {
    fontdb: Arc<Database>,
}

impl TextRenderer {
    /// Renderer backed by the system font set
    pub fn new() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        debug!("Loaded {} font faces", db.faces().count());
        Self::with_database(db)
    }

    /// The generic families are pointed at faces the database actually holds
    pub fn with_database(mut db: Database) -> Self {
        pin_generic_families(&mut db);
        Self { fontdb: Arc::new(db) }
    }

    /// Renderer with no fonts; text layers are skipped
    pub fn empty() -> Self {
        Self::with_database(Database::new())
    }

    pub fn has_fonts(&self) -> bool {
        self.fontdb.faces().next().is_some()
    }

    /// Draw text items onto the canvas; card units are multiplied by `scale`
    pub fn render(&self, canvas: &mut Canvas, items: &[&TextItem], card: (f32, f32), scale: f32) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        if !self.has_fonts() {
            debug!("No fonts installed, skipping {} text items", items.len());
            return Ok(());
        }

        let svg = to_svg(items, card.0, card.1);
        let opts = usvg::Options {
            fontdb: self.fontdb.clone(),
            font_resolver: font_resolver(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(&svg, &opts)
            .map_err(|e| ExportError::RasterizationFailed { reason: format!("text layout: {}", e) })?;

        let mut pixmap = tiny_skia::Pixmap::new(canvas.width(), canvas.height())
            .ok_or_else(|| ExportError::RasterizationFailed { reason: "failed to allocate text pixmap".into() })?;
        resvg::render(&tree, tiny_skia::Transform::from_scale(scale, scale), &mut pixmap.as_mut());

        let width = canvas.width();
        let mut inked = 0usize;
        for (i, px) in pixmap.pixels().iter().enumerate() {
            if px.alpha() == 0 {
                continue;
            }
            inked += 1;
            let c = px.demultiply();
            let (x, y) = (i as u32 % width, i as u32 / width);
            canvas.blend_pixel(x, y, Rgba([c.red(), c.green(), c.blue(), c.alpha()]), 1.0);
        }

        if inked == 0 && items.iter().any(|item| !item.text.trim().is_empty() && item.opacity > 0.0) {
            warn!("No glyphs were drawn for {} text items; check the installed fonts", items.len());
        }
        Ok(())
    }
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn installed_family(db: &Database, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .find(|name| db.faces().any(|face| face.families.iter().any(|(family, _)| family == *name)))
        .map(|name| name.to_string())
}

fn first_family(db: &Database, monospaced: bool) -> Option<String> {
    db.faces()
        .find(|face| !monospaced || face.monospaced)
        .and_then(|face| face.families.first())
        .map(|(family, _)| family.clone())
}

fn pin_generic_families(db: &mut Database) {
    let serif = installed_family(db, SERIF_FACES).or_else(|| first_family(db, false));
    let monospace = installed_family(db, MONOSPACE_FACES).or_else(|| first_family(db, true));
    let cursive = installed_family(db, CURSIVE_FACES).or_else(|| serif.clone());

    if let Some(family) = &serif {
        db.set_serif_family(family.as_str());
    }
    if let Some(family) = &monospace {
        db.set_monospace_family(family.as_str());
    }
    if let Some(family) = &cursive {
        db.set_cursive_family(family.as_str());
    }
    debug!("Generic fonts: serif={:?} monospace={:?} cursive={:?}", serif, monospace, cursive);
}

/// Font selection that falls back through the generic families, then to any face
fn font_resolver() -> usvg::FontResolver<'static> {
    usvg::FontResolver {
        select_font: Box::new(|font, fontdb| {
            let mut families: Vec<Family<'_>> = font
                .families()
                .iter()
                .map(|family| match family {
                    usvg::FontFamily::Serif => Family::Serif,
                    usvg::FontFamily::SansSerif => Family::SansSerif,
                    usvg::FontFamily::Cursive => Family::Cursive,
                    usvg::FontFamily::Fantasy => Family::Fantasy,
                    usvg::FontFamily::Monospace => Family::Monospace,
                    usvg::FontFamily::Named(name) => Family::Name(name),
                })
                .collect();
            families.extend([Family::Serif, Family::Monospace, Family::SansSerif]);

            let style = match font.style() {
                usvg::FontStyle::Normal => Style::Normal,
                usvg::FontStyle::Italic => Style::Italic,
                usvg::FontStyle::Oblique => Style::Oblique,
            };
            let query = Query {
                families: &families,
                weight: Weight(font.weight()),
                stretch: Stretch::Normal,
                style,
            };

            fontdb.query(&query).or_else(|| fontdb.faces().next().map(|face| face.id))
        }),
        select_fallback: usvg::FontResolver::default_fallback_selector(),
    }
}

/// SVG document holding the text items, in card units
pub fn to_svg(items: &[&TextItem], width: f32, height: f32) -> String {
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = width,
        h = height
    );

    for item in items {
        let anchor = match item.anchor {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        };
        let _ = write!(
            svg,
            r##"<text x="{x}" y="{y}" font-family="{family}" font-size="{size}" font-style="{style}" letter-spacing="{spacing}" text-anchor="{anchor}" fill="#{r:02x}{g:02x}{b:02x}" fill-opacity="{opacity}""##,
            x = item.x,
            y = item.y,
            family = item.font.css_name(),
            size = item.size,
            style = if item.italic { "italic" } else { "normal" },
            spacing = item.tracking * item.size,
            anchor = anchor,
            r = item.color[0],
            g = item.color[1],
            b = item.color[2],
            opacity = item.opacity * item.color[3] as f32 / 255.0,
        );
        if item.rotation != 0.0 {
            let _ = write!(svg, r#" transform="rotate({} {} {})""#, item.rotation, item.x, item.y);
        }
        let _ = write!(svg, ">{}</text>", escape(&item.text));
    }

    svg.push_str("</svg>");
    svg
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
