use std::sync::{Arc, OnceLock};

use anyhow::Context as _;

use crate::config::model::FontCandidate;
use crate::foundation::core::{Rgb8, Rgba8};
use crate::foundation::error::{IntroError, IntroResult};
use crate::render::layer::{Layer, alpha_bounds};

/// Glow passes are drawn at `(k, k)` for `k` in this range, farthest first.
const GLOW_OFFSETS: [i64; 5] = [5, 4, 3, 2, 1];

/// DejaVu Sans Mono, shipped with the crate so the chain always has a last resort.
static EMBEDDED_FONT_DATA: &[u8] = include_bytes!("../../assets/fonts/DejaVuSansMono.ttf");

static EMBEDDED_FONT: OnceLock<Option<(Arc<usvg::fontdb::Database>, String)>> = OnceLock::new();

/// Outcome of walking a font candidate chain.
#[derive(Clone)]
pub enum ResolvedFont {
    /// A scalable font loaded into its own database.
    Vector {
        db: Arc<usvg::fontdb::Database>,
        family: String,
        source: FontCandidate,
    },
    /// Nothing in the chain resolved; text renders as an empty layer.
    Unavailable,
}

impl ResolvedFont {
    /// The font embedded in the crate. `Unavailable` only if its data fails to parse.
    pub fn embedded() -> Self {
        let loaded = EMBEDDED_FONT.get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_font_data(EMBEDDED_FONT_DATA.to_vec());
            let family = first_family(&db)?;
            Some((Arc::new(db), family))
        });
        match loaded {
            Some((db, family)) => Self::Vector {
                db: db.clone(),
                family: family.clone(),
                source: FontCandidate::Builtin,
            },
            None => {
                tracing::warn!("embedded font failed to load");
                Self::Unavailable
            }
        }
    }

    fn is_embedded(&self) -> bool {
        matches!(
            self,
            Self::Vector {
                source: FontCandidate::Builtin,
                ..
            }
        )
    }
}

impl std::fmt::Debug for ResolvedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vector { family, source, .. } => f
                .debug_struct("Vector")
                .field("family", family)
                .field("source", source)
                .finish_non_exhaustive(),
            Self::Unavailable => f.write_str("Unavailable"),
        }
    }
}

fn first_family(db: &usvg::fontdb::Database) -> Option<String> {
    db.faces()
        .next()
        .and_then(|face| face.families.first().map(|(name, _)| name.clone()))
}

/// Try every candidate in order and return the first that resolves.
///
/// Misses are logged at debug level. Reaching the end of the chain without a match is reported as
/// a font-resolution warning, never as an error.
pub fn resolve_font(chain: &[FontCandidate]) -> ResolvedFont {
    let mut system_db: Option<Arc<usvg::fontdb::Database>> = None;

    for candidate in chain {
        match candidate {
            FontCandidate::File(path) => {
                if !path.is_file() {
                    tracing::debug!(path = %path.display(), "font file not found");
                    continue;
                }
                let mut db = usvg::fontdb::Database::new();
                if let Err(e) = db.load_font_file(path) {
                    tracing::debug!(path = %path.display(), error = %e, "font file unreadable");
                    continue;
                }
                let Some(family) = first_family(&db) else {
                    tracing::debug!(path = %path.display(), "font file has no usable face");
                    continue;
                };
                tracing::debug!(path = %path.display(), %family, "resolved font file");
                return ResolvedFont::Vector {
                    db: Arc::new(db),
                    family,
                    source: candidate.clone(),
                };
            }
            FontCandidate::Family(name) => {
                let db = system_db
                    .get_or_insert_with(|| {
                        let mut db = usvg::fontdb::Database::new();
                        db.load_system_fonts();
                        Arc::new(db)
                    })
                    .clone();
                let families = [usvg::fontdb::Family::Name(name.as_str())];
                let query = usvg::fontdb::Query {
                    families: &families,
                    weight: usvg::fontdb::Weight::NORMAL,
                    stretch: usvg::fontdb::Stretch::Normal,
                    style: usvg::fontdb::Style::Normal,
                };
                let Some(family) = db.query(&query).and_then(|id| {
                    db.face(id)
                        .and_then(|face| face.families.first().map(|(n, _)| n.clone()))
                }) else {
                    tracing::debug!(family = %name, "font family not installed");
                    continue;
                };
                tracing::debug!(%family, "resolved system font family");
                return ResolvedFont::Vector {
                    db,
                    family,
                    source: candidate.clone(),
                };
            }
            FontCandidate::Builtin => {
                tracing::info!("using embedded font for wordmark");
                return ResolvedFont::embedded();
            }
        }
    }

    tracing::warn!(
        candidates = chain.len(),
        "no font in the chain resolved; wordmark will be empty"
    );
    ResolvedFont::Unavailable
}

/// Renders the glowing wordmark.
#[derive(Clone, Debug)]
pub struct TextRenderer {
    layer_width: u32,
    accent: Rgb8,
    glow: Rgba8,
    font: ResolvedFont,
}

impl TextRenderer {
    /// `layer_width` is normally the canvas width.
    pub fn new(layer_width: u32, accent: Rgb8, glow: Rgba8, font: ResolvedFont) -> Self {
        Self {
            layer_width,
            accent,
            glow,
            font,
        }
    }

    /// Layer of `layer_width x 2 * font_size` with `text` centred on measured glyph bounds.
    ///
    /// Glow copies at offsets `(5,5)` down to `(1,1)` sit beneath a sharp accent-coloured copy.
    /// A font that yields no glyphs for `text` falls back to the embedded font.
    pub fn render(&self, text: &str, font_size: u32) -> IntroResult<Layer> {
        let height = font_size.saturating_mul(2).max(1);
        if text.trim().is_empty() {
            return Layer::new(self.layer_width, height);
        }

        let ResolvedFont::Vector { db, family, .. } = &self.font else {
            return Layer::new(self.layer_width, height);
        };
        if let Some(layer) = self.render_vector(db, family, text, font_size, height)? {
            return Ok(layer);
        }
        if !self.font.is_embedded()
            && let ResolvedFont::Vector { db, family, .. } = ResolvedFont::embedded()
        {
            tracing::warn!(%family, "font produced no glyphs; falling back to embedded font");
            if let Some(layer) = self.render_vector(&db, &family, text, font_size, height)? {
                return Ok(layer);
            }
        }
        tracing::warn!(text, "no glyphs rendered for wordmark");
        Layer::new(self.layer_width, height)
    }

    /// `Ok(None)` when the font yields no visible glyphs for `text`.
    fn render_vector(
        &self,
        db: &Arc<usvg::fontdb::Database>,
        family: &str,
        text: &str,
        font_size: u32,
        height: u32,
    ) -> IntroResult<Option<Layer>> {
        let baseline = i64::from(font_size);

        // Measure on a scratch canvas wide enough for the unclipped string.
        let scratch_w = self
            .layer_width
            .max(font_size.saturating_mul(text.chars().count() as u32 + 2));
        let mut spans = String::new();
        let sharp = self.accent.with_alpha(255);
        push_text_span(&mut spans, text, 0, baseline, family, font_size, sharp);
        let Some(bounds) = alpha_bounds(&rasterize(db, &spans, scratch_w, height)?, scratch_w)
        else {
            return Ok(None);
        };

        let x = (i64::from(self.layer_width) - bounds.width()) / 2 - bounds.left;
        let y = baseline + (i64::from(height) - bounds.height()) / 2 - bounds.top;

        let mut spans = String::new();
        for k in GLOW_OFFSETS {
            push_text_span(&mut spans, text, x + k, y + k, family, font_size, self.glow);
        }
        push_text_span(&mut spans, text, x, y, family, font_size, sharp);
        let data = rasterize(db, &spans, self.layer_width, height)?;
        Layer::from_premul(self.layer_width, height, data).map(Some)
    }
}

fn push_text_span(
    out: &mut String,
    text: &str,
    x: i64,
    y: i64,
    family: &str,
    font_size: u32,
    color: Rgba8,
) {
    out.push_str(&format!(
        r#"<text x="{x}" y="{y}" font-family="{}" font-size="{font_size}" fill="rgb({},{},{})" fill-opacity="{:.4}" xml:space="preserve">{}</text>"#,
        escape_xml(family),
        color.r,
        color.g,
        color.b,
        f64::from(color.a) / 255.0,
        escape_xml(text),
    ));
}

fn rasterize(
    db: &Arc<usvg::fontdb::Database>,
    body: &str,
    width: u32,
    height: u32,
) -> IntroResult<Vec<u8>> {
    let svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">{body}</svg>"#
    );
    let opts = usvg::Options {
        fontdb: db.clone(),
        ..Default::default()
    };
    let tree = usvg::Tree::from_str(&svg, &opts).context("parse wordmark svg")?;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
        IntroError::Other(anyhow::anyhow!("failed to allocate {width}x{height} text pixmap"))
    })?;
    resvg::render(&tree, resvg::tiny_skia::Transform::identity(), &mut pixmap.as_mut());
    Ok(pixmap.take())
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/elements/text.rs"]
mod tests;
