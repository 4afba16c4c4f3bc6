use super::*;
use std::path::PathBuf;

const WHITE: Rgb8 = Rgb8::new(255, 255, 255);
const GLOW: Rgba8 = Rgba8::new(138, 43, 226, 128);

fn embedded(width: u32) -> TextRenderer {
    TextRenderer::new(width, WHITE, GLOW, ResolvedFont::embedded())
}

#[test]
fn chain_falls_through_missing_candidates_to_embedded_font() {
    let chain = vec![
        FontCandidate::File(PathBuf::from("/definitely/not/here.ttf")),
        FontCandidate::Family("NoSuchFamily-bootreel-test".to_owned()),
        FontCandidate::Builtin,
    ];
    let font = resolve_font(&chain);
    assert!(font.is_embedded(), "{font:?}");
    let ResolvedFont::Vector { family, .. } = font else {
        panic!("embedded font should be a vector font");
    };
    assert_eq!(family, "DejaVu Sans Mono");
}

#[test]
fn embedded_font_database_is_loaded_once() {
    let (ResolvedFont::Vector { db: a, .. }, ResolvedFont::Vector { db: b, .. }) =
        (ResolvedFont::embedded(), ResolvedFont::embedded())
    else {
        panic!("embedded font failed to load");
    };
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn exhausted_chain_is_unavailable_and_renders_empty() {
    let font = resolve_font(&[FontCandidate::File(PathBuf::from("/nope.otf"))]);
    assert!(matches!(font, ResolvedFont::Unavailable));
    let r = TextRenderer::new(64, WHITE, GLOW, font);
    let layer = r.render("LilithOS", 16).unwrap();
    assert_eq!((layer.width(), layer.height()), (64, 32));
    assert!(layer.is_transparent());
}

#[test]
fn embedded_text_is_centred_with_glow_trailing_down_right() {
    let layer = embedded(400).render("HI", 40).unwrap();
    assert_eq!((layer.width(), layer.height()), (400, 80));

    let b = alpha_bounds(layer.data(), 400).unwrap();
    // The sharp pass sets the left/top edges; glow extends right/bottom by 5px.
    let (left, right) = (b.left, 400 - b.right);
    let (top, bottom) = (b.top, 80 - b.bottom);
    assert!((left - (right + 5)).abs() <= 2, "{b:?}");
    assert!((top - (bottom + 5)).abs() <= 2, "{b:?}");
}

#[test]
fn sharp_pass_sits_on_top_of_tinted_glow() {
    let layer = embedded(400).render("HI", 40).unwrap();
    let px: Vec<&[u8]> = layer.data().chunks_exact(4).collect();
    assert!(px.iter().any(|p| *p == [255, 255, 255, 255]));
    // Glow-only pixels keep the purple tint: blue dominates red.
    assert!(px.iter().any(|p| p[3] > 0 && p[3] < 255 && p[2] > p[0]));
}

#[test]
fn blank_text_yields_transparent_layer() {
    let layer = embedded(50).render("   ", 10).unwrap();
    assert_eq!((layer.width(), layer.height()), (50, 20));
    assert!(layer.is_transparent());
}

#[test]
fn xml_special_characters_are_escaped() {
    assert_eq!(escape_xml(r#"a<b>&"c'"#), "a&lt;b&gt;&amp;&quot;c&apos;");
}

#[test]
fn vector_font_renders_centered_when_available() {
    let path = PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf");
    if !path.is_file() {
        return;
    }
    let font = resolve_font(&[FontCandidate::File(path)]);
    assert!(matches!(font, ResolvedFont::Vector { .. }));
    let layer = TextRenderer::new(400, WHITE, GLOW, font)
        .render("LilithOS", 40)
        .unwrap();
    assert_eq!((layer.width(), layer.height()), (400, 80));
    let b = alpha_bounds(layer.data(), 400).unwrap();
    // Glow extends the box 5px right/down; the left edge comes from the sharp pass.
    let left_margin = b.left;
    let right_margin = 400 - b.right;
    assert!((left_margin - (right_margin + 5)).abs() <= 2, "{b:?}");
}
