use super::*;

#[test]
fn defaults_validate_and_yield_384_frames() {
    let cfg = AnimationConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.total_frames(), 384);
    assert_eq!(cfg.canvas(), Canvas { width: 2778, height: 1284 });
}

#[test]
fn frame_duration_is_inverse_fps() {
    let cfg = AnimationConfig {
        fps: 120,
        ..AnimationConfig::default()
    };
    let d = cfg.frame_duration().as_secs_f64();
    assert!((d - 1.0 / 120.0).abs() < 1e-9);
}

#[test]
fn rejects_non_positive_canvas_fps_and_duration() {
    let base = AnimationConfig::default();
    for cfg in [
        AnimationConfig { width: 0, ..base.clone() },
        AnimationConfig { height: 0, ..base.clone() },
        AnimationConfig { fps: 0, ..base.clone() },
        AnimationConfig { duration_secs: 0.0, ..base.clone() },
        AnimationConfig { duration_secs: -1.0, ..base.clone() },
        AnimationConfig { duration_secs: f64::NAN, ..base.clone() },
    ] {
        assert!(matches!(cfg.validate(), Err(IntroError::Config(_))));
    }
}

#[test]
fn rejects_durations_that_round_to_zero_frames() {
    let cfg = AnimationConfig {
        fps: 10,
        duration_secs: 0.01,
        ..AnimationConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_bad_phase_weights() {
    let sum_off = PhaseWeights { fade_in: 0.3, main: 0.5, fade_out: 0.3 };
    assert!(sum_off.validate().is_err());

    let zero = PhaseWeights { fade_in: 0.0, main: 0.8, fade_out: 0.2 };
    assert!(zero.validate().is_err());

    let negative = PhaseWeights { fade_in: -0.1, main: 0.9, fade_out: 0.2 };
    assert!(negative.validate().is_err());

    let within_tolerance = PhaseWeights { fade_in: 0.1 + 0.2, main: 0.5, fade_out: 0.2 };
    within_tolerance.validate().unwrap();
}

#[test]
fn partial_json_fills_defaults() {
    let cfg = AnimationConfig::from_json_str(
        r#"{ "width": 320, "height": 180, "fps": 24, "duration_secs": 1.0,
             "palette": { "background": [10, 20, 30] },
             "fonts": ["builtin"] }"#,
    )
    .unwrap();
    assert_eq!(cfg.width, 320);
    assert_eq!(cfg.total_frames(), 24);
    assert_eq!(cfg.palette.background, Rgb8::new(10, 20, 30));
    assert_eq!(cfg.palette.primary, Palette::default().primary);
    assert_eq!(cfg.fonts, vec![FontCandidate::Builtin]);
    assert_eq!(cfg.title, "LilithOS");
}

#[test]
fn json_rejects_negative_particle_count_and_unknown_fields() {
    assert!(AnimationConfig::from_json_str(r#"{ "particle_count": -1 }"#).is_err());
    assert!(AnimationConfig::from_json_str(r#"{ "colour": 1 }"#).is_err());
}

#[test]
fn font_candidates_use_snake_case_tags() {
    let chain: Vec<FontCandidate> =
        serde_json::from_str(r#"[{ "file": "/x.ttf" }, { "family": "Arial" }, "builtin"]"#)
            .unwrap();
    assert_eq!(
        chain,
        vec![
            FontCandidate::File(PathBuf::from("/x.ttf")),
            FontCandidate::Family("Arial".to_owned()),
            FontCandidate::Builtin,
        ]
    );
}
