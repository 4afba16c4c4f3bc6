use super::*;
use crate::config::model::PhaseWeights;
use crate::foundation::core::FrameIndex;
use crate::timeline::phase::schedule;

fn ctx(phase: Phase, p: f64) -> FrameContext {
    FrameContext {
        frame: FrameIndex(0),
        total_frames: 1,
        phase,
        local_progress: p,
    }
}

#[test]
fn fade_in_grows_from_half_size_and_ramps_alpha() {
    let start = logo_modulation(&ctx(Phase::FadeIn, 0.0));
    assert_eq!(start.alpha, 0);
    assert_eq!(start.scale, 0.5);

    let mid = logo_modulation(&ctx(Phase::FadeIn, 0.5));
    assert_eq!(mid.alpha, 128);
    assert_eq!(mid.scale, 0.75);

    let end = logo_modulation(&ctx(Phase::FadeIn, 1.0));
    assert_eq!(end.alpha, 255);
    assert_eq!(end.scale, 1.0);
}

#[test]
fn main_pulses_twice_and_stays_opaque() {
    let quarter_cycle = logo_modulation(&ctx(Phase::Main, 0.125));
    assert_eq!(quarter_cycle.alpha, 255);
    assert!((quarter_cycle.scale - 1.1).abs() < 1e-9);

    let three_quarter_cycle = logo_modulation(&ctx(Phase::Main, 0.375));
    assert!((three_quarter_cycle.scale - 0.9).abs() < 1e-9);

    let second_peak = logo_modulation(&ctx(Phase::Main, 0.625));
    assert!((second_peak.scale - 1.1).abs() < 1e-9);
}

#[test]
fn fade_out_keeps_size_and_ramps_alpha_down() {
    let m = logo_modulation(&ctx(Phase::FadeOut, 0.25));
    assert_eq!(m.scale, 1.0);
    assert_eq!(m.alpha, 191);
    assert_eq!(logo_modulation(&ctx(Phase::FadeOut, 1.0)).alpha, 0);
}

#[test]
fn text_never_scales_and_matches_logo_alpha() {
    for phase in [Phase::FadeIn, Phase::Main, Phase::FadeOut] {
        for p in [0.0, 0.3, 0.7, 1.0] {
            let c = ctx(phase, p);
            let t = text_modulation(&c);
            assert_eq!(t.scale, 1.0);
            assert_eq!(t.alpha, logo_modulation(&c).alpha);
        }
    }
}

#[test]
fn alpha_is_bounded_over_a_whole_run() {
    let w = PhaseWeights::default();
    for f in 0..384 {
        let c = schedule(FrameIndex(f), 384, &w);
        let m = logo_modulation(&c);
        assert!(m.scale >= 0.5 && m.scale <= 1.1 + 1e-9);
        if c.phase == Phase::Main {
            assert_eq!(phase_alpha(&c), 255);
        }
    }
}
