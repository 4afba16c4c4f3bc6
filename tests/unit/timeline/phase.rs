use super::*;

fn weights() -> PhaseWeights {
    PhaseWeights::default()
}

#[test]
fn first_frame_starts_fade_in_at_zero() {
    let ctx = schedule(FrameIndex(0), 384, &weights());
    assert_eq!(ctx.phase, Phase::FadeIn);
    assert_eq!(ctx.local_progress, 0.0);
}

#[test]
fn fade_in_to_main_boundary() {
    let w = weights();
    let last_in = schedule(FrameIndex(115), 384, &w);
    let first_main = schedule(FrameIndex(116), 384, &w);
    assert_eq!(last_in.phase, Phase::FadeIn);
    assert!(last_in.local_progress > 0.99);
    assert_eq!(first_main.phase, Phase::Main);
    assert!(first_main.local_progress < 1.0 / (384.0 * w.main) + 1e-9);
}

#[test]
fn main_to_fade_out_boundary() {
    let w = weights();
    let last_main = schedule(FrameIndex(307), 384, &w);
    let first_out = schedule(FrameIndex(308), 384, &w);
    assert_eq!(last_main.phase, Phase::Main);
    assert!(last_main.local_progress > 0.99);
    assert_eq!(first_out.phase, Phase::FadeOut);
    // One frame past the threshold: local progress is at most a single step.
    let step = 1.0 / (384.0 * w.fade_out);
    assert!(first_out.local_progress < step + 1e-9);
}

#[test]
fn last_frame_is_fade_out_near_one() {
    let ctx = schedule(FrameIndex(383), 384, &weights());
    assert_eq!(ctx.phase, Phase::FadeOut);
    assert!(ctx.local_progress > 0.98);
    assert!(ctx.local_progress <= 1.0);
}

#[test]
fn phases_partition_timeline_in_order() {
    let w = PhaseWeights {
        fade_in: 0.25,
        main: 0.6,
        fade_out: 0.15,
    };
    let total = 97;
    let mut prev: Option<FrameContext> = None;
    for f in 0..total {
        let ctx = schedule(FrameIndex(f), total, &w);
        assert!((0.0..=1.0).contains(&ctx.local_progress));
        if let Some(p) = prev {
            let rank = |ph: Phase| match ph {
                Phase::FadeIn => 0,
                Phase::Main => 1,
                Phase::FadeOut => 2,
            };
            assert!(rank(ctx.phase) >= rank(p.phase), "phases must not go backwards");
            if ctx.phase == p.phase {
                assert!(ctx.local_progress > p.local_progress);
            }
        }
        prev = Some(ctx);
    }
}

#[test]
fn single_frame_animation_is_fade_in() {
    let ctx = schedule(FrameIndex(0), 1, &weights());
    assert_eq!(ctx.phase, Phase::FadeIn);
    assert_eq!(ctx.global_progress(), 0.0);
}
