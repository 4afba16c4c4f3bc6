use super::*;
use crate::config::model::FontCandidate;
use crate::foundation::core::Rgb8;
use crate::timeline::phase::Phase;

fn small_config() -> AnimationConfig {
    AnimationConfig {
        width: 96,
        height: 64,
        fps: 10,
        duration_secs: 1.0,
        particle_count: 0,
        title: "HI".to_owned(),
        font_size: 10,
        logo_size: 32,
        logo_offset_y: 4,
        text_gap: 2,
        fonts: vec![FontCandidate::Builtin],
        ..AnimationConfig::default()
    }
}

#[derive(Clone)]
struct Flaky {
    total: u64,
    fail_at: u64,
}

impl FrameSource for Flaky {
    fn canvas(&self) -> Canvas {
        Canvas {
            width: 1,
            height: 1,
        }
    }

    fn fps(&self) -> u32 {
        10
    }

    fn total_frames(&self) -> u64 {
        self.total
    }

    fn render_frame(&self, frame: FrameIndex) -> IntroResult<RenderedFrame> {
        if frame.0 == self.fail_at {
            return Err(IntroError::render(frame.0, "boom"));
        }
        Ok(RenderedFrame {
            index: frame,
            width: 1,
            height: 1,
            data: vec![frame.0 as u8, 0, 0, 255],
            display_duration: std::time::Duration::from_millis(100),
        })
    }
}

#[test]
fn new_rejects_invalid_config() {
    let cfg = AnimationConfig {
        fps: 0,
        ..small_config()
    };
    assert!(matches!(FrameSequencer::new(cfg), Err(IntroError::Config(_))));
}

#[test]
fn frames_cover_the_timeline_in_order() {
    let seq = FrameSequencer::new(small_config()).unwrap();
    assert_eq!(seq.total_frames(), 10);

    let frames: Vec<_> = seq.frames().collect::<IntroResult<_>>().unwrap();
    assert_eq!(frames.len(), 10);
    for (i, f) in frames.iter().enumerate() {
        assert_eq!(f.index, FrameIndex(i as u64));
        assert_eq!((f.width, f.height), (96, 64));
        assert!((f.display_duration.as_secs_f64() - 0.1).abs() < 1e-9);
        assert!(f.data.chunks_exact(4).all(|px| px[3] == 255));
    }
}

#[test]
fn generate_matches_sequencer_frames() {
    let cfg = small_config();
    let a: Vec<_> = generate(&cfg).unwrap().collect::<IntroResult<_>>().unwrap();
    let b: Vec<_> = FrameSequencer::new(cfg)
        .unwrap()
        .frames()
        .collect::<IntroResult<_>>()
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn frames_are_deterministic_and_restartable() {
    let cfg = AnimationConfig {
        particle_count: 20,
        ..small_config()
    };
    let seq = FrameSequencer::new(cfg).unwrap();
    assert_eq!(
        seq.render_frame(FrameIndex(4)).unwrap(),
        seq.render_frame(FrameIndex(4)).unwrap()
    );

    let mut it = seq.frames();
    let first: Vec<_> = it.by_ref().map(|f| f.unwrap()).collect();
    assert!(it.next().is_none());
    assert!(it.next().is_none());
    it.restart();
    let second: Vec<_> = it.map(|f| f.unwrap()).collect();
    assert_eq!(first, second);
}

#[test]
fn first_frame_shows_only_background() {
    let cfg = AnimationConfig {
        palette: crate::config::model::Palette {
            background: Rgb8::new(10, 20, 30),
            ..Default::default()
        },
        ..small_config()
    };
    let seq = FrameSequencer::new(cfg).unwrap();
    assert_eq!(seq.context(FrameIndex(0)).phase, Phase::FadeIn);

    let f = seq.render_frame(FrameIndex(0)).unwrap();
    assert!(f.data.chunks_exact(4).all(|px| px == [10, 20, 30, 255]));
}

#[test]
fn main_phase_shows_the_mark_at_the_anchor() {
    let seq = FrameSequencer::new(small_config()).unwrap();
    assert_eq!(seq.context(FrameIndex(5)).phase, Phase::Main);

    let f = seq.render_frame(FrameIndex(5)).unwrap();
    // Anchor is (w/2, h/2 - logo_offset_y).
    let px = f.pixel(48, 28).unwrap();
    for (got, want) in px[..3].iter().zip([138u8, 43, 226]) {
        assert!(got.abs_diff(want) <= 3, "{px:?}");
    }
}

#[test]
fn out_of_range_frame_is_a_render_error() {
    let seq = FrameSequencer::new(small_config()).unwrap();
    let err = seq.render_frame(FrameIndex(10)).unwrap_err();
    assert!(matches!(err, IntroError::Render { frame: 10, .. }));
}

#[test]
fn cancelled_sequence_yields_one_cancellation() {
    let token = CancelToken::new();
    let mut it = FrameSequence::new(Flaky {
        total: 5,
        fail_at: u64::MAX,
    })
    .with_cancel(token.clone());

    assert!(it.next().unwrap().is_ok());
    token.cancel();
    assert!(matches!(
        it.next(),
        Some(Err(IntroError::Cancelled { frame: 1 }))
    ));
    assert!(it.next().is_none());
}

#[test]
fn abort_policy_stops_after_the_failing_frame() {
    let items: Vec<_> = FrameSequence::new(Flaky {
        total: 5,
        fail_at: 2,
    })
    .collect();
    assert_eq!(items.len(), 3);
    assert!(items[0].is_ok() && items[1].is_ok());
    assert_eq!(items[2].as_ref().unwrap_err().frame(), Some(2));
}

#[test]
fn skip_policy_yields_errors_in_place() {
    let items: Vec<_> = FrameSequence::new(Flaky {
        total: 5,
        fail_at: 2,
    })
    .with_failure_policy(FailurePolicy::SkipAndContinue)
    .collect();
    assert_eq!(items.len(), 5);
    assert_eq!(items.iter().filter(|r| r.is_err()).count(), 1);
    assert_eq!(items[4].as_ref().unwrap().index, FrameIndex(4));
}
