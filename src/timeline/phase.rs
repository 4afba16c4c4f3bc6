use crate::config::model::PhaseWeights;
use crate::foundation::core::FrameIndex;

/// One of the three contiguous animation segments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Phase {
    FadeIn,
    Main,
    FadeOut,
}

/// Per-frame render inputs derived from the frame index alone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameContext {
    pub frame: FrameIndex,
    pub total_frames: u64,
    pub phase: Phase,
    /// Progress within `phase`, clamped to `[0, 1]`.
    pub local_progress: f64,
}

impl FrameContext {
    /// `frame / total_frames`, in `[0, 1)` for in-range frames.
    pub fn global_progress(&self) -> f64 {
        global_progress(self.frame.0, self.total_frames)
    }
}

fn global_progress(frame: u64, total_frames: u64) -> f64 {
    if total_frames == 0 {
        return 0.0;
    }
    frame as f64 / total_frames as f64
}

/// Classify `frame` into a phase using cumulative thresholds over `weights`.
///
/// `weights` must already be validated (every weight > 0); this is checked once when the
/// configuration is built, not per frame.
pub fn schedule(frame: FrameIndex, total_frames: u64, weights: &PhaseWeights) -> FrameContext {
    let g = global_progress(frame.0, total_frames);
    let t1 = weights.fade_in;
    let t2 = t1 + weights.main;

    let (phase, local) = if g < t1 {
        (Phase::FadeIn, g / t1)
    } else if g < t2 {
        (Phase::Main, (g - t1) / weights.main)
    } else {
        (Phase::FadeOut, (g - t2) / weights.fade_out)
    };

    FrameContext {
        frame,
        total_frames,
        phase,
        local_progress: clamp_unit(local),
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/phase.rs"]
mod tests;
