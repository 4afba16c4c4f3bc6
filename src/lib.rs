//! Bootreel synthesizes short, deterministic intro animations: a glowing logo mark, a glowing
//! wordmark and a drifting particle field over a solid background.
//!
//! Every frame is a pure function of its index and an immutable [`AnimationConfig`]:
//!
//! - Build a [`FrameSequencer`] (validates the config and prepares static layers)
//! - Iterate [`FrameSequence`] lazily, or render a single frame by index
//! - Stream a range into a [`FrameSink`], optionally in parallel
#![forbid(unsafe_code)]

mod foundation;

/// Animation parameters, JSON loading and validation.
pub mod config;
/// Procedural element renderers.
pub mod elements;
/// Frame sinks.
pub mod encode;
/// Pixel layers and compositing.
pub mod render;
/// Frame sequencing and range rendering.
pub mod sequence;
/// Phase scheduling and per-phase modulation.
pub mod timeline;

pub use crate::foundation::core::{Canvas, FrameIndex, FrameRange, Point, Rgb8, Rgba8, Vec2};
pub use crate::foundation::error::{IntroError, IntroResult};
pub use crate::foundation::rng::Rng64;

pub use crate::config::model::{AnimationConfig, FontCandidate, Palette, PhaseWeights};
pub use crate::encode::sink::{FrameSink, InMemorySink, PngSequenceSink, SinkConfig, write_png};
pub use crate::render::composite::RenderedFrame;
pub use crate::sequence::pipeline::{
    CancelToken, FailurePolicy, RenderStats, SequenceOpts, render_range,
};
pub use crate::sequence::sequencer::{FrameSequence, FrameSequencer, FrameSource, generate};
pub use crate::timeline::phase::{FrameContext, Phase};
