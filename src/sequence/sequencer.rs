use std::sync::Arc;

use crate::config::model::AnimationConfig;
use crate::elements::logo::{LogoRenderer, centered_on};
use crate::elements::particles::ParticleField;
use crate::elements::text::{TextRenderer, resolve_font};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Canvas, FrameIndex, FrameRange, Point};
use crate::foundation::error::{IntroError, IntroResult};
use crate::render::composite::{Placed, RenderedFrame, composite};
use crate::render::layer::Layer;
use crate::sequence::pipeline::{CancelToken, FailurePolicy, RenderStats, SequenceOpts, render_range};
use crate::timeline::modulation::{logo_modulation, text_modulation};
use crate::timeline::phase::{FrameContext, schedule};

/// Anything that can produce frames of a fixed-length timeline by index.
///
/// Implementations must be pure over the frame index: rendering frame `i` twice, or on different
/// threads, yields identical pixels.
pub trait FrameSource: Sync {
    fn canvas(&self) -> Canvas;
    fn fps(&self) -> u32;
    fn total_frames(&self) -> u64;
    fn render_frame(&self, frame: FrameIndex) -> IntroResult<RenderedFrame>;

    /// Sink configuration for a run over `frames` frames of this source.
    fn sink_config(&self, frames: u64) -> SinkConfig {
        let fps = self.fps().max(1);
        SinkConfig {
            canvas: self.canvas(),
            fps,
            frame_duration: std::time::Duration::from_secs_f64(1.0 / f64::from(fps)),
            frames,
        }
    }
}

/// Element layers that do not depend on the frame index, built once per run.
#[derive(Debug)]
struct Prepared {
    particles: ParticleField,
    logo_base: Layer,
    logo_anchor: Point,
    text_base: Layer,
    text_origin: (i64, i64),
}

/// Validated config plus the prepared element layers of one animation run.
///
/// Cheap to clone and safe to share across threads. Per-frame work is limited to the particle
/// layer, logo modulation, text opacity and compositing.
#[derive(Clone, Debug)]
pub struct FrameSequencer {
    config: Arc<AnimationConfig>,
    prepared: Arc<Prepared>,
}

impl FrameSequencer {
    /// Validate `config`, resolve the wordmark font and prepare the static element layers.
    #[tracing::instrument(skip(config), fields(width = config.width, height = config.height))]
    pub fn new(config: AnimationConfig) -> IntroResult<Self> {
        config.validate()?;
        let canvas = config.canvas();
        let palette = &config.palette;

        let logo_box = Canvas {
            width: config.logo_size,
            height: config.logo_size,
        };
        let logo_base = LogoRenderer::new(palette.primary).render_base(logo_box)?;
        let logo_anchor = Point::new(
            f64::from(canvas.width) / 2.0,
            f64::from(canvas.height) / 2.0 - f64::from(config.logo_offset_y),
        );
        let (_, logo_top) = centered_on(logo_anchor, &logo_base);

        let font = resolve_font(&config.fonts);
        let text_base = TextRenderer::new(canvas.width, palette.accent, palette.glow, font)
            .render(&config.title, config.font_size)?;
        let text_origin = (
            0,
            logo_top + i64::from(config.logo_size) + i64::from(config.text_gap),
        );

        tracing::debug!(
            frames = config.total_frames(),
            particles = config.particle_count,
            text_y = text_origin.1,
            "prepared sequence"
        );

        Ok(Self {
            prepared: Arc::new(Prepared {
                particles: ParticleField::new(canvas, palette.primary),
                logo_base,
                logo_anchor,
                text_base,
                text_origin,
            }),
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub fn total_frames(&self) -> u64 {
        self.config.total_frames()
    }

    /// Render one frame. Any failure is reported as [`IntroError::Render`] carrying `frame`.
    pub fn render_frame(&self, frame: FrameIndex) -> IntroResult<RenderedFrame> {
        let total = self.config.total_frames();
        if frame.0 >= total {
            return Err(IntroError::render(
                frame.0,
                format!("frame index out of range (total {total})"),
            ));
        }
        self.compose(frame).map_err(|e| match e {
            IntroError::Render { .. } => e,
            other => IntroError::render(frame.0, other.to_string()),
        })
    }

    /// Phase context for `frame`.
    pub fn context(&self, frame: FrameIndex) -> FrameContext {
        schedule(frame, self.config.total_frames(), &self.config.phase_weights)
    }

    /// Lazy iterator over every frame of the run, in frame order.
    pub fn frames(&self) -> FrameSequence<Self> {
        FrameSequence::new(self.clone())
    }

    /// Render `range` into `sink`, in frame order.
    pub fn render_range(
        &self,
        range: FrameRange,
        opts: &SequenceOpts,
        sink: &mut dyn FrameSink,
        cancel: &CancelToken,
    ) -> IntroResult<RenderStats> {
        render_range(self, range, opts, sink, cancel)
    }

    /// Render the whole timeline into `sink`.
    pub fn render_all(
        &self,
        opts: &SequenceOpts,
        sink: &mut dyn FrameSink,
        cancel: &CancelToken,
    ) -> IntroResult<RenderStats> {
        let range = FrameRange::new(FrameIndex(0), FrameIndex(self.config.total_frames()))?;
        self.render_range(range, opts, sink, cancel)
    }

    fn compose(&self, frame: FrameIndex) -> IntroResult<RenderedFrame> {
        let cfg = &*self.config;
        let p = &*self.prepared;
        let total = cfg.total_frames();
        let ctx = schedule(frame, total, &cfg.phase_weights);

        let particles = p
            .particles
            .render(frame, total, cfg.particle_count, cfg.particle_seed)?;

        let logo = LogoRenderer::modulate(&p.logo_base, logo_modulation(&ctx))?;
        let (logo_x, logo_y) = centered_on(p.logo_anchor, &logo);

        let mut text = p.text_base.clone();
        text.apply_opacity(text_modulation(&ctx).alpha);

        composite(
            frame,
            cfg.palette.background,
            &particles,
            Placed {
                layer: &logo,
                x: logo_x,
                y: logo_y,
            },
            Placed {
                layer: &text,
                x: p.text_origin.0,
                y: p.text_origin.1,
            },
            cfg.frame_duration(),
        )
    }
}

impl FrameSource for FrameSequencer {
    fn canvas(&self) -> Canvas {
        self.config.canvas()
    }

    fn fps(&self) -> u32 {
        self.config.fps
    }

    fn total_frames(&self) -> u64 {
        FrameSequencer::total_frames(self)
    }

    fn render_frame(&self, frame: FrameIndex) -> IntroResult<RenderedFrame> {
        FrameSequencer::render_frame(self, frame)
    }
}

/// Build a sequencer for `config` and return its frame iterator.
pub fn generate(config: &AnimationConfig) -> IntroResult<FrameSequence<FrameSequencer>> {
    Ok(FrameSequencer::new(config.clone())?.frames())
}

/// Lazy, finite iterator over `Result<RenderedFrame, IntroError>` in frame order.
///
/// Frames are rendered on demand. Under [`FailurePolicy::Abort`] the iterator yields the failing
/// frame's error and then ends; under [`FailurePolicy::SkipAndContinue`] errors are yielded in
/// place and iteration carries on. A cancelled token yields one [`IntroError::Cancelled`] and ends
/// the iterator. [`FrameSequence::restart`] replays the same frames.
pub struct FrameSequence<S: FrameSource> {
    source: S,
    next: u64,
    end: u64,
    policy: FailurePolicy,
    cancel: Option<CancelToken>,
    done: bool,
}

impl<S: FrameSource> FrameSequence<S> {
    pub fn new(source: S) -> Self {
        let end = source.total_frames();
        Self {
            source,
            next: 0,
            end,
            policy: FailurePolicy::default(),
            cancel: None,
            done: false,
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Rewind to frame 0 and start a new pass.
    ///
    /// An exhausted sequence returns `None` until restarted; it is not a `FusedIterator`.
    pub fn restart(&mut self) {
        self.next = 0;
        self.done = false;
    }
}

impl<S: FrameSource> Iterator for FrameSequence<S> {
    type Item = IntroResult<RenderedFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.next >= self.end {
            return None;
        }
        let idx = self.next;
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            self.done = true;
            return Some(Err(IntroError::Cancelled { frame: idx }));
        }

        self.next += 1;
        let res = self.source.render_frame(FrameIndex(idx));
        if res.is_err() && self.policy == FailurePolicy::Abort {
            self.done = true;
        }
        Some(res)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let rest = usize::try_from(self.end - self.next).unwrap_or(usize::MAX);
        (0, Some(rest))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/sequencer.rs"]
mod tests;
