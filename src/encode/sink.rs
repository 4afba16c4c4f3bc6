use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;

use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{IntroError, IntroResult};
use crate::render::composite::RenderedFrame;

/// Configuration provided to a [`FrameSink`] at the start of a range render.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    pub canvas: Canvas,
    pub fps: u32,
    /// Display duration of every frame (`1 / fps`).
    pub frame_duration: Duration,
    /// Number of frames the sink should expect.
    pub frames: u64,
}

/// Sink contract for consuming rendered frames in timeline order.
///
/// Ordering contract: `push_frame` is called in strictly increasing [`FrameIndex`] order. When a
/// run is cancelled or aborted, `end` is not called and the frames already pushed form a valid
/// prefix.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> IntroResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, frame: &RenderedFrame) -> IntroResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> IntroResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<RenderedFrame>,
    finished: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Frames in timeline order.
    pub fn frames(&self) -> &[RenderedFrame] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<RenderedFrame> {
        self.frames
    }

    /// Whether `end` was called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> IntroResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, frame: &RenderedFrame) -> IntroResult<()> {
        if let Some(last) = self.frames.last()
            && frame.index <= last.index
        {
            return Err(IntroError::sink(format!(
                "frame {} pushed after frame {}",
                frame.index.0, last.index.0
            )));
        }
        self.frames.push(frame.clone());
        Ok(())
    }

    fn end(&mut self) -> IntroResult<()> {
        self.finished = true;
        Ok(())
    }
}

/// Writes each frame as `frame_NNNNN.png` into a directory.
///
/// A debugging dump of the raw sequence; it does not produce an animated container.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl PngSequenceSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far, in frame order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(format!("frame_{:05}.png", idx.0))
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, _cfg: SinkConfig) -> IntroResult<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output dir '{}'", self.dir.display()))?;
        self.written.clear();
        Ok(())
    }

    fn push_frame(&mut self, frame: &RenderedFrame) -> IntroResult<()> {
        let path = self.frame_path(frame.index);
        write_png(&path, frame)?;
        self.written.push(path);
        Ok(())
    }

    fn end(&mut self) -> IntroResult<()> {
        tracing::debug!(frames = self.written.len(), dir = %self.dir.display(), "png sequence complete");
        Ok(())
    }
}

/// Save a single frame as an RGBA PNG.
pub fn write_png(path: &Path, frame: &RenderedFrame) -> IntroResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        path,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}
