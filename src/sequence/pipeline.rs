use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};

use rayon::prelude::*;

use crate::encode::sink::FrameSink;
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{IntroError, IntroResult};
use crate::render::composite::RenderedFrame;
use crate::sequence::sequencer::FrameSource;

const MAX_REORDER_BUFFER_BYTES: u64 = 128 * 1024 * 1024;

/// What a batch render does when one frame fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first failing frame and return its error.
    #[default]
    Abort,
    /// Log the failure, count the frame as skipped, keep going.
    SkipAndContinue,
}

/// Cooperative cancellation flag shared between a caller and a running batch.
///
/// Checked once per completed frame, so a batch always stops on a frame boundary.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Options controlling range rendering.
#[derive(Clone, Debug)]
pub struct SequenceOpts {
    /// Render frames in parallel on a dedicated rayon pool.
    pub parallel: bool,
    /// Frames per parallel chunk. Also capped by the reorder buffer memory limit.
    pub chunk_size: usize,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Bounded channel capacity between render workers and the emitter thread.
    pub channel_capacity: usize,
    pub failure_policy: FailurePolicy,
}

impl Default for SequenceOpts {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
            channel_capacity: 4,
            failure_policy: FailurePolicy::Abort,
        }
    }
}

/// Range render statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Total frames in the requested range.
    pub frames_total: u64,
    /// Frames rendered and delivered to the sink.
    pub frames_rendered: u64,
    /// Frames that failed under [`FailurePolicy::SkipAndContinue`].
    pub frames_skipped: u64,
}

#[derive(Debug)]
struct FrameMsg {
    idx: FrameIndex,
    frame: IntroResult<RenderedFrame>,
}

/// Render `range` of `source` and stream the frames into `sink`.
///
/// The sink receives frames in strictly increasing index order. With `opts.parallel`, chunks are
/// rendered on a rayon pool and out-of-order completions are reordered before the sink boundary.
/// `sink.end()` is only called when the whole range was emitted.
#[tracing::instrument(skip_all, fields(start = range.start.0, end = range.end.0))]
pub fn render_range(
    source: &dyn FrameSource,
    range: FrameRange,
    opts: &SequenceOpts,
    sink: &mut dyn FrameSink,
    cancel: &CancelToken,
) -> IntroResult<RenderStats> {
    if range.is_empty() {
        return Err(IntroError::config("render_range range must be non-empty"));
    }
    if range.end.0 > source.total_frames() {
        return Err(IntroError::config(format!(
            "render_range end {} exceeds total frames {}",
            range.end.0,
            source.total_frames()
        )));
    }

    let cfg = source.sink_config(range.len_frames());
    let bytes_per_frame = (u64::from(cfg.canvas.width))
        .saturating_mul(u64::from(cfg.canvas.height))
        .saturating_mul(4)
        .max(1);
    let max_chunk_by_mem = (MAX_REORDER_BUFFER_BYTES / bytes_per_frame).max(1);
    let chunk_size = normalized_chunk_size(opts.chunk_size)
        .min(max_chunk_by_mem)
        .min(range.len_frames());
    let cap = opts.channel_capacity.max(1);
    let policy = opts.failure_policy;

    let pool = if opts.parallel {
        Some(build_thread_pool(opts.threads)?)
    } else {
        None
    };

    tracing::debug!(
        parallel = opts.parallel,
        chunk_size,
        frames = range.len_frames(),
        "render range"
    );

    std::thread::scope(|scope| -> IntroResult<RenderStats> {
        let (tx, rx) = mpsc::sync_channel::<FrameMsg>(cap);
        let range_start = range.start.0;
        let range_end = range.end.0;
        let sink_ref: &mut dyn FrameSink = sink;
        let cancel_emit = cancel.clone();

        // Emitter: in-order delivery to the sink regardless of render completion order.
        let emitter = scope.spawn(move || -> IntroResult<RenderStats> {
            sink_ref.begin(cfg)?;

            let mut stats = RenderStats {
                frames_total: range_end - range_start,
                ..RenderStats::default()
            };
            let progress_every = (stats.frames_total / 10).max(1);
            let mut next = range_start;
            let mut pending = HashMap::<u64, IntroResult<RenderedFrame>>::new();

            while next < range_end {
                let res = match pending.remove(&next) {
                    Some(res) => res,
                    None => {
                        let Ok(msg) = rx.recv() else {
                            if cancel_emit.is_cancelled() {
                                return Err(IntroError::Cancelled { frame: next });
                            }
                            return Err(IntroError::render(
                                next,
                                "frame channel disconnected unexpectedly",
                            ));
                        };
                        pending.insert(msg.idx.0, msg.frame);
                        continue;
                    }
                };

                match res {
                    Ok(frame) => {
                        sink_ref.push_frame(&frame)?;
                        stats.frames_rendered += 1;
                    }
                    Err(e) if policy == FailurePolicy::SkipAndContinue => {
                        tracing::warn!(frame = next, error = %e, "skipping failed frame");
                        stats.frames_skipped += 1;
                    }
                    Err(e) => return Err(e),
                }
                next += 1;

                let done = next - range_start;
                if done % progress_every == 0 || next == range_end {
                    tracing::info!(done, total = stats.frames_total, "rendered frames");
                }
                if next < range_end && cancel_emit.is_cancelled() {
                    tracing::info!(frame = next, "render cancelled");
                    return Err(IntroError::Cancelled { frame: next });
                }
            }

            sink_ref.end()?;
            Ok(stats)
        });

        let produce_res = if let Some(pool) = pool.as_ref() {
            let mut chunk_start = range_start;
            let mut res = Ok(());
            while chunk_start < range_end && res.is_ok() {
                let chunk_end = (chunk_start + chunk_size).min(range_end);
                res = render_chunk_parallel(source, pool, &tx, cancel, chunk_start, chunk_end);
                chunk_start = chunk_end;
            }
            res
        } else {
            (range_start..range_end).try_for_each(|f| render_and_send(source, &tx, cancel, f))
        };

        drop(tx);
        let emit_res = emitter
            .join()
            .map_err(|_| IntroError::render(range_start, "emitter thread panicked"))?;

        // A send failure only means the emitter stopped; its own result explains why.
        match (emit_res, produce_res) {
            (Err(e), _) => Err(e),
            (Ok(_), Err(e)) => Err(e),
            (Ok(stats), Ok(())) => Ok(stats),
        }
    })
}

fn render_chunk_parallel(
    source: &dyn FrameSource,
    pool: &rayon::ThreadPool,
    tx: &mpsc::SyncSender<FrameMsg>,
    cancel: &CancelToken,
    chunk_start: u64,
    chunk_end: u64,
) -> IntroResult<()> {
    pool.install(|| {
        (chunk_start..chunk_end)
            .into_par_iter()
            .try_for_each_init(|| tx.clone(), |tx, f| render_and_send(source, tx, cancel, f))
    })
}

fn render_and_send(
    source: &dyn FrameSource,
    tx: &mpsc::SyncSender<FrameMsg>,
    cancel: &CancelToken,
    f: u64,
) -> IntroResult<()> {
    if cancel.is_cancelled() {
        return Err(IntroError::Cancelled { frame: f });
    }
    let idx = FrameIndex(f);
    let frame = source.render_frame(idx);
    tx.send(FrameMsg { idx, frame })
        .map_err(|_| IntroError::render(f, "emitter thread is not accepting frames"))
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    if chunk_size == 0 {
        1
    } else {
        chunk_size as u64
    }
}

fn build_thread_pool(threads: Option<usize>) -> IntroResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(IntroError::config("'threads' must be >= 1 when set"));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| IntroError::config(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/pipeline.rs"]
mod tests;
