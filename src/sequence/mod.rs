//! Frame sequencing: per-run preparation, the lazy frame iterator, and batch range rendering.

/// Batch range rendering into a [`crate::encode::sink::FrameSink`].
pub mod pipeline;
/// Prepared per-run state and the lazy frame iterator.
pub mod sequencer;
