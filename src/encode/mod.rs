//! Encoder boundary.
//!
//! Sinks consume rendered frames in ascending frame order. Container encoding (GIF, MP4, ...) lives
//! behind this trait, outside the crate.

/// Generic frame sink trait and built-in sinks.
pub mod sink;
