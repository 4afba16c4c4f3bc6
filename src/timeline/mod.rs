//! Frame-index to phase mapping and the per-phase effect curves.

pub mod modulation;
pub mod phase;
