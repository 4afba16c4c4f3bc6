//! Immutable animation parameters and their validation.

pub mod model;
