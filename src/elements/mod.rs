//! The three procedural elements drawn over the background.

pub mod logo;
pub mod particles;
pub mod text;
