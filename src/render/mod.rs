//! Pixel buffers, blur, and the fixed-order compositor.

pub mod blur;
pub mod composite;
pub mod layer;
