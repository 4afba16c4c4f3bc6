use std::time::Duration;

use crate::foundation::core::{FrameIndex, Rgb8};
use crate::foundation::error::{IntroError, IntroResult};
use crate::foundation::math::mul_div255_u8;
use crate::render::layer::Layer;

pub type PremulRgba8 = [u8; 4];

/// Premultiplied source-over: `out = src + dst * (1 - src_a)`, with `src` scaled by `opacity`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Final composited output for one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedFrame {
    pub index: FrameIndex,
    pub width: u32,
    pub height: u32,
    /// Opaque RGBA8 bytes, tightly packed, row-major. Alpha is always 255.
    pub data: Vec<u8>,
    /// How long the encoder should display this frame (`1 / fps`).
    pub display_duration: Duration,
}

impl RenderedFrame {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    /// Drop the alpha channel (`RGB8`, row-major) for encoders that take opaque frames.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len() / 4 * 3);
        for px in self.data.chunks_exact(4) {
            out.extend_from_slice(&px[..3]);
        }
        out
    }
}

/// A positioned layer: top-left corner in canvas pixels. Positions may be negative.
#[derive(Clone, Copy, Debug)]
pub struct Placed<'a> {
    pub layer: &'a Layer,
    pub x: i64,
    pub y: i64,
}

/// Merge the four element layers into one opaque frame.
///
/// Paint order is fixed: background fill, particle layer (full canvas), logo, text. Every layer is
/// blended source-over; the output alpha is forced to 255 at the end.
pub fn composite(
    index: FrameIndex,
    background: Rgb8,
    particles: &Layer,
    logo: Placed<'_>,
    text: Placed<'_>,
    display_duration: Duration,
) -> IntroResult<RenderedFrame> {
    let (width, height) = (particles.width(), particles.height());
    let mut target = Layer::new(width, height)
        .map_err(|e| IntroError::render(index.0, format!("allocate frame buffer: {e}")))?;

    let bg = [background.r, background.g, background.b, 255];
    for px in target.data_mut().chunks_exact_mut(4) {
        px.copy_from_slice(&bg);
    }

    target.draw_over(particles, 0, 0);
    target.draw_over(logo.layer, logo.x, logo.y);
    target.draw_over(text.layer, text.x, text.y);

    let mut data = target.into_data();
    for px in data.chunks_exact_mut(4) {
        px[3] = 255;
    }

    Ok(RenderedFrame {
        index,
        width,
        height,
        data,
        display_duration,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
