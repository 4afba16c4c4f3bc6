use crate::foundation::core::{Point, Rgba8};
use crate::foundation::error::{IntroError, IntroResult};
use crate::foundation::math::mul_div255_u8;
use crate::render::composite::over;

/// An intermediate RGBA8 pixel buffer for one visual element.
///
/// Pixels are **premultiplied**, tightly packed, row-major. A layer is owned by the frame that
/// produced it and consumed by the compositor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Layer {
    /// Fully transparent layer. Allocation failure is reported instead of aborting.
    pub fn new(width: u32, height: u32) -> IntroResult<Self> {
        let len = rgba_len(width, height)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|e| {
            IntroError::Other(anyhow::anyhow!(
                "allocate {width}x{height} layer ({len} bytes): {e}"
            ))
        })?;
        data.resize(len, 0);
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Wrap an existing premultiplied buffer.
    pub fn from_premul(width: u32, height: u32, data: Vec<u8>) -> IntroResult<Self> {
        if data.len() != rgba_len(width, height)? {
            return Err(IntroError::Other(anyhow::anyhow!(
                "layer buffer of {} bytes does not match {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Premultiplied pixel at `(x, y)`, or `None` outside the layer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Box around the pixels with non-zero alpha, `None` for a transparent layer.
    pub(crate) fn ink_bounds(&self) -> Option<PixelBounds> {
        alpha_bounds(&self.data, self.width)
    }

    pub fn is_transparent(&self) -> bool {
        self.data.chunks_exact(4).all(|px| px[3] == 0)
    }

    fn index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }

    fn blend_px(&mut self, x: u32, y: u32, src: [u8; 4]) {
        let i = self.index(x, y);
        let dst = [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ];
        self.data[i..i + 4].copy_from_slice(&over(dst, src, 1.0));
    }

    /// Paint an axis-aligned rectangle with inclusive corners, clipped to the layer.
    pub fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgba8) {
        let src = color.to_premul();
        let (Some((xa, xb)), Some((ya, yb))) = (
            clip_span(x0, x1, self.width),
            clip_span(y0, y1, self.height),
        ) else {
            return;
        };
        for y in ya..=yb {
            for x in xa..=xb {
                self.blend_px(x, y, src);
            }
        }
    }

    /// Paint a filled circle. A pixel is covered when its centre lies within `radius`.
    pub fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba8) {
        if radius <= 0.0 || color.a == 0 {
            return;
        }
        let src = color.to_premul();
        let r2 = radius * radius;
        let (Some((xa, xb)), Some((ya, yb))) = (
            clip_span(
                (center.x - radius).floor() as i64,
                (center.x + radius).ceil() as i64,
                self.width,
            ),
            clip_span(
                (center.y - radius).floor() as i64,
                (center.y + radius).ceil() as i64,
                self.height,
            ),
        ) else {
            return;
        };
        for y in ya..=yb {
            let dy = f64::from(y) + 0.5 - center.y;
            for x in xa..=xb {
                let dx = f64::from(x) + 0.5 - center.x;
                if dx * dx + dy * dy <= r2 {
                    self.blend_px(x, y, src);
                }
            }
        }
    }

    /// Source-over `src` onto this layer with its top-left corner at `(x, y)`.
    ///
    /// `src` may hang off any edge; only the overlapping region is touched.
    pub fn draw_over(&mut self, src: &Layer, x: i64, y: i64) {
        let x_start = x.max(0);
        let y_start = y.max(0);
        let x_end = (x + i64::from(src.width)).min(i64::from(self.width));
        let y_end = (y + i64::from(src.height)).min(i64::from(self.height));
        if x_start >= x_end || y_start >= y_end {
            return;
        }

        for dy in y_start..y_end {
            let sy = (dy - y) as u32;
            for dx in x_start..x_end {
                let sx = (dx - x) as u32;
                let si = src.index(sx, sy);
                let s = [
                    src.data[si],
                    src.data[si + 1],
                    src.data[si + 2],
                    src.data[si + 3],
                ];
                if s[3] == 0 {
                    continue;
                }
                self.blend_px(dx as u32, dy as u32, s);
            }
        }
    }

    /// Multiply every pixel by `alpha / 255`.
    pub fn apply_opacity(&mut self, alpha: u8) {
        if alpha == 255 {
            return;
        }
        let a = u16::from(alpha);
        for v in &mut self.data {
            *v = mul_div255_u8(u16::from(*v), a);
        }
    }

    /// Resample to `width x height` with a Lanczos3 filter.
    pub fn resized(&self, width: u32, height: u32) -> IntroResult<Layer> {
        if width == self.width && height == self.height {
            return Ok(self.clone());
        }
        if width == 0 || height == 0 {
            return Layer::new(width.max(1), height.max(1));
        }
        let img = image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| IntroError::Other(anyhow::anyhow!("layer buffer size mismatch")))?;
        let out = image::imageops::resize(
            &img,
            width,
            height,
            image::imageops::FilterType::Lanczos3,
        );
        Layer::from_premul(width, height, out.into_raw())
    }
}

/// Axis-aligned pixel box, half-open on the right and bottom.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PixelBounds {
    pub(crate) left: i64,
    pub(crate) top: i64,
    pub(crate) right: i64,
    pub(crate) bottom: i64,
}

impl PixelBounds {
    pub(crate) fn width(&self) -> i64 {
        self.right - self.left
    }

    pub(crate) fn height(&self) -> i64 {
        self.bottom - self.top
    }

    /// Grow by `by` on every side, then clip to `[0, width) x [0, height)`.
    pub(crate) fn grown(self, by: i64, width: u32, height: u32) -> Self {
        Self {
            left: (self.left - by).max(0),
            top: (self.top - by).max(0),
            right: (self.right + by).min(i64::from(width)),
            bottom: (self.bottom + by).min(i64::from(height)),
        }
    }
}

/// Tight box around every pixel of a packed RGBA8 buffer with non-zero alpha.
pub(crate) fn alpha_bounds(premul: &[u8], width: u32) -> Option<PixelBounds> {
    let w = width as usize;
    if w == 0 {
        return None;
    }
    let mut b: Option<PixelBounds> = None;
    for (i, px) in premul.chunks_exact(4).enumerate() {
        if px[3] == 0 {
            continue;
        }
        let (x, y) = ((i % w) as i64, (i / w) as i64);
        b = Some(match b {
            None => PixelBounds {
                left: x,
                top: y,
                right: x + 1,
                bottom: y + 1,
            },
            Some(b) => PixelBounds {
                left: b.left.min(x),
                top: b.top.min(y),
                right: b.right.max(x + 1),
                bottom: b.bottom.max(y + 1),
            },
        });
    }
    b
}

fn rgba_len(width: u32, height: u32) -> IntroResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| IntroError::Other(anyhow::anyhow!("layer size {width}x{height} overflows")))
}

/// Intersect the inclusive span `[a, b]` with `[0, len)`.
fn clip_span(a: i64, b: i64, len: u32) -> Option<(u32, u32)> {
    if len == 0 {
        return None;
    }
    let lo = a.max(0);
    let hi = b.min(i64::from(len) - 1);
    if lo > hi {
        return None;
    }
    Some((lo as u32, hi as u32))
}

#[cfg(test)]
#[path = "../../tests/unit/render/layer.rs"]
mod tests;
