use crate::foundation::error::{IntroError, IntroResult};
use crate::render::layer::{Layer, PixelBounds};

/// Separable Gaussian blur of a premultiplied layer.
///
/// The kernel spans `ceil(3 * sigma)` taps on each side; samples outside the layer clamp to the
/// nearest edge pixel. Only the ink box grown by the kernel radius is computed, everything else
/// stays transparent.
pub fn gaussian_blur(src: &Layer, sigma: f32) -> IntroResult<Layer> {
    let mut out = Layer::new(src.width(), src.height())?;
    blur_into(src, sigma, &mut out)?;
    Ok(out)
}

/// `src` blurred by `sigma`, with the sharp `src` painted over the blur.
pub fn glow_under(src: &Layer, sigma: f32) -> IntroResult<Layer> {
    let mut out = Layer::new(src.width(), src.height())?;
    blur_into(src, sigma, &mut out)?;
    out.draw_over(src, 0, 0);
    Ok(out)
}

fn blur_into(src: &Layer, sigma: f32, out: &mut Layer) -> IntroResult<()> {
    if sigma.is_nan() || sigma <= 0.0 {
        out.data_mut().copy_from_slice(src.data());
        return Ok(());
    }
    let Some(ink) = src.ink_bounds() else {
        return Ok(());
    };
    let kernel = Kernel::gaussian(sigma)?;
    let (w, h) = (src.width(), src.height());
    let reach = ink.grown(kernel.radius, w, h);

    // Horizontal pass: rows outside the ink box are transparent, so only ink rows are kept.
    let band_w = reach.width() as usize;
    let mut band = vec![0u8; band_w * ink.height() as usize * 4];
    let src_data = src.data();
    let max_x = i64::from(w) - 1;
    for (row, y) in (ink.top..ink.bottom).enumerate() {
        let row_base = y as usize * w as usize;
        for (col, x) in (reach.left..reach.right).enumerate() {
            let px = kernel.convolve(|dx| {
                let i = (row_base + (x + dx).clamp(0, max_x) as usize) * 4;
                [src_data[i], src_data[i + 1], src_data[i + 2], src_data[i + 3]]
            });
            let i = (row * band_w + col) * 4;
            band[i..i + 4].copy_from_slice(&px);
        }
    }

    let max_y = i64::from(h) - 1;
    let dst = out.data_mut();
    for y in reach.top..reach.bottom {
        for (col, x) in (reach.left..reach.right).enumerate() {
            let px = kernel.convolve(|dy| {
                let sy = (y + dy).clamp(0, max_y);
                if sy < ink.top || sy >= ink.bottom {
                    return [0; 4];
                }
                let i = ((sy - ink.top) as usize * band_w + col) * 4;
                [band[i], band[i + 1], band[i + 2], band[i + 3]]
            });
            let i = (y as usize * w as usize + x as usize) * 4;
            dst[i..i + 4].copy_from_slice(&px);
        }
    }
    Ok(())
}

/// Symmetric 1-D Gaussian in Q16 fixed point. Taps sum to exactly `1 << 16`.
struct Kernel {
    radius: i64,
    taps: Vec<u32>,
}

impl Kernel {
    fn gaussian(sigma: f32) -> IntroResult<Self> {
        if !sigma.is_finite() {
            return Err(IntroError::Other(anyhow::anyhow!("blur sigma must be finite")));
        }
        let radius = (3.0 * sigma).ceil() as i64;
        let sigma = f64::from(sigma);
        let half: Vec<f64> = (0..=radius)
            .map(|d| (-((d * d) as f64) / (2.0 * sigma * sigma)).exp())
            .collect();
        let total = half[0] + 2.0 * half[1..].iter().sum::<f64>();

        // Side taps are rounded independently; the centre absorbs the remainder.
        let side: Vec<u32> = half[1..]
            .iter()
            .map(|v| ((v / total) * 65536.0).round() as u32)
            .collect();
        let side_sum: u32 = side.iter().sum::<u32>() * 2;
        let centre = 65536u32.checked_sub(side_sum).ok_or_else(|| {
            IntroError::Other(anyhow::anyhow!("gaussian kernel overflowed for sigma {sigma}"))
        })?;

        let taps = side
            .iter()
            .rev()
            .copied()
            .chain(std::iter::once(centre))
            .chain(side.iter().copied())
            .collect();
        Ok(Self { radius, taps })
    }

    fn convolve(&self, mut sample: impl FnMut(i64) -> [u8; 4]) -> [u8; 4] {
        let mut acc = [0u32; 4];
        for (d, &tap) in (-self.radius..=self.radius).zip(&self.taps) {
            if tap == 0 {
                continue;
            }
            let px = sample(d);
            for (a, c) in acc.iter_mut().zip(px) {
                *a += tap * u32::from(c);
            }
        }
        acc.map(|a| ((a + (1 << 15)) >> 16).min(255) as u8)
    }
}
