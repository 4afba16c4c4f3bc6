use crate::foundation::core::{Canvas, FrameIndex, Point, Rgb8};
use crate::foundation::error::IntroResult;
use crate::foundation::math::unit_to_alpha;
use crate::foundation::rng::Rng64;
use crate::render::layer::Layer;

/// Radius of every particle dot, in pixels.
pub const PARTICLE_RADIUS: f64 = 3.0;
/// Velocity scale shared by the horizontal wave and the vertical drift.
pub const MAX_VELOCITY: f64 = 2.0;

/// One procedural dot, regenerated every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Wrapped position in `[0, width) x [0, height)`.
    pub position: Point,
    /// Per-particle phase jitter `r` in `[0, 1)`.
    pub seed_offset: f64,
    pub opacity: u8,
}

/// Deterministic particle generator.
///
/// Particle state is a pure function of `(frame, total_frames, count, seed)`. The generator is
/// created locally per call and consumed in particle-index order, so particle `i` depends on every
/// draw made for particles `0..i`.
#[derive(Clone, Copy, Debug)]
pub struct ParticleField {
    canvas: Canvas,
    color: Rgb8,
}

impl ParticleField {
    pub fn new(canvas: Canvas, color: Rgb8) -> Self {
        Self { canvas, color }
    }

    /// Positions and opacities for one frame. `seed` defaults to the frame index.
    pub fn particles(
        &self,
        frame: FrameIndex,
        total_frames: u64,
        count: u32,
        seed: Option<u64>,
    ) -> Vec<Particle> {
        let mut rng = Rng64::new(seed.unwrap_or(frame.0));
        let progress = if total_frames == 0 {
            0.0
        } else {
            frame.0 as f64 / total_frames as f64
        };
        let w = f64::from(self.canvas.width);
        let h = f64::from(self.canvas.height);

        (0..count)
            .map(|_| {
                let x0 = f64::from(rng.next_below(self.canvas.width));
                let y0 = f64::from(rng.next_below(self.canvas.height));
                let r = rng.next_f64_01();

                let wave = (progress * std::f64::consts::TAU + r * 0.1).sin();
                let x = wrap(x0 + wave * MAX_VELOCITY * 10.0, w);
                let y = wrap(y0 + progress * MAX_VELOCITY * 5.0, h);

                Particle {
                    position: Point::new(x, y),
                    seed_offset: r,
                    opacity: unit_to_alpha(1.0 - wave.abs()),
                }
            })
            .collect()
    }

    /// Draw the particle layer for one frame, in particle-index order.
    pub fn render(
        &self,
        frame: FrameIndex,
        total_frames: u64,
        count: u32,
        seed: Option<u64>,
    ) -> IntroResult<Layer> {
        let mut layer = Layer::new(self.canvas.width, self.canvas.height)?;
        for p in self.particles(frame, total_frames, count, seed) {
            layer.fill_circle(p.position, PARTICLE_RADIUS, self.color.with_alpha(p.opacity));
        }
        Ok(layer)
    }
}

/// Toroidal wrap into `[0, len)`.
fn wrap(v: f64, len: f64) -> f64 {
    let m = v.rem_euclid(len);
    // rem_euclid can round up to exactly `len` for tiny negative inputs.
    if m >= len { 0.0 } else { m }
}

#[cfg(test)]
#[path = "../../tests/unit/elements/particles.rs"]
mod tests;
