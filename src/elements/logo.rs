use crate::foundation::core::{Canvas, Point, Rgb8};
use crate::foundation::error::IntroResult;
use crate::render::blur::glow_under;
use crate::render::layer::Layer;
use crate::timeline::modulation::Modulation;

/// Pixel dimensions of the "L" mark inside a logo box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogoGeometry {
    pub bar_width: u32,
    pub bar_height: u32,
    pub foot_width: u32,
}

impl LogoGeometry {
    pub fn for_size(size: Canvas) -> Self {
        Self {
            bar_width: (size.width / 20).max(20),
            bar_height: (f64::from(size.height) * 0.7).round() as u32,
            foot_width: (f64::from(size.width) * 0.4).round() as u32,
        }
    }

    /// Gaussian sigma of the glow halo.
    pub fn glow_radius(&self) -> f32 {
        (2 * self.bar_width) as f32
    }
}

/// Builds the glowing logo and applies per-frame scale/fade.
#[derive(Clone, Copy, Debug)]
pub struct LogoRenderer {
    color: Rgb8,
}

impl LogoRenderer {
    pub fn new(color: Rgb8) -> Self {
        Self { color }
    }

    /// The sharp mark only: a centred vertical bar with a foot along its bottom edge.
    pub fn render_mark(&self, size: Canvas) -> IntroResult<Layer> {
        let geo = LogoGeometry::for_size(size);
        let mut layer = Layer::new(size.width, size.height)?;
        let color = self.color.with_alpha(255);

        let cx = i64::from(size.width / 2);
        let cy = i64::from(size.height / 2);
        let bar_w = i64::from(geo.bar_width);
        let bar_h = i64::from(geo.bar_height);
        let foot_w = i64::from(geo.foot_width);

        let bar_x0 = cx - bar_w / 2;
        let bar_y0 = cy - bar_h / 2;
        let bar_y1 = bar_y0 + bar_h - 1;
        layer.fill_rect(bar_x0, bar_y0, bar_x0 + bar_w - 1, bar_y1, color);

        let foot_x0 = cx - foot_w / 2;
        layer.fill_rect(foot_x0, bar_y1 - bar_w + 1, foot_x0 + foot_w - 1, bar_y1, color);

        Ok(layer)
    }

    /// Mark plus glow: a blurred copy of the mark painted beneath the sharp mark.
    #[tracing::instrument(skip(self))]
    pub fn render_base(&self, size: Canvas) -> IntroResult<Layer> {
        let mark = self.render_mark(size)?;
        let geo = LogoGeometry::for_size(size);
        glow_under(&mark, geo.glow_radius())
    }

    /// Scale `base` around its centre and fade it.
    ///
    /// Scaled dimensions truncate toward zero and never drop below one pixel.
    pub fn modulate(base: &Layer, m: Modulation) -> IntroResult<Layer> {
        let w = ((f64::from(base.width()) * m.scale) as u32).max(1);
        let h = ((f64::from(base.height()) * m.scale) as u32).max(1);
        let mut out = base.resized(w, h)?;
        out.apply_opacity(m.alpha);
        Ok(out)
    }
}

/// Top-left corner that centres `layer` on `anchor`.
pub fn centered_on(anchor: Point, layer: &Layer) -> (i64, i64) {
    (
        (anchor.x - f64::from(layer.width()) / 2.0).floor() as i64,
        (anchor.y - f64::from(layer.height()) / 2.0).floor() as i64,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/elements/logo.rs"]
mod tests;
