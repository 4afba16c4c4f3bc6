use crate::foundation::math::unit_to_alpha;
use crate::timeline::phase::{FrameContext, Phase};

/// Visual modulation applied to a prepared element for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Modulation {
    /// Layer opacity in `[0, 255]`.
    pub alpha: u8,
    /// Uniform scale factor around the element's anchor.
    pub scale: f64,
}

impl Modulation {
    pub const IDENTITY: Self = Self {
        alpha: 255,
        scale: 1.0,
    };
}

/// Shared fade curve: ramps up across FadeIn, holds through Main, ramps down across FadeOut.
pub fn phase_alpha(ctx: &FrameContext) -> u8 {
    match ctx.phase {
        Phase::FadeIn => unit_to_alpha(ctx.local_progress),
        Phase::Main => 255,
        Phase::FadeOut => unit_to_alpha(1.0 - ctx.local_progress),
    }
}

/// Logo curve: grow from half size while fading in, pulse twice during Main, fade out at size.
pub fn logo_modulation(ctx: &FrameContext) -> Modulation {
    let p = ctx.local_progress;
    let scale = match ctx.phase {
        Phase::FadeIn => 0.5 + 0.5 * p,
        Phase::Main => 1.0 + 0.1 * (p * 4.0 * std::f64::consts::PI).sin(),
        Phase::FadeOut => 1.0,
    };
    Modulation {
        alpha: phase_alpha(ctx),
        scale,
    }
}

/// Wordmark curve: same alpha ramp as the logo, never scaled.
pub fn text_modulation(ctx: &FrameContext) -> Modulation {
    Modulation {
        alpha: phase_alpha(ctx),
        scale: 1.0,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/modulation.rs"]
mod tests;
