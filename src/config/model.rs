use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;

use crate::foundation::core::{Canvas, Rgb8, Rgba8};
use crate::foundation::error::{IntroError, IntroResult};

/// Allowed deviation of the phase-weight sum from 1.0.
pub const PHASE_WEIGHT_TOLERANCE: f64 = 1e-6;

/// Colour palette shared by every element of the animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Palette {
    /// Opaque fill behind every other layer.
    pub background: Rgb8,
    /// Logo mark and particle colour.
    pub primary: Rgb8,
    /// Secondary tone of the palette. Part of the colour scheme; no element draws with it.
    pub secondary: Rgb8,
    /// Sharp wordmark colour.
    pub accent: Rgb8,
    /// Translucent colour used for the wordmark glow passes.
    pub glow: Rgba8,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Rgb8::new(0, 0, 0),
            primary: Rgb8::new(138, 43, 226),
            secondary: Rgb8::new(75, 0, 130),
            accent: Rgb8::new(255, 255, 255),
            glow: Rgba8::new(138, 43, 226, 128),
        }
    }
}

/// Relative durations of the three animation phases.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhaseWeights {
    pub fade_in: f64,
    pub main: f64,
    pub fade_out: f64,
}

impl Default for PhaseWeights {
    fn default() -> Self {
        Self {
            fade_in: 0.3,
            main: 0.5,
            fade_out: 0.2,
        }
    }
}

impl PhaseWeights {
    pub fn validate(&self) -> IntroResult<()> {
        for (name, w) in [
            ("fade_in", self.fade_in),
            ("main", self.main),
            ("fade_out", self.fade_out),
        ] {
            if !w.is_finite() || w <= 0.0 {
                return Err(IntroError::config(format!(
                    "phase weight '{name}' must be finite and > 0 (got {w})"
                )));
            }
        }
        let sum = self.fade_in + self.main + self.fade_out;
        if (sum - 1.0).abs() > PHASE_WEIGHT_TOLERANCE {
            return Err(IntroError::config(format!(
                "phase weights must sum to 1.0 (got {sum})"
            )));
        }
        Ok(())
    }
}

/// One entry of the ordered font fallback chain.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontCandidate {
    /// A font file on the host (`.ttf`, `.otf`, `.ttc`).
    File(PathBuf),
    /// A family name looked up in the host's installed fonts.
    Family(String),
    /// The embedded DejaVu Sans Mono font. Always resolves.
    Builtin,
}

/// Default candidate order: platform fonts first, embedded font last.
pub fn default_font_chain() -> Vec<FontCandidate> {
    vec![
        FontCandidate::File(PathBuf::from("/System/Library/Fonts/Helvetica.ttc")),
        FontCandidate::File(PathBuf::from("/System/Library/Fonts/Arial.ttf")),
        FontCandidate::File(PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf")),
        FontCandidate::File(PathBuf::from("/usr/share/fonts/TTF/DejaVuSans.ttf")),
        FontCandidate::Family("Helvetica".to_owned()),
        FontCandidate::Family("Arial".to_owned()),
        FontCandidate::Builtin,
    ]
}

/// Immutable parameters for one animation run.
///
/// Constructed once, validated once, then shared read-only by every frame computation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Display rate of the encoded artifact. Does not throttle generation.
    pub fps: u32,
    /// Total duration in seconds.
    pub duration_secs: f64,
    pub palette: Palette,
    pub phase_weights: PhaseWeights,
    /// Number of particles drawn per frame.
    pub particle_count: u32,
    /// Overrides the per-frame particle seed (which defaults to the frame index).
    pub particle_seed: Option<u64>,
    /// Wordmark string.
    pub title: String,
    /// Wordmark size in pixels.
    pub font_size: u32,
    /// Edge length of the square logo box at scale 1.0.
    pub logo_size: u32,
    /// Upward shift of the logo anchor from the canvas centre.
    pub logo_offset_y: i32,
    /// Vertical gap between the logo box and the wordmark layer.
    pub text_gap: i32,
    /// Ordered font candidates for the wordmark.
    pub fonts: Vec<FontCandidate>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            width: 2778,
            height: 1284,
            fps: 120,
            duration_secs: 3.2,
            palette: Palette::default(),
            phase_weights: PhaseWeights::default(),
            particle_count: 50,
            particle_seed: None,
            title: "LilithOS".to_owned(),
            font_size: 72,
            logo_size: 400,
            logo_offset_y: 100,
            text_gap: 50,
            fonts: default_font_chain(),
        }
    }
}

impl AnimationConfig {
    /// Parse a (possibly partial) JSON config. Missing fields take their defaults.
    pub fn from_json_str(s: &str) -> IntroResult<Self> {
        serde_json::from_str(s).map_err(|e| IntroError::config(format!("invalid config json: {e}")))
    }

    /// Read and parse a JSON config file. The result is not yet validated.
    pub fn from_path(path: impl AsRef<Path>) -> IntroResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// `round(fps * duration_secs)`.
    pub fn total_frames(&self) -> u64 {
        let frames = (f64::from(self.fps) * self.duration_secs).round();
        if frames.is_finite() && frames > 0.0 {
            frames as u64
        } else {
            0
        }
    }

    /// Display duration of a single frame (`1 / fps`).
    pub fn frame_duration(&self) -> Duration {
        if self.fps == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(1.0 / f64::from(self.fps))
    }

    pub fn validate(&self) -> IntroResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(IntroError::config(format!(
                "canvas must be non-empty (got {}x{})",
                self.width, self.height
            )));
        }
        self.canvas().rgba_len()?;
        if self.fps == 0 {
            return Err(IntroError::config("fps must be > 0"));
        }
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(IntroError::config(format!(
                "duration_secs must be finite and > 0 (got {})",
                self.duration_secs
            )));
        }
        if self.total_frames() < 1 {
            return Err(IntroError::config(format!(
                "fps * duration_secs must round to at least one frame (fps={}, duration_secs={})",
                self.fps, self.duration_secs
            )));
        }
        self.phase_weights.validate()?;
        if self.font_size == 0 {
            return Err(IntroError::config("font_size must be > 0"));
        }
        if self.logo_size == 0 {
            return Err(IntroError::config("logo_size must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/model.rs"]
mod tests;
