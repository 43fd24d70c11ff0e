//! # Monochrome Converter
//!
//! Reduces RGBA pixel frames to 1-bit logical bitmaps, optionally applying
//! ordered dithering.
//!
//! ## Pipeline Position
//!
//! ```text
//! PixelFrame (RGBA8) ──convert()──► MonoFrame (1 bit/pixel)
//! ```
//!
//! ## Algorithm
//!
//! Per pixel, luminance is computed with the Rec. 601 weights (alpha is
//! ignored):
//!
//! ```text
//! luminance = round(0.299·R + 0.587·G + 0.114·B)
//! ```
//!
//! In plain threshold mode a pixel is lit when `luminance >= threshold`.
//! In `ordered4x4` mode the threshold is shifted per position by the Bayer
//! matrix (see [`dither`]) before the same comparison. `invert` flips the
//! decided bit in both modes.
//!
//! The decision is a pure per-pixel function with no cross-pixel error
//! diffusion, so per-frame conversion is deterministic and freely
//! parallelizable; the batch pipeline exploits this for large jobs.
//!
//! ## Usage
//!
//! ```
//! use oledpack::convert::{self, ConvertOptions};
//! use oledpack::frame::{Dimensions, PixelFrame};
//!
//! let dims = Dimensions::new(8, 8);
//! let white = PixelFrame::new(dims, vec![0xFF; 8 * 8 * 4])?;
//! let monos = convert::convert(&[white], &ConvertOptions::default())?;
//! assert_eq!(monos[0].count_lit(), 64);
//! # Ok::<(), oledpack::OledpackError>(())
//! ```

pub mod dither;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::OledpackError;
use crate::frame::{MonoFrame, PixelFrame};

/// Dithering mode for the monochrome reduction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dithering {
    /// Plain global threshold.
    #[default]
    None,
    /// Ordered dithering with the fixed 4x4 Bayer matrix.
    #[serde(rename = "ordered4x4")]
    Ordered4x4,
}

impl std::str::FromStr for Dithering {
    type Err = OledpackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "ordered4x4" => Ok(Self::Ordered4x4),
            other => Err(OledpackError::InvalidParameters(format!(
                "unknown dithering mode '{}' (expected 'none' or 'ordered4x4')",
                other
            ))),
        }
    }
}

/// Options for [`convert`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConvertOptions {
    /// Luminance cutoff, 0–255. A pixel at exactly the threshold is lit.
    pub threshold: u16,
    /// Dithering mode.
    pub dithering: Dithering,
    /// Flip every decided bit. Applied uniformly in both dithering modes.
    pub invert: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            threshold: 128,
            dithering: Dithering::None,
            invert: false,
        }
    }
}

impl ConvertOptions {
    /// Fail with `InvalidParameters` if any option is out of range.
    pub fn validate(&self) -> Result<(), OledpackError> {
        if self.threshold > 255 {
            return Err(OledpackError::InvalidParameters(format!(
                "threshold must be 0-255, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// Rec. 601 luminance of one pixel, rounded to the nearest integer.
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32).round() as u8
}

/// Convert a list of pixel frames to logical bitmaps.
///
/// One output per input, order-preserving; empty input produces empty
/// output. Options are validated before any frame is processed — an invalid
/// threshold or dithering mode fails the whole call with no partial output.
pub fn convert(
    frames: &[PixelFrame],
    options: &ConvertOptions,
) -> Result<Vec<MonoFrame>, OledpackError> {
    options.validate()?;
    debug!(
        frames = frames.len(),
        threshold = options.threshold,
        dithering = ?options.dithering,
        invert = options.invert,
        "converting frames to 1-bit"
    );
    Ok(frames.iter().map(|f| convert_frame(f, options)).collect())
}

/// Convert a single frame with already-validated options.
///
/// The per-frame body of [`convert`], exposed so the batch pipeline can map
/// it across frames in parallel.
pub fn convert_frame(frame: &PixelFrame, options: &ConvertOptions) -> MonoFrame {
    convert_frame_into(frame, options, Vec::new())
}

/// Like [`convert_frame`], but reuses `storage` for the output bitmap
/// (buffer-pool path). The buffer is cleared and resized as needed.
pub fn convert_frame_into(
    frame: &PixelFrame,
    options: &ConvertOptions,
    storage: Vec<u8>,
) -> MonoFrame {
    let mut mono = MonoFrame::from_storage(frame.dims, storage).with_delay(frame.delay_ms);

    for y in 0..frame.dims.height {
        for x in 0..frame.dims.width {
            let [r, g, b, _a] = frame.rgba(x, y);
            let lum = luminance(r, g, b);

            let mut lit = match options.dithering {
                Dithering::None => lum as u16 >= options.threshold,
                Dithering::Ordered4x4 => {
                    lum as f32 >= dither::adjusted_threshold(options.threshold, x, y)
                }
            };
            if options.invert {
                lit = !lit;
            }

            if lit {
                mono.set_bit(x, y, true);
            }
        }
    }

    mono
}

// ============================================================================
// TESTS
// ============================================================================
