//! # Bayer 4x4 Ordered Dithering
//!
//! This module implements ordered dithering using a Bayer matrix to convert
//! continuous-tone (grayscale) pixels to binary (lit/unlit) output suitable
//! for monochrome OLED panels.
//!
//! ## What is Dithering?
//!
//! Dithering simulates grayscale on a panel whose pixels are only on or off.
//! By varying the density of lit pixels, we create the illusion of different
//! gray levels.
//!
//! ```text
//! Grayscale:    Black    Dark     Medium    Light   White
//!               ░░░░░░   ░░▒░░░   ░▒░▒░▒   ▒▓▒▓▒▓   ██████
//! ```
//!
//! ## Ordered Dithering
//!
//! Instead of one global threshold, each pixel position gets a small
//! position-dependent threshold offset drawn from a repeating matrix. For a
//! pixel at (x, y):
//!
//! 1. Look up the matrix value `B = BAYER4[y mod 4][x mod 4]` ∈ [0, 15]
//! 2. Shift the base threshold by `(B − 7.5) × 4`
//! 3. Light the pixel if its luminance meets the shifted threshold
//!
//! ## The Bayer Matrix
//!
//! ```text
//!     0    1    2    3   (x mod 4)
//!   ┌────┬────┬────┬────┐
//! 0 │  0 │  8 │  2 │ 10 │
//!   ├────┼────┼────┼────┤
//! 1 │ 12 │  4 │ 14 │  6 │
//!   ├────┼────┼────┼────┤
//! 2 │  3 │ 11 │  1 │  9 │
//!   ├────┼────┼────┼────┤
//! 3 │ 15 │  7 │ 13 │  5 │
//!   └────┴────┴────┴────┘
//! (y mod 4)
//! ```
//!
//! Centering the offsets on 7.5 keeps the mean shifted threshold equal to
//! the base threshold, so dithering redistributes pixels without changing
//! the overall brightness. The ±30 spread (`(0−7.5)×4` to `(15−7.5)×4`)
//! turns a mid-gray region into the classic halftone checker instead of a
//! hard band.
//!
//! ## Why Ordered (Not Error Diffusion)?
//!
//! | Method | Speed | Cross-pixel state | Parallelizable |
//! |--------|-------|-------------------|----------------|
//! | Bayer | Fast | None | Yes, trivially |
//! | Floyd-Steinberg | Slow | Error carries forward | No |
//!
//! The lookup is a pure per-pixel function — no error accumulation — so the
//! pipeline can run frames (or rows) in parallel and the output is fully
//! deterministic.

/// Bayer 4x4 dithering matrix.
///
/// Values 0–15, each appearing exactly once, arranged so that progressively
/// brighter inputs light pixels in a visually even pattern.
pub const BAYER4: [[u8; 4]; 4] = [
    [0, 8, 2, 10],
    [12, 4, 14, 6],
    [3, 11, 1, 9],
    [15, 7, 13, 5],
];

/// The position-adjusted threshold for pixel (x, y).
///
/// ```text
/// adjusted = threshold + (BAYER4[y mod 4][x mod 4] − 7.5) × 4
/// ```
///
/// The result ranges over `threshold ± 30` and may leave [0, 255]; callers
/// compare against it as a float, so saturated pixels still resolve
/// correctly at the extremes.
#[inline]
pub fn adjusted_threshold(threshold: u16, x: u32, y: u32) -> f32 {
    let matrix_value = BAYER4[(y % 4) as usize][(x % 4) as usize];
    threshold as f32 + (matrix_value as f32 - 7.5) * 4.0
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bayer_matrix_values() {
        // Check matrix contains all values 0-15 exactly once
        let mut seen = [false; 16];
        for row in &BAYER4 {
            for &val in row {
                assert!(val < 16, "Matrix value {} out of range", val);
                assert!(!seen[val as usize], "Duplicate value {}", val);
                seen[val as usize] = true;
            }
        }
        assert!(seen.iter().all(|&s| s), "Not all values 0-15 present");
    }

    #[test]
    fn test_adjusted_threshold_is_centered() {
        // Offsets are symmetric around the base threshold, so the mean over
        // one full tile equals the base.
        let mut sum = 0.0;
        for y in 0..4 {
            for x in 0..4 {
                sum += adjusted_threshold(128, x, y);
            }
        }
        assert!((sum / 16.0 - 128.0).abs() < 1e-4);
    }

    #[test]
    fn test_adjusted_threshold_range() {
        for y in 0..4 {
            for x in 0..4 {
                let t = adjusted_threshold(128, x, y);
                assert!(t >= 128.0 - 30.0, "below spread at ({},{}): {}", x, y, t);
                assert!(t <= 128.0 + 30.0, "above spread at ({},{}): {}", x, y, t);
            }
        }
    }

    #[test]
    fn test_adjusted_threshold_periodicity() {
        // Matrix should repeat every 4 pixels
        for y in 0..4 {
            for x in 0..4 {
                let t = adjusted_threshold(100, x, y);
                assert_eq!(t, adjusted_threshold(100, x + 4, y));
                assert_eq!(t, adjusted_threshold(100, x, y + 4));
                assert_eq!(t, adjusted_threshold(100, x + 8, y + 12));
            }
        }
    }

    #[test]
    fn test_known_corner_values() {
        // B(0,0) = 0 → 128 + (0 − 7.5) × 4 = 98
        assert_eq!(adjusted_threshold(128, 0, 0), 98.0);
        // B(x=0, y=3) = 15 → 128 + (15 − 7.5) × 4 = 158
        assert_eq!(adjusted_threshold(128, 0, 3), 158.0);
    }
}
