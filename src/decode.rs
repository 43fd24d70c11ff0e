//! # Image Decode
//!
//! Turns uploaded image files into RGBA [`PixelFrame`]s, extracting the
//! animation metadata encoded in filenames.
//!
//! ## Filename Conventions
//!
//! - A trailing `_<N>ms` before the extension is a per-frame display
//!   delay: `logo_100ms.png` shows for 100 milliseconds.
//! - The last run of digits in the remaining stem is an ordering index:
//!   `frame_003.png`, `sprite-05.png` and `image42.png` sort as 3, 5
//!   and 42. Files without an index keep their given order, after the
//!   indexed ones.
//!
//! ## Failure Modes
//!
//! Unrecognized container bytes fail with `UnsupportedFormat`; a
//! recognized container that will not decode fails with `CorruptFile`.
//! Frames of one sequence that disagree with *each other* fail with
//! `InconsistentDimensions` — deliberately distinct from
//! `DimensionMismatch`, which is about disagreeing with a preset and is
//! diagnosed later, by the packer.

use tracing::debug;

use crate::error::OledpackError;
use crate::frame::{Dimensions, PixelFrame};

/// Decode a single image into an RGBA pixel frame.
///
/// `name` is the source filename, used both for error context and for the
/// delay-suffix convention.
pub fn decode_image(name: &str, bytes: &[u8]) -> Result<PixelFrame, OledpackError> {
    if image::guess_format(bytes).is_err() {
        return Err(OledpackError::UnsupportedFormat(name.to_string()));
    }

    let decoded = image::load_from_memory(bytes).map_err(|e| OledpackError::CorruptFile {
        name: name.to_string(),
        reason: e.to_string(),
    })?;

    let rgba = decoded.to_rgba8();
    let dims = Dimensions::new(rgba.width(), rgba.height());
    debug!(name, %dims, "decoded image");

    PixelFrame::new(dims, rgba.into_raw()).map(|f| f.with_delay(frame_delay_ms(name)))
}

/// Decode a named set of files into one ordered frame sequence.
///
/// Files are sorted by their filename index (unindexed files keep their
/// relative order after the indexed ones); all frames must agree on
/// dimensions.
pub fn decode_sequence(files: &[(String, Vec<u8>)]) -> Result<Vec<PixelFrame>, OledpackError> {
    let mut order: Vec<usize> = (0..files.len()).collect();
    order.sort_by_key(|&i| (frame_index(&files[i].0).unwrap_or(u32::MAX), i));

    let mut frames = Vec::with_capacity(files.len());
    for &i in &order {
        let (name, bytes) = &files[i];
        frames.push(decode_image(name, bytes)?);
    }

    if let Some(first) = frames.first() {
        let expected = first.dims;
        for (index, frame) in frames.iter().enumerate().skip(1) {
            if frame.dims != expected {
                return Err(OledpackError::InconsistentDimensions {
                    first: expected,
                    index,
                    actual: frame.dims,
                });
            }
        }
    }

    Ok(frames)
}

/// The filename stem: everything before the last `.`.
fn stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot) => &name[..dot],
        None => name,
    }
}

/// Parse the `_<N>ms` delay suffix from a filename, if present.
///
/// ```
/// use oledpack::decode::frame_delay_ms;
///
/// assert_eq!(frame_delay_ms("logo_100ms.png"), Some(100));
/// assert_eq!(frame_delay_ms("logo.png"), None);
/// ```
pub fn frame_delay_ms(name: &str) -> Option<u32> {
    split_delay(stem(name)).1
}

/// Parse the numeric ordering index from a filename, if present.
///
/// The delay suffix is stripped first, then the last run of ASCII digits
/// in the stem is the index.
///
/// ```
/// use oledpack::decode::frame_index;
///
/// assert_eq!(frame_index("frame_003.png"), Some(3));
/// assert_eq!(frame_index("sprite-05.png"), Some(5));
/// assert_eq!(frame_index("image42.png"), Some(42));
/// assert_eq!(frame_index("logo.png"), None);
/// ```
pub fn frame_index(name: &str) -> Option<u32> {
    trailing_digits(split_delay(stem(name)).0)
}

/// Split a stem into (remainder, delay): `"frame_003_100ms"` becomes
/// `("frame_003", Some(100))`.
fn split_delay(stem: &str) -> (&str, Option<u32>) {
    if let Some(rest) = stem.strip_suffix("ms") {
        let digits_start = rest
            .rfind(|c: char| !c.is_ascii_digit())
            .map(|i| i + rest[i..].chars().next().map_or(1, char::len_utf8))
            .unwrap_or(0);
        let digits = &rest[digits_start..];
        if !digits.is_empty() && rest[..digits_start].ends_with('_') {
            if let Ok(delay) = digits.parse() {
                return (&rest[..digits_start - 1], Some(delay));
            }
        }
    }
    (stem, None)
}

/// The last run of ASCII digits in a stem, parsed.
fn trailing_digits(stem: &str) -> Option<u32> {
    let end = stem.rfind(|c: char| c.is_ascii_digit())? + 1;
    let start = stem[..end]
        .rfind(|c: char| !c.is_ascii_digit())
        .map(|i| i + 1)
        .unwrap_or(0);
    stem[start..end].parse().ok()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Encode a tiny PNG for decode tests.
    fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        use image::ImageEncoder;
        let mut img = image::RgbaImage::new(width, height);
        for pixel in img.pixels_mut() {
            *pixel = image::Rgba(rgba);
        }
        let mut bytes = Vec::new();
        image::codecs::png::PngEncoder::new(&mut bytes)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_png() {
        let bytes = png_bytes(4, 2, [10, 20, 30, 255]);
        let frame = decode_image("test.png", &bytes).unwrap();
        assert_eq!(frame.dims, Dimensions::new(4, 2));
        assert_eq!(frame.rgba(0, 0), [10, 20, 30, 255]);
    }

    #[test]
    fn test_unsupported_format() {
        let err = decode_image("notes.txt", b"plain text, not an image").unwrap_err();
        assert!(matches!(err, OledpackError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_corrupt_file() {
        // Valid PNG magic, garbage afterwards
        let mut bytes = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
        let err = decode_image("broken.png", &bytes).unwrap_err();
        match err {
            OledpackError::CorruptFile { name, .. } => assert_eq!(name, "broken.png"),
            other => panic!("expected CorruptFile, got {:?}", other),
        }
    }

    #[test]
    fn test_delay_suffix() {
        assert_eq!(frame_delay_ms("logo_100ms.png"), Some(100));
        assert_eq!(frame_delay_ms("frame_003_16ms.png"), Some(16));
        assert_eq!(frame_delay_ms("logo.png"), None);
        // "ms" without digits or separator is not a delay
        assert_eq!(frame_delay_ms("alarms.png"), None);
        assert_eq!(frame_delay_ms("100ms.png"), None);
    }

    #[test]
    fn test_frame_index_patterns() {
        assert_eq!(frame_index("frame_003.png"), Some(3));
        assert_eq!(frame_index("sprite-05.png"), Some(5));
        assert_eq!(frame_index("image42.png"), Some(42));
        assert_eq!(frame_index("logo.png"), None);
        // Delay suffix is not mistaken for the index
        assert_eq!(frame_index("frame_003_100ms.png"), Some(3));
    }

    #[test]
    fn test_decode_image_attaches_delay() {
        let bytes = png_bytes(2, 2, [0, 0, 0, 255]);
        let frame = decode_image("blink_250ms.png", &bytes).unwrap();
        assert_eq!(frame.delay_ms, Some(250));
    }

    #[test]
    fn test_sequence_sorted_by_index() {
        let files = vec![
            ("frame_002.png".to_string(), png_bytes(2, 2, [2, 2, 2, 255])),
            ("frame_000.png".to_string(), png_bytes(2, 2, [0, 0, 0, 255])),
            ("frame_001.png".to_string(), png_bytes(2, 2, [1, 1, 1, 255])),
        ];
        let frames = decode_sequence(&files).unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].rgba(0, 0)[0], 0);
        assert_eq!(frames[1].rgba(0, 0)[0], 1);
        assert_eq!(frames[2].rgba(0, 0)[0], 2);
    }

    #[test]
    fn test_sequence_inconsistent_dimensions() {
        let files = vec![
            ("frame_000.png".to_string(), png_bytes(4, 4, [0, 0, 0, 255])),
            ("frame_001.png".to_string(), png_bytes(4, 2, [0, 0, 0, 255])),
        ];
        let err = decode_sequence(&files).unwrap_err();
        match err {
            OledpackError::InconsistentDimensions { first, index, actual } => {
                assert_eq!(first, Dimensions::new(4, 4));
                assert_eq!(index, 1);
                assert_eq!(actual, Dimensions::new(4, 2));
            }
            other => panic!("expected InconsistentDimensions, got {:?}", other),
        }
    }

    #[test]
    fn test_sequence_empty() {
        assert!(decode_sequence(&[]).unwrap().is_empty());
    }
}
