//! # Byte Packer
//!
//! Maps logical bitmaps onto the physical memory layout of page-addressed
//! display controllers.
//!
//! ## Page Memory Layout
//!
//! The controller stores one byte per column per page; each byte encodes
//! 8 vertically stacked pixels:
//!
//! ```text
//! Output offset = page * width + column
//!
//!           col 0   col 1   col 2  ...
//!          ┌───────┬───────┬───────┬───
//! page 0   │ b[0]  │ b[1]  │ b[2]  │      rows 0..8
//!          ├───────┼───────┼───────┼───
//! page 1   │b[W+0] │b[W+1] │b[W+2] │      rows 8..16
//!          └───────┴───────┴───────┴───
//!
//! With lsb-top bit order:
//!   bit 0 = row page*8 + 0 (top of page)
//!   bit 7 = row page*8 + 7 (bottom of page)
//! ```
//!
//! ## Storage Position vs. Source Position
//!
//! The page/column order options are implemented as a pure relabeling: the
//! outer loops walk *storage* positions (which byte of the output buffer is
//! being assembled), and the order options map each storage position to the
//! *source* page/column whose pixels fill it. The output array is never
//! physically reversed afterwards — `bottom-up` means storage page 0 is
//! assembled from the bottommost source page, not that a top-down buffer is
//! flipped in a second pass. The two index spaces must stay independent or
//! the order combinations stop agreeing with the renderer.
//!
//! ## Viewport Devices
//!
//! The SH1106 has 132 physical columns but shows only 128. The packer
//! always produces all 132 bytes per page — it neither crops nor offsets
//! the input. Hiding the 2 border columns is purely a rendering concern
//! (see [`crate::preview`]).
//!
//! ## Example
//!
//! ```
//! use oledpack::device::Preset;
//! use oledpack::frame::{Dimensions, MonoFrame};
//! use oledpack::pack::{self, PackOptions};
//!
//! // Single lit pixel at (0, 0) on a 128x32 panel
//! let mut mono = MonoFrame::blank(Dimensions::new(128, 32));
//! mono.set_bit(0, 0, true);
//!
//! let options = PackOptions::new(Preset::SSD1306_128X32);
//! let packed = pack::pack(&[mono], &options)?;
//! assert_eq!(packed[0].bytes.len(), 512);
//! assert_eq!(packed[0].bytes[0], 0x01); // bit 0 = top of page 0
//! # Ok::<(), oledpack::OledpackError>(())
//! ```

use serde::Serialize;
use tracing::debug;

use crate::device::{BitOrder, ColumnOrder, PageOrder, Preset};
use crate::error::OledpackError;
use crate::frame::{MonoFrame, PackedFrame};

/// Options for [`pack`].
///
/// The per-call overrides take precedence over the preset's own defaults
/// for that call only; the preset itself is never mutated.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PackOptions {
    /// Target device preset.
    pub preset: Preset,
    /// XOR every pixel before placement.
    pub invert: bool,
    /// Override the preset's bit order for this call.
    pub bit_order: Option<BitOrder>,
    /// Override the preset's page order for this call.
    pub page_order: Option<PageOrder>,
    /// Override the preset's column order for this call.
    pub column_order: Option<ColumnOrder>,
}

impl PackOptions {
    /// Options with the preset's own defaults and no inversion.
    pub fn new(preset: Preset) -> Self {
        Self {
            preset,
            invert: false,
            bit_order: None,
            page_order: None,
            column_order: None,
        }
    }

    #[inline]
    pub(crate) fn resolved_bit_order(&self) -> BitOrder {
        self.bit_order.unwrap_or(self.preset.bit_order)
    }

    #[inline]
    pub(crate) fn resolved_page_order(&self) -> PageOrder {
        self.page_order.unwrap_or(self.preset.page_order)
    }

    #[inline]
    pub(crate) fn resolved_column_order(&self) -> ColumnOrder {
        self.column_order.unwrap_or(self.preset.column_order)
    }
}

/// Pack a list of logical bitmaps into device byte buffers.
///
/// One output per input, order-preserving. Failures are per-call: every
/// frame is validated up front and the whole call fails on the first
/// invalid one, producing no partial results.
pub fn pack(frames: &[MonoFrame], options: &PackOptions) -> Result<Vec<PackedFrame>, OledpackError> {
    for frame in frames {
        validate_frame(frame, &options.preset)?;
    }
    debug!(
        frames = frames.len(),
        preset = options.preset.tag,
        invert = options.invert,
        "packing frames"
    );
    frames.iter().map(|f| pack_frame(f, options)).collect()
}

/// Validate one bitmap against a preset's physical layout.
///
/// Dimensions must match the preset exactly — an SH1106 input must be
/// 132x64, not 128x64.
pub fn validate_frame(frame: &MonoFrame, preset: &Preset) -> Result<(), OledpackError> {
    let expected = preset.physical_size();
    if frame.dims != expected {
        return Err(OledpackError::DimensionMismatch {
            expected,
            actual: frame.dims,
        });
    }
    // Always true when the dimensions match a registry preset; guards
    // hand-constructed presets.
    if frame.dims.height % preset.page_height != 0 {
        return Err(OledpackError::InvalidParameters(format!(
            "height {} is not divisible by page height {}",
            frame.dims.height, preset.page_height
        )));
    }
    Ok(())
}

/// Pack a single validated bitmap.
///
/// The per-frame body of [`pack`], exposed so the batch pipeline can map it
/// across frames in parallel.
pub fn pack_frame(frame: &MonoFrame, options: &PackOptions) -> Result<PackedFrame, OledpackError> {
    let preset = &options.preset;
    let page_count = preset.page_count();
    let width = preset.width;
    let page_height = preset.page_height;

    let bit_order = options.resolved_bit_order();
    let page_order = options.resolved_page_order();
    let column_order = options.resolved_column_order();

    let mut bytes = vec![0u8; preset.packed_len()];

    // `page`/`col` are storage positions; `source_page`/`source_col` are
    // the bitmap positions that fill them.
    for page in 0..page_count {
        let source_page = match page_order {
            PageOrder::TopDown => page,
            PageOrder::BottomUp => page_count - 1 - page,
        };
        for col in 0..width {
            let source_col = match column_order {
                ColumnOrder::LeftRight => col,
                ColumnOrder::RightLeft => width - 1 - col,
            };

            let mut byte = 0u8;
            for bit in 0..page_height {
                let y = source_page * page_height + bit;
                let lit = frame.bit(source_col, y) ^ options.invert;
                if lit {
                    let position = match bit_order {
                        BitOrder::LsbTop => bit,
                        BitOrder::MsbTop => page_height - 1 - bit,
                    };
                    byte |= 1 << position;
                }
            }

            bytes[(page * width + col) as usize] = byte;
        }
    }

    if bytes.len() != preset.packed_len() {
        return Err(OledpackError::ByteCount {
            preset: preset.tag.to_string(),
            expected: preset.packed_len(),
            actual: bytes.len(),
        });
    }

    Ok(PackedFrame {
        preset_tag: preset.tag.to_string(),
        dims: frame.dims,
        delay_ms: frame.delay_ms,
        bytes,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Dimensions;

    fn mono_with(dims: Dimensions, lit: &[(u32, u32)]) -> MonoFrame {
        let mut mono = MonoFrame::blank(dims);
        for &(x, y) in lit {
            mono.set_bit(x, y, true);
        }
        mono
    }

    #[test]
    fn test_pixel_0_0_is_bit_0_of_byte_0() {
        let mono = mono_with(Dimensions::new(128, 32), &[(0, 0)]);
        let packed = pack_frame(&mono, &PackOptions::new(Preset::SSD1306_128X32)).unwrap();
        assert_eq!(packed.bytes[0], 0x01);
        assert!(packed.bytes[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_pixel_0_7_is_bit_7_of_byte_0() {
        let mono = mono_with(Dimensions::new(128, 32), &[(0, 7)]);
        let packed = pack_frame(&mono, &PackOptions::new(Preset::SSD1306_128X32)).unwrap();
        assert_eq!(packed.bytes[0], 0x80);
    }

    #[test]
    fn test_pixel_0_8_starts_second_page() {
        let mono = mono_with(Dimensions::new(128, 32), &[(0, 8)]);
        let packed = pack_frame(&mono, &PackOptions::new(Preset::SSD1306_128X32)).unwrap();
        assert_eq!(packed.bytes[128], 0x01);
        assert_eq!(packed.bytes[0], 0x00);
    }

    #[test]
    fn test_column_maps_to_byte_within_page() {
        let mono = mono_with(Dimensions::new(128, 32), &[(5, 0)]);
        let packed = pack_frame(&mono, &PackOptions::new(Preset::SSD1306_128X32)).unwrap();
        assert_eq!(packed.bytes[5], 0x01);
    }

    #[test]
    fn test_msb_top_reverses_bit_position() {
        let mono = mono_with(Dimensions::new(128, 32), &[(0, 0)]);
        let options = PackOptions {
            bit_order: Some(BitOrder::MsbTop),
            ..PackOptions::new(Preset::SSD1306_128X32)
        };
        let packed = pack_frame(&mono, &options).unwrap();
        assert_eq!(packed.bytes[0], 0x80);
    }

    #[test]
    fn test_bottom_up_relabels_pages_without_reversal() {
        // Pixel in the TOP source page lands in the LAST storage page.
        let mono = mono_with(Dimensions::new(128, 32), &[(0, 0)]);
        let options = PackOptions {
            page_order: Some(PageOrder::BottomUp),
            ..PackOptions::new(Preset::SSD1306_128X32)
        };
        let packed = pack_frame(&mono, &options).unwrap();
        // 4 pages; storage page 3 starts at byte 384
        assert_eq!(packed.bytes[384], 0x01);
        assert_eq!(packed.bytes[0], 0x00);
    }

    #[test]
    fn test_right_left_relabels_columns() {
        let mono = mono_with(Dimensions::new(128, 32), &[(0, 0)]);
        let options = PackOptions {
            column_order: Some(ColumnOrder::RightLeft),
            ..PackOptions::new(Preset::SSD1306_128X32)
        };
        let packed = pack_frame(&mono, &options).unwrap();
        assert_eq!(packed.bytes[127], 0x01);
        assert_eq!(packed.bytes[0], 0x00);
    }

    #[test]
    fn test_invert_is_bytewise_complement() {
        let mono = mono_with(Dimensions::new(128, 32), &[(0, 0), (64, 17), (127, 31)]);
        let plain = pack_frame(&mono, &PackOptions::new(Preset::SSD1306_128X32)).unwrap();
        let options = PackOptions {
            invert: true,
            ..PackOptions::new(Preset::SSD1306_128X32)
        };
        let inverted = pack_frame(&mono, &options).unwrap();
        for (i, (&a, &b)) in plain.bytes.iter().zip(&inverted.bytes).enumerate() {
            assert_eq!(a, !b, "byte {} not complemented", i);
        }
    }

    #[test]
    fn test_sh1106_packs_all_132_columns() {
        // Edge columns are packed even though the panel hides them.
        let dims = Dimensions::new(132, 64);
        let mono = mono_with(dims, &[(0, 0), (1, 0), (2, 0), (129, 0), (130, 0), (131, 0)]);
        let packed = pack_frame(&mono, &PackOptions::new(Preset::SH1106_132X64)).unwrap();
        assert_eq!(packed.bytes.len(), 1056);
        for col in [0usize, 1, 2, 129, 130, 131] {
            assert_eq!(packed.bytes[col], 0x01, "column {} missing", col);
        }
    }

    #[test]
    fn test_dimension_mismatch_names_both_sizes() {
        let mono = MonoFrame::blank(Dimensions::new(64, 32));
        let err = pack(&[mono], &PackOptions::new(Preset::SSD1306_128X32)).unwrap_err();
        match err {
            OledpackError::DimensionMismatch { expected, actual } => {
                assert_eq!(expected, Dimensions::new(128, 32));
                assert_eq!(actual, Dimensions::new(64, 32));
            }
            other => panic!("expected DimensionMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_sh1106_rejects_visible_sized_input() {
        // SH1106 input must be the full physical 132x64, not the visible 128x64.
        let mono = MonoFrame::blank(Dimensions::new(128, 64));
        let err = pack(&[mono], &PackOptions::new(Preset::SH1106_132X64)).unwrap_err();
        assert!(matches!(err, OledpackError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_whole_call_fails_on_first_bad_frame() {
        // A good frame before a bad one still yields no partial results.
        let good = MonoFrame::blank(Dimensions::new(128, 32));
        let bad = MonoFrame::blank(Dimensions::new(64, 32));
        let result = pack(&[good, bad], &PackOptions::new(Preset::SSD1306_128X32));
        assert!(result.is_err());
    }

    #[test]
    fn test_packed_len_matches_preset() {
        for preset in Preset::ALL {
            let mono = MonoFrame::blank(preset.physical_size());
            let packed = pack_frame(&mono, &PackOptions::new(preset)).unwrap();
            assert_eq!(packed.bytes.len(), preset.packed_len(), "{}", preset.tag);
        }
    }

    #[test]
    fn test_delay_carried_forward() {
        let mono = MonoFrame::blank(Dimensions::new(128, 32)).with_delay(Some(80));
        let packed = pack_frame(&mono, &PackOptions::new(Preset::SSD1306_128X32)).unwrap();
        assert_eq!(packed.delay_ms, Some(80));
    }
}
