//! # Packed-Frame Preview Renderer
//!
//! Renders packed device bytes back into visible pixels — the exact inverse
//! of the byte packer, used both for on-screen preview and as the packer's
//! test oracle.
//!
//! ## Architecture
//!
//! ```text
//! PackedFrame → unpack_frame() → MonoFrame → render() → DrawSurface
//!                 (bit-exact          (visible window,
//!                  inverse of          scaled squares,
//!                  the packer)         optional grid)
//! ```
//!
//! Unpacking applies the same storage-position → source-position mapping as
//! the packer, in reverse: the byte at storage offset `page * width + col`
//! is scattered back to the source page/column the packer read it from. A
//! frame packed with any `(bit order, page order, column order)` combination
//! therefore unpacks to exactly the bits that were set in the source
//! bitmap.
//!
//! ## Viewport
//!
//! Rendering is restricted to the preset's *visible* window. For the SH1106
//! that means 128 of the 132 physical columns: the drawing surface is sized
//! for 128 columns and physical columns 0-1 and 130-131 are never drawn.
//!
//! ## Drawing Surface
//!
//! The renderer draws through the [`DrawSurface`] trait — resize, set
//! foreground color, fill rectangle — so any 2D raster target can be
//! plugged in. [`ImageSurface`] (an `image::RgbaImage` in memory) is the
//! built-in implementation, with PNG export for previews and golden files.

use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::device::{BitOrder, ColumnOrder, PageOrder, Preset};
use crate::error::OledpackError;
use crate::frame::{MonoFrame, PackedFrame};

/// Color of a lit pixel (and of the background when inverted).
const LIT: Rgba<u8> = Rgba([0xFF, 0xFF, 0xFF, 0xFF]);

/// Color of an unlit pixel (and of lit pixels when inverted).
const UNLIT: Rgba<u8> = Rgba([0x00, 0x00, 0x00, 0xFF]);

/// Grid overlay color.
const GRID: Rgba<u8> = Rgba([0x40, 0x40, 0x40, 0xFF]);

/// A 2D raster drawing target.
///
/// The renderer is the only consumer; implementations outside this crate
/// can bridge to any canvas-like API that can resize, set a foreground
/// color, and fill rectangles.
pub trait DrawSurface {
    /// Resize the drawable area, discarding existing content.
    fn resize(&mut self, width: u32, height: u32);

    /// Set the foreground color used by subsequent `fill_rect` calls.
    fn set_color(&mut self, color: Rgba<u8>);

    /// Fill an axis-aligned rectangle with the current foreground color.
    fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32);
}

/// Options for [`render`].
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Square size in surface pixels per display pixel. Must be >= 1.
    pub scale: u32,
    /// Swap background and pixel colors.
    pub invert: bool,
    /// Draw 1-pixel grid lines at every scaled pixel boundary. Only drawn
    /// when `scale > 1`.
    pub show_grid: bool,
    /// Bit order override, matching the one used when packing. `None`
    /// means the preset default.
    pub bit_order: Option<BitOrder>,
    /// Page order override, matching the one used when packing.
    pub page_order: Option<PageOrder>,
    /// Column order override, matching the one used when packing.
    pub column_order: Option<ColumnOrder>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: 1,
            invert: false,
            show_grid: false,
            bit_order: None,
            page_order: None,
            column_order: None,
        }
    }
}

/// Unpack device bytes back into the logical bitmap that produced them.
///
/// Bit-exact inverse of [`crate::pack::pack_frame`] over the full physical
/// dimensions (including any viewport-hidden columns). The order options
/// must match the ones the frame was packed with; `None` selects the
/// preset defaults, mirroring the packer.
pub fn unpack_frame(
    frame: &PackedFrame,
    options: &RenderOptions,
) -> Result<MonoFrame, OledpackError> {
    let preset = Preset::lookup(&frame.preset_tag)?;
    if frame.bytes.len() != preset.packed_len() {
        return Err(OledpackError::ByteCount {
            preset: preset.tag.to_string(),
            expected: preset.packed_len(),
            actual: frame.bytes.len(),
        });
    }

    let bit_order = options.bit_order.unwrap_or(preset.bit_order);
    let page_order = options.page_order.unwrap_or(preset.page_order);
    let column_order = options.column_order.unwrap_or(preset.column_order);

    let page_count = preset.page_count();
    let width = preset.width;
    let page_height = preset.page_height;

    let mut mono = MonoFrame::blank(preset.physical_size()).with_delay(frame.delay_ms);

    // Walk storage positions exactly like the packer and scatter each byte
    // back to the source position it was assembled from.
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

            let byte = frame.bytes[(page * width + col) as usize];
            for bit in 0..page_height {
                let position = match bit_order {
                    BitOrder::LsbTop => bit,
                    BitOrder::MsbTop => page_height - 1 - bit,
                };
                if byte >> position & 1 == 1 {
                    mono.set_bit(source_col, source_page * page_height + bit, true);
                }
            }
        }
    }

    Ok(mono)
}

/// Render a packed frame onto a drawing surface.
///
/// The surface is resized to `visible_width * scale` by
/// `visible_height * scale` (visible dimensions come from the preset — the
/// SH1106 renders 128 columns, not 132), filled with the background color,
/// and every lit pixel inside the visible window is drawn as a
/// `scale x scale` square. Must agree bit-for-bit with what a physical
/// panel driven by `frame.bytes` would show.
pub fn render(
    surface: &mut dyn DrawSurface,
    frame: &PackedFrame,
    options: &RenderOptions,
) -> Result<(), OledpackError> {
    if options.scale == 0 {
        return Err(OledpackError::InvalidParameters(
            "scale must be at least 1".to_string(),
        ));
    }
    let preset = Preset::lookup(&frame.preset_tag)?;
    let mono = unpack_frame(frame, options)?;

    let visible = preset.visible_size();
    let scale = options.scale;
    debug!(preset = preset.tag, %visible, scale, "rendering preview");

    surface.resize(visible.width * scale, visible.height * scale);

    let (background, foreground) = if options.invert {
        (LIT, UNLIT)
    } else {
        (UNLIT, LIT)
    };

    surface.set_color(background);
    surface.fill_rect(0, 0, visible.width * scale, visible.height * scale);

    surface.set_color(foreground);
    for y in 0..visible.height {
        for col in 0..visible.width {
            if mono.bit(col + preset.viewport_offset, y) {
                surface.fill_rect(col * scale, y * scale, scale, scale);
            }
        }
    }

    if options.show_grid && scale > 1 {
        surface.set_color(GRID);
        for col in 1..visible.width {
            surface.fill_rect(col * scale, 0, 1, visible.height * scale);
        }
        for row in 1..visible.height {
            surface.fill_rect(0, row * scale, visible.width * scale, 1);
        }
    }

    Ok(())
}

/// Render a packed frame to PNG bytes via an in-memory [`ImageSurface`].
pub fn render_to_png(
    frame: &PackedFrame,
    options: &RenderOptions,
) -> Result<Vec<u8>, OledpackError> {
    let mut surface = ImageSurface::new();
    render(&mut surface, frame, options)?;
    surface.to_png()
}

/// An in-memory RGBA drawing surface backed by the `image` crate.
pub struct ImageSurface {
    image: RgbaImage,
    color: Rgba<u8>,
}

impl ImageSurface {
    pub fn new() -> Self {
        Self {
            image: RgbaImage::new(1, 1),
            color: UNLIT,
        }
    }

    /// The rendered image.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Encode the surface as PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>, OledpackError> {
        use image::ImageEncoder;

        let mut png_bytes = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(
                self.image.as_raw(),
                self.image.width(),
                self.image.height(),
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e: image::ImageError| OledpackError::Render(e.to_string()))?;

        Ok(png_bytes)
    }
}

impl Default for ImageSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawSurface for ImageSurface {
    fn resize(&mut self, width: u32, height: u32) {
        self.image = RgbaImage::new(width.max(1), height.max(1));
    }

    fn set_color(&mut self, color: Rgba<u8>) {
        self.color = color;
    }

    fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32) {
        let x_end = (x + width).min(self.image.width());
        let y_end = (y + height).min(self.image.height());
        for py in y..y_end {
            for px in x..x_end {
                self.image.put_pixel(px, py, self.color);
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Dimensions;
    use crate::pack::{self, PackOptions};

    fn mono_with(dims: Dimensions, lit: &[(u32, u32)]) -> MonoFrame {
        let mut mono = MonoFrame::blank(dims);
        for &(x, y) in lit {
            mono.set_bit(x, y, true);
        }
        mono
    }

    #[test]
    fn test_unpack_inverts_pack_default_orders() {
        let mono = mono_with(Dimensions::new(128, 32), &[(0, 0), (3, 9), (127, 31)]);
        let packed = pack::pack_frame(&mono, &PackOptions::new(Preset::SSD1306_128X32)).unwrap();
        let unpacked = unpack_frame(&packed, &RenderOptions::default()).unwrap();
        assert_eq!(unpacked.as_bytes(), mono.as_bytes());
    }

    #[test]
    fn test_unpack_rejects_wrong_byte_count() {
        let frame = PackedFrame {
            preset_tag: "SSD1306_128x32".to_string(),
            dims: Dimensions::new(128, 32),
            delay_ms: None,
            bytes: vec![0; 100],
        };
        let err = unpack_frame(&frame, &RenderOptions::default()).unwrap_err();
        assert!(matches!(err, OledpackError::ByteCount { .. }));
    }

    #[test]
    fn test_unpack_unknown_preset() {
        let frame = PackedFrame {
            preset_tag: "NOPE".to_string(),
            dims: Dimensions::new(128, 32),
            delay_ms: None,
            bytes: vec![0; 512],
        };
        assert!(matches!(
            unpack_frame(&frame, &RenderOptions::default()),
            Err(OledpackError::UnknownPreset(_))
        ));
    }

    #[test]
    fn test_render_surface_sized_to_visible_window() {
        let mono = MonoFrame::blank(Dimensions::new(132, 64));
        let packed = pack::pack_frame(&mono, &PackOptions::new(Preset::SH1106_132X64)).unwrap();
        let mut surface = ImageSurface::new();
        let options = RenderOptions {
            scale: 2,
            ..Default::default()
        };
        render(&mut surface, &packed, &options).unwrap();
        // 128 visible columns, not 132
        assert_eq!(surface.image().width(), 256);
        assert_eq!(surface.image().height(), 128);
    }

    #[test]
    fn test_render_zero_scale_rejected() {
        let mono = MonoFrame::blank(Dimensions::new(128, 32));
        let packed = pack::pack_frame(&mono, &PackOptions::new(Preset::SSD1306_128X32)).unwrap();
        let mut surface = ImageSurface::new();
        let options = RenderOptions {
            scale: 0,
            ..Default::default()
        };
        assert!(matches!(
            render(&mut surface, &packed, &options),
            Err(OledpackError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_render_draws_lit_pixel_as_scaled_square() {
        let mono = mono_with(Dimensions::new(128, 32), &[(1, 1)]);
        let packed = pack::pack_frame(&mono, &PackOptions::new(Preset::SSD1306_128X32)).unwrap();
        let mut surface = ImageSurface::new();
        let options = RenderOptions {
            scale: 3,
            ..Default::default()
        };
        render(&mut surface, &packed, &options).unwrap();

        let img = surface.image();
        // All 9 pixels of the square at (3..6, 3..6) are lit
        for py in 3..6 {
            for px in 3..6 {
                assert_eq!(*img.get_pixel(px, py), LIT, "pixel ({},{})", px, py);
            }
        }
        // A neighbor outside the square stays background
        assert_eq!(*img.get_pixel(7, 7), UNLIT);
    }

    #[test]
    fn test_render_invert_swaps_colors() {
        let mono = mono_with(Dimensions::new(128, 32), &[(0, 0)]);
        let packed = pack::pack_frame(&mono, &PackOptions::new(Preset::SSD1306_128X32)).unwrap();
        let mut surface = ImageSurface::new();
        let options = RenderOptions {
            invert: true,
            ..Default::default()
        };
        render(&mut surface, &packed, &options).unwrap();
        let img = surface.image();
        assert_eq!(*img.get_pixel(0, 0), UNLIT);
        assert_eq!(*img.get_pixel(5, 5), LIT);
    }

    #[test]
    fn test_grid_only_drawn_above_scale_1() {
        let mono = MonoFrame::blank(Dimensions::new(128, 32));
        let packed = pack::pack_frame(&mono, &PackOptions::new(Preset::SSD1306_128X32)).unwrap();

        let mut surface = ImageSurface::new();
        let options = RenderOptions {
            scale: 1,
            show_grid: true,
            ..Default::default()
        };
        render(&mut surface, &packed, &options).unwrap();
        assert_eq!(*surface.image().get_pixel(1, 0), UNLIT, "no grid at scale 1");

        let mut surface = ImageSurface::new();
        let options = RenderOptions {
            scale: 4,
            show_grid: true,
            ..Default::default()
        };
        render(&mut surface, &packed, &options).unwrap();
        // Vertical boundary line at x = 4
        assert_eq!(*surface.image().get_pixel(4, 1), GRID);
        // Horizontal boundary line at y = 4
        assert_eq!(*surface.image().get_pixel(1, 4), GRID);
    }

    #[test]
    fn test_sh1106_viewport_crops_hidden_columns() {
        // Row-0 pixels at physical columns 0,1,2,129,130,131: only columns
        // 2..=129 are inside the visible window.
        let dims = Dimensions::new(132, 64);
        let mono = mono_with(dims, &[(0, 0), (1, 0), (2, 0), (129, 0), (130, 0), (131, 0)]);
        let packed = pack::pack_frame(&mono, &PackOptions::new(Preset::SH1106_132X64)).unwrap();

        let mut surface = ImageSurface::new();
        render(&mut surface, &packed, &RenderOptions::default()).unwrap();
        let img = surface.image();

        // Physical column 2 → visible column 0; physical 129 → visible 127
        assert_eq!(*img.get_pixel(0, 0), LIT);
        assert_eq!(*img.get_pixel(127, 0), LIT);
        // Visible columns 1..127 on row 0 are dark
        for x in 1..127 {
            assert_eq!(*img.get_pixel(x, 0), UNLIT, "column {} lit", x);
        }
    }

    #[test]
    fn test_png_export() {
        let mono = mono_with(Dimensions::new(128, 32), &[(0, 0)]);
        let packed = pack::pack_frame(&mono, &PackOptions::new(Preset::SSD1306_128X32)).unwrap();
        let png = render_to_png(&packed, &RenderOptions::default()).unwrap();
        // PNG magic
        assert_eq!(&png[..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}
