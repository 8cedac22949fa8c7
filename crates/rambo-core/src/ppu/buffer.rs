//! Framebuffer the PPU paints during visible dots.
//!
//! The buffer is a flat 256x240 array of packed 32-bit pixels. The packing is
//! chosen once (RGBA or BGRA byte order) so frontends can upload it without a
//! conversion pass.

#[cfg(feature = "savestate-serde")]
use serde::{Deserialize, Serialize};

use super::palette::Color;
use crate::error::Error;

pub const SCREEN_WIDTH: usize = 256;
pub const SCREEN_HEIGHT: usize = 240;
pub const SCREEN_PIXELS: usize = SCREEN_WIDTH * SCREEN_HEIGHT;

/// Byte order of a packed pixel in memory (little-endian `u32`).
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorFormat {
    /// Bytes R, G, B, A.
    #[default]
    Rgba8888,
    /// Bytes B, G, R, A.
    Bgra8888,
}

impl ColorFormat {
    pub const fn bytes_per_pixel(self) -> usize {
        4
    }

    /// Packs an opaque color so that `u32::to_le_bytes` yields this format's
    /// byte order.
    #[inline]
    pub fn pack(self, color: Color) -> u32 {
        let bytes = match self {
            ColorFormat::Rgba8888 => [color.r, color.g, color.b, 0xFF],
            ColorFormat::Bgra8888 => [color.b, color.g, color.r, 0xFF],
        };
        u32::from_le_bytes(bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pixels: Vec<u32>,
    format: ColorFormat,
}

impl FrameBuffer {
    /// Allocates a black 256x240 buffer.
    pub fn new(format: ColorFormat) -> Self {
        Self {
            pixels: vec![format.pack(Color::default()); SCREEN_PIXELS],
            format,
        }
    }

    /// Wraps caller-provided storage, rejecting anything that is not exactly
    /// 256x240 pixels.
    pub fn try_from_pixels(pixels: Vec<u32>, format: ColorFormat) -> Result<Self, Error> {
        if pixels.len() != SCREEN_PIXELS {
            return Err(Error::FrameBufferSize {
                expected: SCREEN_PIXELS,
                actual: pixels.len(),
            });
        }
        Ok(Self { pixels, format })
    }

    /// Wraps caller-provided storage without validation. A buffer of the
    /// wrong size is kept but never written.
    pub(crate) fn from_pixels_unchecked(pixels: Vec<u32>, format: ColorFormat) -> Self {
        if pixels.len() != SCREEN_PIXELS {
            tracing::warn!(
                expected = SCREEN_PIXELS,
                actual = pixels.len(),
                "framebuffer size mismatch; pixel writes will be skipped"
            );
        }
        Self { pixels, format }
    }

    pub fn format(&self) -> ColorFormat {
        self.format
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u32> {
        self.pixels
    }

    /// Packed pixel at `(x, y)`, if inside a correctly sized buffer.
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if !self.is_screen_sized() || x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            return None;
        }
        self.pixels.get(y * SCREEN_WIDTH + x).copied()
    }

    /// Pixels as bytes in the buffer's color format.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|px| px.to_le_bytes()).collect()
    }

    pub fn is_screen_sized(&self) -> bool {
        self.pixels.len() == SCREEN_PIXELS
    }

    /// Writes one pixel. Out-of-range coordinates and mis-sized buffers are
    /// ignored.
    #[inline]
    pub(crate) fn write(&mut self, x: usize, y: usize, color: Color) {
        if !self.is_screen_sized() || x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            return;
        }
        self.pixels[y * SCREEN_WIDTH + x] = self.format.pack(color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packing_matches_byte_order() {
        let color = Color::new(0x11, 0x22, 0x33);
        assert_eq!(
            ColorFormat::Rgba8888.pack(color).to_le_bytes(),
            [0x11, 0x22, 0x33, 0xFF]
        );
        assert_eq!(
            ColorFormat::Bgra8888.pack(color).to_le_bytes(),
            [0x33, 0x22, 0x11, 0xFF]
        );
    }

    #[test]
    fn try_from_pixels_validates_size() {
        assert!(matches!(
            FrameBuffer::try_from_pixels(vec![0; 10], ColorFormat::Rgba8888),
            Err(Error::FrameBufferSize { expected: SCREEN_PIXELS, actual: 10 })
        ));
        assert!(FrameBuffer::try_from_pixels(vec![0; SCREEN_PIXELS], ColorFormat::Bgra8888).is_ok());
    }

    #[test]
    fn mis_sized_buffer_skips_writes() {
        let mut fb = FrameBuffer::from_pixels_unchecked(vec![7; 100], ColorFormat::Rgba8888);
        fb.write(0, 0, Color::new(1, 2, 3));
        assert!(fb.pixels().iter().all(|&px| px == 7));
        assert_eq!(fb.pixel(0, 0), None);
    }

    #[test]
    fn write_lands_at_row_major_offset() {
        let mut fb = FrameBuffer::new(ColorFormat::Rgba8888);
        fb.write(3, 2, Color::new(9, 9, 9));
        assert_eq!(fb.pixel(3, 2), Some(ColorFormat::Rgba8888.pack(Color::new(9, 9, 9))));
        assert_eq!(fb.to_bytes().len(), SCREEN_PIXELS * 4);
    }
}
