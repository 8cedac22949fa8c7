//! NES master palette.
//!
//! Palette RAM stores 6-bit indices into this table. The table is the common
//! 2C02 approximation; emphasis bits are not applied.

/// An RGB triple produced by the PPU's color lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Mask keeping only the row (luma) bits of a palette index in greyscale mode.
pub(crate) const GREYSCALE_MASK: u8 = 0x30;
/// Valid bits of a palette index.
pub(crate) const PALETTE_INDEX_MASK: u8 = 0x3F;

/// Applies the greyscale bit of `$2001` to a 6-bit palette index.
#[inline]
pub(crate) fn apply_greyscale(index: u8, greyscale: bool) -> u8 {
    let index = index & PALETTE_INDEX_MASK;
    if greyscale { index & GREYSCALE_MASK } else { index }
}

/// Looks up the RGB color for a palette index (upper bits ignored).
#[inline]
pub fn color(index: u8) -> Color {
    NES_PALETTE[usize::from(index & PALETTE_INDEX_MASK)]
}

pub const NES_PALETTE: [Color; 64] = [
    Color::new(84, 84, 84),
    Color::new(0, 30, 116),
    Color::new(8, 16, 144),
    Color::new(48, 0, 136),
    Color::new(68, 0, 100),
    Color::new(92, 0, 48),
    Color::new(84, 4, 0),
    Color::new(60, 24, 0),
    Color::new(32, 42, 0),
    Color::new(8, 58, 0),
    Color::new(0, 64, 0),
    Color::new(0, 60, 0),
    Color::new(0, 50, 60),
    Color::new(0, 0, 0),
    Color::new(0, 0, 0),
    Color::new(0, 0, 0),
    Color::new(152, 150, 152),
    Color::new(8, 76, 196),
    Color::new(48, 50, 236),
    Color::new(92, 30, 228),
    Color::new(136, 20, 176),
    Color::new(160, 20, 100),
    Color::new(152, 34, 32),
    Color::new(120, 60, 0),
    Color::new(84, 90, 0),
    Color::new(40, 114, 0),
    Color::new(8, 124, 0),
    Color::new(0, 118, 40),
    Color::new(0, 102, 120),
    Color::new(0, 0, 0),
    Color::new(0, 0, 0),
    Color::new(0, 0, 0),
    Color::new(236, 238, 236),
    Color::new(76, 154, 236),
    Color::new(120, 124, 236),
    Color::new(176, 98, 236),
    Color::new(228, 84, 236),
    Color::new(236, 88, 180),
    Color::new(236, 106, 100),
    Color::new(212, 136, 32),
    Color::new(160, 170, 0),
    Color::new(116, 196, 0),
    Color::new(76, 208, 32),
    Color::new(56, 204, 108),
    Color::new(56, 180, 204),
    Color::new(60, 60, 60),
    Color::new(0, 0, 0),
    Color::new(0, 0, 0),
    Color::new(236, 238, 236),
    Color::new(168, 204, 236),
    Color::new(188, 188, 236),
    Color::new(212, 178, 236),
    Color::new(236, 174, 236),
    Color::new(236, 174, 212),
    Color::new(236, 180, 176),
    Color::new(228, 196, 144),
    Color::new(204, 210, 120),
    Color::new(180, 222, 120),
    Color::new(168, 226, 144),
    Color::new(152, 226, 180),
    Color::new(160, 214, 228),
    Color::new(160, 162, 160),
    Color::new(0, 0, 0),
    Color::new(0, 0, 0),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greyscale_collapses_to_first_column() {
        let distinct: std::collections::BTreeSet<u8> =
            (0..=0xFF).map(|i| apply_greyscale(i, true)).collect();
        assert_eq!(distinct.into_iter().collect::<Vec<_>>(), vec![0x00, 0x10, 0x20, 0x30]);
        assert_eq!(apply_greyscale(0x2A, false), 0x2A);
    }

    #[test]
    fn lookup_ignores_upper_bits() {
        assert_eq!(color(0x40), NES_PALETTE[0]);
        assert_eq!(color(0x20), Color::new(236, 238, 236));
    }
}
