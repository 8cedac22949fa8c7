// Layout (bits 0-14):
//  14 13 12 11 10 9 8 7 6 5 4 3 2 1 0
//  [fine_y][nt][coarse_y   ][coarse_x   ]
//  yyy     NN   YYYYY         XXXXX
const COARSE_X_MASK: u16 = 0x001F;
const COARSE_Y_MASK: u16 = 0x03E0;
const NAMETABLE_X_BIT: u16 = 0x0400;
const NAMETABLE_Y_BIT: u16 = 0x0800;
const NAMETABLE_MASK: u16 = NAMETABLE_X_BIT | NAMETABLE_Y_BIT;
const FINE_Y_MASK: u16 = 0x7000;
const ADDR_MASK: u16 = 0x7FFF;

/// Bits copied from `t` at dot 257 (coarse X + horizontal nametable).
const HORIZONTAL_BITS: u16 = COARSE_X_MASK | NAMETABLE_X_BIT;
/// Bits copied from `t` during pre-render dots 280-304.
const VERTICAL_BITS: u16 = FINE_Y_MASK | NAMETABLE_Y_BIT | COARSE_Y_MASK;

const COARSE_Y_SHIFT: u16 = 5;
const NAMETABLE_SHIFT: u16 = 10;
const FINE_Y_SHIFT: u16 = 12;

/// 15-bit VRAM address used by the PPU internal `v`/`t` registers.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct VramAddr(u16);

impl VramAddr {
    #[inline]
    pub fn coarse_x(self) -> u8 {
        (self.0 & COARSE_X_MASK) as u8
    }

    #[inline]
    pub fn set_coarse_x(&mut self, cx: u8) {
        self.0 = (self.0 & !COARSE_X_MASK) | u16::from(cx & 0b1_1111);
    }

    #[inline]
    pub fn coarse_y(self) -> u8 {
        ((self.0 & COARSE_Y_MASK) >> COARSE_Y_SHIFT) as u8
    }

    #[inline]
    pub fn set_coarse_y(&mut self, cy: u8) {
        self.0 = (self.0 & !COARSE_Y_MASK) | (u16::from(cy & 0b1_1111) << COARSE_Y_SHIFT);
    }

    #[inline]
    pub fn set_nametable(&mut self, nt: u8) {
        self.0 = (self.0 & !NAMETABLE_MASK) | (u16::from(nt & 0b11) << NAMETABLE_SHIFT);
    }

    #[inline]
    pub fn fine_y(self) -> u8 {
        ((self.0 & FINE_Y_MASK) >> FINE_Y_SHIFT) as u8
    }

    #[inline]
    pub fn set_fine_y(&mut self, fy: u8) {
        self.0 = (self.0 & !FINE_Y_MASK) | (u16::from(fy & 0b111) << FINE_Y_SHIFT);
    }

    #[inline]
    pub fn raw(self) -> u16 {
        self.0
    }

    /// Replaces the raw address, masking to 15 bits.
    #[inline]
    pub fn set_raw(&mut self, v: u16) {
        self.0 = v & ADDR_MASK;
    }

    /// Address of the nametable byte for the tile `v` points at.
    #[inline]
    pub fn tile_addr(self) -> u16 {
        0x2000 | (self.0 & 0x0FFF)
    }

    /// Address of the attribute byte covering the tile `v` points at.
    #[inline]
    pub fn attribute_addr(self) -> u16 {
        0x23C0 | (self.0 & 0x0C00) | ((self.0 >> 4) & 0x38) | ((self.0 >> 2) & 0x07)
    }

    /// Shift that moves this tile's 2-bit palette select to bits 0-1 of the
    /// attribute byte (quadrant chosen by bit 1 of coarse X and coarse Y).
    #[inline]
    pub fn attribute_shift(self) -> u8 {
        ((self.coarse_y() & 0b10) << 1) | (self.coarse_x() & 0b10)
    }

    /// Increments the internal address after a `$2007` access.
    #[inline]
    pub fn increment(&mut self, step: u16) {
        self.0 = self.0.wrapping_add(step) & ADDR_MASK;
    }

    /// Moves to the next tile column, wrapping into the horizontally
    /// adjacent nametable after column 31.
    pub fn increment_x(&mut self) {
        if self.coarse_x() == 31 {
            self.0 &= !COARSE_X_MASK;
            self.0 ^= NAMETABLE_X_BIT;
        } else {
            self.0 += 1;
        }
    }

    /// Moves to the next pixel row. Coarse Y wraps at 29 into the vertically
    /// adjacent nametable; rows 30/31 (attribute memory) wrap to 0 without
    /// switching nametable.
    pub fn increment_y(&mut self) {
        if self.fine_y() != 7 {
            self.0 += 0x1000;
            return;
        }
        self.0 &= !FINE_Y_MASK;
        match self.coarse_y() {
            29 => {
                self.set_coarse_y(0);
                self.0 ^= NAMETABLE_Y_BIT;
            }
            31 => self.set_coarse_y(0),
            y => self.set_coarse_y(y + 1),
        }
    }

    /// Dot 257: `v = (v & 0xFBE0) | (t & 0x041F)`.
    #[inline]
    pub fn copy_horizontal(&mut self, t: VramAddr) {
        self.0 = (self.0 & !HORIZONTAL_BITS) | (t.0 & HORIZONTAL_BITS);
    }

    /// Pre-render dots 280-304: `v = (v & 0x841F) | (t & 0x7BE0)`.
    #[inline]
    pub fn copy_vertical(&mut self, t: VramAddr) {
        self.0 = (self.0 & !VERTICAL_BITS) | (t.0 & VERTICAL_BITS);
    }
}

impl core::fmt::Debug for VramAddr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VramAddr")
            .field("raw", &format_args!("{:#06X}", self.0))
            .field("fine_y", &self.fine_y())
            .field("coarse_y", &self.coarse_y())
            .field("coarse_x", &self.coarse_x())
            .finish()
    }
}

impl From<u16> for VramAddr {
    #[inline]
    fn from(v: u16) -> Self {
        VramAddr(v & ADDR_MASK)
    }
}
