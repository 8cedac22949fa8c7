use bitflags::bitflags;

use crate::memory::ppu as ppu_mem;

bitflags! {
    /// PPU control register (`$2000`).
    ///
    /// Bit layout:
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// V P H B S I N N
    /// ```
    /// - `N N`: base nametable select (folded into `t` bits 10-11 on write)
    /// - `I`: VRAM increment per `$2007` access (0=+1, 1=+32)
    /// - `S`: sprite pattern table for 8x8 sprites
    /// - `B`: background pattern table
    /// - `H`: sprite height (0=8x8, 1=8x16)
    /// - `P`: master/slave select, unused by the core
    /// - `V`: raise NMI at the start of VBlank
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub(crate) struct Control: u8 {
        const NAMETABLE = 0b0000_0011;
        const INCREMENT_32 = 0b0000_0100;
        const SPRITE_TABLE = 0b0000_1000;
        const BACKGROUND_TABLE = 0b0001_0000;
        const SPRITE_SIZE_16 = 0b0010_0000;
        const MASTER_SLAVE = 0b0100_0000;
        const GENERATE_NMI = 0b1000_0000;
    }
}

impl Control {
    pub(crate) fn nametable_index(self) -> u8 {
        (self & Control::NAMETABLE).bits()
    }

    /// `$2007` address step: 1 across a row, 32 down a column.
    pub(crate) fn vram_increment(self) -> u16 {
        if self.contains(Control::INCREMENT_32) { 32 } else { 1 }
    }

    /// Pattern table used by 8x8 sprites. 8x16 sprites pick theirs from the
    /// tile index instead.
    pub(crate) fn sprite_pattern_table(self) -> u16 {
        self.table(Control::SPRITE_TABLE)
    }

    pub(crate) fn background_pattern_table(self) -> u16 {
        self.table(Control::BACKGROUND_TABLE)
    }

    pub(crate) fn sprite_height(self) -> u8 {
        if self.contains(Control::SPRITE_SIZE_16) { 16 } else { 8 }
    }

    pub(crate) fn nmi_enabled(self) -> bool {
        self.contains(Control::GENERATE_NMI)
    }

    fn table(self, select: Control) -> u16 {
        if self.contains(select) {
            ppu_mem::PATTERN_TABLE_1
        } else {
            ppu_mem::PATTERN_TABLE_0
        }
    }
}
