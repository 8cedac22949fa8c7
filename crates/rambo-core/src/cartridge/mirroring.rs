#[cfg(feature = "savestate-serde")]
use serde::{Deserialize, Serialize};

use crate::memory::ppu as ppu_mem;

/// Layout mirroring type for the PPU nametables.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mirroring {
    /// `$2000`/`$2400` share one page, `$2800`/`$2C00` the other.
    #[default]
    Horizontal,
    /// `$2000`/`$2800` share one page, `$2400`/`$2C00` the other.
    Vertical,
    /// Every nametable maps to the first CIRAM page.
    SingleScreenLower,
    /// Every nametable maps to the second CIRAM page.
    SingleScreenUpper,
    /// Cartridge would supply extra VRAM; only the 2 KiB CIRAM exists here,
    /// so this falls back to the vertical layout.
    FourScreen,
}

impl Mirroring {
    /// Maps a nametable address (`$2000-$3EFF`) to an offset inside the 2 KiB
    /// CIRAM.
    pub fn ciram_offset(self, addr: u16) -> usize {
        let addr = addr & 0x0FFF;
        let table = addr / ppu_mem::NAMETABLE_SIZE;
        let offset = addr % ppu_mem::NAMETABLE_SIZE;
        let page = match self {
            Mirroring::Horizontal => table >> 1,
            Mirroring::Vertical | Mirroring::FourScreen => table & 1,
            Mirroring::SingleScreenLower => 0,
            Mirroring::SingleScreenUpper => 1,
        };
        (page * ppu_mem::NAMETABLE_SIZE + offset) as usize
    }
}
