use std::fmt::Debug;

use dyn_clone::DynClone;

use super::Mirroring;

mod nrom;

pub use nrom::Nrom;

/// PPU-facing capability of a cartridge board.
///
/// Implemented once per board (NROM, MMC1, MMC3, ...) and selected when the
/// cartridge is loaded. Addresses handed to `chr_*` are already masked to the
/// 13-bit CHR window.
pub trait Mapper: DynClone + Debug {
    /// Reads a byte from pattern-table space (`$0000-$1FFF`).
    fn chr_read(&mut self, addr: u16) -> u8;

    /// Writes a byte to pattern-table space. Boards with CHR ROM ignore it.
    fn chr_write(&mut self, addr: u16, value: u8);

    /// Called on a filtered rising edge of PPU A12. Scanline-IRQ boards clock
    /// their counter here; everything else can ignore it.
    fn notify_a12_rising(&mut self) {}

    /// Current nametable mirroring. Boards that switch mirroring at runtime
    /// report the live value.
    fn mirroring(&self) -> Mirroring;
}

dyn_clone::clone_trait_object!(Mapper);
