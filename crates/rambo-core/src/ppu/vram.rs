//! PPU-internal memories: 2 KiB nametable RAM (CIRAM) and 32 bytes of
//! palette RAM, plus the `$0000-$3FFF` address decode that routes pattern
//! accesses to the cartridge.

use super::{pattern_bus::PpuBus, savestate::VramState};
use crate::{
    cartridge::Mirroring,
    error::Error,
    memory::ppu::{self as ppu_mem},
};

/// Index into palette RAM for an address in `$3F00-$3FFF`.
///
/// `$3F10/$3F14/$3F18/$3F1C` are aliases of `$3F00/$3F04/$3F08/$3F0C`.
#[inline]
pub(crate) fn palette_index(addr: u16) -> usize {
    let idx = usize::from(addr) & (ppu_mem::PALETTE_RAM_SIZE - 1);
    if idx >= 0x10 && idx & 0x03 == 0 {
        idx - 0x10
    } else {
        idx
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Vram {
    ciram: [u8; ppu_mem::CIRAM_SIZE],
    palette: [u8; ppu_mem::PALETTE_RAM_SIZE],
}

impl Default for Vram {
    fn default() -> Self {
        Self {
            ciram: [0; ppu_mem::CIRAM_SIZE],
            palette: [0; ppu_mem::PALETTE_RAM_SIZE],
        }
    }
}

impl Vram {
    /// Reads a byte from PPU address space.
    ///
    /// Pattern reads with no cartridge attached return `open_bus`.
    pub(crate) fn read(
        &self,
        addr: u16,
        mirroring: Mirroring,
        bus: &mut PpuBus<'_>,
        open_bus: u8,
    ) -> u8 {
        let addr = addr & ppu_mem::VRAM_MIRROR_MASK;
        match addr {
            0..=ppu_mem::CHR_END => bus.chr_read(addr).unwrap_or(open_bus),
            ppu_mem::NAMETABLE_BASE..=ppu_mem::NAMETABLE_END => self.read_nametable(addr, mirroring),
            _ => self.palette[palette_index(addr)],
        }
    }

    /// Writes a byte to PPU address space. CHR writes go to the cartridge,
    /// which decides whether the memory is writable.
    pub(crate) fn write(&mut self, addr: u16, value: u8, mirroring: Mirroring, bus: &mut PpuBus<'_>) {
        let addr = addr & ppu_mem::VRAM_MIRROR_MASK;
        match addr {
            0..=ppu_mem::CHR_END => bus.chr_write(addr, value),
            ppu_mem::NAMETABLE_BASE..=ppu_mem::NAMETABLE_END => {
                self.ciram[mirroring.ciram_offset(addr)] = value;
            }
            _ => self.palette[palette_index(addr)] = value,
        }
    }

    #[inline]
    pub(crate) fn read_nametable(&self, addr: u16, mirroring: Mirroring) -> u8 {
        self.ciram[mirroring.ciram_offset(addr)]
    }

    /// Palette RAM entry `index` (0..32, aliases folded).
    #[inline]
    pub(crate) fn palette_entry(&self, index: u8) -> u8 {
        self.palette[palette_index(u16::from(index))]
    }

    pub(crate) fn ciram(&self) -> &[u8; ppu_mem::CIRAM_SIZE] {
        &self.ciram
    }

    pub(crate) fn ciram_mut(&mut self) -> &mut [u8; ppu_mem::CIRAM_SIZE] {
        &mut self.ciram
    }

    pub(crate) fn palette_ram(&self) -> &[u8; ppu_mem::PALETTE_RAM_SIZE] {
        &self.palette
    }

    pub(crate) fn palette_ram_mut(&mut self) -> &mut [u8; ppu_mem::PALETTE_RAM_SIZE] {
        &mut self.palette
    }

    pub(crate) fn save_state(&self) -> VramState {
        VramState {
            nametable_ram: self.ciram.to_vec(),
            palette_ram: self.palette.to_vec(),
        }
    }

    pub(crate) fn load_state(&mut self, state: &VramState) -> Result<(), Error> {
        copy_exact("nametable_ram", &mut self.ciram, &state.nametable_ram)?;
        copy_exact("palette_ram", &mut self.palette, &state.palette_ram)
    }
}

/// Copies `src` into `dst`, rejecting snapshots whose buffers have the wrong
/// size instead of partially restoring them.
pub(crate) fn copy_exact(field: &'static str, dst: &mut [u8], src: &[u8]) -> Result<(), Error> {
    if dst.len() != src.len() {
        return Err(Error::SnapshotLength {
            field,
            expected: dst.len(),
            actual: src.len(),
        });
    }
    dst.copy_from_slice(src);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::{Mapper, Nrom};

    #[test]
    fn palette_aliases_fold_onto_backdrop_entries() {
        for (alias, base) in [(0x3F10, 0x00), (0x3F14, 0x04), (0x3F18, 0x08), (0x3F1C, 0x0C)] {
            assert_eq!(palette_index(alias), base);
        }
        assert_eq!(palette_index(0x3F11), 0x11);
        assert_eq!(palette_index(0x3FE5), 0x05);
    }

    #[test]
    fn nametable_mirror_above_3000() {
        let mut vram = Vram::default();
        let mut bus = PpuBus::headless();
        vram.write(0x2123, 0x5A, Mirroring::Vertical, &mut bus);
        assert_eq!(vram.read(0x3123, Mirroring::Vertical, &mut bus, 0), 0x5A);
        assert_eq!(vram.read(0x2923, Mirroring::Vertical, &mut bus, 0), 0x5A);
    }

    #[test]
    fn pattern_space_goes_to_cartridge_or_open_bus() {
        let vram = Vram::default();
        let mut headless = PpuBus::headless();
        assert_eq!(vram.read(0x0123, Mirroring::Horizontal, &mut headless, 0xAB), 0xAB);

        let mut board = Nrom::with_chr_ram(Mirroring::Horizontal);
        board.chr_write(0x0123, 0x77);
        let mut bus = PpuBus::new(Some(&mut board));
        assert_eq!(vram.read(0x0123, Mirroring::Horizontal, &mut bus, 0xAB), 0x77);
    }

    #[test]
    fn wrong_sized_snapshot_is_rejected() {
        let mut vram = Vram::default();
        let mut state = vram.save_state();
        state.palette_ram.pop();
        assert!(matches!(
            vram.load_state(&state),
            Err(Error::SnapshotLength { field: "palette_ram", expected: 32, actual: 31 })
        ));
    }
}
