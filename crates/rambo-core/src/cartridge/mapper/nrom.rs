//! NROM-style CHR board.
//!
//! 8 KiB of CHR ROM or CHR RAM mapped flat at `$0000-$1FFF` with hardwired
//! mirroring. No banking and no IRQ, which makes it the natural board for
//! headless PPU work and for tests that need writable pattern tables.
//!
//! Reference: <https://www.nesdev.org/wiki/NROM>

use crate::{
    cartridge::{Mapper, Mirroring},
    memory::ppu as ppu_mem,
};

#[derive(Debug, Clone)]
pub struct Nrom {
    chr: Box<[u8]>,
    chr_is_ram: bool,
    mirroring: Mirroring,
}

impl Nrom {
    /// Board with read-only CHR. Short images are zero-padded, long ones
    /// truncated to the 8 KiB window.
    pub fn with_chr_rom(chr_rom: &[u8], mirroring: Mirroring) -> Self {
        let mut chr = vec![0u8; ppu_mem::CHR_SIZE].into_boxed_slice();
        let len = chr_rom.len().min(ppu_mem::CHR_SIZE);
        chr[..len].copy_from_slice(&chr_rom[..len]);
        Self {
            chr,
            chr_is_ram: false,
            mirroring,
        }
    }

    /// Board with 8 KiB of zeroed CHR RAM.
    pub fn with_chr_ram(mirroring: Mirroring) -> Self {
        Self {
            chr: vec![0u8; ppu_mem::CHR_SIZE].into_boxed_slice(),
            chr_is_ram: true,
            mirroring,
        }
    }
}

impl Mapper for Nrom {
    fn chr_read(&mut self, addr: u16) -> u8 {
        self.chr[(addr & ppu_mem::CHR_ADDR_MASK) as usize]
    }

    fn chr_write(&mut self, addr: u16, value: u8) {
        if self.chr_is_ram {
            self.chr[(addr & ppu_mem::CHR_ADDR_MASK) as usize] = value;
        }
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }
}
