//! CPU-facing side of the PPU: `$2000-$2007`, mirrored through `$3FFF`.

use super::{
    Ppu,
    pattern_bus::PpuBus,
    registers::{Mask, Status},
    timing::VBLANK_SCANLINE,
};
use crate::memory::ppu::{self as ppu_mem, Register as PpuRegister};

/// Bits of an OAM attribute byte that are not stored and read back from the
/// bus instead.
const OAM_ATTRIBUTE_OPEN_BUS_MASK: u8 = 0b0001_1100;
/// Folds a palette address onto the nametable byte the buffer sees under it.
const PALETTE_SHADOW_MASK: u16 = 0x2FFF;
/// Last dot on which disabling rendering can corrupt OAM.
const OAM_CORRUPTION_LAST_DOT: u16 = 320;
/// Palette RAM is 6 bits wide; the top two bits of a palette read float.
const PALETTE_OPEN_BUS_MASK: u8 = 0b1100_0000;

impl Ppu {
    /// Handles a CPU read from the PPU register window.
    pub fn read_register(&mut self, addr: u16, bus: &mut PpuBus<'_>) -> u8 {
        match PpuRegister::from_cpu_addr(addr) {
            PpuRegister::Status => self.read_status(),
            PpuRegister::OamData => self.read_oam_data(),
            PpuRegister::Data => self.read_data(bus),
            _ => self.open_bus.sample(),
        }
    }

    /// Handles a CPU write to the PPU register window. Every write charges
    /// the open-bus latch, including writes to read-only `$2002`.
    pub fn write_register(&mut self, addr: u16, value: u8, bus: &mut PpuBus<'_>) {
        self.open_bus.drive(value);
        match PpuRegister::from_cpu_addr(addr) {
            PpuRegister::Control => {
                if self.warmup_complete {
                    self.registers.write_control(value);
                    self.refresh_nmi_line();
                }
            }
            PpuRegister::Mask => {
                if self.warmup_complete {
                    self.write_mask(value);
                } else {
                    self.buffered_mask_write = Some(value);
                }
            }
            PpuRegister::Status => {}
            PpuRegister::OamAddr => self.registers.oam_addr = value,
            PpuRegister::OamData => self.write_oam_data(value),
            PpuRegister::Scroll => {
                if self.warmup_complete {
                    self.registers.vram.write_scroll(value);
                }
            }
            PpuRegister::Addr => {
                if self.warmup_complete {
                    self.registers.vram.write_addr(value);
                }
            }
            PpuRegister::Data => self.write_data(value, bus),
        }
    }

    fn read_status(&mut self) -> u8 {
        let set_is_next = self.timing.scanline == VBLANK_SCANLINE && self.timing.cycle == 0;
        let vblank = self.vblank.read(self.master_cycle, set_is_next);
        self.registers.vram.reset_latch();
        self.refresh_nmi_line();

        let mut value = self.registers.status.bits();
        if vblank {
            value |= Status::VERTICAL_BLANK_BIT;
        }
        self.open_bus.apply(Status::OPEN_BUS_MASK, value)
    }

    fn read_oam_data(&mut self) -> u8 {
        let addr = self.registers.oam_addr;
        let value = self.oam[usize::from(addr)];
        if addr & 0b11 == 2 {
            self.open_bus.apply(OAM_ATTRIBUTE_OPEN_BUS_MASK, value)
        } else {
            self.open_bus.drive(value);
            value
        }
    }

    pub(super) fn write_oam_data(&mut self, value: u8) {
        let addr = self.registers.oam_addr;
        self.oam[usize::from(addr)] = value;
        self.registers.oam_addr = addr.wrapping_add(1);
    }

    /// Stores `$2001`. Switching rendering off in the middle of a rendering
    /// line latches the OAM row that the sprite unit was addressing.
    pub(super) fn write_mask(&mut self, value: u8) {
        let was_rendering = self.registers.mask.rendering_enabled();
        self.registers.mask = Mask::from_bits_retain(value);
        if was_rendering
            && !self.registers.mask.rendering_enabled()
            && self.timing.is_rendering_line()
            && (1..=OAM_CORRUPTION_LAST_DOT).contains(&self.timing.cycle)
        {
            self.oam_corruption_row = Some(self.sprite_eval.secondary_addr());
        }
    }

    fn read_data(&mut self, bus: &mut PpuBus<'_>) -> u8 {
        self.sync_mirroring(bus);
        let addr = self.registers.vram.v.raw() & ppu_mem::VRAM_MIRROR_MASK;
        let open_bus = self.open_bus.sample();
        let fresh = self.vram.read(addr, self.mirroring, bus, open_bus);

        let value = if addr >= ppu_mem::PALETTE_BASE {
            // The buffer picks up the nametable byte hidden under the palette.
            self.registers.read_buffer =
                self.vram
                    .read(addr & PALETTE_SHADOW_MASK, self.mirroring, bus, open_bus);
            self.open_bus.apply(PALETTE_OPEN_BUS_MASK, fresh)
        } else {
            std::mem::replace(&mut self.registers.read_buffer, fresh)
        };

        self.increment_vram_addr();
        self.open_bus.drive(value);
        value
    }

    fn write_data(&mut self, value: u8, bus: &mut PpuBus<'_>) {
        self.sync_mirroring(bus);
        let addr = self.registers.vram.v.raw();
        self.vram.write(addr, value, self.mirroring, bus);
        self.increment_vram_addr();
    }

    fn increment_vram_addr(&mut self) {
        let step = self.registers.control.vram_increment();
        self.registers.vram.v.increment(step);
    }
}
