//! CPU-visible PPU register state and internal VRAM address latches.
//!
//! This module mirrors the `$2000-$2007` register set and the internal
//! `v/t/x/w` VRAM latches described on NESDev. The concrete bit layouts live
//! in submodules.

mod control;
mod mask;
mod status;
mod vram_addr;
mod vram_registers;

pub(crate) use control::Control;
pub(crate) use mask::Mask;
pub(crate) use status::Status;
pub use vram_addr::VramAddr;
pub(crate) use vram_registers::VramRegisters;

/// Aggregates the CPU-visible register state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct Registers {
    /// Mirror of the control register (`$2000`).
    pub(crate) control: Control,
    /// Mask register (`$2001`) as last written; the render path reads the
    /// delayed copy from the mask-delay ring instead.
    pub(crate) mask: Mask,
    /// Sprite flags of `$2002`.
    pub(crate) status: Status,
    /// Current OAM pointer driven by `$2003`/`$2004`.
    pub(crate) oam_addr: u8,
    /// Internal VRAM registers (`v`/`t`/`x`/`w`).
    pub(crate) vram: VramRegisters,
    /// Internal buffer implementing the delayed `$2007` read behavior.
    pub(crate) read_buffer: u8,
}

impl Registers {
    /// Updates control, folding the nametable bits into `t`.
    pub(crate) fn write_control(&mut self, value: u8) {
        self.control = Control::from_bits_retain(value);
        self.vram.t.set_nametable(self.control.nametable_index());
    }
}
