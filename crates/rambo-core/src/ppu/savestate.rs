//! Flat snapshot types for the PPU.
//!
//! Every piece of PPU state is copied into plain data here: small `Copy`
//! structs for the sub-units, `Vec<u8>` for the fixed-size memories. No
//! pointers or cartridge references are captured, so a snapshot can be
//! cloned, compared, and (with `savestate-postcard`) encoded to bytes.

#[cfg(feature = "savestate-serde")]
use serde::{Deserialize, Serialize};

use crate::cartridge::Mirroring;

#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegistersState {
    pub control: u8,
    pub mask: u8,
    /// Sprite flags of `$2002` only; VBlank lives in [`VblankLedgerState`].
    pub status: u8,
    pub oam_addr: u8,
    pub v: u16,
    pub t: u16,
    pub fine_x: u8,
    pub write_toggle: bool,
    pub read_buffer: u8,
}

#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PpuOpenBusState {
    pub value: u8,
    pub decay_timer: u8,
}

/// Background shifters plus the four fetch latches.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BgPipelineState {
    pub pattern: [u16; 2],
    pub attribute: [u16; 2],
    pub nametable_latch: u8,
    pub attribute_latch: u8,
    pub pattern_low_latch: u8,
    pub pattern_high_latch: u8,
}

#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpriteLaneState {
    pub pattern_low: u8,
    pub pattern_high: u8,
    pub attributes: u8,
    pub x_counter: u8,
    pub oam_source_index: u8,
}

#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpritePipelineState {
    pub lanes: [SpriteLaneState; 8],
}

/// Cursor of the sprite evaluation and fetch units.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpriteEvalState {
    pub sprite_index: u8,
    pub byte_index: u8,
    pub found: u8,
    pub latch: u8,
    pub done: bool,
    pub sprite0_in_range: bool,
    pub source_index: [u8; 8],
    pub secondary_addr: u8,
    pub fetch_pattern_low: u8,
}

#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimingState {
    pub cycle: u16,
    pub scanline: i16,
    pub frame: u64,
}

#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VblankLedgerState {
    pub flag: bool,
    pub span_active: bool,
    pub last_set_cycle: u64,
    pub last_clear_cycle: u64,
    pub last_read_cycle: u64,
    pub prevent_set_at_cycle: u64,
}

#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct A12State {
    pub chr_address: u16,
    pub level: bool,
    pub filter_delay: u8,
}

#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaskDelayState {
    pub slots: [u8; 4],
    pub cursor: u8,
}

#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VramState {
    /// 2 KiB CIRAM.
    pub nametable_ram: Vec<u8>,
    /// 32 bytes of palette RAM.
    pub palette_ram: Vec<u8>,
}

/// Full PPU state captured by [`Ppu::save_state`](super::Ppu::save_state).
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PpuSnapshot {
    pub registers: RegistersState,
    /// 256 bytes of primary OAM.
    pub oam: Vec<u8>,
    /// 32 bytes of secondary OAM.
    pub secondary_oam: Vec<u8>,
    pub vram: VramState,
    pub mirroring: Mirroring,
    pub open_bus: PpuOpenBusState,
    pub background: BgPipelineState,
    pub sprites: SpritePipelineState,
    pub sprite_eval: SpriteEvalState,
    pub timing: TimingState,
    pub master_cycle: u64,
    pub vblank: VblankLedgerState,
    pub nmi_line: bool,
    pub a12: A12State,
    pub mask_delay: MaskDelayState,
    pub warmup_complete: bool,
    pub buffered_mask_write: Option<u8>,
    pub oam_corruption_row: Option<u8>,
}

#[cfg(feature = "savestate-postcard")]
impl PpuSnapshot {
    /// Encodes the snapshot with `postcard`.
    pub fn to_bytes(&self) -> Result<Vec<u8>, crate::error::Error> {
        Ok(postcard::to_allocvec(self)?)
    }

    /// Decodes a snapshot produced by [`PpuSnapshot::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, crate::error::Error> {
        Ok(postcard::from_bytes(bytes)?)
    }
}
