//! Picture Processing Unit (RP2C02).
//!
//! [`Ppu`] is a facade over a set of small state machines, each in its own
//! module: register latches, the background and sprite pipelines, the VBlank
//! ledger, the A12 edge detector and the mask propagation delay. One call to
//! [`Ppu::tick`] advances exactly one dot and runs those units in a fixed
//! order:
//!
//! 1. advance the beam position
//! 2. record the mask for the delayed render view
//! 3. apply a pending OAM row corruption
//! 4. evaluate A12 for scanline-counting mappers
//! 5. background fetch and shift
//! 6. sprite clear, evaluation and fetch
//! 7. pixel composition
//! 8. VBlank and NMI bookkeeping
//!
//! CPU register accesses arrive between ticks through
//! [`Ppu::read_register`]/[`Ppu::write_register`]. The cartridge is never
//! stored: every call that may touch pattern memory takes a [`PpuBus`].

mod a12;
mod background_pipeline;
pub mod buffer;
mod config;
mod mask_delay;
mod open_bus;
pub mod palette;
mod pattern_bus;
mod register_port;
mod registers;
mod rendering;
pub mod savestate;
mod sprite;
mod sprite_eval;
mod sprite_pipeline;
mod timing;
mod vblank;
mod vram;

pub use buffer::{ColorFormat, FrameBuffer, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use config::{PowerOnState, PpuConfig};
pub use pattern_bus::PpuBus;
pub use registers::VramAddr;
pub use savestate::PpuSnapshot;

use crate::{
    cartridge::Mirroring,
    error::Error,
    memory::ppu as ppu_mem,
    rng::SplitMix64,
};
use a12::A12Detector;
use background_pipeline::BgPipeline;
use mask_delay::MaskDelay;
use open_bus::PpuOpenBus;
use registers::{Control, Mask, Registers, Status, VramRegisters};
use savestate::RegistersState;
use sprite_eval::SpriteEvaluator;
use sprite_pipeline::SpritePipeline;
use timing::{FrameTiming, PRE_RENDER_SCANLINE, VBLANK_SCANLINE};
use vblank::VblankLedger;
use vram::{Vram, copy_exact};

/// PPU dots after power-on during which `$2000/$2001/$2005/$2006` writes are
/// not accepted (29 658 CPU cycles).
pub const WARMUP_DOTS: u64 = 29_658 * 3;

/// Events produced by a single [`Ppu::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClockResult {
    /// The beam wrapped from scanline 260 to the pre-render line.
    pub frame_advanced: bool,
    /// The VBlank flag was set on this dot (not suppressed by a racing read).
    pub vblank_started: bool,
}

#[derive(Debug, Clone)]
pub struct Ppu {
    registers: Registers,
    vram: Vram,
    oam: [u8; ppu_mem::OAM_RAM_SIZE],
    secondary_oam: [u8; ppu_mem::SECONDARY_OAM_RAM_SIZE],
    /// Mirroring used when no cartridge reports one; also the last value seen.
    mirroring: Mirroring,
    open_bus: PpuOpenBus,
    bg: BgPipeline,
    sprites: SpritePipeline,
    sprite_eval: SpriteEvaluator,
    timing: FrameTiming,
    /// Dots elapsed since power-on or reset; the timestamp base for races.
    master_cycle: u64,
    vblank: VblankLedger,
    /// Level of the NMI output: VBlank flag AND `$2000` bit 7.
    nmi_line: bool,
    a12: A12Detector,
    mask_delay: MaskDelay,
    warmup_complete: bool,
    buffered_mask_write: Option<u8>,
    /// Primary-OAM row (8 bytes) waiting to be overwritten by row 0.
    oam_corruption_row: Option<u8>,
    config: PpuConfig,
    framebuffer: Option<FrameBuffer>,
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new(PpuConfig::default())
    }
}

impl Ppu {
    /// Powers on a PPU. Memory contents follow `config.power_on`; with
    /// `config.warmup` the register-ignore window is armed.
    pub fn new(config: PpuConfig) -> Self {
        let mut ppu = Self {
            registers: Registers::default(),
            vram: Vram::default(),
            oam: [0; ppu_mem::OAM_RAM_SIZE],
            secondary_oam: [0xFF; ppu_mem::SECONDARY_OAM_RAM_SIZE],
            mirroring: Mirroring::default(),
            open_bus: PpuOpenBus::default(),
            bg: BgPipeline::default(),
            sprites: SpritePipeline::default(),
            sprite_eval: SpriteEvaluator::default(),
            timing: FrameTiming::default(),
            master_cycle: 0,
            vblank: VblankLedger::default(),
            nmi_line: false,
            a12: A12Detector::default(),
            mask_delay: MaskDelay::default(),
            warmup_complete: !config.warmup,
            buffered_mask_write: None,
            oam_corruption_row: None,
            config,
            framebuffer: None,
        };

        if let PowerOnState::Randomized { seed } = config.power_on {
            let mut rng = SplitMix64::new(seed);
            rng.fill_bytes(&mut ppu.oam);
            rng.fill_bytes(ppu.vram.ciram_mut());
            rng.fill_bytes(ppu.vram.palette_ram_mut());
        }

        tracing::debug!(?config, "ppu power-on");
        ppu
    }

    /// Applies the RESET line: control, mask, scroll latches and the read
    /// buffer are cleared, the beam restarts at the pre-render line and the
    /// warm-up window is re-armed. OAM, nametable RAM and palette RAM keep
    /// their contents.
    pub fn reset(&mut self) {
        self.registers = Registers {
            status: self.registers.status,
            oam_addr: self.registers.oam_addr,
            vram: VramRegisters {
                v: self.registers.vram.v,
                ..VramRegisters::default()
            },
            ..Registers::default()
        };
        self.open_bus = PpuOpenBus::default();
        self.bg = BgPipeline::default();
        self.sprites = SpritePipeline::default();
        self.sprite_eval = SpriteEvaluator::default();
        self.timing = FrameTiming::default();
        self.master_cycle = 0;
        self.vblank = VblankLedger::default();
        self.a12 = A12Detector::default();
        self.mask_delay.reset(Mask::empty());
        self.warmup_complete = !self.config.warmup;
        self.buffered_mask_write = None;
        self.oam_corruption_row = None;
        self.refresh_nmi_line();
        tracing::debug!(warmup = self.config.warmup, "ppu reset");
    }

    /// Advances the PPU by one dot.
    pub fn tick(&mut self, bus: &mut PpuBus<'_>) -> ClockResult {
        let frame_advanced = self.timing.advance(self.registers.mask.rendering_enabled());
        self.master_cycle += 1;
        if frame_advanced {
            self.open_bus.on_frame();
        }
        if !self.warmup_complete && self.master_cycle >= WARMUP_DOTS {
            self.complete_warmup();
        }
        self.sync_mirroring(bus);

        self.mask_delay.push(self.registers.mask);
        self.apply_oam_corruption();
        self.clock_a12(bus);
        self.background_step(bus);
        self.sprite_step(bus);
        self.pixel_step();
        let vblank_started = self.vblank_step();

        ClockResult {
            frame_advanced,
            vblank_started,
        }
    }

    /// Ends the warm-up window now, applying the last buffered `$2001` write.
    pub fn complete_warmup(&mut self) {
        if self.warmup_complete {
            return;
        }
        self.warmup_complete = true;
        let buffered = self.buffered_mask_write.take();
        if let Some(value) = buffered {
            self.write_mask(value);
        }
        tracing::debug!(buffered_mask = ?buffered, "ppu warm-up complete");
    }

    fn vblank_step(&mut self) -> bool {
        if self.timing.cycle != 1 {
            return false;
        }
        match self.timing.scanline {
            VBLANK_SCANLINE => {
                let started = self.vblank.begin(self.master_cycle);
                self.refresh_nmi_line();
                started
            }
            PRE_RENDER_SCANLINE => {
                self.vblank.end(self.master_cycle);
                self.registers
                    .status
                    .remove(Status::SPRITE_OVERFLOW | Status::SPRITE_ZERO_HIT);
                self.registers.vram.reset_latch();
                self.refresh_nmi_line();
                false
            }
            _ => false,
        }
    }

    fn refresh_nmi_line(&mut self) {
        self.nmi_line = self.vblank.flag() && self.registers.control.nmi_enabled();
    }

    fn sync_mirroring(&mut self, bus: &PpuBus<'_>) {
        let Some(mirroring) = bus.mirroring() else {
            return;
        };
        if mirroring != self.mirroring {
            tracing::debug!(?mirroring, "nametable mirroring changed");
            self.mirroring = mirroring;
        }
    }

    /// Level of the NMI output polled by the CPU.
    pub fn nmi_line(&self) -> bool {
        self.nmi_line
    }

    /// Sets the mirroring used while no cartridge is attached to the bus.
    pub fn set_mirroring(&mut self, mirroring: Mirroring) {
        self.mirroring = mirroring;
    }

    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    pub fn config(&self) -> &PpuConfig {
        &self.config
    }

    pub fn warmup_complete(&self) -> bool {
        self.warmup_complete
    }

    /// Installs a framebuffer; rendering writes into it from now on.
    pub fn set_framebuffer(&mut self, framebuffer: FrameBuffer) {
        self.framebuffer = Some(framebuffer);
    }

    /// Installs caller-provided pixel storage without validating it. If the
    /// size is not 256x240 the PPU keeps running but skips every pixel write.
    pub fn attach_framebuffer(&mut self, pixels: Vec<u32>) {
        self.framebuffer = Some(FrameBuffer::from_pixels_unchecked(
            pixels,
            self.config.color_format,
        ));
    }

    /// Removes the framebuffer, returning the PPU to headless mode.
    pub fn detach_framebuffer(&mut self) -> Option<FrameBuffer> {
        self.framebuffer.take()
    }

    pub fn framebuffer(&self) -> Option<&FrameBuffer> {
        self.framebuffer.as_ref()
    }

    pub fn scanline(&self) -> i16 {
        self.timing.scanline
    }

    pub fn cycle(&self) -> u16 {
        self.timing.cycle
    }

    pub fn frame_count(&self) -> u64 {
        self.timing.frame
    }

    pub fn master_cycle(&self) -> u64 {
        self.master_cycle
    }

    pub fn v(&self) -> VramAddr {
        self.registers.vram.v
    }

    pub fn t(&self) -> VramAddr {
        self.registers.vram.t
    }

    pub fn fine_x(&self) -> u8 {
        self.registers.vram.x
    }

    pub fn write_toggle(&self) -> bool {
        self.registers.vram.w
    }

    pub fn control(&self) -> u8 {
        self.registers.control.bits()
    }

    pub fn mask(&self) -> u8 {
        self.registers.mask.bits()
    }

    pub fn oam_addr(&self) -> u8 {
        self.registers.oam_addr
    }

    pub fn oam(&self) -> &[u8; ppu_mem::OAM_RAM_SIZE] {
        &self.oam
    }

    pub fn secondary_oam(&self) -> &[u8; ppu_mem::SECONDARY_OAM_RAM_SIZE] {
        &self.secondary_oam
    }

    pub fn nametable_ram(&self) -> &[u8; ppu_mem::CIRAM_SIZE] {
        self.vram.ciram()
    }

    pub fn palette_ram(&self) -> &[u8; ppu_mem::PALETTE_RAM_SIZE] {
        self.vram.palette_ram()
    }

    pub fn sprite_overflow(&self) -> bool {
        self.registers.status.contains(Status::SPRITE_OVERFLOW)
    }

    pub fn sprite_zero_hit(&self) -> bool {
        self.registers.status.contains(Status::SPRITE_ZERO_HIT)
    }

    /// Sprite 0 was found by the last evaluation and is in the lanes for the
    /// line being drawn.
    pub fn sprite_zero_on_line(&self) -> bool {
        self.sprite_eval.sprite0_in_range()
    }

    /// VBlank flag as a `$2002` read would see it, without the read's side
    /// effects.
    pub fn vblank(&self) -> bool {
        self.vblank.flag()
    }

    /// Whether the beam is between the VBlank set and the pre-render clear,
    /// regardless of `$2002` reads.
    pub fn in_vblank_span(&self) -> bool {
        self.vblank.span_active()
    }

    pub fn last_vblank_set_cycle(&self) -> u64 {
        self.vblank.last_set_cycle()
    }

    pub fn last_vblank_clear_cycle(&self) -> u64 {
        self.vblank.last_clear_cycle()
    }

    pub fn last_status_read_cycle(&self) -> u64 {
        self.vblank.last_read_cycle()
    }

    /// Last CHR address put on the bus by a rendering fetch.
    pub fn chr_address(&self) -> u16 {
        self.a12.chr_address()
    }

    /// Reads PPU address space without touching the read buffer, `v`, or the
    /// open-bus latch.
    pub fn peek_vram(&self, addr: u16, bus: &mut PpuBus<'_>) -> u8 {
        let mirroring = bus.mirroring().unwrap_or(self.mirroring);
        self.vram
            .read(addr, mirroring, bus, self.open_bus.sample())
    }

    /// Bulk OAM upload as performed by `$4014`: 256 `$2004` writes starting at
    /// the current OAMADDR.
    pub fn write_oam_dma(&mut self, page: &[u8; ppu_mem::OAM_RAM_SIZE]) {
        for &byte in page {
            self.open_bus.drive(byte);
            self.write_oam_data(byte);
        }
    }

    /// Captures the complete PPU state as flat data. The framebuffer and the
    /// configuration are not part of the snapshot.
    pub fn save_state(&self) -> PpuSnapshot {
        let regs = &self.registers;
        PpuSnapshot {
            registers: RegistersState {
                control: regs.control.bits(),
                mask: regs.mask.bits(),
                status: regs.status.bits(),
                oam_addr: regs.oam_addr,
                v: regs.vram.v.raw(),
                t: regs.vram.t.raw(),
                fine_x: regs.vram.x,
                write_toggle: regs.vram.w,
                read_buffer: regs.read_buffer,
            },
            oam: self.oam.to_vec(),
            secondary_oam: self.secondary_oam.to_vec(),
            vram: self.vram.save_state(),
            mirroring: self.mirroring,
            open_bus: self.open_bus.save_state(),
            background: self.bg.save_state(),
            sprites: self.sprites.save_state(),
            sprite_eval: self.sprite_eval.save_state(),
            timing: self.timing.save_state(),
            master_cycle: self.master_cycle,
            vblank: self.vblank.save_state(),
            nmi_line: self.nmi_line,
            a12: self.a12.save_state(),
            mask_delay: self.mask_delay.save_state(),
            warmup_complete: self.warmup_complete,
            buffered_mask_write: self.buffered_mask_write,
            oam_corruption_row: self.oam_corruption_row,
        }
    }

    /// Restores a snapshot taken by [`Ppu::save_state`].
    ///
    /// Memory arrays are validated before anything is modified, so a
    /// rejected snapshot leaves the PPU untouched.
    pub fn load_state(&mut self, snapshot: &PpuSnapshot) -> Result<(), Error> {
        let mut oam = [0; ppu_mem::OAM_RAM_SIZE];
        copy_exact("oam", &mut oam, &snapshot.oam)?;
        let mut secondary_oam = [0; ppu_mem::SECONDARY_OAM_RAM_SIZE];
        copy_exact("secondary_oam", &mut secondary_oam, &snapshot.secondary_oam)?;
        let mut vram = Vram::default();
        vram.load_state(&snapshot.vram)?;

        let regs = snapshot.registers;
        self.registers = Registers {
            control: Control::from_bits_retain(regs.control),
            mask: Mask::from_bits_retain(regs.mask),
            status: Status::from_bits_truncate(regs.status),
            oam_addr: regs.oam_addr,
            vram: VramRegisters {
                v: VramAddr::from(regs.v),
                t: VramAddr::from(regs.t),
                x: regs.fine_x & 0b111,
                w: regs.write_toggle,
            },
            read_buffer: regs.read_buffer,
        };
        self.oam = oam;
        self.secondary_oam = secondary_oam;
        self.vram = vram;
        self.mirroring = snapshot.mirroring;
        self.open_bus.load_state(snapshot.open_bus);
        self.bg.load_state(snapshot.background);
        self.sprites.load_state(&snapshot.sprites);
        self.sprite_eval.load_state(snapshot.sprite_eval);
        self.timing.load_state(snapshot.timing);
        self.master_cycle = snapshot.master_cycle;
        self.vblank.load_state(snapshot.vblank);
        self.nmi_line = snapshot.nmi_line;
        self.a12.load_state(snapshot.a12);
        self.mask_delay.load_state(snapshot.mask_delay);
        self.warmup_complete = snapshot.warmup_complete;
        self.buffered_mask_write = snapshot.buffered_mask_write;
        self.oam_corruption_row = snapshot.oam_corruption_row.map(|row| row & 0x1F);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::ppu::Register as PpuRegister;

    fn ready_ppu() -> Ppu {
        Ppu::new(PpuConfig {
            warmup: false,
            ..PpuConfig::default()
        })
    }

    fn run_to(ppu: &mut Ppu, scanline: i16, cycle: u16) {
        let mut bus = PpuBus::headless();
        while ppu.scanline() != scanline || ppu.cycle() != cycle {
            ppu.tick(&mut bus);
        }
    }

    #[test]
    fn vblank_flag_is_managed_by_clock() {
        let mut ppu = ready_ppu();
        run_to(&mut ppu, 241, 0);
        assert!(!ppu.vblank());
        run_to(&mut ppu, 241, 1);
        assert!(ppu.vblank());
        run_to(&mut ppu, -1, 0);
        assert!(ppu.vblank());
        run_to(&mut ppu, -1, 1);
        assert!(!ppu.vblank());
    }

    #[test]
    fn tick_reports_frame_and_vblank_events() {
        let mut ppu = ready_ppu();
        let mut bus = PpuBus::headless();
        let mut frames = 0;
        let mut vblanks = 0;
        for _ in 0..341 * 262 {
            let result = ppu.tick(&mut bus);
            frames += usize::from(result.frame_advanced);
            vblanks += usize::from(result.vblank_started);
        }
        assert_eq!((frames, vblanks), (1, 1));
        assert_eq!(ppu.frame_count(), 1);
    }

    #[test]
    fn nmi_line_follows_flag_and_enable() {
        let mut ppu = ready_ppu();
        let mut bus = PpuBus::headless();
        run_to(&mut ppu, 241, 2);
        assert!(!ppu.nmi_line());
        ppu.write_register(PpuRegister::Control.addr(), 0x80, &mut bus);
        assert!(ppu.nmi_line(), "enabling NMI during VBlank raises the line");
        ppu.write_register(PpuRegister::Control.addr(), 0x00, &mut bus);
        assert!(!ppu.nmi_line());
    }

    #[test]
    fn randomized_power_on_is_deterministic_per_seed() {
        let config = PpuConfig {
            power_on: PowerOnState::Randomized { seed: 42 },
            ..PpuConfig::default()
        };
        let a = Ppu::new(config);
        let b = Ppu::new(config);
        assert_eq!(a.oam(), b.oam());
        assert_eq!(a.nametable_ram(), b.nametable_ram());
        assert!(a.oam().iter().any(|&byte| byte != 0));

        let zeroed = Ppu::default();
        assert!(zeroed.oam().iter().all(|&byte| byte == 0));
    }

    #[test]
    fn reset_keeps_memory_and_clears_registers() {
        let mut ppu = Ppu::default();
        ppu.complete_warmup();
        let mut bus = PpuBus::headless();
        ppu.write_register(PpuRegister::Control.addr(), 0x84, &mut bus);
        ppu.write_register(PpuRegister::OamData.addr(), 0x5A, &mut bus);
        ppu.write_register(PpuRegister::Scroll.addr(), 0x10, &mut bus);
        run_to(&mut ppu, 10, 10);

        ppu.reset();
        assert_eq!(ppu.control(), 0);
        assert!(!ppu.write_toggle());
        assert_eq!(ppu.oam()[0], 0x5A);
        assert_eq!((ppu.scanline(), ppu.cycle(), ppu.frame_count()), (-1, 0, 0));
        assert!(!ppu.warmup_complete());
    }

    #[test]
    fn load_state_rejects_short_oam_without_side_effects() {
        let mut ppu = ready_ppu();
        let mut snapshot = ppu.save_state();
        snapshot.oam.truncate(10);
        snapshot.registers.control = 0xFF;
        assert!(matches!(
            ppu.load_state(&snapshot),
            Err(Error::SnapshotLength { field: "oam", .. })
        ));
        assert_eq!(ppu.control(), 0);
    }
}
