#![allow(dead_code)]

use ctor::ctor;
use rambo_core::{
    Mapper, Mirroring, Nrom, Ppu, PpuBus, PpuConfig, memory::ppu::Register as PpuRegister,
};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Dots in an even frame (262 lines of 341 dots).
pub const DOTS_PER_FRAME: u64 = 262 * 341;

#[ctor]
fn init_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_file(true)
        .with_line_number(true)
        .with_max_level(Level::DEBUG)
        .pretty()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");
}

/// CHR-RAM board that counts filtered A12 rises.
#[derive(Debug, Clone)]
pub struct CountingBoard {
    inner: Nrom,
    pub a12_rises: u32,
}

impl CountingBoard {
    pub fn new(mirroring: Mirroring) -> Self {
        Self {
            inner: Nrom::with_chr_ram(mirroring),
            a12_rises: 0,
        }
    }
}

impl Mapper for CountingBoard {
    fn chr_read(&mut self, addr: u16) -> u8 {
        self.inner.chr_read(addr)
    }

    fn chr_write(&mut self, addr: u16, value: u8) {
        self.inner.chr_write(addr, value);
    }

    fn notify_a12_rising(&mut self) {
        self.a12_rises += 1;
    }

    fn mirroring(&self) -> Mirroring {
        self.inner.mirroring()
    }
}

/// Bus backed by `board`.
pub fn bus(board: &mut dyn Mapper) -> PpuBus<'_> {
    PpuBus::new(Some(board))
}

/// Powered-on PPU with the warm-up window already elapsed.
pub fn ready_ppu() -> Ppu {
    Ppu::new(PpuConfig {
        warmup: false,
        ..PpuConfig::default()
    })
}

pub fn write(ppu: &mut Ppu, bus: &mut PpuBus<'_>, reg: PpuRegister, value: u8) {
    ppu.write_register(reg.addr(), value, bus);
}

pub fn read(ppu: &mut Ppu, bus: &mut PpuBus<'_>, reg: PpuRegister) -> u8 {
    ppu.read_register(reg.addr(), bus)
}

/// Points `v` at `addr` through two `$2006` writes.
pub fn set_addr(ppu: &mut Ppu, bus: &mut PpuBus<'_>, addr: u16) {
    write(ppu, bus, PpuRegister::Addr, (addr >> 8) as u8);
    write(ppu, bus, PpuRegister::Addr, addr as u8);
}

/// Writes `data` to consecutive PPU addresses starting at `addr`.
pub fn poke(ppu: &mut Ppu, bus: &mut PpuBus<'_>, addr: u16, data: &[u8]) {
    set_addr(ppu, bus, addr);
    for &byte in data {
        write(ppu, bus, PpuRegister::Data, byte);
    }
}

/// Ticks until the beam sits on `(scanline, cycle)`. Returns the dot count.
pub fn run_to(ppu: &mut Ppu, bus: &mut PpuBus<'_>, scanline: i16, cycle: u16) -> u64 {
    let mut dots = 0;
    while ppu.scanline() != scanline || ppu.cycle() != cycle {
        ppu.tick(bus);
        dots += 1;
    }
    dots
}

/// Ticks until the next frame starts. Returns the dot count.
pub fn run_frame(ppu: &mut Ppu, bus: &mut PpuBus<'_>) -> u64 {
    let mut dots = 1;
    while !ppu.tick(bus).frame_advanced {
        dots += 1;
    }
    dots
}

/// Loads a solid 8x8 tile (every pixel color 1) at `tile` in pattern table 0.
pub fn solid_tile(board: &mut dyn Mapper, tile: u8) {
    let base = u16::from(tile) * 16;
    for row in 0..8 {
        board.chr_write(base + row, 0xFF);
        board.chr_write(base + row + 8, 0x00);
    }
}
