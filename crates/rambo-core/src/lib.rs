//! Cycle-accurate NTSC PPU (RP2C02) core.
//!
//! The crate models the PPU one dot at a time. A host drives it by calling
//! [`Ppu::tick`] three times per CPU cycle, forwards CPU accesses to
//! `$2000-$3FFF` through [`Ppu::read_register`]/[`Ppu::write_register`], and
//! polls [`Ppu::nmi_line`]. Pattern memory and mirroring come from the
//! cartridge through a short-lived [`PpuBus`].

pub mod cartridge;
pub mod error;
pub mod memory;
pub mod ppu;
mod rng;

pub use cartridge::{Cartridge, Mapper, Mirroring, Nrom};
pub use error::Error;
pub use ppu::{ClockResult, Ppu, PpuBus, PpuConfig};

#[cfg(test)]
mod tests {
    use ctor::ctor;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

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
}
