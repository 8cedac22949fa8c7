//! Cartridge-side collaborators consumed by the PPU.
//!
//! The PPU only ever needs three things from a cartridge: CHR reads/writes in
//! `$0000-$1FFF`, a notification when PPU A12 rises (for scanline-counting
//! mappers), and the current nametable mirroring. Everything else a board does
//! (PRG banking, IRQ counters, ROM parsing) lives behind [`Mapper`] and is not
//! modeled here.

pub mod mapper;
pub mod mirroring;

pub use mapper::{Mapper, Nrom};
pub use mirroring::Mirroring;

/// An inserted cartridge: a boxed board implementation selected once at load.
#[derive(Debug)]
pub struct Cartridge {
    mapper: Box<dyn Mapper>,
}

impl Cartridge {
    pub fn new(mapper: Box<dyn Mapper>) -> Self {
        tracing::debug!(mirroring = ?mapper.mirroring(), "cartridge inserted");
        Self { mapper }
    }

    pub fn mapper(&self) -> &dyn Mapper {
        self.mapper.as_ref()
    }

    pub fn mapper_mut(&mut self) -> &mut dyn Mapper {
        self.mapper.as_mut()
    }

    pub fn mirroring(&self) -> Mirroring {
        self.mapper.mirroring()
    }
}

impl Clone for Cartridge {
    fn clone(&self) -> Self {
        Self {
            mapper: dyn_clone::clone_box(&*self.mapper),
        }
    }
}
