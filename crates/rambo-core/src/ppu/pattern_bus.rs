use crate::cartridge::{Cartridge, Mapper, Mirroring};

/// Temporary view that lets the PPU reach the cartridge's CHR space.
///
/// The caller builds one of these per PPU call, so the PPU never stores a
/// reference to the cartridge and lifetimes stay borrow-checked. A bus with
/// no mapper models a console with no cartridge inserted.
#[derive(Default)]
pub struct PpuBus<'a> {
    mapper: Option<&'a mut dyn Mapper>,
}

impl<'a> PpuBus<'a> {
    pub fn new(mapper: Option<&'a mut dyn Mapper>) -> Self {
        Self { mapper }
    }

    /// Bus backed by an optional inserted cartridge.
    pub fn with_cartridge(cartridge: Option<&'a mut Cartridge>) -> Self {
        Self {
            mapper: cartridge.map(|cart| cart.mapper_mut()),
        }
    }

    /// Bus with nothing attached: pattern reads float and writes are lost.
    pub fn headless() -> Self {
        Self { mapper: None }
    }

    pub fn has_cartridge(&self) -> bool {
        self.mapper.is_some()
    }

    pub(crate) fn chr_read(&mut self, addr: u16) -> Option<u8> {
        self.mapper.as_mut().map(|mapper| mapper.chr_read(addr))
    }

    pub(crate) fn chr_write(&mut self, addr: u16, value: u8) {
        if let Some(mapper) = self.mapper.as_mut() {
            mapper.chr_write(addr, value);
        }
    }

    pub(crate) fn notify_a12_rising(&mut self) {
        if let Some(mapper) = self.mapper.as_mut() {
            mapper.notify_a12_rising();
        }
    }

    /// Live mirroring reported by the board, if one is attached.
    pub(crate) fn mirroring(&self) -> Option<Mirroring> {
        self.mapper.as_ref().map(|mapper| mapper.mirroring())
    }
}
