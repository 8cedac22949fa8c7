//! PPU address line A12 edge detection.
//!
//! Scanline-counting boards (MMC3 and friends) clock an IRQ counter on rising
//! edges of A12 (`addr & 0x1000`). Pattern fetches toggle A12 many times per
//! scanline, so the hardware only counts a rise after the line has stayed low
//! for a few dots:
//! - every fetch updates the latched CHR address
//! - once per rendering dot the detector compares A12 with the previous dot
//! - a rise is reported only after at least [`A12_FILTER_DOTS`] low dots

use super::savestate::A12State;

/// Low dots required before a rising edge counts.
pub(crate) const A12_FILTER_DOTS: u8 = 6;
/// Saturation point of the low-time counter.
const A12_FILTER_MAX: u8 = 8;

const A12_BIT: u16 = 0x1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct A12Detector {
    /// Last CHR bus address touched by a fetch.
    chr_address: u16,
    /// A12 level seen on the previous evaluated dot.
    level: bool,
    /// Consecutive evaluated dots with A12 low.
    filter_delay: u8,
}

impl A12Detector {
    /// Records the address of a nametable, attribute or pattern fetch.
    #[inline]
    pub(crate) fn observe(&mut self, addr: u16) {
        self.chr_address = addr;
    }

    /// Evaluates one dot. Returns `true` on a filtered rising edge.
    pub(crate) fn clock(&mut self) -> bool {
        let high = self.chr_address & A12_BIT != 0;
        let rising = high && !self.level && self.filter_delay >= A12_FILTER_DOTS;
        if high {
            self.filter_delay = 0;
        } else if self.filter_delay < A12_FILTER_MAX {
            self.filter_delay += 1;
        }
        self.level = high;
        rising
    }

    pub(crate) fn chr_address(&self) -> u16 {
        self.chr_address
    }

    pub(crate) fn save_state(&self) -> A12State {
        A12State {
            chr_address: self.chr_address,
            level: self.level,
            filter_delay: self.filter_delay,
        }
    }

    pub(crate) fn load_state(&mut self, state: A12State) {
        self.chr_address = state.chr_address & 0x3FFF;
        self.level = state.level;
        self.filter_delay = state.filter_delay.min(A12_FILTER_MAX);
    }
}
