use super::savestate::BgPipelineState;

/// 16-bit left-shifting register used by the background pipeline.
///
/// Layout:
///   [ high 8 bits | low 8 bits ]
///
/// The high byte holds the tile currently being drawn, the low byte the next
/// one (or its palette bit repeated eight times).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
struct Shift16(u16);

impl Shift16 {
    /// Replaces the low byte, keeping the pixels still in flight.
    #[inline]
    fn reload_low_byte(&mut self, byte: u8) {
        self.0 = (self.0 & 0xFF00) | u16::from(byte);
    }

    /// Returns the bit at position `15 - fine_x`.
    ///
    /// Fine X picks which in-flight bit is visible instead of delaying the
    /// shift cadence.
    #[inline]
    fn bit_with_fine_x(&self, fine_x: u8) -> u8 {
        let shift = 15 - (fine_x & 0b111);
        ((self.0 >> shift) & 1) as u8
    }

    #[inline]
    fn shift(&mut self) {
        self.0 <<= 1;
    }
}

/// Bytes gathered by the four fetch phases of one 8-dot tile slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct BgLatches {
    /// Tile index read from the nametable.
    pub(crate) nametable: u8,
    /// 2-bit palette select already extracted from the attribute byte.
    pub(crate) attribute: u8,
    pub(crate) pattern_low: u8,
    pub(crate) pattern_high: u8,
}

/// Background pixel pipeline: two pattern shifters (bitplanes 0/1) and two
/// attribute shifters (palette bits 0/1), plus the fetch latches that feed
/// them every 8 dots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct BgPipeline {
    pattern: [Shift16; 2],
    attribute: [Shift16; 2],
    pub(crate) latches: BgLatches,
}

impl BgPipeline {
    /// Moves the latched tile into the low byte of all four shifters.
    ///
    /// Each palette bit is replicated across eight pixels (`0x00`/`0xFF`) so
    /// the attribute shifters stay aligned with the pattern shifters.
    pub(crate) fn reload(&mut self) {
        let latches = self.latches;
        self.pattern[0].reload_low_byte(latches.pattern_low);
        self.pattern[1].reload_low_byte(latches.pattern_high);
        for (bit, shifter) in self.attribute.iter_mut().enumerate() {
            let repeated = if (latches.attribute >> bit) & 1 != 0 {
                0xFF
            } else {
                0x00
            };
            shifter.reload_low_byte(repeated);
        }
    }

    /// Samples the current background pixel.
    ///
    /// Returns `(palette, pattern)`, both in `0..=3`; pattern 0 is transparent.
    pub(crate) fn sample(&self, fine_x: u8) -> (u8, u8) {
        let pattern = (self.pattern[1].bit_with_fine_x(fine_x) << 1)
            | self.pattern[0].bit_with_fine_x(fine_x);
        let palette = (self.attribute[1].bit_with_fine_x(fine_x) << 1)
            | self.attribute[0].bit_with_fine_x(fine_x);
        (palette, pattern)
    }

    /// Advances all four shifters by one dot.
    pub(crate) fn shift(&mut self) {
        for i in 0..=1 {
            self.pattern[i].shift();
            self.attribute[i].shift();
        }
    }

    pub(crate) fn save_state(&self) -> BgPipelineState {
        BgPipelineState {
            pattern: [self.pattern[0].0, self.pattern[1].0],
            attribute: [self.attribute[0].0, self.attribute[1].0],
            nametable_latch: self.latches.nametable,
            attribute_latch: self.latches.attribute,
            pattern_low_latch: self.latches.pattern_low,
            pattern_high_latch: self.latches.pattern_high,
        }
    }

    pub(crate) fn load_state(&mut self, state: BgPipelineState) {
        self.pattern = [Shift16(state.pattern[0]), Shift16(state.pattern[1])];
        self.attribute = [Shift16(state.attribute[0]), Shift16(state.attribute[1])];
        self.latches = BgLatches {
            nametable: state.nametable_latch,
            attribute: state.attribute_latch & 0b11,
            pattern_low: state.pattern_low_latch,
            pattern_high: state.pattern_high_latch,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(pattern_low: u8, pattern_high: u8, attribute: u8) -> BgPipeline {
        let mut bg = BgPipeline::default();
        bg.latches = BgLatches {
            nametable: 0,
            attribute,
            pattern_low,
            pattern_high,
        };
        bg.reload();
        for _ in 0..8 {
            bg.shift();
        }
        bg
    }

    #[test]
    fn reloaded_tile_reaches_output_after_eight_shifts() {
        let bg = loaded(0b1000_0000, 0b1000_0000, 0b10);
        assert_eq!(bg.sample(0), (0b10, 0b11));
        assert_eq!(bg.sample(1), (0b10, 0b00));
    }

    #[test]
    fn fine_x_selects_later_pixels() {
        let bg = loaded(0b0010_0000, 0b0000_0000, 0b01);
        assert_eq!(bg.sample(0).1, 0);
        assert_eq!(bg.sample(2), (0b01, 0b01));
    }

    #[test]
    fn reload_keeps_pixels_in_flight() {
        let mut bg = loaded(0xFF, 0x00, 0b11);
        bg.latches.pattern_low = 0x00;
        bg.latches.attribute = 0;
        bg.reload();
        assert_eq!(bg.sample(0), (0b11, 0b01));
    }
}
