//! Per-dot sprite evaluation for the next scanline.
//!
//! Dots 1-64 clear secondary OAM, dots 65-256 scan primary OAM two dots per
//! byte (odd: read into a latch, even: write or compare). The evaluator keeps
//! the cursor state the hardware has so the scan can be snapshotted mid-line.

use super::{savestate::SpriteEvalState, sprite::covers_line, sprite_pipeline::SPRITE_LANES};
use crate::memory::ppu as ppu_mem;

/// First dot of the primary-OAM scan.
pub(crate) const EVAL_START_DOT: u16 = 65;
/// Last dot of the primary-OAM scan.
pub(crate) const EVAL_END_DOT: u16 = 256;
/// Last dot of the secondary-OAM clear.
pub(crate) const CLEAR_END_DOT: u16 = 64;

const SPRITES_IN_OAM: u8 = 64;

/// Cursor state of the sprite evaluation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct SpriteEvaluator {
    /// Primary-OAM sprite currently scanned (`n`).
    sprite_index: u8,
    /// Byte within that sprite (`m`).
    byte_index: u8,
    /// Secondary-OAM slots filled so far.
    found: u8,
    /// Byte last read from primary OAM on an odd dot.
    latch: u8,
    /// Scan finished: all 64 sprites visited or overflow detected.
    done: bool,
    /// Sprite 0 is among the sprites found for the next line.
    sprite0_in_range: bool,
    /// Primary-OAM sprite number behind each filled slot.
    source_index: [u8; SPRITE_LANES],
    /// Address the secondary-OAM counter currently points at.
    secondary_addr: u8,
    /// Low bitplane held between the two pattern fetches of a sprite.
    fetch_pattern_low: u8,
}

impl SpriteEvaluator {
    /// One dot of the secondary-OAM clear (dots 1-64).
    pub(crate) fn clear_step(&mut self, dot: u16, secondary: &mut [u8; ppu_mem::SECONDARY_OAM_RAM_SIZE]) {
        if dot == 1 {
            self.found = 0;
            self.sprite0_in_range = false;
            self.source_index = [0xFF; SPRITE_LANES];
        }
        let offset = usize::from(dot - 1);
        if let Some(byte) = secondary.get_mut(offset) {
            *byte = 0xFF;
        }
        self.secondary_addr = (((dot - 1) >> 1) as u8) & 0x1F;
    }

    /// One dot of the primary-OAM scan (dots 65-256).
    ///
    /// Returns `true` on the dot a ninth in-range sprite is detected; the
    /// caller latches the overflow flag.
    pub(crate) fn evaluate_step(
        &mut self,
        dot: u16,
        oam: &[u8; ppu_mem::OAM_RAM_SIZE],
        secondary: &mut [u8; ppu_mem::SECONDARY_OAM_RAM_SIZE],
        next_line: i16,
        sprite_height: u8,
    ) -> bool {
        if dot == EVAL_START_DOT {
            self.sprite_index = 0;
            self.byte_index = 0;
            self.done = false;
        }
        if self.done {
            return false;
        }

        if dot & 1 == 1 {
            let addr = usize::from(self.sprite_index) * 4 + usize::from(self.byte_index);
            self.latch = oam[addr];
            return false;
        }

        let slot = usize::from(self.found);
        if self.byte_index == 0 {
            let in_range = covers_line(self.latch, next_line, sprite_height);
            if slot < SPRITE_LANES {
                secondary[slot * 4] = self.latch;
                self.secondary_addr = (slot * 4) as u8;
                if in_range {
                    if self.sprite_index == 0 {
                        self.sprite0_in_range = true;
                    }
                    self.source_index[slot] = self.sprite_index;
                    self.byte_index = 1;
                } else {
                    self.next_sprite();
                }
                return false;
            }
            if in_range {
                self.done = true;
                return true;
            }
            self.next_sprite();
            return false;
        }

        secondary[slot * 4 + usize::from(self.byte_index)] = self.latch;
        self.byte_index += 1;
        self.secondary_addr = ((slot * 4) as u8 + self.byte_index) & 0x1F;
        if self.byte_index == 4 {
            self.byte_index = 0;
            self.found += 1;
            self.next_sprite();
        }
        false
    }

    fn next_sprite(&mut self) {
        self.sprite_index += 1;
        if self.sprite_index == SPRITES_IN_OAM {
            self.done = true;
        }
    }

    /// Slots filled by the last completed scan.
    pub(crate) fn found(&self) -> u8 {
        self.found
    }

    /// Primary-OAM sprite number for `slot`, or `0xFF` when the slot is empty.
    pub(crate) fn source_index(&self, slot: usize) -> u8 {
        if slot < usize::from(self.found) {
            self.source_index[slot]
        } else {
            0xFF
        }
    }

    pub(crate) fn sprite0_in_range(&self) -> bool {
        self.sprite0_in_range
    }

    /// Byte address the secondary-OAM counter holds, used to pick the primary
    /// OAM row hit by rendering-disable corruption.
    pub(crate) fn secondary_addr(&self) -> u8 {
        self.secondary_addr
    }

    /// Tracks the secondary-OAM counter while the fetch stage walks slots.
    pub(crate) fn set_secondary_addr(&mut self, addr: u8) {
        self.secondary_addr = addr & 0x1F;
    }

    pub(crate) fn latch_fetch_pattern_low(&mut self, value: u8) {
        self.fetch_pattern_low = value;
    }

    pub(crate) fn fetch_pattern_low(&self) -> u8 {
        self.fetch_pattern_low
    }

    pub(crate) fn save_state(&self) -> SpriteEvalState {
        SpriteEvalState {
            sprite_index: self.sprite_index,
            byte_index: self.byte_index,
            found: self.found,
            latch: self.latch,
            done: self.done,
            sprite0_in_range: self.sprite0_in_range,
            source_index: self.source_index,
            secondary_addr: self.secondary_addr,
            fetch_pattern_low: self.fetch_pattern_low,
        }
    }

    pub(crate) fn load_state(&mut self, state: SpriteEvalState) {
        *self = Self {
            sprite_index: state.sprite_index.min(SPRITES_IN_OAM),
            byte_index: state.byte_index & 0b11,
            found: state.found.min(SPRITE_LANES as u8),
            latch: state.latch,
            done: state.done,
            sprite0_in_range: state.sprite0_in_range,
            source_index: state.source_index,
            secondary_addr: state.secondary_addr & 0x1F,
            fetch_pattern_low: state.fetch_pattern_low,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(oam: &[u8; 256], next_line: i16, height: u8) -> (SpriteEvaluator, [u8; 32], bool) {
        let mut eval = SpriteEvaluator::default();
        let mut secondary = [0u8; 32];
        let mut overflow = false;
        for dot in 1..=CLEAR_END_DOT {
            eval.clear_step(dot, &mut secondary);
        }
        for dot in EVAL_START_DOT..=EVAL_END_DOT {
            overflow |= eval.evaluate_step(dot, oam, &mut secondary, next_line, height);
        }
        (eval, secondary, overflow)
    }

    fn oam_with_ys(ys: &[u8]) -> [u8; 256] {
        let mut oam = [0xFFu8; 256];
        for (i, &y) in ys.iter().enumerate() {
            oam[i * 4] = y;
            oam[i * 4 + 1] = i as u8;
            oam[i * 4 + 2] = 0;
            oam[i * 4 + 3] = (i * 8) as u8;
        }
        oam
    }

    #[test]
    fn copies_in_range_sprites_in_oam_order() {
        let oam = oam_with_ys(&[100, 50, 98, 120]);
        let (eval, secondary, overflow) = scan(&oam, 100, 8);
        assert!(!overflow);
        assert_eq!(eval.found(), 2);
        assert_eq!(&secondary[0..4], &[100, 0, 0, 0]);
        assert_eq!(&secondary[4..8], &[98, 2, 0, 16]);
        assert!(secondary[8..].iter().all(|&b| b == 0xFF));
        assert!(eval.sprite0_in_range());
        assert_eq!(eval.source_index(1), 2);
        assert_eq!(eval.source_index(2), 0xFF);
    }

    #[test]
    fn ninth_sprite_sets_overflow_and_keeps_eight() {
        let oam = oam_with_ys(&[30; 10]);
        let (eval, secondary, overflow) = scan(&oam, 30, 8);
        assert!(overflow);
        assert_eq!(eval.found(), 8);
        assert_eq!(secondary[7 * 4 + 1], 7);
    }

    #[test]
    fn exactly_eight_sprites_do_not_overflow() {
        let oam = oam_with_ys(&[30; 8]);
        let (eval, _, overflow) = scan(&oam, 30, 8);
        assert!(!overflow);
        assert_eq!(eval.found(), 8);
    }

    #[test]
    fn tall_sprites_extend_range() {
        let oam = oam_with_ys(&[20]);
        assert_eq!(scan(&oam, 35, 16).0.found(), 1);
        assert_eq!(scan(&oam, 35, 8).0.found(), 0);
    }

    #[test]
    fn sprite_zero_tracked_by_source_not_slot() {
        let oam = oam_with_ys(&[0xF0, 60]);
        let (eval, _, _) = scan(&oam, 60, 8);
        assert!(!eval.sprite0_in_range());
        assert_eq!(eval.source_index(0), 1);
    }
}
