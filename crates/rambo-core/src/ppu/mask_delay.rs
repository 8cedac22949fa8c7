use super::{registers::Mask, savestate::MaskDelayState};

const MASK_DELAY_SLOTS: usize = 4;
/// How many dots behind the write cursor the render path reads.
const MASK_DELAY_DOTS: usize = 3;

/// Ring of recent `$2001` values.
///
/// Pixel composition, left-column clipping, greyscale and sprite-0 hit see
/// the mask a few dots late; fetch and scroll logic use the register
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct MaskDelay {
    slots: [Mask; MASK_DELAY_SLOTS],
    cursor: u8,
}

impl MaskDelay {
    /// Records this dot's mask and advances the cursor.
    pub(crate) fn push(&mut self, mask: Mask) {
        self.slots[usize::from(self.cursor)] = mask;
        self.cursor = ((usize::from(self.cursor) + 1) % MASK_DELAY_SLOTS) as u8;
    }

    /// Mask the render path should use on the current dot.
    pub(crate) fn effective(&self) -> Mask {
        let idx = (usize::from(self.cursor) + MASK_DELAY_SLOTS - MASK_DELAY_DOTS) % MASK_DELAY_SLOTS;
        self.slots[idx]
    }

    /// Fills every slot so the delayed view matches `mask` immediately.
    pub(crate) fn reset(&mut self, mask: Mask) {
        self.slots = [mask; MASK_DELAY_SLOTS];
        self.cursor = 0;
    }

    pub(crate) fn save_state(&self) -> MaskDelayState {
        MaskDelayState {
            slots: self.slots.map(|mask| mask.bits()),
            cursor: self.cursor,
        }
    }

    pub(crate) fn load_state(&mut self, state: MaskDelayState) {
        self.slots = state.slots.map(Mask::from_bits_retain);
        self.cursor = state.cursor % MASK_DELAY_SLOTS as u8;
    }
}
