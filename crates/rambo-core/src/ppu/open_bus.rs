use super::savestate::PpuOpenBusState;

/// Frames a driven value survives on the PPU data bus before reading back 0.
pub(crate) const DECAY_FRAMES: u8 = 60;

/// PPU-local open-bus latch.
///
/// Every CPU write to `$2000-$3FFF` (and every read the PPU drives) charges
/// the bus with the transferred byte. Write-only registers read back that
/// byte until it leaks away, which is modeled as a single frame countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct PpuOpenBus {
    value: u8,
    decay_timer: u8,
}

impl PpuOpenBus {
    /// Latches a freshly driven value and restarts the decay countdown.
    pub(crate) fn drive(&mut self, value: u8) {
        self.value = value;
        self.decay_timer = DECAY_FRAMES;
    }

    /// Combines a register value with the latch: bits set in `mask` come from
    /// the bus, the rest from `value`. The merged byte is then driven back.
    pub(crate) fn apply(&mut self, mask: u8, value: u8) -> u8 {
        let merged = (value & !mask) | (self.value & mask);
        self.drive(merged);
        merged
    }

    /// Returns the latched value without refreshing it.
    pub(crate) fn sample(&self) -> u8 {
        self.value
    }

    /// Advances decay by one frame.
    pub(crate) fn on_frame(&mut self) {
        if self.decay_timer > 0 {
            self.decay_timer -= 1;
            if self.decay_timer == 0 {
                self.value = 0;
            }
        }
    }

    pub(crate) fn save_state(&self) -> PpuOpenBusState {
        PpuOpenBusState {
            value: self.value,
            decay_timer: self.decay_timer,
        }
    }

    pub(crate) fn load_state(&mut self, state: PpuOpenBusState) {
        self.value = state.value;
        self.decay_timer = state.decay_timer.min(DECAY_FRAMES);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_decays_after_sixty_frames() {
        let mut bus = PpuOpenBus::default();
        bus.drive(0xA5);
        for _ in 0..DECAY_FRAMES - 1 {
            bus.on_frame();
        }
        assert_eq!(bus.sample(), 0xA5);
        bus.on_frame();
        assert_eq!(bus.sample(), 0x00);
    }

    #[test]
    fn drive_restarts_decay() {
        let mut bus = PpuOpenBus::default();
        bus.drive(0x11);
        for _ in 0..30 {
            bus.on_frame();
        }
        bus.drive(0x22);
        for _ in 0..59 {
            bus.on_frame();
        }
        assert_eq!(bus.sample(), 0x22);
    }

    #[test]
    fn apply_merges_masked_bits() {
        let mut bus = PpuOpenBus::default();
        bus.drive(0b0001_1111);
        assert_eq!(bus.apply(0x1F, 0b1010_0000), 0b1011_1111);
        assert_eq!(bus.sample(), 0b1011_1111);
    }
}
