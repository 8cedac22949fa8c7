use super::VramAddr;

/// Internal VRAM register block matching the NESDev `v/t/x/w` terminology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct VramRegisters {
    /// Current VRAM address (`v`).
    pub(crate) v: VramAddr,
    /// Temporary VRAM address (`t`).
    pub(crate) t: VramAddr,
    /// Fine X scroll component (`x`, 0..7).
    pub(crate) x: u8,
    /// Write toggle (`w`): false => first write, true => second write.
    pub(crate) w: bool,
}

impl VramRegisters {
    /// `$2005`: first write sets fine X and coarse X, second write sets
    /// fine Y and coarse Y.
    pub(crate) fn write_scroll(&mut self, value: u8) {
        if !self.w {
            self.t.set_coarse_x(value >> 3);
            self.x = value & 0b111;
        } else {
            self.t.set_coarse_y(value >> 3);
            self.t.set_fine_y(value & 0b111);
        }
        self.w = !self.w;
    }

    /// `$2006`: first write loads the high six bits of `t` (bit 14 cleared),
    /// second write loads the low byte and copies `t` into `v`.
    pub(crate) fn write_addr(&mut self, value: u8) {
        if !self.w {
            let hi = u16::from(value & 0b0011_1111) << 8;
            self.t.set_raw(hi | (self.t.raw() & 0x00FF));
        } else {
            self.t.set_raw((self.t.raw() & 0x7F00) | u16::from(value));
            self.v = self.t;
        }
        self.w = !self.w;
    }

    /// Resets the write toggle so the next `$2005/$2006` write is treated
    /// as the first half of the pair.
    pub(crate) fn reset_latch(&mut self) {
        self.w = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_writes_fill_t_and_fine_x() {
        let mut regs = VramRegisters::default();
        regs.write_scroll(0b0111_1101); // coarse X = 15, fine X = 5
        assert!(regs.w);
        assert_eq!(regs.x, 5);
        assert_eq!(regs.t.coarse_x(), 15);

        regs.write_scroll(0b0101_1110); // coarse Y = 11, fine Y = 6
        assert!(!regs.w);
        assert_eq!(regs.t.coarse_y(), 11);
        assert_eq!(regs.t.fine_y(), 6);
        assert_eq!(regs.v.raw(), 0, "scroll writes never touch v");
    }

    #[test]
    fn addr_second_write_commits_v() {
        let mut regs = VramRegisters::default();
        regs.write_addr(0xFF);
        assert_eq!(regs.t.raw(), 0x3F00, "bit 14 is cleared by the first write");
        assert_eq!(regs.v.raw(), 0);
        regs.write_addr(0x10);
        assert_eq!(regs.v.raw(), 0x3F10);
        assert!(!regs.w);
    }
}
