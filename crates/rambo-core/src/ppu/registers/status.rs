use bitflags::bitflags;

bitflags! {
    /// Sprite flags of the PPU status register (`$2002`).
    ///
    /// Bit layout:
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// V S O . . . . .
    /// ```
    /// Only `S` (sprite-0 hit) and `O` (sprite overflow) are stored here. `V`
    /// belongs to the VBlank ledger and is merged in when `$2002` is read; the
    /// low five bits come from the open bus.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub(crate) struct Status: u8 {
        const SPRITE_OVERFLOW = 0b0010_0000;
        const SPRITE_ZERO_HIT = 0b0100_0000;
    }
}

impl Status {
    /// Bit 7 of `$2002`.
    pub(crate) const VERTICAL_BLANK_BIT: u8 = 0b1000_0000;
    /// Bits of `$2002` that are not driven by the PPU.
    pub(crate) const OPEN_BUS_MASK: u8 = 0b0001_1111;
}
