use bitflags::bitflags;

use super::registers::Control;

bitflags! {
    /// Attribute bits stored in sprite byte 2.
    ///
    /// Bit layout:
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// V H P . . . p p
    /// ```
    /// - `V`: Vertical flip
    /// - `H`: Horizontal flip
    /// - `P`: Priority (behind background when set)
    /// - `p`: Sprite palette select (0..=3)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub(crate) struct SpriteAttributes: u8 {
        const PALETTE = 0b0000_0011;
        const PRIORITY_BEHIND_BACKGROUND = 0b0010_0000;
        const FLIP_HORIZONTAL = 0b0100_0000;
        const FLIP_VERTICAL = 0b1000_0000;
    }
}

impl SpriteAttributes {
    pub(crate) fn palette(self) -> u8 {
        self.bits() & Self::PALETTE.bits()
    }
}

/// Read-only view over one 4-byte sprite record in primary or secondary OAM:
/// Y, tile index, attributes, X.
#[derive(Clone, Copy)]
pub(crate) struct SpriteView<'a> {
    bytes: &'a [u8],
}

impl<'a> SpriteView<'a> {
    pub(crate) const BYTES_PER_SPRITE: usize = 4;

    /// Returns a view for the sprite at `sprite_index`, if it is in range.
    pub(crate) fn at_index(oam: &'a [u8], sprite_index: usize) -> Option<Self> {
        let start = sprite_index.checked_mul(Self::BYTES_PER_SPRITE)?;
        let bytes = oam.get(start..start + Self::BYTES_PER_SPRITE)?;
        Some(Self { bytes })
    }

    pub(crate) fn y(&self) -> u8 {
        self.bytes[0]
    }

    pub(crate) fn tile(&self) -> u8 {
        self.bytes[1]
    }

    pub(crate) fn attributes(&self) -> SpriteAttributes {
        SpriteAttributes::from_bits_retain(self.bytes[2])
    }

    pub(crate) fn x(&self) -> u8 {
        self.bytes[3]
    }
}

/// Whether a sprite whose top edge is `y` covers `line` at the given height.
pub(crate) fn covers_line(y: u8, line: i16, height: u8) -> bool {
    let row = line - i16::from(y);
    (0..i16::from(height)).contains(&row)
}

/// Pattern-table address of the low bitplane for one sprite row.
///
/// `row` is the distance from the sprite's top edge before flipping. In 8x16
/// mode bit 0 of the tile picks the pattern table and rows 8-15 come from the
/// following tile.
pub(crate) fn pattern_addr(tile: u8, row: u8, attributes: SpriteAttributes, ctrl: Control) -> u16 {
    let height = ctrl.sprite_height();
    let row = row & (height - 1);
    let row = if attributes.contains(SpriteAttributes::FLIP_VERTICAL) {
        height - 1 - row
    } else {
        row
    };

    if height == 16 {
        let table = if tile & 1 != 0 { 0x1000 } else { 0x0000 };
        let tile = (tile & 0xFE) + u8::from(row >= 8);
        table | (u16::from(tile) << 4) | u16::from(row & 7)
    } else {
        ctrl.sprite_pattern_table() | (u16::from(tile) << 4) | u16::from(row)
    }
}
