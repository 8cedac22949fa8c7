use bitflags::bitflags;

bitflags! {
    /// PPU mask register (`$2001`).
    ///
    /// Bit layout:
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// B G R S B s b g
    /// ```
    /// - `g`: greyscale
    /// - `b`: show background in the leftmost 8 pixels
    /// - `s`: show sprites in the leftmost 8 pixels
    /// - `B`: background enable
    /// - `S`: sprite enable
    /// - `R/G/B`: color emphasis (stored, not rendered)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub(crate) struct Mask: u8 {
        const GRAYSCALE = 0b0000_0001;
        const SHOW_BACKGROUND_LEFT = 0b0000_0010;
        const SHOW_SPRITES_LEFT = 0b0000_0100;
        const SHOW_BACKGROUND = 0b0000_1000;
        const SHOW_SPRITES = 0b0001_0000;
        const EMPHASIZE_RED = 0b0010_0000;
        const EMPHASIZE_GREEN = 0b0100_0000;
        const EMPHASIZE_BLUE = 0b1000_0000;
    }
}

impl Mask {
    /// Returns `true` when either background or sprite rendering is enabled.
    pub(crate) fn rendering_enabled(self) -> bool {
        self.intersects(Mask::SHOW_BACKGROUND | Mask::SHOW_SPRITES)
    }

    pub(crate) fn show_background(self) -> bool {
        self.contains(Mask::SHOW_BACKGROUND)
    }

    pub(crate) fn show_sprites(self) -> bool {
        self.contains(Mask::SHOW_SPRITES)
    }

    /// Whether the background is visible at screen column `x`.
    pub(crate) fn background_visible_at(self, x: u16) -> bool {
        self.show_background() && (x >= 8 || self.contains(Mask::SHOW_BACKGROUND_LEFT))
    }

    /// Whether sprites are visible at screen column `x`.
    pub(crate) fn sprites_visible_at(self, x: u16) -> bool {
        self.show_sprites() && (x >= 8 || self.contains(Mask::SHOW_SPRITES_LEFT))
    }

    pub(crate) fn greyscale(self) -> bool {
        self.contains(Mask::GRAYSCALE)
    }
}
