#[cfg(feature = "savestate-serde")]
use serde::{Deserialize, Serialize};

use super::buffer::ColorFormat;

/// Contents of OAM, nametable RAM and palette RAM at power-on.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PowerOnState {
    /// All memories cleared to zero.
    #[default]
    Zeroed,
    /// Memories filled from a seeded generator. The same seed always yields
    /// the same contents.
    Randomized { seed: u64 },
}

/// Construction-time options for [`Ppu`](super::Ppu).
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PpuConfig {
    pub power_on: PowerOnState,
    /// Ignore `$2000/$2005/$2006` writes (and buffer `$2001`) for the first
    /// 29 658 CPU cycles after power-on, as the 2C02 does.
    pub warmup: bool,
    pub color_format: ColorFormat,
}

impl Default for PpuConfig {
    fn default() -> Self {
        Self {
            power_on: PowerOnState::Zeroed,
            warmup: true,
            color_format: ColorFormat::Rgba8888,
        }
    }
}
