use super::{
    savestate::{SpriteLaneState, SpritePipelineState},
    sprite::SpriteAttributes,
};

/// Marker stored in a lane's source index when the slot holds no sprite.
pub(crate) const NO_SPRITE: u8 = 0xFF;

/// Number of sprite lanes the PPU renders per scanline.
pub(crate) const SPRITE_LANES: usize = 8;

/// One sprite output unit for the current scanline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SpriteLane {
    /// Pattern bitplane 0, already flipped so the MSB is the leftmost pixel.
    pattern_low: u8,
    /// Pattern bitplane 1, already flipped so the MSB is the leftmost pixel.
    pattern_high: u8,
    attributes: SpriteAttributes,
    /// Dots left before the lane starts shifting out pixels.
    x_counter: u8,
    /// Primary-OAM sprite number this lane was filled from.
    oam_source_index: u8,
}

impl Default for SpriteLane {
    fn default() -> Self {
        Self {
            pattern_low: 0,
            pattern_high: 0,
            attributes: SpriteAttributes::empty(),
            x_counter: 0xFF,
            oam_source_index: NO_SPRITE,
        }
    }
}

/// Sprite pixel produced by the pipeline for a single dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub(crate) struct SpritePixel {
    /// Sprite palette select (0..=3).
    pub(crate) palette: u8,
    /// Color index within the palette (0..=3, 0 means transparent).
    pub(crate) color: u8,
    pub(crate) behind_background: bool,
    pub(crate) is_sprite0: bool,
}

impl SpritePixel {
    pub(crate) fn is_opaque(&self) -> bool {
        self.color != 0
    }
}

/// Sprite output stage: eight lanes each holding two pattern shifters, a
/// latched attribute byte and an X down-counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub(crate) struct SpritePipeline {
    lanes: [SpriteLane; SPRITE_LANES],
}

impl SpritePipeline {
    /// Fills `lane` with fetched pattern bytes for the next scanline.
    ///
    /// Horizontally flipped sprites are bit-reversed here so shifting left
    /// always walks pixels from left to right.
    pub(crate) fn load_lane(
        &mut self,
        lane: usize,
        pattern_low: u8,
        pattern_high: u8,
        attributes: SpriteAttributes,
        x: u8,
        oam_source_index: u8,
    ) {
        let Some(slot) = self.lanes.get_mut(lane) else {
            return;
        };
        let (low, high) = if attributes.contains(SpriteAttributes::FLIP_HORIZONTAL) {
            (pattern_low.reverse_bits(), pattern_high.reverse_bits())
        } else {
            (pattern_low, pattern_high)
        };
        *slot = SpriteLane {
            pattern_low: low,
            pattern_high: high,
            attributes,
            x_counter: x,
            oam_source_index,
        };
    }

    /// Marks `lane` as holding no sprite. Its pattern is transparent.
    pub(crate) fn clear_lane(&mut self, lane: usize) {
        if let Some(slot) = self.lanes.get_mut(lane) {
            *slot = SpriteLane::default();
        }
    }

    /// Samples the current sprite pixel and advances every lane by one dot.
    ///
    /// Lanes are checked in order so the lowest lane with an opaque pixel
    /// wins, which gives lower OAM indices priority.
    pub(crate) fn sample_and_shift(&mut self) -> SpritePixel {
        let mut chosen: Option<SpritePixel> = None;

        for lane in self.lanes.iter_mut() {
            if lane.x_counter > 0 {
                lane.x_counter -= 1;
                continue;
            }

            let bit0 = (lane.pattern_low >> 7) & 1;
            let bit1 = (lane.pattern_high >> 7) & 1;
            let color = (bit1 << 1) | bit0;

            if chosen.is_none() && color != 0 {
                chosen = Some(SpritePixel {
                    palette: lane.attributes.palette(),
                    color,
                    behind_background: lane
                        .attributes
                        .contains(SpriteAttributes::PRIORITY_BEHIND_BACKGROUND),
                    is_sprite0: lane.oam_source_index == 0,
                });
            }

            lane.pattern_low <<= 1;
            lane.pattern_high <<= 1;
        }

        chosen.unwrap_or_default()
    }

    pub(crate) fn save_state(&self) -> SpritePipelineState {
        let mut lanes = [SpriteLaneState::default(); SPRITE_LANES];
        for (state, lane) in lanes.iter_mut().zip(self.lanes.iter()) {
            *state = SpriteLaneState {
                pattern_low: lane.pattern_low,
                pattern_high: lane.pattern_high,
                attributes: lane.attributes.bits(),
                x_counter: lane.x_counter,
                oam_source_index: lane.oam_source_index,
            };
        }
        SpritePipelineState { lanes }
    }

    pub(crate) fn load_state(&mut self, state: &SpritePipelineState) {
        for (lane, saved) in self.lanes.iter_mut().zip(state.lanes.iter()) {
            *lane = SpriteLane {
                pattern_low: saved.pattern_low,
                pattern_high: saved.pattern_high,
                attributes: SpriteAttributes::from_bits_retain(saved.attributes),
                x_counter: saved.x_counter,
                oam_source_index: saved.oam_source_index,
            };
        }
    }
}
