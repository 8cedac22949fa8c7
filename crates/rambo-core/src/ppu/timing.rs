use super::savestate::TimingState;

/// Dots per scanline (0..=340).
pub(crate) const DOTS_PER_SCANLINE: u16 = 341;
pub(crate) const LAST_DOT: u16 = DOTS_PER_SCANLINE - 1;
pub(crate) const PRE_RENDER_SCANLINE: i16 = -1;
pub(crate) const LAST_VISIBLE_SCANLINE: i16 = 239;
pub(crate) const VBLANK_SCANLINE: i16 = 241;
pub(crate) const LAST_SCANLINE: i16 = 260;
/// Dot on the pre-render line skipped on odd frames with rendering on.
pub(crate) const ODD_FRAME_SKIP_DOT: u16 = 339;

/// Role of the current scanline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum LineKind {
    PreRender,
    Visible,
    PostRender,
    VBlank,
}

/// Beam position: dot, scanline and frame counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct FrameTiming {
    pub(crate) cycle: u16,
    pub(crate) scanline: i16,
    pub(crate) frame: u64,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self {
            cycle: 0,
            scanline: PRE_RENDER_SCANLINE,
            frame: 0,
        }
    }
}

impl FrameTiming {
    /// Moves to the next dot. Returns `true` when a new frame starts.
    ///
    /// On odd frames with rendering enabled, dot 339 of the pre-render line
    /// jumps straight to 340, shortening that frame by one dot.
    pub(crate) fn advance(&mut self, rendering_enabled: bool) -> bool {
        self.cycle += 1;
        if self.cycle == ODD_FRAME_SKIP_DOT
            && self.scanline == PRE_RENDER_SCANLINE
            && self.frame & 1 == 1
            && rendering_enabled
        {
            self.cycle = LAST_DOT;
        }
        if self.cycle <= LAST_DOT {
            return false;
        }
        self.cycle = 0;
        self.scanline += 1;
        if self.scanline > LAST_SCANLINE {
            self.scanline = PRE_RENDER_SCANLINE;
            self.frame = self.frame.wrapping_add(1);
            return true;
        }
        false
    }

    pub(crate) fn line_kind(&self) -> LineKind {
        match self.scanline {
            PRE_RENDER_SCANLINE => LineKind::PreRender,
            0..=LAST_VISIBLE_SCANLINE => LineKind::Visible,
            240 => LineKind::PostRender,
            _ => LineKind::VBlank,
        }
    }

    /// Visible or pre-render: the lines where fetches happen.
    pub(crate) fn is_rendering_line(&self) -> bool {
        matches!(self.line_kind(), LineKind::Visible | LineKind::PreRender)
    }

    pub(crate) fn save_state(&self) -> TimingState {
        TimingState {
            cycle: self.cycle,
            scanline: self.scanline,
            frame: self.frame,
        }
    }

    pub(crate) fn load_state(&mut self, state: TimingState) {
        self.cycle = state.cycle.min(LAST_DOT);
        self.scanline = state.scanline.clamp(PRE_RENDER_SCANLINE, LAST_SCANLINE);
        self.frame = state.frame;
    }
}
