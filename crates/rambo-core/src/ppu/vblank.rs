//! Timestamped VBlank flag bookkeeping.
//!
//! The flag is set at (241, 1) and cleared at (-1, 1) or by a `$2002` read.
//! Reads racing the set are resolved by comparing master-cycle stamps:
//! - a read one dot before the set sees it clear and blocks the set
//! - a read on the same master cycle as the set sees it clear and clears it

use super::savestate::VblankLedgerState;

const NO_SUPPRESSION: u64 = u64::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct VblankLedger {
    /// Bit 7 of `$2002` as the CPU would read it.
    flag: bool,
    /// Between (241, 1) and (-1, 1), independent of reads.
    span_active: bool,
    last_set_cycle: u64,
    last_clear_cycle: u64,
    last_read_cycle: u64,
    /// Master cycle whose set must be skipped.
    prevent_set_at_cycle: u64,
}

impl Default for VblankLedger {
    fn default() -> Self {
        Self {
            flag: false,
            span_active: false,
            last_set_cycle: 0,
            last_clear_cycle: 0,
            last_read_cycle: 0,
            prevent_set_at_cycle: NO_SUPPRESSION,
        }
    }
}

impl VblankLedger {
    /// Starts the VBlank span. Returns `false` when a racing read suppressed
    /// the flag for this frame.
    pub(crate) fn begin(&mut self, cycle: u64) -> bool {
        self.span_active = true;
        if self.prevent_set_at_cycle == cycle {
            self.prevent_set_at_cycle = NO_SUPPRESSION;
            tracing::trace!(cycle, "vblank set suppressed by racing $2002 read");
            return false;
        }
        self.prevent_set_at_cycle = NO_SUPPRESSION;
        self.flag = true;
        self.last_set_cycle = cycle;
        true
    }

    /// Ends the span at the pre-render line.
    pub(crate) fn end(&mut self, cycle: u64) {
        self.flag = false;
        self.span_active = false;
        self.last_clear_cycle = cycle;
    }

    /// Handles a `$2002` read and returns the bit the CPU observes.
    ///
    /// `set_is_next` tells the ledger the flag would be set on the very next
    /// dot; the read then blocks that set.
    pub(crate) fn read(&mut self, cycle: u64, set_is_next: bool) -> bool {
        self.last_read_cycle = cycle;
        let racing_set = self.last_set_cycle == cycle;
        let observed = self.flag && !racing_set;
        if self.flag {
            self.flag = false;
            self.last_clear_cycle = cycle;
        }
        if set_is_next {
            self.prevent_set_at_cycle = cycle + 1;
        }
        observed
    }

    pub(crate) fn flag(&self) -> bool {
        self.flag
    }

    pub(crate) fn span_active(&self) -> bool {
        self.span_active
    }

    pub(crate) fn last_set_cycle(&self) -> u64 {
        self.last_set_cycle
    }

    pub(crate) fn last_clear_cycle(&self) -> u64 {
        self.last_clear_cycle
    }

    pub(crate) fn last_read_cycle(&self) -> u64 {
        self.last_read_cycle
    }

    pub(crate) fn save_state(&self) -> VblankLedgerState {
        VblankLedgerState {
            flag: self.flag,
            span_active: self.span_active,
            last_set_cycle: self.last_set_cycle,
            last_clear_cycle: self.last_clear_cycle,
            last_read_cycle: self.last_read_cycle,
            prevent_set_at_cycle: self.prevent_set_at_cycle,
        }
    }

    pub(crate) fn load_state(&mut self, state: VblankLedgerState) {
        *self = Self {
            flag: state.flag,
            span_active: state.span_active,
            last_set_cycle: state.last_set_cycle,
            last_clear_cycle: state.last_clear_cycle,
            last_read_cycle: state.last_read_cycle,
            prevent_set_at_cycle: state.prevent_set_at_cycle,
        };
    }
}
