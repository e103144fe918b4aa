//! Freeze-detection state machine
//!
//! Two states, one elapsed-time measurement. ACTIVE expects the scoring
//! version stamp to advance; once it has been static for a full freeze
//! window the loop drops to FROZEN and polls wide. Any stamp change thaws
//! it back. The machine also counts how many whole windows the stamp has
//! been stuck, feeding the experimental remap heuristic.

use std::time::Duration;
use tokio::time::Instant;

/// Polling mode of the sync loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollMode {
    /// Producer live, narrow poll interval.
    Active,
    /// Producer stalled, wide poll interval.
    Frozen,
}

/// Transition produced by one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FreezeEvent {
    /// Version stamp static past the freeze window while active.
    Froze,
    /// Version stamp moved again after a freeze.
    Thawed,
}

pub(crate) struct FreezeDetector {
    freeze_window: Duration,
    remap_after_windows: u32,
    mode: PollMode,
    last_version: u32,
    changed_at: Instant,
    frozen_at: Instant,
    windows_stalled: u32,
    remap_requested: bool,
}

impl FreezeDetector {
    pub(crate) fn new(freeze_window: Duration, remap_after_windows: u32, now: Instant) -> Self {
        Self {
            freeze_window,
            remap_after_windows,
            mode: PollMode::Active,
            last_version: 0,
            changed_at: now,
            frozen_at: now,
            windows_stalled: 0,
            remap_requested: false,
        }
    }

    pub(crate) fn mode(&self) -> PollMode {
        self.mode
    }

    /// Feed one tick's scoring version stamp, `None` when this tick's read
    /// was torn. Timers advance either way.
    pub(crate) fn observe(&mut self, version: Option<u32>, now: Instant) -> Option<FreezeEvent> {
        if let Some(version) = version {
            if version != self.last_version {
                self.last_version = version;
                self.changed_at = now;
                self.windows_stalled = 0;
                self.remap_requested = false;
                if self.mode == PollMode::Frozen {
                    self.mode = PollMode::Active;
                    return Some(FreezeEvent::Thawed);
                }
                return None;
            }
        }

        match self.mode {
            PollMode::Active => {
                if now.duration_since(self.changed_at) >= self.freeze_window {
                    self.mode = PollMode::Frozen;
                    self.frozen_at = now;
                    self.windows_stalled = 0;
                    return Some(FreezeEvent::Froze);
                }
            }
            PollMode::Frozen => {
                let stalled = now.duration_since(self.frozen_at);
                let windows = (stalled.as_nanos() / self.freeze_window.as_nanos().max(1)) as u32;
                self.windows_stalled = windows;
            }
        }
        None
    }

    /// Whether the repeated-stamp remap heuristic fires on this tick.
    ///
    /// Fires at most once per freeze; a stamp change re-arms it.
    pub(crate) fn remap_due(&mut self) -> bool {
        if self.remap_after_windows == 0 || self.remap_requested {
            return false;
        }
        if self.mode == PollMode::Frozen && self.windows_stalled >= self.remap_after_windows {
            self.remap_requested = true;
            return true;
        }
        false
    }

    /// Poll interval for the current mode.
    pub(crate) fn poll_interval(&self, active: Duration, frozen: Duration) -> Duration {
        match self.mode {
            PollMode::Active => active,
            PollMode::Frozen => frozen,
        }
    }
}
