//! Per-user flood detection.
//!
//! A sliding window of recent message timestamps yields the flooding
//! verdict; an independent deadline tracks the "already warned" state.
//!
//! The controller never reads the clock itself.  Every operation takes
//! `now` exactly once, so one logical check is never evaluated against
//! two different clock readings, and tests drive time deterministically.
//! Re-arming the warning replaces the stored deadline — there is a
//! single pending reset per user, and superseding it is an explicit
//! state transition rather than a background timer.

use std::collections::VecDeque;
use std::time::Instant;

use crate::config::FloodConfig;

/// Sliding-window flood detector and warning cooldown for one user.
#[derive(Debug, Clone)]
pub struct FloodController {
    config: FloodConfig,
    /// Recent message timestamps, arrival order.
    timestamps: VecDeque<Instant>,
    /// When set, the user counts as warned until this instant.
    warned_until: Option<Instant>,
}

impl FloodController {
    pub fn new(config: FloodConfig) -> Self {
        Self { config, timestamps: VecDeque::new(), warned_until: None }
    }

    /// Record one inbound message at `now`.
    pub fn record_message(&mut self, now: Instant) {
        self.prune(now);
        self.timestamps.push_back(now);
    }

    /// True iff strictly more than `msgs_per_sec × window` messages
    /// remain inside the window ending at `now`.
    pub fn is_flooding(&mut self, now: Instant) -> bool {
        self.prune(now);
        self.timestamps.len() > self.config.max_messages_in_window()
    }

    /// Mark the user as warned.  A pending warning deadline is
    /// superseded; only the latest one is honored.
    pub fn mark_warned(&mut self, now: Instant) {
        self.warned_until = Some(now + self.config.warning_timeout());
    }

    /// True while the warning deadline has not passed.  The first check
    /// at or after the deadline clears it for good.
    pub fn is_warned(&mut self, now: Instant) -> bool {
        match self.warned_until {
            Some(deadline) if now < deadline => true,
            Some(_) => {
                self.warned_until = None;
                false
            }
            None => false,
        }
    }

    /// Messages currently inside the window (after pruning at `now`).
    pub fn recent_message_count(&mut self, now: Instant) -> usize {
        self.prune(now);
        self.timestamps.len()
    }

    /// Drop timestamps that fell out of the detection window.  Always
    /// relative to the single `now` of the enclosing operation.
    fn prune(&mut self, now: Instant) {
        let window = self.config.detection_window();
        while let Some(&oldest) = self.timestamps.front() {
            if oldest + window > now {
                break;
            }
            self.timestamps.pop_front();
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
