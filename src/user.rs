//! Per-user session state.
//!
//! One record per user per channel, created on first observed activity
//! and owned exclusively by the session that created it — if concurrent
//! message arrival for one user is possible, serializing access is the
//! calling layer's job.

use std::time::Instant;

use crate::config::FloodConfig;
use crate::effects::{EffectInsert, EffectSlots};
use crate::flood::FloodController;

/// Mutable per-user record: active effects, flood state, cooldowns.
#[derive(Debug, Clone)]
pub struct UserState {
    pub effects: EffectSlots,
    pub flood: FloodController,
    /// A fresh user waits out a cooldown before attacking.
    pub last_attack: Instant,
    /// Last time this user was hit by a flooder attack.
    pub last_shelling: Instant,
    pub is_shadowmuted: bool,
}

impl UserState {
    /// `now` is the creation instant; both attack cooldowns start from it.
    pub fn new(now: Instant, flood_config: FloodConfig) -> Self {
        Self {
            effects: EffectSlots::new(),
            flood: FloodController::new(flood_config),
            last_attack: now,
            last_shelling: now,
            is_shadowmuted: false,
        }
    }

    /// Record an inbound message for flood tracking.
    pub fn log_msg(&mut self, now: Instant) {
        self.flood.record_message(now);
    }

    pub fn add_effect(&mut self, insert: impl Into<EffectInsert>) {
        self.effects.add(insert);
    }
}
