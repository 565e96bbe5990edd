//! Playback position extrapolation and the debounced seek accumulator.

use chrono::{DateTime, Utc};
use std::time::Duration;

use super::timer::{SingleSlotTimer, TimerTicket};
use crate::api::{EntityState, PlayerStatus};

/// Position in seconds the player has reached at `now`.
///
/// Only a playing player advances; otherwise the reported position is
/// returned as is. Clock skew between host and browser can put the update
/// timestamp in the future, so the result never goes below zero.
pub fn current_progress(state: &EntityState, now: DateTime<Utc>) -> f64 {
    let reported = state.attributes.media_position.unwrap_or(0.0);
    if state.state != PlayerStatus::Playing {
        return reported;
    }

    let Some(updated_at) = state.attributes.media_position_updated_at else {
        return reported.max(0.0);
    };
    let elapsed_ms = (now - updated_at).num_milliseconds() as f64;
    (reported + elapsed_ms / 1000.0).max(0.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeekCommand {
    pub target_id: String,
    pub position_secs: f64,
}

/// Collects seek steps and releases them as one command after a quiet period.
#[derive(Debug, Default)]
pub struct SeekAccumulator {
    delta_secs: f64,
    timer: SingleSlotTimer,
}

impl SeekAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_delta(&self) -> f64 {
        self.delta_secs
    }

    pub fn is_pending(&self) -> bool {
        self.timer.is_pending()
    }

    /// Adds `step` seconds (negative seeks backward) and restarts the quiet
    /// period.
    pub fn push(&mut self, step: f64, now: DateTime<Utc>, quiet: Duration) -> TimerTicket {
        self.delta_secs += step;
        self.timer.schedule(now, quiet)
    }

    /// Drops the pending seek without sending anything.
    pub fn cancel(&mut self) {
        self.timer.cancel();
        self.delta_secs = 0.0;
    }

    /// Releases the command for `ticket` if it is still the pending one.
    pub fn claim(
        &mut self,
        ticket: TimerTicket,
        target_id: &str,
        state: Option<&EntityState>,
        now: DateTime<Utc>,
    ) -> Option<SeekCommand> {
        if !self.timer.claim(ticket) {
            return None;
        }
        self.release(target_id, state, now)
    }

    /// Releases the command if the quiet period has elapsed at `now`.
    pub fn poll(
        &mut self,
        target_id: &str,
        state: Option<&EntityState>,
        now: DateTime<Utc>,
    ) -> Option<SeekCommand> {
        self.timer.fire_if_due(now)?;
        self.release(target_id, state, now)
    }

    fn release(
        &mut self,
        target_id: &str,
        state: Option<&EntityState>,
        now: DateTime<Utc>,
    ) -> Option<SeekCommand> {
        let delta = std::mem::take(&mut self.delta_secs);
        let Some(state) = state else {
            tracing::debug!(target_id = %target_id, "player state vanished, dropping pending seek");
            return None;
        };

        let mut position = current_progress(state, now) + delta;
        if let Some(duration) = state.attributes.media_duration {
            position = position.min(duration);
        }
        Some(SeekCommand {
            target_id: target_id.to_string(),
            position_secs: position.max(0.0),
        })
    }
}
