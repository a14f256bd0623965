//! Decides when the client has drifted far enough from the authoritative
//! twin to force a resync, and runs the cooldown that keeps detectors quiet
//! while the client digests a correction.

use warden_utils::math::Vector3;

use crate::interface::CorrectionPayload;
use crate::player::movement_state::AuthoritativeState;

/// Default divergence (blocks) that forces a correction.
pub const DEFAULT_THRESHOLD: f64 = 0.1;
/// Default post-correction cooldown in ticks.
pub const DEFAULT_COOLDOWN: u64 = 20;
/// Ticks after a teleport during which corrections are suppressed.
const TELEPORT_GRACE: u64 = 20;

/// Per-player correction state.
#[derive(Debug, Clone)]
pub struct CorrectionHandler {
    threshold: f64,
    cooldown: u64,
    /// Corrections sent but not yet acknowledged by the client.
    pending: u32,
    /// Ticks since the last correction was sent.
    ticks_since_correction: u64,
    /// Remaining teleport grace ticks.
    teleport_grace: u64,
}

impl CorrectionHandler {
    /// Handler with explicit threshold and cooldown.
    #[must_use]
    pub const fn new(threshold: f64, cooldown: u64) -> Self {
        Self {
            threshold,
            cooldown,
            pending: 0,
            ticks_since_correction: u64::MAX,
            teleport_grace: 0,
        }
    }

    /// Whether the divergence between `server` and `client` warrants a
    /// resync. Always false during teleport grace, while a correction is
    /// still unacknowledged and during the cooldown, so a stubborn client
    /// is re-corrected at a bounded rate rather than every tick.
    #[must_use]
    pub fn should_correct(&self, server: &Vector3<f64>, client: &Vector3<f64>) -> bool {
        if self.teleport_grace > 0 || self.pending > 0 || self.is_in_cooldown() {
            return false;
        }
        server.distance_sq(client) > self.threshold * self.threshold
    }

    /// Emits a resync instruction from the authoritative twin and starts the
    /// cooldown.
    pub fn send_correction(&mut self, auth: &AuthoritativeState) -> CorrectionPayload {
        self.pending += 1;
        self.ticks_since_correction = 0;
        log::debug!(
            "sending position correction to ({:.3}, {:.3}, {:.3}), {} pending",
            auth.position.x,
            auth.position.y,
            auth.position.z,
            self.pending
        );
        CorrectionPayload {
            position: auth.position,
            velocity: auth.velocity,
            on_ground: auth.on_ground,
        }
    }

    /// Client acknowledged a correction.
    pub const fn on_correction_ack(&mut self) {
        self.pending = self.pending.saturating_sub(1);
    }

    /// Starts teleport grace; corrections would chase a client that is
    /// still flying toward the teleport target.
    pub const fn on_teleport(&mut self) {
        self.teleport_grace = TELEPORT_GRACE;
    }

    /// Whether detectors should stay quiet: client state is transiently
    /// stale right after a resync.
    #[must_use]
    pub const fn is_in_cooldown(&self) -> bool {
        self.ticks_since_correction < self.cooldown
    }

    /// Corrections awaiting acknowledgement.
    #[must_use]
    pub const fn pending(&self) -> u32 {
        self.pending
    }

    /// Advances the age counters one tick.
    pub const fn on_tick(&mut self) {
        self.ticks_since_correction = self.ticks_since_correction.saturating_add(1);
        self.teleport_grace = self.teleport_grace.saturating_sub(1);
    }
}

impl Default for CorrectionHandler {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, DEFAULT_COOLDOWN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_at(x: f64) -> AuthoritativeState {
        AuthoritativeState::at(Vector3::new(x, 64.0, 0.0))
    }

    #[test]
    fn corrects_only_past_threshold() {
        let handler = CorrectionHandler::default();
        let server = Vector3::new(0.0, 64.0, 0.0);
        assert!(!handler.should_correct(&server, &Vector3::new(0.05, 64.0, 0.0)));
        assert!(handler.should_correct(&server, &Vector3::new(0.2, 64.0, 0.0)));
    }

    #[test]
    fn pending_correction_suppresses_new_ones() {
        let mut handler = CorrectionHandler::default();
        let server = Vector3::new(0.0, 64.0, 0.0);
        let client = Vector3::new(5.0, 64.0, 0.0);
        assert!(handler.should_correct(&server, &client));
        let payload = handler.send_correction(&auth_at(0.0));
        assert!((payload.position.x).abs() < f64::EPSILON);
        assert!(!handler.should_correct(&server, &client));

        // Even acknowledged, a fresh correction holds the cooldown.
        handler.on_correction_ack();
        assert!(!handler.should_correct(&server, &client));
        for _ in 0..20 {
            handler.on_tick();
        }
        assert!(handler.should_correct(&server, &client));
    }

    #[test]
    fn cooldown_expires_after_configured_ticks() {
        let mut handler = CorrectionHandler::new(0.1, 20);
        assert!(!handler.is_in_cooldown());
        handler.send_correction(&auth_at(0.0));
        assert!(handler.is_in_cooldown());
        for _ in 0..19 {
            handler.on_tick();
            assert!(handler.is_in_cooldown());
        }
        handler.on_tick();
        assert!(!handler.is_in_cooldown());
    }

    #[test]
    fn teleport_grace_suppresses_corrections() {
        let mut handler = CorrectionHandler::default();
        handler.on_teleport();
        let server = Vector3::new(0.0, 64.0, 0.0);
        let client = Vector3::new(9.0, 64.0, 0.0);
        assert!(!handler.should_correct(&server, &client));
        for _ in 0..20 {
            handler.on_tick();
        }
        assert!(handler.should_correct(&server, &client));
    }
}
