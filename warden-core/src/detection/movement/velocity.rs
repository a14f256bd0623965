//! `VelocityA`: after a knockback with a clear vertical component, the client
//! has to show at least a fraction of it within a few ticks. Anti-knockback
//! clients swallow the velocity packet and stay planted.

use crate::config::{MovementConfig, Thresholds};
use crate::detection::{
    DEFAULT_PASS, Detection, DetectionCtx, DetectionKind, DetectionState, pass,
};
use crate::player::movement_state::{CollisionFlags, MovementState};

/// Vertical knockback below this is too small to measure reliably.
const MIN_MEASURABLE_KB: f64 = 0.1;

/// Knockback-response check.
#[derive(Debug)]
pub struct VelocityA {
    state: DetectionState,
    min_response: f64,
    window: u32,
    tracking: bool,
    best_ratio: f64,
}

impl VelocityA {
    /// Builds the detector from movement tuning.
    #[must_use]
    pub const fn new(config: &MovementConfig) -> Self {
        Self {
            state: DetectionState::new(Thresholds {
                max_buffer: 6.0,
                fail_buffer: 3.0,
                max_violations: 10.0,
                trust_duration: 40,
            }),
            min_response: config.velocity_min_response,
            window: config.velocity_window,
            tracking: false,
            best_ratio: 0.0,
        }
    }

    /// Observes one tick of the client's reaction to a pending knockback.
    /// The best (largest) vertical response across the window is compared
    /// against the minimum acceptable fraction once the window closes.
    ///
    /// Unlike the divergence checks, this one stays live through the
    /// correction cooldown: a client eating knockback diverges immediately
    /// and would otherwise hide behind the corrections it provokes. Only
    /// the client's own reported deltas are measured, so corrections do not
    /// contaminate the reading.
    pub fn on_tick_check(&mut self, ctx: &mut DetectionCtx<'_>, movement: &MovementState) {
        let Some(kb) = movement.knockback else {
            self.tracking = false;
            return;
        };
        if kb.velocity.y < MIN_MEASURABLE_KB || kb.age == 0 {
            return;
        }
        if !movement.simulation_reliable
            || movement.teleport.is_some()
            || movement.flying
            || movement.no_clip
        {
            self.tracking = false;
            return;
        }
        // A ceiling hit legitimately kills the vertical response.
        if kb.age > 1 && movement.collisions.contains(CollisionFlags::Y) {
            self.tracking = false;
            return;
        }

        if kb.age == 1 {
            self.tracking = true;
            self.best_ratio = 0.0;
        }
        if !self.tracking {
            return;
        }

        let observed = movement.client.position.y - movement.client.prev_position.y;
        self.best_ratio = self.best_ratio.max(observed / kb.velocity.y);

        if kb.age >= self.window {
            self.tracking = false;
            if self.best_ratio < self.min_response {
                let debug = vec![
                    ("ratio", format!("{:.3}", self.best_ratio)),
                    ("expected_y", format!("{:.3}", kb.velocity.y)),
                ];
                ctx.flag(self, 2.0, debug);
            } else {
                pass(&mut self.state, DEFAULT_PASS);
            }
        }
    }
}

impl Detection for VelocityA {
    fn name(&self) -> &'static str {
        "VelocityA"
    }

    fn kind(&self) -> DetectionKind {
        DetectionKind::Movement
    }

    fn state(&self) -> &DetectionState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut DetectionState {
        &mut self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::NullSink;
    use crate::player::cancellation::CancellationState;
    use crate::player::movement_state::Knockback;
    use warden_utils::math::Vector3;

    fn run_window(detector: &mut VelocityA, response_per_tick: f64) {
        let mut movement = MovementState::new(Vector3::new(0.0, 64.0, 0.0));
        let mut y = 64.0;
        for age in 1..=6u32 {
            movement.knockback = Some(Knockback {
                velocity: Vector3::new(0.0, 0.4, 0.0),
                age,
            });
            movement.client.prev_position = Vector3::new(0.0, y, 0.0);
            y += response_per_tick;
            movement.client.position = Vector3::new(0.0, y, 0.0);

            let mut cancellation = CancellationState::new();
            let mut ctx = DetectionCtx {
                tick: 100 + u64::from(age),
                player_name: "steve",
                sink: &NullSink,
                cancellation: &mut cancellation,
            };
            detector.on_tick_check(&mut ctx, &movement);
        }
    }

    #[test]
    fn ignored_knockback_accumulates() {
        let mut detector = VelocityA::new(&MovementConfig::default());
        run_window(&mut detector, 0.0);
        assert!((detector.state().buffer - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn honest_response_passes() {
        let mut detector = VelocityA::new(&MovementConfig::default());
        // 0.3 blocks up in one tick is 75% of the expected 0.4.
        run_window(&mut detector, 0.3);
        assert!(detector.state().buffer.abs() < f64::EPSILON);
    }

    #[test]
    fn no_knockback_means_no_check() {
        let mut detector = VelocityA::new(&MovementConfig::default());
        let movement = MovementState::new(Vector3::ZERO);
        let mut cancellation = CancellationState::new();
        let mut ctx = DetectionCtx {
            tick: 100,
            player_name: "steve",
            sink: &NullSink,
            cancellation: &mut cancellation,
        };
        detector.on_tick_check(&mut ctx, &movement);
        assert!(detector.state().buffer.abs() < f64::EPSILON);
    }
}
