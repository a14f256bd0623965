//! `SpeedA`: the client may never be meaningfully faster horizontally than
//! the simulated twin. Corrections keep the twin anchored, so sustained
//! horizontal divergence can only come from client-side acceleration.

use crate::config::{MovementConfig, Thresholds};
use crate::detection::{
    DEFAULT_PASS, Detection, DetectionCtx, DetectionKind, DetectionState, pass,
};
use crate::player::movement_state::MovementState;
use crate::simulation::correction::CorrectionHandler;

/// Horizontal divergence check.
#[derive(Debug)]
pub struct SpeedA {
    state: DetectionState,
    tolerance: f64,
}

impl SpeedA {
    /// Builds the detector from movement tuning.
    #[must_use]
    pub const fn new(config: &MovementConfig) -> Self {
        Self {
            state: DetectionState::new(Thresholds {
                max_buffer: 8.0,
                fail_buffer: 4.0,
                max_violations: 10.0,
                trust_duration: 40,
            }),
            tolerance: config.speed_tolerance,
        }
    }

    /// Compares client and twin horizontally after a simulated tick.
    pub fn on_tick_check(
        &mut self,
        ctx: &mut DetectionCtx<'_>,
        movement: &MovementState,
        correction: &CorrectionHandler,
    ) {
        if !super::checks_active(movement, correction) {
            return;
        }

        let offset = movement.client.position - movement.auth.position;
        let divergence = offset.horizontal_length();
        if divergence > self.tolerance {
            let excess = divergence - self.tolerance;
            let extra = (excess * 4.0).clamp(1.0, 3.0);
            ctx.flag(self, extra, vec![("divergence", format!("{divergence:.4}"))]);
        } else {
            pass(&mut self.state, DEFAULT_PASS);
        }
    }
}

impl Detection for SpeedA {
    fn name(&self) -> &'static str {
        "SpeedA"
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
    use warden_utils::math::Vector3;

    fn run(detector: &mut SpeedA, movement: &MovementState, correction: &CorrectionHandler) {
        let mut cancellation = CancellationState::new();
        let mut ctx = DetectionCtx {
            tick: 100,
            player_name: "steve",
            sink: &NullSink,
            cancellation: &mut cancellation,
        };
        detector.on_tick_check(&mut ctx, movement, correction);
    }

    #[test]
    fn divergent_client_accumulates() {
        let mut detector = SpeedA::new(&MovementConfig::default());
        let mut movement = MovementState::new(Vector3::new(0.0, 64.0, 0.0));
        movement.client.position = Vector3::new(0.8, 64.0, 0.0);
        run(&mut detector, &movement, &CorrectionHandler::default());
        assert!(detector.state().buffer > 0.0);
    }

    #[test]
    fn aligned_client_passes() {
        let mut detector = SpeedA::new(&MovementConfig::default());
        let mut movement = MovementState::new(Vector3::new(0.0, 64.0, 0.0));
        movement.client.position = Vector3::new(0.1, 64.0, 0.0);
        detector.state.buffer = 1.0;
        run(&mut detector, &movement, &CorrectionHandler::default());
        assert!((detector.state().buffer - 0.9).abs() < 1e-9);
    }

    #[test]
    fn correction_cooldown_suppresses_the_check() {
        let mut detector = SpeedA::new(&MovementConfig::default());
        let mut movement = MovementState::new(Vector3::new(0.0, 64.0, 0.0));
        movement.client.position = Vector3::new(5.0, 64.0, 0.0);
        let mut correction = CorrectionHandler::default();
        correction.send_correction(&movement.auth);
        run(&mut detector, &movement, &correction);
        assert!(detector.state().buffer.abs() < f64::EPSILON);
    }

    #[test]
    fn unreliable_simulation_suppresses_the_check() {
        let mut detector = SpeedA::new(&MovementConfig::default());
        let mut movement = MovementState::new(Vector3::new(0.0, 64.0, 0.0));
        movement.client.position = Vector3::new(5.0, 64.0, 0.0);
        movement.simulation_reliable = false;
        run(&mut detector, &movement, &CorrectionHandler::default());
        assert!(detector.state().buffer.abs() < f64::EPSILON);
    }
}
