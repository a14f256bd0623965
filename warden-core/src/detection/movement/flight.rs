//! `FlightA`: sustained upward divergence from the twin. Gravity is not
//! negotiable; a client holding itself above the simulated position is
//! generating lift the server never granted.

use crate::config::{MovementConfig, Thresholds};
use crate::detection::{
    DEFAULT_PASS, Detection, DetectionCtx, DetectionKind, DetectionState, pass,
};
use crate::player::movement_state::MovementState;
use crate::simulation::correction::CorrectionHandler;

/// Vertical divergence check.
#[derive(Debug)]
pub struct FlightA {
    state: DetectionState,
    tolerance: f64,
}

impl FlightA {
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
            tolerance: config.flight_tolerance,
        }
    }

    /// Compares client and twin vertically after a simulated tick. Only
    /// upward divergence counts; falling behind the twin is lag, not lift.
    pub fn on_tick_check(
        &mut self,
        ctx: &mut DetectionCtx<'_>,
        movement: &MovementState,
        correction: &CorrectionHandler,
    ) {
        if !super::checks_active(movement, correction)
            || movement.climbing
            || movement.gliding
            || movement.swimming
        {
            return;
        }

        let rise = movement.client.position.y - movement.auth.position.y;
        if rise > self.tolerance {
            let extra = ((rise - self.tolerance) * 4.0).clamp(1.0, 3.0);
            let debug = vec![
                ("rise", format!("{rise:.4}")),
                ("claims_ground", movement.client.on_ground.to_string()),
            ];
            ctx.flag(self, extra, debug);
        } else {
            pass(&mut self.state, DEFAULT_PASS);
        }
    }
}

impl Detection for FlightA {
    fn name(&self) -> &'static str {
        "FlightA"
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

    fn run(detector: &mut FlightA, movement: &MovementState) {
        let mut cancellation = CancellationState::new();
        let mut ctx = DetectionCtx {
            tick: 100,
            player_name: "steve",
            sink: &NullSink,
            cancellation: &mut cancellation,
        };
        detector.on_tick_check(&mut ctx, movement, &CorrectionHandler::default());
    }

    #[test]
    fn hovering_client_accumulates() {
        let mut detector = FlightA::new(&MovementConfig::default());
        let mut movement = MovementState::new(Vector3::new(0.0, 64.0, 0.0));
        movement.client.position = Vector3::new(0.0, 65.0, 0.0);
        run(&mut detector, &movement);
        assert!(detector.state().buffer > 0.0);
    }

    #[test]
    fn lagging_client_is_fine() {
        let mut detector = FlightA::new(&MovementConfig::default());
        let mut movement = MovementState::new(Vector3::new(0.0, 64.0, 0.0));
        movement.client.position = Vector3::new(0.0, 62.0, 0.0);
        run(&mut detector, &movement);
        assert!(detector.state().buffer.abs() < f64::EPSILON);
    }

    #[test]
    fn climbing_is_exempt() {
        let mut detector = FlightA::new(&MovementConfig::default());
        let mut movement = MovementState::new(Vector3::new(0.0, 64.0, 0.0));
        movement.client.position = Vector3::new(0.0, 65.0, 0.0);
        movement.climbing = true;
        run(&mut detector, &movement);
        assert!(detector.state().buffer.abs() < f64::EPSILON);
    }
}
