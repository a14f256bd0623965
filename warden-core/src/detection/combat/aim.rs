//! `AimA`: mouse-driven yaw deltas carry sensor noise deep into the decimal
//! places. Aim-assist code that snaps rotations to coarse increments produces
//! deltas that survive rounding to one decimal place unchanged.

use warden_utils::math::wrap_degrees;

use crate::config::{CombatConfig, Thresholds};
use crate::detection::{
    DEFAULT_PASS, Detection, DetectionCtx, DetectionKind, DetectionState, pass,
};
use crate::interface::InputMode;
use crate::player::movement_state::MovementState;

/// Minimum yaw delta worth inspecting. Idle rotations are all zeros.
const MIN_DELTA: f64 = 1.0e-4;

/// Rotation-quantization check.
#[derive(Debug)]
pub struct AimA {
    state: DetectionState,
    rounding_epsilon: f64,
}

impl AimA {
    /// Builds the detector from combat tuning.
    #[must_use]
    pub const fn new(config: &CombatConfig) -> Self {
        Self {
            state: DetectionState::new(Thresholds {
                max_buffer: 10.0,
                fail_buffer: 6.0,
                max_violations: 10.0,
                trust_duration: 40,
            }),
            rounding_epsilon: config.aim_rounding_epsilon,
        }
    }

    /// Inspects the rotation delta of one input packet. Only mouse input has
    /// the noise expectation; collisions jerk the camera and are exempt.
    pub fn on_input(
        &mut self,
        ctx: &mut DetectionCtx<'_>,
        movement: &MovementState,
        input_mode: InputMode,
    ) {
        if input_mode != InputMode::Mouse || !movement.collisions.is_empty() {
            return;
        }

        let delta = f64::from(wrap_degrees(movement.yaw - movement.prev_yaw)).abs();
        if delta < MIN_DELTA || delta > 20.0 {
            return;
        }

        let coarse = round_to(delta, 1);
        let fine = round_to(delta, 5);
        if (coarse - fine).abs() < self.rounding_epsilon {
            ctx.flag(self, 1.0, vec![("delta", format!("{delta:.6}"))]);
        } else {
            pass(&mut self.state, DEFAULT_PASS);
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10.0f64.powi(decimals);
    (value * scale).round() / scale
}

impl Detection for AimA {
    fn name(&self) -> &'static str {
        "AimA"
    }

    fn kind(&self) -> DetectionKind {
        DetectionKind::Combat
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
    use crate::player::movement_state::CollisionFlags;
    use warden_utils::math::Vector3;

    fn movement_with_delta(delta: f32) -> MovementState {
        let mut m = MovementState::new(Vector3::ZERO);
        m.prev_yaw = 10.0;
        m.yaw = 10.0 + delta;
        m
    }

    fn run(detector: &mut AimA, movement: &MovementState, mode: InputMode) {
        let mut cancellation = CancellationState::new();
        let mut ctx = DetectionCtx {
            tick: 100,
            player_name: "steve",
            sink: &NullSink,
            cancellation: &mut cancellation,
        };
        detector.on_input(&mut ctx, movement, mode);
    }

    #[test]
    fn quantized_delta_accumulates() {
        let mut detector = AimA::new(&CombatConfig::default());
        // Exactly 3.1 degrees survives both roundings.
        run(&mut detector, &movement_with_delta(3.1), InputMode::Mouse);
        assert!((detector.state().buffer - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn noisy_delta_passes() {
        let mut detector = AimA::new(&CombatConfig::default());
        run(&mut detector, &movement_with_delta(3.140_87), InputMode::Mouse);
        assert!(detector.state().buffer.abs() < f64::EPSILON);
    }

    #[test]
    fn controller_input_is_exempt() {
        let mut detector = AimA::new(&CombatConfig::default());
        run(&mut detector, &movement_with_delta(3.1), InputMode::Gamepad);
        assert!(detector.state().buffer.abs() < f64::EPSILON);
    }

    #[test]
    fn collision_ticks_are_exempt() {
        let mut detector = AimA::new(&CombatConfig::default());
        let mut movement = movement_with_delta(3.1);
        movement.collisions = CollisionFlags::X;
        run(&mut detector, &movement, InputMode::Mouse);
        assert!(detector.state().buffer.abs() < f64::EPSILON);
    }
}
