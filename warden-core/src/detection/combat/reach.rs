//! Reach validation.
//!
//! `ReachA` casts the attacker's look ray against the target box interpolated
//! across its last movement, keeping the min and max hit distances over the
//! interpolation steps. Both have to exceed their thresholds to flag, which
//! forgives targets that were briefly far mid-interpolation. `ReachB` is the
//! cheaper closest-point variant used as a second opinion.

use warden_utils::math::Vector3;

use crate::config::{CombatConfig, Thresholds};
use crate::detection::{
    DEFAULT_PASS, Detection, DetectionCtx, DetectionKind, DetectionState, pass,
};
use crate::interface::InputMode;
use crate::player::combat_state::{EYE_HEIGHT, closest_point_reach, look_vector, raycast_reach};
use crate::player::entity_tracker::TrackedEntity;
use crate::player::movement_state::MovementState;

/// Raycast reach check.
#[derive(Debug)]
pub struct ReachA {
    state: DetectionState,
    min_threshold: f64,
    max_threshold: f64,
    steps: u32,
    teleport_grace: u64,
}

impl ReachA {
    /// Builds the detector from combat tuning.
    #[must_use]
    pub const fn new(config: &CombatConfig) -> Self {
        Self {
            state: DetectionState::new(Thresholds {
                max_buffer: 6.0,
                fail_buffer: 3.0,
                max_violations: 10.0,
                trust_duration: 40,
            }),
            min_threshold: config.reach_min,
            max_threshold: config.reach_max,
            steps: config.reach_raycast_steps,
            teleport_grace: config.reach_teleport_grace,
        }
    }

    /// Validates one attack. Touch clients aim with a different picking model
    /// and are skipped, as is any attack shortly after the target teleported.
    /// Returns the measured minimum hit distance, when the ray connected.
    pub fn on_attack(
        &mut self,
        ctx: &mut DetectionCtx<'_>,
        movement: &MovementState,
        target: &TrackedEntity,
        input_mode: InputMode,
    ) -> Option<f64> {
        if input_mode == InputMode::Touch
            || target.ticks_since_teleport(ctx.tick) < self.teleport_grace
        {
            return None;
        }

        let eye = movement.client.position + Vector3::new(0.0, EYE_HEIGHT, 0.0);
        let look = look_vector(movement.yaw, movement.pitch);
        let sample = raycast_reach(&eye, &look, target, self.steps)?;

        if sample.min > self.min_threshold && sample.max > self.max_threshold {
            let debug = vec![
                ("min", format!("{:.4}", sample.min)),
                ("max", format!("{:.4}", sample.max)),
            ];
            ctx.flag(self, 1.0, debug);
        } else {
            pass(&mut self.state, DEFAULT_PASS);
        }
        Some(sample.min)
    }
}

impl Detection for ReachA {
    fn name(&self) -> &'static str {
        "ReachA"
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

    fn is_cancellable(&self) -> bool {
        true
    }
}

/// Closest-point reach check.
#[derive(Debug)]
pub struct ReachB {
    state: DetectionState,
    threshold: f64,
    steps: u32,
}

impl ReachB {
    /// Builds the detector from combat tuning.
    #[must_use]
    pub const fn new(config: &CombatConfig) -> Self {
        Self {
            state: DetectionState::new(Thresholds {
                max_buffer: 8.0,
                fail_buffer: 4.0,
                max_violations: 10.0,
                trust_duration: 40,
            }),
            threshold: config.reach_min,
            steps: config.reach_closest_steps,
        }
    }

    /// Validates one attack: if even the closest interpolated point of the
    /// target box sits beyond the threshold, no legal aim could have hit.
    pub fn on_attack(
        &mut self,
        ctx: &mut DetectionCtx<'_>,
        movement: &MovementState,
        target: &TrackedEntity,
    ) {
        let eye = movement.client.position + Vector3::new(0.0, EYE_HEIGHT, 0.0);
        let distance = closest_point_reach(&eye, target, self.steps);
        if distance > self.threshold {
            ctx.flag(self, 1.0, vec![("distance", format!("{distance:.4}"))]);
        } else {
            pass(&mut self.state, DEFAULT_PASS);
        }
    }
}

impl Detection for ReachB {
    fn name(&self) -> &'static str {
        "ReachB"
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
