//! `PhaseA`: the client-reported bounding box must never sit inside solid
//! collision geometry. Phase/clip cheats report positions inside walls that
//! the collision pass would have rejected.

use crate::config::Thresholds;
use crate::detection::{
    DEFAULT_PASS, Detection, DetectionCtx, DetectionKind, DetectionState, pass,
};
use crate::interface::WorldQuery;
use crate::player::movement_state::MovementState;
use crate::simulation::collisions::has_collision;
use crate::simulation::player_box;

/// Shrink applied to the probe box so grazing contact with a wall face does
/// not read as penetration.
const PROBE_SHRINK: f64 = 0.03;

/// Inside-solid-geometry check.
#[derive(Debug)]
pub struct PhaseA {
    state: DetectionState,
}

impl PhaseA {
    /// Builds the detector.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: DetectionState::new(Thresholds {
                max_buffer: 6.0,
                fail_buffer: 3.0,
                max_violations: 10.0,
                trust_duration: 40,
            }),
        }
    }

    /// Probes the client position against world collision. Players the
    /// server itself knows to be stuck (piston push, sand) are exempt.
    pub fn on_input(
        &mut self,
        ctx: &mut DetectionCtx<'_>,
        movement: &MovementState,
        world: &dyn WorldQuery,
    ) {
        if movement.no_clip || movement.stuck_in_collider || !movement.simulation_reliable {
            return;
        }
        let pos = movement.client.position;
        if !world.is_chunk_loaded(pos.x.floor() as i32, pos.z.floor() as i32) {
            return;
        }

        let probe = player_box(pos).shrink(PROBE_SHRINK);
        if has_collision(world, &probe) {
            let debug = vec![(
                "position",
                format!("({:.2}, {:.2}, {:.2})", pos.x, pos.y, pos.z),
            )];
            ctx.flag(self, 1.0, debug);
        } else {
            pass(&mut self.state, DEFAULT_PASS);
        }
    }
}

impl Default for PhaseA {
    fn default() -> Self {
        Self::new()
    }
}

impl Detection for PhaseA {
    fn name(&self) -> &'static str {
        "PhaseA"
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
    use crate::test_world::FlatWorld;
    use warden_utils::math::Vector3;

    fn run(detector: &mut PhaseA, movement: &MovementState, world: &FlatWorld) {
        let mut cancellation = CancellationState::new();
        let mut ctx = DetectionCtx {
            tick: 100,
            player_name: "steve",
            sink: &NullSink,
            cancellation: &mut cancellation,
        };
        detector.on_input(&mut ctx, movement, world);
    }

    #[test]
    fn standing_on_ground_passes() {
        let world = FlatWorld::new(63);
        let mut detector = PhaseA::new();
        let mut movement = MovementState::new(Vector3::new(0.5, 64.0, 0.5));
        movement.client.position = Vector3::new(0.5, 64.0, 0.5);
        run(&mut detector, &movement, &world);
        assert!(detector.state().buffer.abs() < f64::EPSILON);
    }

    #[test]
    fn client_inside_the_floor_accumulates() {
        let world = FlatWorld::new(63);
        let mut detector = PhaseA::new();
        let mut movement = MovementState::new(Vector3::new(0.5, 64.0, 0.5));
        movement.client.position = Vector3::new(0.5, 63.0, 0.5);
        run(&mut detector, &movement, &world);
        assert!((detector.state().buffer - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stuck_players_are_exempt() {
        let world = FlatWorld::new(63);
        let mut detector = PhaseA::new();
        let mut movement = MovementState::new(Vector3::new(0.5, 63.0, 0.5));
        movement.client.position = Vector3::new(0.5, 63.0, 0.5);
        movement.stuck_in_collider = true;
        run(&mut detector, &movement, &world);
        assert!(detector.state().buffer.abs() < f64::EPSILON);
    }
}
