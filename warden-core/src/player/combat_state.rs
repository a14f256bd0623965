//! Combat component: swing timing, the per-tick attacked set, and the
//! lag-compensated hit validation the reach/hitbox checks are built on.

use rustc_hash::FxHashSet;
use warden_utils::math::{TRIG_TABLES, Vector3, lerp_vec};

use crate::player::entity_tracker::{EntityTracker, TrackedEntity};

/// Eye height above the feet position for a standing player.
pub const EYE_HEIGHT: f64 = 1.62;

/// Unit look vector from yaw/pitch in degrees, using the engine trig tables
/// so the direction matches what the client aimed with.
#[must_use]
pub fn look_vector(yaw: f32, pitch: f32) -> Vector3<f64> {
    let yaw_rad = yaw.to_radians();
    let pitch_rad = pitch.to_radians();
    let cos_pitch = f64::from(TRIG_TABLES.cos(pitch_rad));
    Vector3::new(
        -f64::from(TRIG_TABLES.sin(yaw_rad)) * cos_pitch,
        -f64::from(TRIG_TABLES.sin(pitch_rad)),
        f64::from(TRIG_TABLES.cos(yaw_rad)) * cos_pitch,
    )
}

/// Min/max ray-hit distances across the interpolation steps that hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReachSample {
    /// Shortest hit distance.
    pub min: f64,
    /// Longest hit distance.
    pub max: f64,
}

/// Casts a ray from `eye` along `look` against the target's bounding box
/// interpolated across `steps` positions between its previous and current
/// recorded position. Returns `None` when no step intersects.
#[must_use]
pub fn raycast_reach(
    eye: &Vector3<f64>,
    look: &Vector3<f64>,
    target: &TrackedEntity,
    steps: u32,
) -> Option<ReachSample> {
    let mut sample: Option<ReachSample> = None;
    for i in 0..=steps {
        let t = f64::from(i) / f64::from(steps.max(1));
        let center = lerp_vec(t, &target.prev_position, &target.position);
        if let Some(distance) = target.box_at(center).ray_distance(eye, look) {
            sample = Some(match sample {
                None => ReachSample {
                    min: distance,
                    max: distance,
                },
                Some(s) => ReachSample {
                    min: s.min.min(distance),
                    max: s.max.max(distance),
                },
            });
        }
    }
    sample
}

/// The cheaper variant: minimum closest-point distance from `eye` to the
/// interpolated boxes, no ray involved.
#[must_use]
pub fn closest_point_reach(eye: &Vector3<f64>, target: &TrackedEntity, steps: u32) -> f64 {
    let mut min = f64::INFINITY;
    for i in 0..=steps {
        let t = f64::from(i) / f64::from(steps.max(1));
        let center = lerp_vec(t, &target.prev_position, &target.position);
        min = min.min(target.box_at(center).distance_to_point(eye));
    }
    min
}

/// Per-player combat component.
#[derive(Debug)]
pub struct CombatState {
    /// Tick of the last arm swing, if any swing was seen yet.
    pub last_swing_tick: Option<u64>,
    /// Entity ids attacked during the current tick. Cleared every tick.
    pub attacked_this_tick: FxHashSet<u64>,
    /// Reach distance computed by the last validated hit.
    pub last_reach_distance: Option<f64>,
    /// Tracked entities visible to this player.
    pub tracker: EntityTracker,
}

impl CombatState {
    /// Fresh combat state with an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_swing_tick: None,
            attacked_this_tick: FxHashSet::default(),
            last_reach_distance: None,
            tracker: EntityTracker::new(),
        }
    }

    /// Records an arm swing.
    pub fn on_swing(&mut self, tick: u64) {
        self.last_swing_tick = Some(tick);
    }

    /// Clears per-tick transient data. Called at every tick boundary.
    pub fn begin_tick(&mut self) {
        self.attacked_this_tick.clear();
    }

    /// Registers an attack on `target`. Returns false when the same target
    /// was already attacked this tick (duplicate hit packets).
    pub fn register_attack(&mut self, target: u64) -> bool {
        self.attacked_this_tick.insert(target)
    }

    /// Ticks since the last swing, if one was seen.
    #[must_use]
    pub fn ticks_since_swing(&self, current_tick: u64) -> Option<u64> {
        self.last_swing_tick
            .map(|swing| current_tick.saturating_sub(swing))
    }
}

impl Default for CombatState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target_moving_x() -> TrackedEntity {
        let mut tracker = EntityTracker::new();
        tracker.add_entity(
            1,
            Vector3::new(0.0, 64.0, 3.0),
            Vector3::new(0.3, 0.9, 0.3),
            true,
        );
        tracker.update_entity(1, Vector3::new(0.5, 64.0, 3.0), 10, false);
        tracker.get(1).expect("tracked").clone()
    }

    #[test]
    fn look_vector_is_unit_length() {
        for (yaw, pitch) in [(0.0, 0.0), (90.0, 30.0), (-135.0, -60.0)] {
            let v = look_vector(yaw, pitch);
            assert!((v.length() - 1.0).abs() < 1e-3, "({yaw},{pitch}): {v:?}");
        }
    }

    #[test]
    fn straight_look_points_positive_z() {
        let v = look_vector(0.0, 0.0);
        assert!(v.z > 0.99);
        assert!(v.x.abs() < 1e-3 && v.y.abs() < 1e-3);
    }

    #[test]
    fn raycast_reach_hits_target_ahead() {
        let target = target_moving_x();
        let eye = Vector3::new(0.0, 64.0, 0.0);
        let look = Vector3::new(0.0, 0.0, 1.0);
        let sample = raycast_reach(&eye, &look, &target, 20).expect("hit");
        assert!(sample.min <= sample.max);
        assert!(sample.min > 2.0 && sample.min < 3.0);
    }

    #[test]
    fn raycast_reach_misses_behind() {
        let target = target_moving_x();
        let eye = Vector3::new(0.0, 64.0, 0.0);
        let look = Vector3::new(0.0, 0.0, -1.0);
        assert!(raycast_reach(&eye, &look, &target, 20).is_none());
    }

    #[test]
    fn closest_point_reach_tracks_interpolation() {
        let target = target_moving_x();
        let eye = Vector3::new(0.0, 64.5, 0.0);
        let d = closest_point_reach(&eye, &target, 10);
        // Box front face sits at z = 2.7; eye is inside the y-range.
        assert!(d < 2.75, "got {d}");
    }

    #[test]
    fn attacked_set_deduplicates_within_tick() {
        let mut combat = CombatState::new();
        assert!(combat.register_attack(5));
        assert!(!combat.register_attack(5));
        combat.begin_tick();
        assert!(combat.register_attack(5));
    }
}
