//! Axis-by-axis collision resolution with step-up.
//!
//! Movement is resolved Y first, then X, then Z, each axis clipped against
//! every candidate block box. When a grounded entity is blocked
//! horizontally, a step-up attempt re-runs the horizontal passes from a
//! position raised by up to [`STEP_HEIGHT`] and keeps the stepped trajectory
//! if it travels farther.

use smallvec::SmallVec;
use warden_utils::BlockPos;
use warden_utils::math::{Aabb, Vector3, floor};

use crate::interface::WorldQuery;
use crate::player::movement_state::CollisionFlags;

/// Maximum ledge height climbable without jumping.
pub const STEP_HEIGHT: f64 = 0.6;

type BoxList = SmallVec<[Aabb; 16]>;

/// Outcome of one collision pass.
#[derive(Debug, Clone, Copy)]
pub struct CollisionResult {
    /// Displacement actually travelled after clipping.
    pub movement: Vector3<f64>,
    /// Axes on which movement was shortened.
    pub flags: CollisionFlags,
    /// Whether the final box still overlaps a collider.
    pub penetrating: bool,
}

/// Collects world-space collision boxes of all solid blocks overlapping
/// `region`. In one-way mode, boxes already penetrated by `start` are
/// skipped so depenetration cannot catapult the entity.
pub fn collect_boxes(
    world: &dyn WorldQuery,
    region: &Aabb,
    start: &Aabb,
    one_way: bool,
) -> BoxList {
    let mut boxes = BoxList::new();
    let (x0, x1) = (floor(region.min.x) - 1, floor(region.max.x) + 1);
    let (y0, y1) = (floor(region.min.y) - 1, floor(region.max.y) + 1);
    let (z0, z1) = (floor(region.min.z) - 1, floor(region.max.z) + 1);

    for x in x0..=x1 {
        for y in y0..=y1 {
            for z in z0..=z1 {
                let pos = BlockPos::new(x, y, z);
                if !world.block_at(pos).solid {
                    continue;
                }
                for bb in world.collision_boxes(pos) {
                    if !bb.intersects(region) {
                        continue;
                    }
                    if one_way && bb.intersects(start) {
                        continue;
                    }
                    boxes.push(bb);
                }
            }
        }
    }
    boxes
}

/// Clips `velocity` axis by axis (Y, X, Z) against `boxes`, starting from
/// `start`. Returns the clipped displacement and the moved box.
fn clip_axes(boxes: &BoxList, start: &Aabb, velocity: Vector3<f64>) -> (Vector3<f64>, Aabb) {
    let mut moved = *start;

    let mut dy = velocity.y;
    for bb in boxes {
        dy = bb.clip_y_collide(&moved, dy);
    }
    moved = moved.offset(Vector3::new(0.0, dy, 0.0));

    let mut dx = velocity.x;
    for bb in boxes {
        dx = bb.clip_x_collide(&moved, dx);
    }
    moved = moved.offset(Vector3::new(dx, 0.0, 0.0));

    let mut dz = velocity.z;
    for bb in boxes {
        dz = bb.clip_z_collide(&moved, dz);
    }
    moved = moved.offset(Vector3::new(0.0, 0.0, dz));

    (Vector3::new(dx, dy, dz), moved)
}

/// Resolves one tick of movement for `start` with the given `velocity`.
///
/// `grounded` enables the step-up attempt when horizontal movement was
/// blocked; `one_way` disables depenetration push-back while the entity is
/// stuck inside a collider.
pub fn try_collisions(
    world: &dyn WorldQuery,
    start: &Aabb,
    velocity: Vector3<f64>,
    grounded: bool,
    one_way: bool,
) -> CollisionResult {
    let region = start.expand_towards(velocity).grow_xyz(0.0, STEP_HEIGHT, 0.0);
    let boxes = collect_boxes(world, &region, start, one_way);

    let (clipped, mut final_box) = clip_axes(&boxes, start, velocity);
    let blocked_x = (clipped.x - velocity.x).abs() > 1.0e-12;
    let blocked_y = (clipped.y - velocity.y).abs() > 1.0e-12;
    let blocked_z = (clipped.z - velocity.z).abs() > 1.0e-12;

    let mut movement = clipped;
    let landed = blocked_y && velocity.y < 0.0;

    // Step-up: raise, move horizontally, settle back down; adopt the stepped
    // trajectory only when it gets farther than the direct one.
    if (grounded || landed) && (blocked_x || blocked_z) {
        let mut up = STEP_HEIGHT;
        for bb in &boxes {
            up = bb.clip_y_collide(start, up);
        }
        let raised = start.offset(Vector3::new(0.0, up, 0.0));

        let (stepped, stepped_box) =
            clip_axes(&boxes, &raised, Vector3::new(velocity.x, 0.0, velocity.z));

        let mut down = -up;
        for bb in &boxes {
            down = bb.clip_y_collide(&stepped_box, down);
        }

        if stepped.horizontal_length_sq() > movement.horizontal_length_sq() {
            movement = Vector3::new(stepped.x, up + down, stepped.z);
            final_box = stepped_box.offset(Vector3::new(0.0, down, 0.0));
        }
    }

    let mut flags = CollisionFlags::empty();
    if (movement.x - velocity.x).abs() > 1.0e-12 {
        flags |= CollisionFlags::X;
    }
    if blocked_y {
        flags |= CollisionFlags::Y;
    }
    if (movement.z - velocity.z).abs() > 1.0e-12 {
        flags |= CollisionFlags::Z;
    }

    let penetrating = boxes.iter().any(|bb| bb.intersects(&final_box));

    CollisionResult {
        movement,
        flags,
        penetrating,
    }
}

/// Whether any solid collision box overlaps `probe`. Used by edge avoidance
/// and the supporting-block lookup.
pub fn has_collision(world: &dyn WorldQuery, probe: &Aabb) -> bool {
    !collect_boxes(world, probe, probe, false).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::BlockInfo;
    use crate::test_world::FlatWorld;

    fn standing_box(x: f64, y: f64, z: f64) -> Aabb {
        Aabb::from_base(Vector3::new(x, y, z), 0.3, 1.8)
    }

    #[test]
    fn falling_lands_on_floor() {
        let world = FlatWorld::new(63);
        let start = standing_box(0.5, 66.0, 0.5);
        let result = try_collisions(&world, &start, Vector3::new(0.0, -5.0, 0.0), false, false);
        assert!(result.flags.contains(CollisionFlags::Y));
        assert!((result.movement.y - (-2.0)).abs() < 1e-6, "{result:?}");
        assert!(!result.penetrating);
    }

    #[test]
    fn wall_blocks_horizontal() {
        let mut world = FlatWorld::new(63);
        world.set_column(2, 64, 66, 0, BlockInfo::SOLID);
        let start = standing_box(1.5, 64.0, 0.5);
        let result = try_collisions(&world, &start, Vector3::new(1.0, 0.0, 0.0), true, false);
        assert!(result.flags.contains(CollisionFlags::X));
        assert!(result.movement.x < 0.25, "{result:?}");
    }

    #[test]
    fn step_up_climbs_slab() {
        let mut world = FlatWorld::new(63);
        // A half-slab ledge ahead, nothing above it.
        world.set_slab(2, 64, 0);
        let start = standing_box(1.5, 64.0, 0.5);
        let result = try_collisions(&world, &start, Vector3::new(0.6, 0.0, 0.0), true, false);
        assert!((result.movement.x - 0.6).abs() < 1e-6, "{result:?}");
        assert!(result.movement.y > 0.45, "{result:?}");
    }

    #[test]
    fn full_block_is_too_tall_to_step() {
        let mut world = FlatWorld::new(63);
        world.set_block(2, 64, 0, BlockInfo::SOLID);
        let start = standing_box(1.5, 64.0, 0.5);
        let result = try_collisions(&world, &start, Vector3::new(0.6, 0.0, 0.0), true, false);
        assert!(result.movement.x < 0.25, "{result:?}");
    }

    #[test]
    fn step_up_refuses_tall_wall() {
        let mut world = FlatWorld::new(63);
        world.set_column(2, 64, 65, 0, BlockInfo::SOLID);
        let start = standing_box(1.5, 64.0, 0.5);
        let result = try_collisions(&world, &start, Vector3::new(0.6, 0.0, 0.0), true, false);
        assert!(result.movement.x < 0.25, "{result:?}");
        assert!(result.flags.contains(CollisionFlags::X));
    }

    #[test]
    fn one_way_ignores_penetrated_box() {
        let mut world = FlatWorld::new(63);
        world.set_block(0, 64, 0, BlockInfo::SOLID);
        // Start overlapping the block at (0, 64, 0).
        let start = standing_box(0.5, 64.5, 0.5);
        let blocked = try_collisions(&world, &start, Vector3::new(0.0, -0.1, 0.0), false, false);
        let one_way = try_collisions(&world, &start, Vector3::new(0.0, -0.1, 0.0), false, true);
        // One-way mode falls through the penetrated box instead of clipping.
        assert!(one_way.movement.y < blocked.movement.y || !one_way.flags.contains(CollisionFlags::Y));
    }
}
