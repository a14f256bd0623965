//! The per-tick movement simulation that maintains the server-authoritative
//! twin of every player.
//!
//! Runs once per player per server tick, independent of packet arrival, and
//! only ever writes [`AuthoritativeState`] — client-reported fields belong to
//! packet handling. The numeric constants here are the client's own movement
//! constants; deviating from them turns ordinary play into divergence.

pub mod collisions;
pub mod correction;

use warden_utils::BlockPos;
use warden_utils::math::{Aabb, TRIG_TABLES, Vector3, floor};

use crate::interface::{SurfaceKind, WorldQuery};
use crate::player::combat_state::look_vector;
use crate::player::movement_state::{CollisionFlags, MovementState};
use collisions::{STEP_HEIGHT, has_collision, try_collisions};

/// Downward acceleration per tick.
pub const GRAVITY: f64 = 0.08;
/// Vertical drag multiplier applied after gravity.
pub const VERTICAL_DRAG: f64 = 0.98;
/// Horizontal air friction; multiplied by block slipperiness on the ground.
pub const AIR_FRICTION: f64 = 0.91;
/// Initial vertical velocity of a jump.
pub const JUMP_POWER: f64 = 0.42;
/// Horizontal nudge added when jumping mid-sprint.
const SPRINT_JUMP_BOOST: f64 = 0.2;
/// Ticks between jumps.
const JUMP_DELAY_TICKS: u32 = 10;
/// Numerator of the grounded acceleration scale: `0.546³`, so default
/// ground friction yields exactly the base movement speed.
const GROUND_ACCEL_BASE: f64 = 0.16277136;
/// Airborne acceleration per input.
const AIR_ACCEL: f64 = 0.02;
/// Base walking speed per tick.
const WALK_SPEED: f64 = 0.1;
/// Sprint speed multiplier.
const SPRINT_MULTIPLIER: f64 = 1.3;
/// Sneak speed multiplier.
const SNEAK_MULTIPLIER: f64 = 0.3;
/// Speed multiplier on soul sand.
const SOUL_SAND_MULTIPLIER: f64 = 0.543;
/// Climb speed on ladders, vines and scaffolding.
const CLIMB_SPEED: f64 = 0.2;
/// Squared-velocity threshold under which momentum snaps to zero.
const VELOCITY_SNAP_EPSILON: f64 = 3.0e-3;
/// Step size for trimming velocity during sneak edge avoidance.
const EDGE_TRIM_STEP: f64 = 0.05;
/// Ticks a knockback entry is kept for the velocity detector.
const KNOCKBACK_TRACK_TICKS: u32 = 20;
/// Bed bounce velocity cap.
const BED_BOUNCE_CAP: f64 = 1.0;
/// Player bounding-box horizontal half width.
pub const PLAYER_HALF_WIDTH: f64 = 0.3;
/// Player bounding-box height.
pub const PLAYER_HEIGHT: f64 = 1.8;

/// Bounding box of a standing player at `feet`.
#[must_use]
pub fn player_box(feet: Vector3<f64>) -> Aabb {
    Aabb::from_base(feet, PLAYER_HALF_WIDTH, PLAYER_HEIGHT)
}

/// Advances the authoritative twin one tick.
pub fn simulate(m: &mut MovementState, world: &dyn WorldQuery) {
    if m.jump_delay > 0 {
        m.jump_delay -= 1;
    }

    if resolve_teleport(m) {
        return;
    }

    let start_box = player_box(m.auth.position);

    // Physics prediction is abandoned in liquid and in host-granted flight;
    // forcing corrections there produces nothing but false positives.
    if m.flying || m.no_clip || touches(world, &start_box.grow(0.1), |b| b.liquid) {
        m.simulation_reliable = false;
        m.auth.velocity = Vector3::ZERO;
        m.auth.movement = Vector3::ZERO;
        m.auth.position = m.client.position;
        return;
    }
    m.simulation_reliable = true;

    let dest = m.auth.position + m.auth.velocity;
    if m.immobile
        || !world.is_chunk_loaded(floor(dest.x), floor(dest.z))
        || !world.is_chunk_loaded(floor(m.auth.position.x), floor(m.auth.position.z))
    {
        m.auth.velocity = Vector3::ZERO;
        m.auth.movement = Vector3::ZERO;
        return;
    }

    if m.auth.velocity.length_sq() < VELOCITY_SNAP_EPSILON {
        m.auth.velocity = Vector3::ZERO;
    }

    let surface = surface_under(world, m);
    let slipperiness = surface.slipperiness();
    let ground_friction = AIR_FRICTION * slipperiness;
    let accel = if m.auth.on_ground {
        let base = base_speed(m)
            * if surface == SurfaceKind::SoulSand {
                SOUL_SAND_MULTIPLIER
            } else {
                1.0
            };
        base * (GROUND_ACCEL_BASE / (ground_friction * ground_friction * ground_friction))
    } else {
        air_speed(m)
    };

    if m.gliding {
        glide_tick(m, world);
        return;
    }

    if let Some(kb) = &mut m.knockback {
        if kb.age == 0 {
            m.auth.velocity = kb.velocity;
        }
        kb.age += 1;
        if kb.age > KNOCKBACK_TRACK_TICKS {
            m.knockback = None;
        }
    }

    move_relative(
        &mut m.auth.velocity,
        accel,
        m.impulse_strafe,
        m.impulse_forward,
        m.yaw,
    );

    if m.auth.on_ground && m.jumping && m.jump_delay == 0 {
        attempt_jump(m);
    }

    m.climbing = world
        .block_at(BlockPos::containing(
            m.auth.position.x,
            m.auth.position.y,
            m.auth.position.z,
        ))
        .climbable;
    if m.climbing {
        let v = &mut m.auth.velocity;
        if v.y < -CLIMB_SPEED {
            v.y = -CLIMB_SPEED;
        }
        if (m.jumping || m.collisions.horizontal()) && v.y < CLIMB_SPEED {
            v.y = CLIMB_SPEED;
        }
        if m.sneaking && v.y < 0.0 {
            v.y = 0.0;
        }
    }

    if touches(world, &start_box, |b| b.cobweb) {
        m.auth.velocity = m.auth.velocity.scale(0.25, 0.05, 0.25);
    }

    let mut intended = m.auth.velocity;
    if m.sneaking && m.auth.on_ground {
        intended = back_off_from_edge(world, &start_box, intended);
    }

    let result = try_collisions(
        world,
        &start_box,
        intended,
        m.auth.on_ground,
        m.stuck_in_collider,
    );
    m.auth.position += result.movement;
    m.auth.movement = result.movement;
    m.collisions = result.flags;
    m.stuck_in_collider = result.penetrating && m.penetrating;
    m.penetrating = result.penetrating;

    let landed = result.flags.contains(CollisionFlags::Y) && intended.y < 0.0;
    m.auth.on_ground = landed;
    m.supporting_block = landed.then(|| {
        BlockPos::containing(
            m.auth.position.x,
            m.auth.position.y - 0.5,
            m.auth.position.z,
        )
    });

    let bounce = if landed {
        surface_under(world, m).bounce_factor()
    } else {
        None
    };
    let v = &mut m.auth.velocity;
    if result.flags.contains(CollisionFlags::Y) {
        if landed {
            v.y = match bounce {
                Some(factor) if !m.sneaking => {
                    let bounced = intended.y * factor;
                    if factor > -1.0 {
                        bounced.clamp(-BED_BOUNCE_CAP, BED_BOUNCE_CAP)
                    } else {
                        bounced
                    }
                }
                _ => 0.0,
            };
        } else {
            v.y = 0.0;
        }
    }
    if result.flags.contains(CollisionFlags::X) {
        v.x = 0.0;
    }
    if result.flags.contains(CollisionFlags::Z) {
        v.z = 0.0;
    }

    // Pre-next-tick preparation: gravity, then drag, then ground friction.
    v.y = (v.y - GRAVITY) * VERTICAL_DRAG;
    let h_friction = if m.auth.on_ground {
        ground_friction
    } else {
        AIR_FRICTION
    };
    v.x *= h_friction;
    v.z *= h_friction;
}

/// Consumes a pending teleport. Returns true when the rest of the tick must
/// be skipped.
fn resolve_teleport(m: &mut MovementState) -> bool {
    let Some(tp) = m.teleport else {
        return false;
    };

    if tp.smooth {
        let step = (tp.target - m.auth.position) / f64::from(tp.remaining_ticks);
        m.auth.position += step;
        m.auth.movement = step;
        if tp.remaining_ticks <= 1 {
            m.teleport = None;
        } else {
            m.teleport = Some(crate::player::movement_state::PendingTeleport {
                remaining_ticks: tp.remaining_ticks - 1,
                ..tp
            });
        }
        return true;
    }

    m.auth.position = tp.target;
    m.auth.velocity = Vector3::ZERO;
    m.auth.movement = Vector3::ZERO;
    m.jump_delay = 0;
    if m.auth.on_ground && m.jumping {
        attempt_jump(m);
    }
    m.teleport = None;
    true
}

fn attempt_jump(m: &mut MovementState) {
    let v = &mut m.auth.velocity;
    v.y = v.y.max(JUMP_POWER);
    if m.sprinting {
        let yaw_rad = m.yaw.to_radians();
        v.x += -f64::from(TRIG_TABLES.sin(yaw_rad)) * SPRINT_JUMP_BOOST;
        v.z += f64::from(TRIG_TABLES.cos(yaw_rad)) * SPRINT_JUMP_BOOST;
    }
    m.auth.on_ground = false;
    m.jump_delay = JUMP_DELAY_TICKS;
}

/// Elytra glide: lift from pitch, directional realignment toward the look
/// vector, optional firework boost, then its own collision pass.
fn glide_tick(m: &mut MovementState, world: &dyn WorldQuery) {
    let look = look_vector(m.yaw, m.pitch);
    let pitch_rad = m.pitch.to_radians();
    let horiz_look = look.horizontal_length();

    {
        let v = &mut m.auth.velocity;
        let speed_h = v.horizontal_length();
        let lift = {
            let cos_pitch = f64::from(TRIG_TABLES.cos(pitch_rad));
            cos_pitch * cos_pitch * (look.length() / 0.4).min(1.0)
        };

        v.y += GRAVITY * (-1.0 + lift * 0.75);

        if v.y < 0.0 && horiz_look > 0.0 {
            let redirect = v.y * -0.1 * lift;
            v.x += look.x * redirect / horiz_look;
            v.y += redirect;
            v.z += look.z * redirect / horiz_look;
        }

        if pitch_rad < 0.0 && horiz_look > 0.0 {
            let dive_pull = speed_h * f64::from(-TRIG_TABLES.sin(pitch_rad)) * 0.04;
            v.x -= look.x * dive_pull / horiz_look;
            v.y += dive_pull * 3.2;
            v.z -= look.z * dive_pull / horiz_look;
        }

        if horiz_look > 0.0 {
            v.x += (look.x / horiz_look * speed_h - v.x) * 0.1;
            v.z += (look.z / horiz_look * speed_h - v.z) * 0.1;
        }

        if m.glide_boost_ticks > 0 {
            m.glide_boost_ticks -= 1;
            *v += look * 0.1 + (look * 1.5 - *v) * 0.5;
        }
    }

    let start_box = player_box(m.auth.position);
    let intended = m.auth.velocity;
    let result = try_collisions(world, &start_box, intended, false, m.stuck_in_collider);
    m.auth.position += result.movement;
    m.auth.movement = result.movement;
    m.collisions = result.flags;

    m.auth.velocity = m.auth.velocity.scale(0.99, 0.98, 0.99);

    if result.flags.contains(CollisionFlags::Y) && intended.y < 0.0 {
        m.auth.on_ground = true;
        m.auth.velocity.y = 0.0;
        m.gliding = false;
    }
}

/// Yaw-rotated input acceleration, using the engine trig tables.
fn move_relative(v: &mut Vector3<f64>, speed: f64, strafe: f32, forward: f32, yaw: f32) {
    let d = f64::from(strafe * strafe + forward * forward);
    if d < 1.0e-7 {
        return;
    }
    let scale = if d > 1.0 { speed / d.sqrt() } else { speed };
    let yaw_rad = yaw.to_radians();
    let sin = f64::from(TRIG_TABLES.sin(yaw_rad));
    let cos = f64::from(TRIG_TABLES.cos(yaw_rad));
    let strafe = f64::from(strafe) * scale;
    let forward = f64::from(forward) * scale;
    v.x += strafe * cos - forward * sin;
    v.z += forward * cos + strafe * sin;
}

fn base_speed(m: &MovementState) -> f64 {
    let mut speed = WALK_SPEED;
    if m.sprinting {
        speed *= SPRINT_MULTIPLIER;
    }
    if m.sneaking {
        speed *= SNEAK_MULTIPLIER;
    }
    speed
}

fn air_speed(m: &MovementState) -> f64 {
    if m.sprinting {
        AIR_ACCEL * SPRINT_MULTIPLIER
    } else {
        AIR_ACCEL
    }
}

fn surface_under(world: &dyn WorldQuery, m: &MovementState) -> SurfaceKind {
    let below = BlockPos::containing(
        m.auth.position.x,
        m.auth.position.y - 0.5,
        m.auth.position.z,
    );
    world.block_at(below).surface
}

/// Whether any block overlapping `probe` matches the predicate.
fn touches(
    world: &dyn WorldQuery,
    probe: &Aabb,
    pred: impl Fn(&crate::interface::BlockInfo) -> bool,
) -> bool {
    for x in floor(probe.min.x)..=floor(probe.max.x) {
        for y in floor(probe.min.y)..=floor(probe.max.y) {
            for z in floor(probe.min.z)..=floor(probe.max.z) {
                if pred(&world.block_at(BlockPos::new(x, y, z))) {
                    return true;
                }
            }
        }
    }
    false
}

/// Sneak edge avoidance: trims horizontal velocity in 0.05 steps until the
/// foot box, offset by the trial movement and dropped by just over the step
/// height, still finds ground. Refuses to let a sneaking player walk off.
fn back_off_from_edge(
    world: &dyn WorldQuery,
    start_box: &Aabb,
    velocity: Vector3<f64>,
) -> Vector3<f64> {
    let drop = STEP_HEIGHT * 1.01;
    let foot = {
        let shrunk = start_box.grow_xyz(-EDGE_TRIM_STEP, 0.0, -EDGE_TRIM_STEP);
        Aabb::new(
            shrunk.min,
            Vector3::new(shrunk.max.x, shrunk.min.y + 0.1, shrunk.max.z),
        )
    };
    let supported = |dx: f64, dz: f64| {
        has_collision(world, &foot.offset(Vector3::new(dx, -drop, dz)))
    };

    let mut x = velocity.x;
    let mut z = velocity.z;
    while x != 0.0 && !supported(x, 0.0) {
        x = trim(x);
    }
    while z != 0.0 && !supported(0.0, z) {
        z = trim(z);
    }
    while x != 0.0 && z != 0.0 && !supported(x, z) {
        x = trim(x);
        z = trim(z);
    }
    Vector3::new(x, velocity.y, z)
}

fn trim(component: f64) -> f64 {
    if component.abs() <= EDGE_TRIM_STEP {
        0.0
    } else if component > 0.0 {
        component - EDGE_TRIM_STEP
    } else {
        component + EDGE_TRIM_STEP
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::BlockInfo;
    use crate::test_world::FlatWorld;

    fn grounded_state(world: &FlatWorld) -> MovementState {
        let mut m = MovementState::new(Vector3::new(0.5, 64.0, 0.5));
        // Settle: a few ticks of gravity establish the grounded steady state.
        for _ in 0..5 {
            simulate(&mut m, world);
        }
        assert!(m.auth.on_ground);
        m
    }

    #[test]
    fn stationary_player_reaches_steady_state() {
        let world = FlatWorld::new(63);
        let mut m = grounded_state(&world);
        for _ in 0..20 {
            simulate(&mut m, &world);
        }
        assert!(m.auth.on_ground);
        assert!(m.auth.velocity.x.abs() < 1e-9);
        assert!(m.auth.velocity.z.abs() < 1e-9);
        // Gravity steady state: one tick of gravity past a grounded reset.
        assert!((m.auth.velocity.y - (-GRAVITY * VERTICAL_DRAG)).abs() < 1e-9);
        assert!((m.auth.position.y - 64.0).abs() < 1e-4);
    }

    #[test]
    fn jump_from_rest() {
        let world = FlatWorld::new(63);
        let mut m = grounded_state(&world);
        m.jumping = true;
        m.jump_delay = 0;
        simulate(&mut m, &world);
        assert!((m.auth.movement.y - JUMP_POWER).abs() < 1e-9);
        assert_eq!(m.jump_delay, JUMP_DELAY_TICKS);
        assert!(!m.auth.on_ground);
        // End-of-tick velocity already carries gravity for the next tick.
        assert!((m.auth.velocity.y - (JUMP_POWER - GRAVITY) * VERTICAL_DRAG).abs() < 1e-9);
    }

    #[test]
    fn walking_moves_forward_of_yaw() {
        let world = FlatWorld::new(63);
        let mut m = grounded_state(&world);
        m.impulse_forward = 1.0;
        m.yaw = 0.0;
        simulate(&mut m, &world);
        assert!(m.auth.movement.z > 0.05, "{:?}", m.auth.movement);
        assert!(m.auth.movement.x.abs() < 1e-6);
    }

    #[test]
    fn instant_teleport_snaps_and_skips_tick() {
        let world = FlatWorld::new(63);
        let mut m = grounded_state(&world);
        m.teleport_to(Vector3::new(100.5, 70.0, 100.5));
        simulate(&mut m, &world);
        assert_eq!(m.auth.position, Vector3::new(100.5, 70.0, 100.5));
        assert_eq!(m.auth.velocity, Vector3::ZERO);
        assert!(m.teleport.is_none());
    }

    #[test]
    fn smooth_teleport_interpolates() {
        let world = FlatWorld::new(63);
        let mut m = MovementState::new(Vector3::new(0.0, 64.0, 0.0));
        m.teleport_smooth(Vector3::new(10.0, 64.0, 0.0), 5);
        simulate(&mut m, &world);
        assert!((m.auth.position.x - 2.0).abs() < 1e-9);
        simulate(&mut m, &world);
        assert!((m.auth.position.x - 4.0).abs() < 1e-9);
        for _ in 0..3 {
            simulate(&mut m, &world);
        }
        assert!((m.auth.position.x - 10.0).abs() < 1e-9);
        assert!(m.teleport.is_none());
    }

    #[test]
    fn liquid_marks_simulation_unreliable() {
        let mut world = FlatWorld::new(63);
        let water = BlockInfo {
            liquid: true,
            ..BlockInfo::AIR
        };
        for y in 64..=66 {
            world.set_block(0, y, 0, water);
        }
        let mut m = MovementState::new(Vector3::new(0.5, 64.5, 0.5));
        m.client.position = Vector3::new(0.5, 64.5, 0.5);
        simulate(&mut m, &world);
        assert!(!m.simulation_reliable);
        assert_eq!(m.auth.velocity, Vector3::ZERO);
    }

    #[test]
    fn unloaded_chunk_freezes_velocity() {
        let mut world = FlatWorld::new(63);
        world.unload_chunk(0, 0);
        let mut m = MovementState::new(Vector3::new(0.5, 64.0, 0.5));
        m.auth.velocity = Vector3::new(1.0, 0.0, 0.0);
        simulate(&mut m, &world);
        assert_eq!(m.auth.velocity, Vector3::ZERO);
        assert!((m.auth.position.x - 0.5).abs() < 1e-12);
    }

    #[test]
    fn knockback_replaces_velocity_once() {
        let world = FlatWorld::new(63);
        let mut m = grounded_state(&world);
        m.apply_knockback(Vector3::new(0.4, 0.4, 0.0));
        simulate(&mut m, &world);
        assert!(m.auth.movement.x > 0.3, "{:?}", m.auth.movement);
        assert!(m.auth.movement.y > 0.3);
        // Still tracked for the velocity detector, but no longer pending.
        assert!(m.knockback.is_some_and(|kb| kb.age >= 1));
    }

    #[test]
    fn sneak_refuses_ledge() {
        // Player on a single-block pillar, sneaking toward the edge.
        let mut world = FlatWorld::new(0);
        world.set_block(0, 63, 0, BlockInfo::SOLID);
        let mut m = MovementState::new(Vector3::new(0.5, 64.0, 0.5));
        for _ in 0..5 {
            simulate(&mut m, &world);
        }
        assert!(m.auth.on_ground);
        m.sneaking = true;
        m.impulse_forward = 1.0;
        m.yaw = 0.0;
        for _ in 0..40 {
            simulate(&mut m, &world);
        }
        // Never walked off: still above the pillar.
        assert!(m.auth.position.z < 1.3, "{:?}", m.auth.position);
        assert!((m.auth.position.y - 64.0).abs() < 1e-4);
        assert!(m.auth.on_ground);
    }

    #[test]
    fn cobweb_crushes_velocity() {
        let mut world = FlatWorld::new(63);
        let web = BlockInfo {
            cobweb: true,
            ..BlockInfo::AIR
        };
        world.set_block(0, 64, 0, web);
        world.set_block(0, 65, 0, web);
        let mut m = grounded_state(&world);
        // Reset to the webbed column.
        m.auth.position = Vector3::new(0.5, 64.0, 0.5);
        m.auth.velocity = Vector3::new(0.4, 0.0, 0.4);
        simulate(&mut m, &world);
        assert!(m.auth.movement.horizontal_length() < 0.2, "{:?}", m.auth.movement);
    }

    #[test]
    fn slime_bounces_fall_back_up() {
        let mut world = FlatWorld::new(62);
        let slime = BlockInfo {
            solid: true,
            surface: SurfaceKind::Slime,
            ..BlockInfo::SOLID
        };
        world.set_block(0, 63, 0, slime);
        let mut m = MovementState::new(Vector3::new(0.5, 68.0, 0.5));
        let mut bounced = false;
        for _ in 0..30 {
            simulate(&mut m, &world);
            if m.auth.velocity.y > 0.2 {
                bounced = true;
                break;
            }
        }
        assert!(bounced, "never bounced: {:?}", m.auth);
    }

    #[test]
    fn sneaking_absorbs_the_bounce() {
        let mut world = FlatWorld::new(62);
        let slime = BlockInfo {
            solid: true,
            surface: SurfaceKind::Slime,
            ..BlockInfo::SOLID
        };
        world.set_block(0, 63, 0, slime);
        let mut m = MovementState::new(Vector3::new(0.5, 68.0, 0.5));
        m.sneaking = true;
        for _ in 0..30 {
            simulate(&mut m, &world);
            assert!(m.auth.velocity.y <= 0.0, "bounced while sneaking: {:?}", m.auth);
            if m.auth.on_ground {
                break;
            }
        }
        assert!(m.auth.on_ground, "never landed: {:?}", m.auth);
    }

    #[test]
    fn climbing_clamps_descent() {
        let mut world = FlatWorld::new(10);
        let ladder = BlockInfo {
            climbable: true,
            ..BlockInfo::AIR
        };
        for y in 11..=30 {
            world.set_block(0, y, 0, ladder);
        }
        let mut m = MovementState::new(Vector3::new(0.5, 25.0, 0.5));
        m.auth.velocity = Vector3::new(0.0, -2.0, 0.0);
        simulate(&mut m, &world);
        assert!(m.climbing);
        assert!(m.auth.movement.y >= -CLIMB_SPEED - 1e-9, "{:?}", m.auth.movement);
    }
}
