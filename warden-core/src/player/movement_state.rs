//! Movement tracking state: the client-reported position stream and the
//! server-authoritative physics twin, kept strictly apart.
//!
//! The invariant that keeps corrections honest: [`ClientState`] is written
//! only by inbound-packet handling, [`AuthoritativeState`] only by the
//! movement simulation. The two meet in the correction handler and in the
//! movement detectors, never in each other's fields.

use bitflags::bitflags;
use warden_utils::BlockPos;
use warden_utils::math::Vector3;

use crate::interface::InputSnapshot;

bitflags! {
    /// Per-axis collision results of the last simulation tick.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CollisionFlags: u8 {
        /// Movement was clipped on the X axis.
        const X = 1;
        /// Movement was clipped on the Y axis.
        const Y = 1 << 1;
        /// Movement was clipped on the Z axis.
        const Z = 1 << 2;
    }
}

impl CollisionFlags {
    /// Whether either horizontal axis collided.
    #[must_use]
    pub const fn horizontal(self) -> bool {
        self.intersects(Self::X.union(Self::Z))
    }
}

/// What the client claims: position stream from movement packets.
#[derive(Debug, Clone, Copy)]
pub struct ClientState {
    /// Latest reported feet position.
    pub position: Vector3<f64>,
    /// Position from the previous packet.
    pub prev_position: Vector3<f64>,
    /// Claimed ground flag.
    pub on_ground: bool,
}

/// What the server simulated: the authoritative twin.
#[derive(Debug, Clone, Copy)]
pub struct AuthoritativeState {
    /// Simulated feet position.
    pub position: Vector3<f64>,
    /// Simulated velocity (pre-move momentum for the next tick).
    pub velocity: Vector3<f64>,
    /// Displacement actually travelled last tick, after collision clipping.
    pub movement: Vector3<f64>,
    /// Ground flag at the simulated position.
    pub on_ground: bool,
}

impl AuthoritativeState {
    /// A resting twin at `position`.
    #[must_use]
    pub const fn at(position: Vector3<f64>) -> Self {
        Self {
            position,
            velocity: Vector3::ZERO,
            movement: Vector3::ZERO,
            on_ground: false,
        }
    }
}

/// One-shot knockback the simulation must impose, with an age counter so
/// the velocity detector can watch the client's response window.
#[derive(Debug, Clone, Copy)]
pub struct Knockback {
    /// Velocity that replaces the twin's velocity outright.
    pub velocity: Vector3<f64>,
    /// Ticks since the knockback was applied; 0 means still pending.
    pub age: u32,
}

/// A server-initiated teleport waiting to be consumed by the simulation.
#[derive(Debug, Clone, Copy)]
pub struct PendingTeleport {
    /// Target feet position.
    pub target: Vector3<f64>,
    /// Whether to interpolate over `remaining_ticks` instead of snapping.
    pub smooth: bool,
    /// Remaining smoothing ticks. Ignored for instant teleports.
    pub remaining_ticks: u32,
}

/// Full per-player movement component.
#[derive(Debug, Clone)]
pub struct MovementState {
    /// Client-reported state. Packet handlers only.
    pub client: ClientState,
    /// Server-simulated twin. Simulation only.
    pub auth: AuthoritativeState,

    /// Body yaw in degrees.
    pub yaw: f32,
    /// Pitch in degrees.
    pub pitch: f32,
    /// Head yaw in degrees.
    pub head_yaw: f32,
    /// Yaw from the previous packet.
    pub prev_yaw: f32,
    /// Pitch from the previous packet.
    pub prev_pitch: f32,

    /// Forward input impulse, `[-1, 1]`.
    pub impulse_forward: f32,
    /// Strafe input impulse, `[-1, 1]`.
    pub impulse_strafe: f32,

    /// Sprint flag.
    pub sprinting: bool,
    /// Sneak flag.
    pub sneaking: bool,
    /// Jump held.
    pub jumping: bool,
    /// Host granted flight (creative/spectator or an ability).
    pub flying: bool,
    /// Swimming pose.
    pub swimming: bool,
    /// Standing in a climbable block.
    pub climbing: bool,
    /// Elytra glide in progress.
    pub gliding: bool,
    /// Host granted no-clip.
    pub no_clip: bool,
    /// Penetrating a collider on two consecutive ticks; disables
    /// depenetration push-back.
    pub stuck_in_collider: bool,
    /// Host marked the player immobile (cutscene, freeze).
    pub immobile: bool,
    /// Whether last tick's collision pass ended inside a collider.
    pub penetrating: bool,

    /// Collision flags from the last simulated tick.
    pub collisions: CollisionFlags,
    /// Ticks until the next jump is allowed.
    pub jump_delay: u32,
    /// Pending or recently applied knockback.
    pub knockback: Option<Knockback>,
    /// Remaining firework boost ticks while gliding.
    pub glide_boost_ticks: u32,
    /// Pending server teleport.
    pub teleport: Option<PendingTeleport>,
    /// Block the player stands on, when grounded.
    pub supporting_block: Option<BlockPos>,
    /// False while the simulation is abandoned (liquid, flying, no-clip);
    /// movement detectors stay quiet while false.
    pub simulation_reliable: bool,

    /// Move packets received since join.
    pub received_move_packets: u32,
    /// Move packet count observed at the last tick boundary.
    pub known_move_packets: u32,
    /// Last accepted client simulation frame.
    pub last_simulation_frame: u64,
}

impl MovementState {
    /// Creates movement state anchored at the join position.
    #[must_use]
    pub const fn new(spawn: Vector3<f64>) -> Self {
        Self {
            client: ClientState {
                position: spawn,
                prev_position: spawn,
                on_ground: false,
            },
            auth: AuthoritativeState::at(spawn),
            yaw: 0.0,
            pitch: 0.0,
            head_yaw: 0.0,
            prev_yaw: 0.0,
            prev_pitch: 0.0,
            impulse_forward: 0.0,
            impulse_strafe: 0.0,
            sprinting: false,
            sneaking: false,
            jumping: false,
            flying: false,
            swimming: false,
            climbing: false,
            gliding: false,
            no_clip: false,
            stuck_in_collider: false,
            immobile: false,
            penetrating: false,
            collisions: CollisionFlags::empty(),
            jump_delay: 0,
            knockback: None,
            glide_boost_ticks: 0,
            teleport: None,
            supporting_block: None,
            simulation_reliable: true,
            received_move_packets: 0,
            known_move_packets: 0,
            last_simulation_frame: 0,
        }
    }

    /// Applies one decoded input packet to the client-reported side.
    /// Never touches the authoritative twin.
    pub fn apply_input(&mut self, input: &InputSnapshot) {
        self.client.prev_position = self.client.position;
        self.client.position = input.position;
        self.client.on_ground = input.on_ground;
        self.prev_yaw = self.yaw;
        self.prev_pitch = self.pitch;
        self.yaw = input.yaw;
        self.pitch = input.pitch;
        self.head_yaw = input.head_yaw;
        self.impulse_strafe = input.move_vector.0.clamp(-1.0, 1.0);
        self.impulse_forward = input.move_vector.1.clamp(-1.0, 1.0);
        self.sprinting = input.sprinting;
        self.sneaking = input.sneaking;
        self.jumping = input.jumping;
        self.gliding = input.gliding;
        self.received_move_packets = self.received_move_packets.wrapping_add(1);
    }

    /// Distance between the client-reported and simulated positions.
    #[must_use]
    pub fn divergence(&self) -> f64 {
        self.client.position.distance(&self.auth.position)
    }

    /// Queues an instant server teleport.
    pub fn teleport_to(&mut self, target: Vector3<f64>) {
        self.teleport = Some(PendingTeleport {
            target,
            smooth: false,
            remaining_ticks: 0,
        });
    }

    /// Queues a smoothed teleport interpolated over `ticks`.
    pub fn teleport_smooth(&mut self, target: Vector3<f64>, ticks: u32) {
        self.teleport = Some(PendingTeleport {
            target,
            smooth: true,
            remaining_ticks: ticks.max(1),
        });
    }

    /// Queues knockback for the next simulation tick.
    pub fn apply_knockback(&mut self, velocity: Vector3<f64>) {
        self.knockback = Some(Knockback { velocity, age: 0 });
    }

    /// Grants firework glide boost for `ticks`.
    pub const fn boost_glide(&mut self, ticks: u32) {
        self.glide_boost_ticks = ticks;
    }

    /// Move-packet cadence since the last tick boundary, then commits the
    /// boundary. Feeds the timer/cadence detector.
    pub const fn take_packet_cadence(&mut self) -> u32 {
        let delta = self.received_move_packets.wrapping_sub(self.known_move_packets);
        self.known_move_packets = self.received_move_packets;
        delta
    }
}
