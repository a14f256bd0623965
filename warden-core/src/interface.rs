//! Narrow interfaces to the host game server.
//!
//! The anticheat core never decodes packets, owns world data or delivers
//! notifications. Everything it needs from the host comes in through the
//! traits and plain decoded-value structs in this module, and everything it
//! decides goes back out the same way.

use serde::{Deserialize, Serialize};
use warden_utils::BlockPos;
use warden_utils::math::{Aabb, Vector3};

use crate::detection::ViolationEvent;

/// How a block behaves underfoot. Drives ground friction, speed scaling and
/// bounce in the movement simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceKind {
    /// Ordinary ground, slipperiness 0.6.
    #[default]
    Normal,
    /// Ice, packed ice and blue ice, slipperiness 0.98.
    Ice,
    /// Slime block: slipperiness 0.8 and full vertical bounce.
    Slime,
    /// Soul sand: normal slipperiness but movement speed cut to 0.543.
    SoulSand,
    /// Bed: partial vertical bounce.
    Bed,
}

impl SurfaceKind {
    /// Slipperiness factor multiplied into air friction while grounded.
    #[must_use]
    pub const fn slipperiness(self) -> f64 {
        match self {
            Self::Ice => 0.98,
            Self::Slime => 0.8,
            Self::Normal | Self::SoulSand | Self::Bed => 0.6,
        }
    }

    /// Vertical bounce multiplier on landing, if the surface bounces.
    #[must_use]
    pub const fn bounce_factor(self) -> Option<f64> {
        match self {
            Self::Slime => Some(-1.0),
            Self::Bed => Some(-0.66),
            Self::Normal | Self::Ice | Self::SoulSand => None,
        }
    }
}

/// Classification of a single block, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockInfo {
    /// Whether the block has collision.
    pub solid: bool,
    /// Whether the block is a liquid (water or lava).
    pub liquid: bool,
    /// Whether the block can be climbed (ladder, vine, scaffolding).
    pub climbable: bool,
    /// Whether the block is a cobweb.
    pub cobweb: bool,
    /// Surface behavior when stood on.
    pub surface: SurfaceKind,
}

impl BlockInfo {
    /// Air: no collision, no special behavior.
    pub const AIR: Self = Self {
        solid: false,
        liquid: false,
        climbable: false,
        cobweb: false,
        surface: SurfaceKind::Normal,
    };

    /// A full solid block with default friction.
    pub const SOLID: Self = Self {
        solid: true,
        liquid: false,
        climbable: false,
        cobweb: false,
        surface: SurfaceKind::Normal,
    };
}

/// Block/chunk queries answered by the host's world model.
pub trait WorldQuery {
    /// Whether the chunk containing block coordinates (`x`, `z`) is loaded.
    fn is_chunk_loaded(&self, x: i32, z: i32) -> bool;

    /// Classification of the block at `pos`. Unloaded or empty positions
    /// report [`BlockInfo::AIR`].
    fn block_at(&self, pos: BlockPos) -> BlockInfo;

    /// World-space collision boxes of the block at `pos`. Empty for
    /// non-solid blocks.
    fn collision_boxes(&self, pos: BlockPos) -> Vec<Aabb>;
}

/// Entity lookups answered by the host's entity model.
pub trait EntityQuery {
    /// Half extents (x, y, z from center) of the entity's bounding box,
    /// scale applied. `None` when the id is unknown.
    fn half_extents(&self, entity_id: u64) -> Option<Vector3<f64>>;

    /// Whether the entity is a player.
    fn is_player(&self, entity_id: u64) -> bool;

    /// Whether the entity is living (attackable).
    fn is_living(&self, entity_id: u64) -> bool;
}

/// Status effects the core needs to know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    /// Slows arm swings; raises the swing-gap threshold in combat checks.
    MiningFatigue,
}

/// Active status-effect lookup for a player.
pub trait EffectQuery {
    /// Amplifier of the given active effect, or `None` when not active.
    fn amplifier(&self, effect: EffectKind) -> Option<u32>;
}

/// Receives violation events for external delivery (chat alert, webhook).
/// Delivery is entirely the host's concern and may be asynchronous; the core
/// only hands over the payload.
pub trait NotificationSink: Send + Sync {
    /// Called whenever a detection records a violation.
    fn notify(&self, event: &ViolationEvent);
}

impl<T: NotificationSink + ?Sized> NotificationSink for std::sync::Arc<T> {
    fn notify(&self, event: &ViolationEvent) {
        (**self).notify(event);
    }
}

/// A sink that drops every event. Useful for tests and headless setups.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&self, _event: &ViolationEvent) {}
}

/// Operating system family a client session reports at join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceOs {
    /// Android devices.
    Android,
    /// iPhones and iPads.
    Ios,
    /// macOS.
    Osx,
    /// Amazon Fire tablets.
    FireOs,
    /// Windows 10/11 edition.
    Windows,
    /// Legacy Win32 edition.
    Win32,
    /// Dedicated server (never a real player).
    Dedicated,
    /// Apple TV.
    TvOs,
    /// PlayStation consoles.
    PlayStation,
    /// Nintendo Switch.
    Nintendo,
    /// Xbox consoles.
    Xbox,
    /// Anything the protocol did not map.
    Unknown,
}

/// Input method the client reports per session (and may switch mid-session).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputMode {
    /// Keyboard and mouse.
    Mouse,
    /// Touch screen.
    Touch,
    /// Controller.
    Gamepad,
    /// VR motion controller.
    MotionController,
}

/// Game mode of the player, as the server granted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// Survival.
    Survival,
    /// Creative: item spawning and instant break are legitimate.
    Creative,
    /// Adventure.
    Adventure,
    /// Spectator: no interaction at all.
    Spectator,
}

/// What triggered a client-side block action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerType {
    /// Direct player input.
    PlayerInput,
    /// Simulation-driven (e.g. held-button repeat).
    SimulationTick,
    /// Unknown/other trigger.
    Unknown,
}

/// Immutable session metadata captured when the player joins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Device operating system from the connection request.
    pub device_os: DeviceOs,
    /// Store title id the client authenticated with.
    pub title_id: String,
    /// Current input mode.
    pub input_mode: InputMode,
    /// Negotiated protocol version.
    pub protocol_version: i32,
    /// Granted game mode.
    pub game_mode: GameMode,
    /// Last measured ping in milliseconds.
    pub ping: u32,
}

/// One decoded movement/input packet, already validated for framing by the
/// protocol layer. Positions are feet positions.
#[derive(Debug, Clone, Copy)]
pub struct InputSnapshot {
    /// Client-reported feet position.
    pub position: Vector3<f64>,
    /// Body yaw in degrees.
    pub yaw: f32,
    /// Pitch in degrees.
    pub pitch: f32,
    /// Head yaw in degrees.
    pub head_yaw: f32,
    /// Raw move vector, x = strafe, y = forward. Legal range is
    /// `[-1.001, 1.001]` per component.
    pub move_vector: (f32, f32),
    /// Sprint flag.
    pub sprinting: bool,
    /// Sneak flag.
    pub sneaking: bool,
    /// Jump held.
    pub jumping: bool,
    /// Whether the client reported a missed arm swing this frame.
    pub missed_swing: bool,
    /// Whether the client claims to be gliding.
    pub gliding: bool,
    /// Client-claimed ground flag.
    pub on_ground: bool,
    /// Client simulation frame counter. Must be monotonic.
    pub simulation_frame: u64,
}

/// Host-granted movement abilities and poses the simulation cannot infer
/// from packets alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerAbilities {
    /// Flight granted (creative/spectator or an ability).
    pub flying: bool,
    /// No-clip granted.
    pub no_clip: bool,
    /// Marked immobile by the host (cutscene, freeze).
    pub immobile: bool,
    /// Swimming pose.
    pub swimming: bool,
}

/// Authoritative state handed back to the host when a resync is required.
#[derive(Debug, Clone, Copy)]
pub struct CorrectionPayload {
    /// Position to snap the client to.
    pub position: Vector3<f64>,
    /// Velocity to impose.
    pub velocity: Vector3<f64>,
    /// Ground flag at the corrected position.
    pub on_ground: bool,
}
