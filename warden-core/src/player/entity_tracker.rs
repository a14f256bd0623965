//! Per-observer record of every visible entity's recent positions.
//!
//! Each player privately owns one tracker; the host's broadcast interception
//! writes into it and that player's combat detectors read from it. History
//! is indexed by tick distance, never by wall clock, so rewinds stay exact
//! under uneven packet timing.

use rustc_hash::FxHashMap;
use warden_utils::collections::RingBuffer;
use warden_utils::math::{Aabb, Vector3};

/// History capacity: 100 ticks ≈ 5 seconds at 20 TPS.
const HISTORY_CAPACITY: usize = 100;

/// One recorded position sample.
#[derive(Debug, Clone, Copy)]
pub struct HistoricalPosition {
    /// Position at `tick`.
    pub position: Vector3<f64>,
    /// Position at the previous sample.
    pub prev_position: Vector3<f64>,
    /// Server tick the sample was recorded at.
    pub tick: u64,
    /// Whether this sample came from a teleport rather than movement.
    pub was_teleport: bool,
}

/// State of one tracked entity.
#[derive(Debug, Clone)]
pub struct TrackedEntity {
    /// Latest known position.
    pub position: Vector3<f64>,
    /// Position before the latest update.
    pub prev_position: Vector3<f64>,
    /// Position the server itself placed the entity at, if it did.
    pub server_position: Vector3<f64>,
    /// Latest broadcast velocity.
    pub velocity: Vector3<f64>,
    /// Bounding-box half extents from center.
    pub half_extents: Vector3<f64>,
    /// Whether this entity is a player.
    pub is_player: bool,
    /// Server tick of the last teleport, if the entity ever teleported.
    pub last_teleport_tick: Option<u64>,
    /// Ring-buffered position history, append-only via eviction.
    pub history: RingBuffer<HistoricalPosition>,
}

impl TrackedEntity {
    fn new(position: Vector3<f64>, half_extents: Vector3<f64>, is_player: bool) -> Self {
        Self {
            position,
            prev_position: position,
            server_position: position,
            velocity: Vector3::ZERO,
            half_extents,
            is_player,
            last_teleport_tick: None,
            history: RingBuffer::new(HISTORY_CAPACITY),
        }
    }

    /// Ticks elapsed since the last teleport, measured against the server
    /// clock rather than the broadcast stream, so a target that teleports
    /// and then stands still leaves its grace window on schedule.
    /// `u64::MAX` when the entity never teleported.
    #[must_use]
    pub fn ticks_since_teleport(&self, current_tick: u64) -> u64 {
        self.last_teleport_tick
            .map_or(u64::MAX, |tick| current_tick.saturating_sub(tick))
    }

    /// Bounding box around a given center position, using the tracked
    /// half extents.
    #[must_use]
    pub fn box_at(&self, center: Vector3<f64>) -> Aabb {
        Aabb::new(center - self.half_extents, center + self.half_extents)
    }

    /// Bounding box at the latest known position.
    #[must_use]
    pub fn current_box(&self) -> Aabb {
        self.box_at(self.position)
    }

    /// Bounding box at the previous known position.
    #[must_use]
    pub fn prev_box(&self) -> Aabb {
        self.box_at(self.prev_position)
    }
}

/// All entities one player can currently see.
#[derive(Debug, Default)]
pub struct EntityTracker {
    entities: FxHashMap<u64, TrackedEntity>,
}

impl EntityTracker {
    /// Empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking an entity at its spawn position.
    pub fn add_entity(
        &mut self,
        entity_id: u64,
        position: Vector3<f64>,
        half_extents: Vector3<f64>,
        is_player: bool,
    ) {
        self.entities
            .insert(entity_id, TrackedEntity::new(position, half_extents, is_player));
    }

    /// Stops tracking an entity.
    pub fn remove_entity(&mut self, entity_id: u64) {
        self.entities.remove(&entity_id);
    }

    /// Records a broadcast position for a tracked entity. Unknown ids are
    /// ignored: a race between spawn and move broadcasts is not an error.
    pub fn update_entity(
        &mut self,
        entity_id: u64,
        position: Vector3<f64>,
        tick: u64,
        was_teleport: bool,
    ) {
        let Some(entity) = self.entities.get_mut(&entity_id) else {
            return;
        };
        entity.prev_position = entity.position;
        entity.position = position;
        if was_teleport {
            entity.last_teleport_tick = Some(tick);
            entity.server_position = position;
        }
        entity.history.push(HistoricalPosition {
            position,
            prev_position: entity.prev_position,
            tick,
            was_teleport,
        });
    }

    /// Records a broadcast velocity.
    pub fn update_velocity(&mut self, entity_id: u64, velocity: Vector3<f64>) {
        if let Some(entity) = self.entities.get_mut(&entity_id) {
            entity.velocity = velocity;
        }
    }

    /// Read access to a tracked entity.
    #[must_use]
    pub fn get(&self, entity_id: u64) -> Option<&TrackedEntity> {
        self.entities.get(&entity_id)
    }

    /// Write access to a tracked entity.
    #[must_use]
    pub fn get_mut(&mut self, entity_id: u64) -> Option<&mut TrackedEntity> {
        self.entities.get_mut(&entity_id)
    }

    /// Whether the entity is currently tracked.
    #[must_use]
    pub fn contains(&self, entity_id: u64) -> bool {
        self.entities.contains_key(&entity_id)
    }

    /// Number of tracked entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether no entities are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The historical sample nearest to `target_tick` by absolute tick
    /// distance. Linear scan; history is bounded at 100 samples.
    #[must_use]
    pub fn rewind(&self, entity_id: u64, target_tick: u64) -> Option<&HistoricalPosition> {
        let entity = self.entities.get(&entity_id)?;
        entity
            .history
            .iter()
            .min_by_key(|sample| sample.tick.abs_diff(target_tick))
    }

    /// Drops entities whose newest sample is older than `max_age` ticks.
    pub fn cleanup_stale(&mut self, current_tick: u64, max_age: u64) {
        self.entities.retain(|_, entity| {
            entity
                .history
                .newest()
                .is_none_or(|sample| current_tick.saturating_sub(sample.tick) <= max_age)
        });
    }
}
