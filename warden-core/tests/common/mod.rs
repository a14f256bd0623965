//! Shared fixtures for the integration tests: a flat world, a recording
//! violation sink and session builders.

use parking_lot::Mutex;
use warden_utils::BlockPos;
use warden_utils::math::Aabb;

use warden_core::detection::ViolationEvent;
use warden_core::interface::{
    BlockInfo, DeviceOs, GameMode, InputMode, NotificationSink, SessionInfo, WorldQuery,
};

/// Infinite flat world: everything at or below `ground_y` is solid.
pub struct FlatWorld {
    ground_y: i32,
}

impl FlatWorld {
    pub fn new(ground_y: i32) -> Self {
        Self { ground_y }
    }
}

impl WorldQuery for FlatWorld {
    fn is_chunk_loaded(&self, _x: i32, _z: i32) -> bool {
        true
    }

    fn block_at(&self, pos: BlockPos) -> BlockInfo {
        if pos.y <= self.ground_y {
            BlockInfo::SOLID
        } else {
            BlockInfo::AIR
        }
    }

    fn collision_boxes(&self, pos: BlockPos) -> Vec<Aabb> {
        if self.block_at(pos).solid {
            vec![Aabb::unit_block(pos.x, pos.y, pos.z)]
        } else {
            Vec::new()
        }
    }
}

/// Sink that records every violation event for later assertions.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ViolationEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<ViolationEvent> {
        self.events.lock().clone()
    }

    pub fn count_for(&self, detection: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| e.detection == detection)
            .count()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, event: &ViolationEvent) {
        self.events.lock().push(event.clone());
    }
}

/// A plain Windows keyboard-and-mouse survival session.
pub fn windows_session() -> SessionInfo {
    SessionInfo {
        device_os: DeviceOs::Windows,
        title_id: "896928775".to_owned(),
        input_mode: InputMode::Mouse,
        protocol_version: 800,
        game_mode: GameMode::Survival,
        ping: 40,
    }
}
