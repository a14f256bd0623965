//! Per-player state: the components every detector reads from and the
//! detector set itself.

pub mod cancellation;
pub mod click_state;
pub mod click_stats;
pub mod combat_state;
pub mod entity_tracker;
pub mod movement_state;

use warden_utils::math::Vector3;

use crate::detection::manager::DetectorSet;
use crate::interface::SessionInfo;
use crate::player::cancellation::CancellationState;
use crate::player::click_state::ClickState;
use crate::player::combat_state::CombatState;
use crate::player::movement_state::MovementState;
use crate::simulation::correction::CorrectionHandler;

/// Everything the anticheat tracks about one connected player.
pub struct Player {
    /// Host entity id of the player.
    pub entity_id: u64,
    /// Display name, used in violation events and logs.
    pub name: String,
    /// Session metadata captured at join.
    pub session: SessionInfo,
    /// Movement component.
    pub movement: MovementState,
    /// Combat component, including the private entity tracker.
    pub combat: CombatState,
    /// Click tracking for both buttons.
    pub clicks: ClickState,
    /// Per-tick action cancellation flag.
    pub cancellation: CancellationState,
    /// Correction decision state.
    pub correction: CorrectionHandler,
    /// All detectors for this player.
    pub detections: DetectorSet,
}

impl Player {
    /// Creates a player with fresh components and the given detector set.
    #[must_use]
    pub fn new(
        entity_id: u64,
        name: String,
        session: SessionInfo,
        spawn: Vector3<f64>,
        correction: CorrectionHandler,
        detections: DetectorSet,
    ) -> Self {
        Self {
            entity_id,
            name,
            session,
            movement: MovementState::new(spawn),
            combat: CombatState::new(),
            clicks: ClickState::new(),
            cancellation: CancellationState::new(),
            correction,
            detections,
        }
    }

    /// Clears per-tick transient state. Runs at the start of every tick,
    /// before any packet of that tick is processed.
    pub fn begin_tick(&mut self) {
        self.cancellation.clear();
        self.combat.begin_tick();
    }
}
