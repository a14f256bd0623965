//! `HitboxA`: the click position a client reports with an attack has to sit
//! on (or very near) the target's hitbox. Hitbox-expansion cheats report
//! click positions floating in the air around the real box.

use warden_utils::math::Vector3;

use crate::config::{CombatConfig, Thresholds};
use crate::detection::{
    DEFAULT_PASS, Detection, DetectionCtx, DetectionKind, DetectionState, pass,
};
use crate::player::entity_tracker::TrackedEntity;

/// Click-position plausibility check.
#[derive(Debug)]
pub struct HitboxA {
    state: DetectionState,
    grow: f64,
    max_distance: f64,
    teleport_grace: u64,
}

impl HitboxA {
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
            grow: config.hitbox_grow,
            max_distance: config.hitbox_max_distance,
            teleport_grace: config.hitbox_teleport_grace,
        }
    }

    /// Validates the reported click position against the target's current and
    /// previous boxes, both grown by the tolerance. Non-player targets have
    /// host-side hitbox quirks and are skipped, as are freshly teleported
    /// targets whose client-side box lags behind.
    pub fn on_attack(
        &mut self,
        ctx: &mut DetectionCtx<'_>,
        click_position: &Vector3<f64>,
        target: &TrackedEntity,
    ) {
        if !target.is_player || target.ticks_since_teleport(ctx.tick) < self.teleport_grace {
            return;
        }

        let current = target.current_box().grow(self.grow);
        let previous = target.prev_box().grow(self.grow);
        let distance = current
            .distance_to_point(click_position)
            .min(previous.distance_to_point(click_position));

        if distance > self.max_distance {
            // Weight scales with how far outside the box the click landed.
            let extra = 2.0f64.mul_add(distance, 0.6);
            ctx.flag(self, extra, vec![("distance", format!("{distance:.5}"))]);
        } else {
            pass(&mut self.state, DEFAULT_PASS);
        }
    }
}

impl Detection for HitboxA {
    fn name(&self) -> &'static str {
        "HitboxA"
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
