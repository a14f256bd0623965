//! World-interaction detections: scaffold placement and break-rate limits.

use warden_utils::collections::RingBuffer;
use warden_utils::math::Vector3;

use crate::config::{Thresholds, WorldConfig};
use crate::detection::{Detection, DetectionCtx, DetectionKind, DetectionState};
use crate::interface::TriggerType;

/// `ScaffoldA`: modern clients always report the exact click position on the
/// face they place against. Scaffold cheats place programmatically and leave
/// it zeroed. Older protocols never sent the field, so they are exempt.
#[derive(Debug)]
pub struct ScaffoldA {
    state: DetectionState,
    min_protocol: i32,
}

impl ScaffoldA {
    /// Builds the detector from world tuning.
    #[must_use]
    pub const fn new(config: &WorldConfig) -> Self {
        Self {
            state: DetectionState::new(Thresholds {
                max_buffer: 4.0,
                fail_buffer: 2.0,
                max_violations: 10.0,
                trust_duration: 40,
            }),
            min_protocol: config.scaffold_min_protocol,
        }
    }

    /// Validates one block placement. Only direct player input counts;
    /// held-button repeat placements are generated by the client simulation
    /// and legitimately omit the click position.
    pub fn on_place(
        &mut self,
        ctx: &mut DetectionCtx<'_>,
        click_position: &Vector3<f64>,
        trigger: TriggerType,
        protocol_version: i32,
    ) {
        if protocol_version < self.min_protocol || trigger != TriggerType::PlayerInput {
            return;
        }
        if click_position.length_sq() < f64::EPSILON {
            ctx.flag(self, 1.0, vec![("protocol", protocol_version.to_string())]);
        }
    }
}

impl Detection for ScaffoldA {
    fn name(&self) -> &'static str {
        "ScaffoldA"
    }

    fn kind(&self) -> DetectionKind {
        DetectionKind::World
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

/// Window over which `NukerA` counts block breaks.
const BREAK_WINDOW_TICKS: u64 = 20;

/// `NukerA`: block-break rate ceiling over a one-second window. Survival
/// break timing caps an honest client far below what nuker mods attempt.
#[derive(Debug)]
pub struct NukerA {
    state: DetectionState,
    breaks_per_second: u32,
    break_ticks: RingBuffer<u64>,
}

impl NukerA {
    /// Builds the detector from world tuning.
    #[must_use]
    pub fn new(config: &WorldConfig) -> Self {
        Self {
            state: DetectionState::new(Thresholds {
                max_buffer: 4.0,
                fail_buffer: 2.0,
                max_violations: 10.0,
                trust_duration: 40,
            }),
            breaks_per_second: config.nuker_breaks_per_second,
            // Twice the limit is enough history to count a violation.
            break_ticks: RingBuffer::new(config.nuker_breaks_per_second as usize * 2),
        }
    }

    /// Records one block break and checks the rolling rate.
    pub fn on_break(&mut self, ctx: &mut DetectionCtx<'_>, tick: u64) {
        self.break_ticks.push(tick);
        let recent = self
            .break_ticks
            .iter()
            .filter(|&&t| tick.saturating_sub(t) < BREAK_WINDOW_TICKS)
            .count();
        if recent as u32 > self.breaks_per_second {
            ctx.flag(self, 1.0, vec![("breaks", recent.to_string())]);
        }
    }
}

impl Detection for NukerA {
    fn name(&self) -> &'static str {
        "NukerA"
    }

    fn kind(&self) -> DetectionKind {
        DetectionKind::World
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
