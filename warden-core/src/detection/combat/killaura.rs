//! `KillauraA`: attacks must be preceded by an arm swing within the vanilla
//! swing window. Kill aura clients frequently attack without swinging, or
//! reuse a swing far older than the client animation allows.

use crate::config::{CombatConfig, Thresholds};
use crate::detection::{Detection, DetectionCtx, DetectionKind, DetectionState, pass};
use crate::interface::{EffectKind, EffectQuery};
use crate::player::combat_state::CombatState;

/// Swing-gap validation for attacks.
#[derive(Debug)]
pub struct KillauraA {
    state: DetectionState,
    swing_gap: u64,
}

impl KillauraA {
    /// Builds the detector from combat tuning.
    #[must_use]
    pub const fn new(config: &CombatConfig) -> Self {
        Self {
            state: DetectionState::new(Thresholds {
                max_buffer: 4.0,
                fail_buffer: 2.0,
                max_violations: 10.0,
                trust_duration: 40,
            }),
            swing_gap: config.killaura_swing_gap,
        }
    }

    /// Validates one attack against the swing timeline. Mining fatigue slows
    /// arm swings on the client, so each amplifier level widens the window.
    pub fn on_attack(
        &mut self,
        ctx: &mut DetectionCtx<'_>,
        combat: &CombatState,
        effects: &dyn EffectQuery,
    ) {
        let allowed = self.swing_gap
            + u64::from(effects.amplifier(EffectKind::MiningFatigue).unwrap_or(0));

        match combat.ticks_since_swing(ctx.tick) {
            Some(gap) if gap <= allowed => pass(&mut self.state, 0.25),
            gap => {
                let debug = vec![
                    ("gap", gap.map_or_else(|| "none".to_owned(), |g| g.to_string())),
                    ("allowed", allowed.to_string()),
                ];
                ctx.flag(self, 1.0, debug);
            }
        }
    }
}

impl Detection for KillauraA {
    fn name(&self) -> &'static str {
        "KillauraA"
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CombatConfig;
    use crate::interface::NullSink;
    use crate::player::cancellation::CancellationState;

    struct NoEffects;
    impl EffectQuery for NoEffects {
        fn amplifier(&self, _effect: EffectKind) -> Option<u32> {
            None
        }
    }

    struct Fatigued(u32);
    impl EffectQuery for Fatigued {
        fn amplifier(&self, _effect: EffectKind) -> Option<u32> {
            Some(self.0)
        }
    }

    fn ctx<'a>(tick: u64, cancellation: &'a mut CancellationState) -> DetectionCtx<'a> {
        DetectionCtx {
            tick,
            player_name: "steve",
            sink: &NullSink,
            cancellation,
        }
    }

    #[test]
    fn swing_then_attack_passes() {
        let mut detector = KillauraA::new(&CombatConfig::default());
        let mut combat = CombatState::new();
        combat.on_swing(100);
        let mut cancellation = CancellationState::default();
        detector.on_attack(&mut ctx(105, &mut cancellation), &combat, &NoEffects);
        assert!(detector.state().buffer.abs() < f64::EPSILON);
    }

    #[test]
    fn attack_without_swing_accumulates() {
        let mut detector = KillauraA::new(&CombatConfig::default());
        let combat = CombatState::new();
        let mut cancellation = CancellationState::default();
        detector.on_attack(&mut ctx(100, &mut cancellation), &combat, &NoEffects);
        assert!((detector.state().buffer - 1.0).abs() < f64::EPSILON);
        assert!(!cancellation.is_cancelled());

        // Second bad attack crosses the fail buffer and cancels the hit.
        detector.on_attack(&mut ctx(101, &mut cancellation), &combat, &NoEffects);
        assert!(cancellation.is_cancelled());
        assert_eq!(cancellation.reason(), Some("KillauraA"));
    }

    #[test]
    fn mining_fatigue_widens_the_window() {
        let mut detector = KillauraA::new(&CombatConfig::default());
        let mut combat = CombatState::new();
        combat.on_swing(100);
        let mut cancellation = CancellationState::default();
        // Gap of 13 exceeds the base window of 10 but not 10 + amplifier 3.
        detector.on_attack(&mut ctx(113, &mut cancellation), &combat, &Fatigued(3));
        assert!(detector.state().buffer.abs() < f64::EPSILON);
        detector.on_attack(&mut ctx(113, &mut cancellation), &combat, &NoEffects);
        assert!(detector.state().buffer > 0.0);
    }
}
