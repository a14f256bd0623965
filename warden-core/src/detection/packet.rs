//! Stateless packet-validity checks. Each one fires on a value no unmodified
//! client can produce, so they all run with instant thresholds: one bad
//! packet is one violation, no buffering.

use crate::config::Thresholds;
use crate::detection::{Detection, DetectionCtx, DetectionKind, DetectionState};
use crate::interface::GameMode;

/// Hotbar slots a client can legally select.
const HOTBAR_SLOTS: std::ops::Range<i32> = 0..9;
/// Block faces are the six cube sides.
const MAX_BLOCK_FACE: i32 = 5;
/// Legal per-component magnitude of the raw move vector, with the client's
/// own float slack.
const MOVE_VECTOR_LIMIT: f32 = 1.001;

macro_rules! packet_detection {
    ($name:ident, $label:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug)]
        pub struct $name {
            state: DetectionState,
        }

        impl $name {
            /// Builds the detector with instant thresholds.
            #[must_use]
            pub const fn new() -> Self {
                Self {
                    state: DetectionState::new(Thresholds::instant()),
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Detection for $name {
            fn name(&self) -> &'static str {
                $label
            }

            fn kind(&self) -> DetectionKind {
                DetectionKind::Packet
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
    };
}

packet_detection!(
    BadPacketA,
    "BadPacketA",
    "Client simulation frames must be strictly monotonic."
);
packet_detection!(BadPacketB, "BadPacketB", "A player can never attack itself.");
packet_detection!(
    BadPacketC,
    "BadPacketC",
    "Creative-only actions require the creative game mode."
);
packet_detection!(
    BadPacketD,
    "BadPacketD",
    "Hotbar slot selections must be within the hotbar."
);
packet_detection!(
    BadPacketE,
    "BadPacketE",
    "Raw move vector components must be within the analog-stick range."
);
packet_detection!(
    BadPacketF,
    "BadPacketF",
    "Block faces are limited to the six cube sides."
);

impl BadPacketA {
    /// Validates one frame against the last accepted frame. Returns whether
    /// the frame may be accepted.
    pub fn check_frame(&mut self, ctx: &mut DetectionCtx<'_>, frame: u64, last_frame: u64) -> bool {
        if last_frame > 0 && frame <= last_frame {
            let debug = vec![
                ("frame", frame.to_string()),
                ("last_frame", last_frame.to_string()),
            ];
            ctx.flag(self, 1.0, debug);
            return false;
        }
        true
    }
}

impl BadPacketB {
    /// Rejects attacks whose target is the attacker.
    pub fn check_attack(&mut self, ctx: &mut DetectionCtx<'_>, attacker: u64, target: u64) -> bool {
        if attacker == target {
            ctx.flag(self, 1.0, vec![("entity", attacker.to_string())]);
            return false;
        }
        true
    }
}

impl BadPacketC {
    /// Rejects creative actions (item spawning, instabreak) outside creative.
    pub fn check_creative_action(&mut self, ctx: &mut DetectionCtx<'_>, mode: GameMode) -> bool {
        if mode == GameMode::Creative {
            return true;
        }
        ctx.flag(self, 1.0, vec![("mode", format!("{mode:?}"))]);
        false
    }
}

impl BadPacketD {
    /// Rejects out-of-range hotbar slots.
    pub fn check_slot(&mut self, ctx: &mut DetectionCtx<'_>, slot: i32) -> bool {
        if HOTBAR_SLOTS.contains(&slot) {
            return true;
        }
        ctx.flag(self, 1.0, vec![("slot", slot.to_string())]);
        false
    }
}

impl BadPacketE {
    /// Rejects move vectors outside the analog range. `(1.0, 1.0)` is a
    /// legal diagonal; normalization happens later in the pipeline.
    pub fn check_move_vector(&mut self, ctx: &mut DetectionCtx<'_>, vector: (f32, f32)) -> bool {
        if vector.0.abs() <= MOVE_VECTOR_LIMIT && vector.1.abs() <= MOVE_VECTOR_LIMIT {
            return true;
        }
        let debug = vec![("vector", format!("({}, {})", vector.0, vector.1))];
        ctx.flag(self, 1.0, debug);
        false
    }
}

impl BadPacketF {
    /// Rejects block faces outside `[0, 5]`.
    pub fn check_face(&mut self, ctx: &mut DetectionCtx<'_>, face: i32) -> bool {
        if (0..=MAX_BLOCK_FACE).contains(&face) {
            return true;
        }
        ctx.flag(self, 1.0, vec![("face", face.to_string())]);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::NullSink;
    use crate::player::cancellation::CancellationState;

    fn with_ctx<R>(f: impl FnOnce(&mut DetectionCtx<'_>) -> R) -> (R, CancellationState) {
        let mut cancellation = CancellationState::new();
        let result = {
            let mut ctx = DetectionCtx {
                tick: 100,
                player_name: "steve",
                sink: &NullSink,
                cancellation: &mut cancellation,
            };
            f(&mut ctx)
        };
        (result, cancellation)
    }

    #[test]
    fn rewound_frame_is_rejected() {
        let mut detector = BadPacketA::new();
        let (ok, _) = with_ctx(|ctx| detector.check_frame(ctx, 50, 49));
        assert!(ok);
        let (ok, cancellation) = with_ctx(|ctx| detector.check_frame(ctx, 49, 50));
        assert!(!ok);
        assert!(cancellation.is_cancelled());
        assert!((detector.state().violations - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn first_frame_is_always_accepted() {
        let mut detector = BadPacketA::new();
        let (ok, _) = with_ctx(|ctx| detector.check_frame(ctx, 7, 0));
        assert!(ok);
    }

    #[test]
    fn self_attack_is_rejected() {
        let mut detector = BadPacketB::new();
        let (ok, _) = with_ctx(|ctx| detector.check_attack(ctx, 3, 4));
        assert!(ok);
        let (ok, _) = with_ctx(|ctx| detector.check_attack(ctx, 3, 3));
        assert!(!ok);
    }

    #[test]
    fn creative_action_requires_creative_mode() {
        let mut detector = BadPacketC::new();
        let (ok, _) = with_ctx(|ctx| detector.check_creative_action(ctx, GameMode::Creative));
        assert!(ok);
        let (ok, _) = with_ctx(|ctx| detector.check_creative_action(ctx, GameMode::Survival));
        assert!(!ok);
    }

    #[test]
    fn hotbar_slot_bounds() {
        let mut detector = BadPacketD::new();
        assert!(with_ctx(|ctx| detector.check_slot(ctx, 0)).0);
        assert!(with_ctx(|ctx| detector.check_slot(ctx, 8)).0);
        assert!(!with_ctx(|ctx| detector.check_slot(ctx, 9)).0);
        assert!(!with_ctx(|ctx| detector.check_slot(ctx, -1)).0);
    }

    #[test]
    fn move_vector_bounds() {
        let mut detector = BadPacketE::new();
        // A full diagonal is legal before normalization.
        assert!(with_ctx(|ctx| detector.check_move_vector(ctx, (1.0, 1.0))).0);
        assert!(!with_ctx(|ctx| detector.check_move_vector(ctx, (1.5, 0.0))).0);
        assert!(!with_ctx(|ctx| detector.check_move_vector(ctx, (0.0, -1.5))).0);
    }

    #[test]
    fn block_face_bounds() {
        let mut detector = BadPacketF::new();
        assert!(with_ctx(|ctx| detector.check_face(ctx, 5)).0);
        assert!(!with_ctx(|ctx| detector.check_face(ctx, 6)).0);
        assert!(!with_ctx(|ctx| detector.check_face(ctx, -2)).0);
    }
}
