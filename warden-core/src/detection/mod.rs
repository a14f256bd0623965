//! Detection state machine shared by every detector.
//!
//! A detector is a small struct owning a [`DetectionState`] plus whatever
//! working data its heuristic needs. The buffer/violation state machine
//! itself lives in the free functions [`fail`], [`pass`] and [`reset`] so the
//! hot path stays allocation-free and there is exactly one copy of the
//! escalation rules.
//!
//! States: *idle* (`buffer < fail_buffer`) → *flagged* (buffer crossed,
//! violations accrue, paced by trust duration) → *punished*
//! (`violations >= max_violations`, report-only: the punish signal is
//! surfaced to the host, never enforced here).

pub mod auth;
pub mod combat;
pub mod manager;
pub mod movement;
pub mod packet;
pub mod world;

use thiserror::Error;

use crate::config::Thresholds;
use crate::interface::NotificationSink;
use crate::player::cancellation::CancellationState;

/// Category tag of a detector, used for routing and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionKind {
    /// Combat checks (reach, killaura, hitbox, aim, autoclicker).
    Combat,
    /// Movement checks backed by the physics simulation.
    Movement,
    /// Stateless packet-validity checks.
    Packet,
    /// Session/auth metadata cross-validation.
    Auth,
    /// World interaction checks.
    World,
}

impl DetectionKind {
    /// Lowercase tag for logs and notification payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Combat => "combat",
            Self::Movement => "movement",
            Self::Packet => "packet",
            Self::Auth => "auth",
            Self::World => "world",
        }
    }
}

/// Mutable per-detector, per-player state machine data.
#[derive(Debug, Clone, Copy)]
pub struct DetectionState {
    /// Decaying suspicion accumulator, clamped to `[0, max_buffer]`.
    pub buffer: f64,
    /// Accumulated violations. Only [`reset`] lowers this.
    pub violations: f64,
    /// Buffer ceiling.
    pub max_buffer: f64,
    /// Buffer level at which violations start accruing.
    pub fail_buffer: f64,
    /// Violations at which the punish signal fires.
    pub max_violations: f64,
    /// Minimum tick spacing between full-weight violations. `<= 0` means
    /// every threshold crossing adds a full violation.
    pub trust_duration: i64,
    /// Tick of the last violation-adding flag.
    pub last_flagged_tick: u64,
}

/// Invalid threshold combinations, rejected at registration time.
#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    /// `fail_buffer` must not exceed `max_buffer`, or the detector can
    /// never flag.
    #[error("fail buffer {fail_buffer} exceeds max buffer {max_buffer} for {detection}")]
    FailBufferExceedsMax {
        /// Name of the misconfigured detector.
        detection: &'static str,
        /// Configured fail buffer.
        fail_buffer: f64,
        /// Configured max buffer.
        max_buffer: f64,
    },
}

impl DetectionState {
    /// Creates a fresh state from thresholds.
    #[must_use]
    pub const fn new(thresholds: Thresholds) -> Self {
        Self {
            buffer: 0.0,
            violations: 0.0,
            max_buffer: thresholds.max_buffer,
            fail_buffer: thresholds.fail_buffer,
            max_violations: thresholds.max_violations,
            trust_duration: thresholds.trust_duration,
            last_flagged_tick: 0,
        }
    }

    /// Validates the threshold invariant for `detection`.
    pub fn validate(&self, detection: &'static str) -> Result<(), RegistryError> {
        if self.fail_buffer > self.max_buffer {
            return Err(RegistryError::FailBufferExceedsMax {
                detection,
                fail_buffer: self.fail_buffer,
                max_buffer: self.max_buffer,
            });
        }
        Ok(())
    }

    /// Whether the buffer currently sits at or above the fail threshold.
    #[must_use]
    pub fn is_flagged(&self) -> bool {
        self.buffer >= self.fail_buffer
    }

    /// Whether violations have reached the punish ceiling.
    #[must_use]
    pub fn is_maxed(&self) -> bool {
        self.violations >= self.max_violations
    }
}

/// Result of a [`fail`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FailOutcome {
    /// Whether the buffer is at/above the fail threshold after this call.
    pub flagged: bool,
    /// Violation weight added by this call (0 when below threshold).
    pub violation_added: f64,
    /// Whether this call pushed violations to `max_violations` for the
    /// first time.
    pub new_max: bool,
}

/// Raises suspicion by `extra` and, if the fail threshold is crossed,
/// accrues a violation weighted by trust-duration pacing: flags spaced at
/// least `trust_duration` ticks apart count fully, rapid-fire flags count
/// proportionally less so a burst cannot instantly max out violations.
pub fn fail(state: &mut DetectionState, extra: f64, current_tick: u64) -> FailOutcome {
    state.buffer = (state.buffer + extra).clamp(0.0, state.max_buffer);
    if state.buffer < state.fail_buffer {
        return FailOutcome {
            flagged: false,
            violation_added: 0.0,
            new_max: false,
        };
    }

    let increment = if state.trust_duration <= 0 {
        1.0
    } else {
        let elapsed = current_tick.saturating_sub(state.last_flagged_tick) as f64;
        (elapsed / state.trust_duration as f64).min(1.0)
    };

    let was_maxed = state.is_maxed();
    state.violations += increment;
    state.last_flagged_tick = current_tick;

    FailOutcome {
        flagged: true,
        violation_added: increment,
        new_max: !was_maxed && state.is_maxed(),
    }
}

/// Decays suspicion during legitimate behavior. Never touches violations.
pub fn pass(state: &mut DetectionState, amount: f64) {
    state.buffer = (state.buffer - amount).max(0.0);
}

/// Default decay used by detectors without a bespoke amount.
pub const DEFAULT_PASS: f64 = 0.1;

/// Zeroes both the buffer and the violations.
pub fn reset(state: &mut DetectionState) {
    state.buffer = 0.0;
    state.violations = 0.0;
}

/// The uniform surface every detector exposes to the manager.
pub trait Detection {
    /// Stable detector name, e.g. `"ReachA"`.
    fn name(&self) -> &'static str;

    /// Category tag.
    fn kind(&self) -> DetectionKind;

    /// Shared state machine data.
    fn state(&self) -> &DetectionState;

    /// Mutable shared state machine data.
    fn state_mut(&mut self) -> &mut DetectionState;

    /// Whether this detector may void the in-flight action on suspicion,
    /// independent of violation pacing.
    fn is_cancellable(&self) -> bool {
        false
    }

    /// Per-tick hook. Most detectors are event-driven and leave this empty.
    fn on_tick(&mut self, _current_tick: u64) {}
}

/// Point-in-time view of one detector, for the host's inspection commands.
#[derive(Debug, Clone)]
pub struct DetectionSnapshot {
    /// Detector name.
    pub name: &'static str,
    /// Category tag.
    pub kind: DetectionKind,
    /// Current violations.
    pub violations: f64,
    /// Punish ceiling.
    pub max_violations: f64,
    /// Current buffer.
    pub buffer: f64,
    /// Buffer ceiling.
    pub max_buffer: f64,
    /// Whether the detector can cancel actions.
    pub cancellable: bool,
}

/// Payload handed to the [`NotificationSink`] when a violation accrues.
#[derive(Debug, Clone)]
pub struct ViolationEvent {
    /// Player display name.
    pub player: String,
    /// Detector name.
    pub detection: &'static str,
    /// Detector category tag.
    pub kind: DetectionKind,
    /// Violations after this event.
    pub violations: f64,
    /// Punish ceiling.
    pub max_violations: f64,
    /// Buffer after this event.
    pub buffer: f64,
    /// Buffer ceiling.
    pub max_buffer: f64,
    /// Free-form debug key/value pairs from the detector.
    pub debug: Vec<(&'static str, String)>,
    /// Whether this event crossed `max_violations` for the first time.
    pub new_max: bool,
}

/// Everything a detector needs to report a flag: the current tick, where to
/// send events and where to record cancellation.
pub struct DetectionCtx<'a> {
    /// Current server tick.
    pub tick: u64,
    /// Player display name, for event payloads.
    pub player_name: &'a str,
    /// Violation event sink.
    pub sink: &'a dyn NotificationSink,
    /// Per-tick cancellation flag for the in-flight action.
    pub cancellation: &'a mut CancellationState,
}

impl DetectionCtx<'_> {
    /// Runs the fail state machine for `detection`, emits a violation event
    /// when one accrues, and requests cancellation when the detector is
    /// cancellable and flagged. Returns the outcome.
    pub fn flag<D: Detection + ?Sized>(
        &mut self,
        detection: &mut D,
        extra: f64,
        debug: Vec<(&'static str, String)>,
    ) -> FailOutcome {
        let name = detection.name();
        let kind = detection.kind();
        let cancellable = detection.is_cancellable();
        let outcome = fail(detection.state_mut(), extra, self.tick);

        if outcome.flagged && cancellable {
            self.cancellation.cancel(name);
        }

        if outcome.violation_added > 0.0 {
            let state = detection.state();
            if outcome.new_max {
                log::info!(
                    "{} reached max violations on {} ({}/{})",
                    self.player_name,
                    name,
                    state.violations,
                    state.max_violations
                );
            }
            self.sink.notify(&ViolationEvent {
                player: self.player_name.to_owned(),
                detection: name,
                kind,
                violations: state.violations,
                max_violations: state.max_violations,
                buffer: state.buffer,
                max_buffer: state.max_buffer,
                debug,
                new_max: outcome.new_max,
            });
        }
        outcome
    }
}
