//! `TimerA`: move-packet cadence accounting. A client running its game loop
//! faster than 20 Hz sends more than one move packet per server tick; the
//! balance of (received - expected) grows without bound where honest jitter
//! only oscillates around zero.

use crate::config::{MovementConfig, Thresholds};
use crate::detection::{Detection, DetectionCtx, DetectionKind, DetectionState};

/// Credit floor so laggy ticks cannot bank unlimited slow-down credit that
/// would mask a later speed-up.
const MIN_BALANCE: f64 = -20.0;

/// Packet-cadence balance check.
#[derive(Debug)]
pub struct TimerA {
    state: DetectionState,
    limit: f64,
    balance: f64,
}

impl TimerA {
    /// Builds the detector from movement tuning.
    #[must_use]
    pub const fn new(config: &MovementConfig) -> Self {
        Self {
            state: DetectionState::new(Thresholds {
                max_buffer: 3.0,
                fail_buffer: 2.0,
                max_violations: 10.0,
                trust_duration: 40,
            }),
            limit: config.timer_balance_limit,
            balance: 0.0,
        }
    }

    /// Feeds the move-packet count observed this tick. One packet per tick
    /// is the expectation; a teleport in flight pauses accounting because
    /// clients legitimately burst packets while confirming it.
    pub fn on_tick_check(&mut self, ctx: &mut DetectionCtx<'_>, cadence: u32, teleporting: bool) {
        if teleporting {
            self.balance = 0.0;
            return;
        }

        self.balance = (self.balance + f64::from(cadence) - 1.0).max(MIN_BALANCE);
        if self.balance > self.limit {
            let debug = vec![("balance", format!("{:.1}", self.balance))];
            self.balance = 0.0;
            ctx.flag(self, 1.0, debug);
        }
    }
}

impl Detection for TimerA {
    fn name(&self) -> &'static str {
        "TimerA"
    }

    fn kind(&self) -> DetectionKind {
        DetectionKind::Movement
    }

    fn state(&self) -> &DetectionState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut DetectionState {
        &mut self.state
    }
}
