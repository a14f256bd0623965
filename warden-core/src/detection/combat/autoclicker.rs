//! Autoclicker detection, four independent angles on the same click stream:
//!
//! * `AutoclickerA` — raw CPS ceiling over the exact 20-tick window.
//! * `AutoclickerB` — interval consistency (stddev and coefficient of
//!   variation floors). Human clicking is noisy even at high speed.
//! * `AutoclickerC` — interval distribution shape (kurtosis, skewness,
//!   entropy). Jitter-randomized clickers beat B but draw from distributions
//!   no hand produces.
//! * `AutoclickerD` — sequence structure (runs test, lag-1 autocorrelation,
//!   cross-burst consistency). Catches patterned and replayed timing.
//!
//! B, C and D require a streak of consecutive suspicious evaluations before
//! flagging, so a single odd sampling window never costs a violation.

use crate::config::{ClicksConfig, Thresholds};
use crate::detection::{
    DEFAULT_PASS, Detection, DetectionCtx, DetectionKind, DetectionState, pass,
};
use crate::player::click_state::{ClickButton, ClickTrack};
use crate::player::click_stats;

/// Clicks between consecutive B/C/D evaluations, so overlapping windows do
/// not stack the same evidence.
const EVAL_SPACING: usize = 10;

/// CPS ceiling check.
#[derive(Debug)]
pub struct AutoclickerA {
    state: DetectionState,
    left_limit: u32,
    right_limit: u32,
}

impl AutoclickerA {
    /// Builds the detector from click tuning.
    #[must_use]
    pub const fn new(config: &ClicksConfig) -> Self {
        Self {
            state: DetectionState::new(Thresholds {
                max_buffer: 4.0,
                fail_buffer: 4.0,
                max_violations: 10.0,
                trust_duration: 20,
            }),
            left_limit: config.left_cps_limit,
            right_limit: config.right_cps_limit,
        }
    }

    /// Checks one button's sliding-window CPS. Called every tick.
    pub fn on_tick_check(
        &mut self,
        ctx: &mut DetectionCtx<'_>,
        track: &ClickTrack,
        button: ClickButton,
    ) {
        let limit = match button {
            ClickButton::Left => self.left_limit,
            ClickButton::Right => self.right_limit,
        };
        let cps = track.cps();
        if cps > limit {
            let debug = vec![
                ("cps", cps.to_string()),
                ("limit", limit.to_string()),
                ("button", format!("{button:?}")),
            ];
            ctx.flag(self, 4.0, debug);
        } else {
            pass(&mut self.state, DEFAULT_PASS);
        }
    }
}

impl Detection for AutoclickerA {
    fn name(&self) -> &'static str {
        "AutoclickerA"
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
}

/// Interval-consistency check.
#[derive(Debug)]
pub struct AutoclickerB {
    state: DetectionState,
    min_cv: f64,
    min_stddev: f64,
    required_streak: u32,
    streak: u32,
    clicks_since_eval: usize,
}

impl AutoclickerB {
    /// Builds the detector from click tuning.
    #[must_use]
    pub const fn new(config: &ClicksConfig) -> Self {
        Self {
            state: DetectionState::new(Thresholds {
                max_buffer: 6.0,
                fail_buffer: 3.0,
                max_violations: 10.0,
                trust_duration: 60,
            }),
            min_cv: config.min_interval_cv,
            min_stddev: config.min_interval_stddev,
            required_streak: config.suspicion_streak,
            streak: 0,
            clicks_since_eval: 0,
        }
    }

    /// Feeds one click; evaluates the interval history every few clicks.
    pub fn on_click(&mut self, ctx: &mut DetectionCtx<'_>, track: &ClickTrack) {
        self.clicks_since_eval += 1;
        if self.clicks_since_eval < EVAL_SPACING
            || track.interval_count() < click_stats::MIN_SHAPE_SAMPLES
        {
            return;
        }
        self.clicks_since_eval = 0;

        let intervals = track.intervals();
        let Some(mean) = click_stats::mean(&intervals) else {
            return;
        };
        let Some(stddev) = click_stats::std_dev(&intervals) else {
            return;
        };
        if mean <= 0.0 {
            return;
        }
        let cv = stddev / mean;

        if cv < self.min_cv || stddev < self.min_stddev {
            self.streak += 1;
            if self.streak >= self.required_streak {
                self.streak = 0;
                let debug = vec![
                    ("cv", format!("{cv:.4}")),
                    ("stddev", format!("{stddev:.4}")),
                ];
                ctx.flag(self, 3.0, debug);
            }
        } else {
            self.streak = 0;
            pass(&mut self.state, DEFAULT_PASS);
        }
    }
}

impl Detection for AutoclickerB {
    fn name(&self) -> &'static str {
        "AutoclickerB"
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
}

/// Distribution-shape check.
#[derive(Debug)]
pub struct AutoclickerC {
    state: DetectionState,
    min_entropy: f64,
    required_streak: u32,
    streak: u32,
    clicks_since_eval: usize,
}

impl AutoclickerC {
    /// Builds the detector from click tuning.
    #[must_use]
    pub const fn new(config: &ClicksConfig) -> Self {
        Self {
            state: DetectionState::new(Thresholds {
                max_buffer: 6.0,
                fail_buffer: 3.0,
                max_violations: 10.0,
                trust_duration: 60,
            }),
            min_entropy: config.min_entropy,
            required_streak: config.suspicion_streak,
            streak: 0,
            clicks_since_eval: 0,
        }
    }

    /// Feeds one click; scores the distribution shape every few clicks.
    /// The three shape signals are weighted and combined so no single
    /// marginal statistic can flag on its own.
    pub fn on_click(&mut self, ctx: &mut DetectionCtx<'_>, track: &ClickTrack) {
        self.clicks_since_eval += 1;
        if self.clicks_since_eval < EVAL_SPACING
            || track.interval_count() < click_stats::MIN_SHAPE_SAMPLES
        {
            return;
        }
        self.clicks_since_eval = 0;

        let intervals = track.intervals();
        let mut score = 0.0;
        let mut debug = Vec::new();

        // Strongly platykurtic: intervals drawn from a flat jitter range.
        if let Some(kurtosis) = click_stats::excess_kurtosis(&intervals) {
            if kurtosis < -1.0 {
                score += 0.4;
            }
            debug.push(("kurtosis", format!("{kurtosis:.3}")));
        }
        // Human interval distributions skew right (long-pause tail).
        if let Some(skew) = click_stats::skewness(&intervals) {
            if skew.abs() < 0.05 {
                score += 0.3;
            }
            debug.push(("skewness", format!("{skew:.3}")));
        }
        if let Some(entropy) = click_stats::shannon_entropy(&intervals) {
            if entropy < self.min_entropy {
                score += 0.5;
            }
            debug.push(("entropy", format!("{entropy:.3}")));
        }

        if score >= 0.7 {
            self.streak += 1;
            if self.streak >= self.required_streak {
                self.streak = 0;
                debug.push(("score", format!("{score:.2}")));
                ctx.flag(self, 3.0, debug);
            }
        } else {
            self.streak = 0;
            pass(&mut self.state, DEFAULT_PASS);
        }
    }
}

impl Detection for AutoclickerC {
    fn name(&self) -> &'static str {
        "AutoclickerC"
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
}

/// Sequence-structure check.
#[derive(Debug)]
pub struct AutoclickerD {
    state: DetectionState,
    max_runs_z: f64,
    max_autocorrelation: f64,
    min_burst_cv: f64,
    required_streak: u32,
    streak: u32,
    clicks_since_eval: usize,
}

impl AutoclickerD {
    /// Minimum finalized bursts before the cross-burst comparison runs.
    const MIN_BURSTS: usize = 5;

    /// Builds the detector from click tuning.
    #[must_use]
    pub const fn new(config: &ClicksConfig) -> Self {
        Self {
            state: DetectionState::new(Thresholds {
                max_buffer: 6.0,
                fail_buffer: 3.0,
                max_violations: 10.0,
                trust_duration: 60,
            }),
            max_runs_z: config.max_runs_z,
            max_autocorrelation: config.max_autocorrelation,
            min_burst_cv: config.min_burst_cv,
            required_streak: config.suspicion_streak,
            streak: 0,
            clicks_since_eval: 0,
        }
    }

    /// Feeds one click; evaluates sequence randomness every few clicks.
    pub fn on_click(&mut self, ctx: &mut DetectionCtx<'_>, track: &ClickTrack) {
        self.clicks_since_eval += 1;
        if self.clicks_since_eval < EVAL_SPACING
            || track.interval_count() < click_stats::MIN_SHAPE_SAMPLES
        {
            return;
        }
        self.clicks_since_eval = 0;

        let intervals = track.intervals();
        let mut suspicious = false;
        let mut debug = Vec::new();

        if let Some(z) = click_stats::runs_test_z(&intervals) {
            if z.abs() > self.max_runs_z {
                suspicious = true;
            }
            debug.push(("runs_z", format!("{z:.3}")));
        }
        if let Some(ac) = click_stats::autocorrelation_lag1(&intervals) {
            if ac.abs() > self.max_autocorrelation {
                suspicious = true;
            }
            debug.push(("autocorr", format!("{ac:.3}")));
        }
        if let Some(cv) = Self::cross_burst_cv(track) {
            if cv < self.min_burst_cv {
                suspicious = true;
            }
            debug.push(("burst_cv", format!("{cv:.4}")));
        }

        if suspicious {
            self.streak += 1;
            if self.streak >= self.required_streak {
                self.streak = 0;
                ctx.flag(self, 3.0, debug);
            }
        } else {
            self.streak = 0;
            pass(&mut self.state, DEFAULT_PASS);
        }
    }

    /// Coefficient of variation of mean intervals across finalized bursts.
    /// Near-identical bursts mean the "pauses" between them are scripted too.
    fn cross_burst_cv(track: &ClickTrack) -> Option<f64> {
        let bursts = track.bursts();
        if bursts.len() < Self::MIN_BURSTS {
            return None;
        }
        let means: Vec<f64> = bursts.iter().map(|b| b.mean_interval).collect();
        let mean = click_stats::mean(&means)?;
        if mean <= 0.0 {
            return None;
        }
        let variance =
            means.iter().map(|m| (m - mean) * (m - mean)).sum::<f64>() / means.len() as f64;
        Some(variance.sqrt() / mean)
    }
}

impl Detection for AutoclickerD {
    fn name(&self) -> &'static str {
        "AutoclickerD"
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
}
