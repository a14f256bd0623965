//! Tuned thresholds for every detector, grouped into serde-friendly sections.
//!
//! Loading and merging config files is the host's job; this crate only
//! defines the shape and the defaults. Every default here is a tuned
//! constant, not a placeholder — changing one shifts a detector's
//! false-positive/false-negative balance.

use serde::{Deserialize, Serialize};

/// Buffer/violation thresholds shared by the detection state machine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Buffer ceiling.
    pub max_buffer: f64,
    /// Buffer level at which a flag becomes a violation.
    pub fail_buffer: f64,
    /// Violations at which the punish signal fires.
    pub max_violations: f64,
    /// Minimum tick spacing for full-weight violations; `-1` disables
    /// trust pacing.
    pub trust_duration: i64,
}

impl Thresholds {
    /// Instant-signal thresholds for packet-validity style checks.
    #[must_use]
    pub const fn instant() -> Self {
        Self {
            max_buffer: 1.0,
            fail_buffer: 1.0,
            max_violations: 1.0,
            trust_duration: -1,
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_buffer: 10.0,
            fail_buffer: 5.0,
            max_violations: 10.0,
            trust_duration: 40,
        }
    }
}

/// Combat detector tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Max ticks between swing and attack before `KillauraA` flags.
    pub killaura_swing_gap: u64,
    /// `ReachA` minimum-hit-distance threshold.
    pub reach_min: f64,
    /// `ReachA` maximum-hit-distance threshold.
    pub reach_max: f64,
    /// Lag-compensation interpolation steps for the raycast reach check.
    pub reach_raycast_steps: u32,
    /// Lag-compensation interpolation steps for the closest-point variant.
    pub reach_closest_steps: u32,
    /// Ticks after a teleport during which reach checks are skipped.
    pub reach_teleport_grace: u64,
    /// `HitboxA` tolerance added to both target boxes.
    pub hitbox_grow: f64,
    /// `HitboxA` distance past the grown box that flags.
    pub hitbox_max_distance: f64,
    /// Ticks after a target teleport during which `HitboxA` is skipped.
    pub hitbox_teleport_grace: u64,
    /// `AimA` rounding-difference threshold.
    pub aim_rounding_epsilon: f64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            killaura_swing_gap: 10,
            reach_min: 2.9,
            reach_max: 3.0,
            reach_raycast_steps: 20,
            reach_closest_steps: 10,
            reach_teleport_grace: 20,
            hitbox_grow: 0.1,
            hitbox_max_distance: 0.004,
            hitbox_teleport_grace: 10,
            aim_rounding_epsilon: 3.0e-5,
        }
    }
}

/// Autoclicker detector tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClicksConfig {
    /// Left-button CPS ceiling for `AutoclickerA`.
    pub left_cps_limit: u32,
    /// Right-button CPS ceiling for `AutoclickerA`.
    pub right_cps_limit: u32,
    /// Coefficient-of-variation floor below which timing is machine-like.
    pub min_interval_cv: f64,
    /// Stddev floor (ticks) below which timing is machine-like.
    pub min_interval_stddev: f64,
    /// Entropy floor (bits) for the distribution-shape check.
    pub min_entropy: f64,
    /// |runs-test Z| above which the sequence is non-random.
    pub max_runs_z: f64,
    /// |lag-1 autocorrelation| above which the sequence is patterned.
    pub max_autocorrelation: f64,
    /// Cross-burst CV floor for the burst-consistency check.
    pub min_burst_cv: f64,
    /// Consecutive suspicious evaluations required before flagging.
    pub suspicion_streak: u32,
}

impl Default for ClicksConfig {
    fn default() -> Self {
        Self {
            left_cps_limit: 20,
            right_cps_limit: 25,
            min_interval_cv: 0.08,
            min_interval_stddev: 0.25,
            min_entropy: 1.2,
            max_runs_z: 2.6,
            max_autocorrelation: 0.75,
            min_burst_cv: 0.05,
            suspicion_streak: 3,
        }
    }
}

/// Movement detector tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Horizontal divergence (blocks/tick) from the authoritative twin that
    /// `SpeedA` tolerates.
    pub speed_tolerance: f64,
    /// Vertical divergence tolerated by `FlightA`.
    pub flight_tolerance: f64,
    /// Fraction of expected knockback the client must show before
    /// `VelocityA` suspects anti-knockback.
    pub velocity_min_response: f64,
    /// Ticks of knockback observation before giving up on the comparison.
    pub velocity_window: u32,
    /// Client/authoritative distance that forces a position correction.
    pub correction_threshold: f64,
    /// Ticks after a correction during which movement checks stay quiet.
    pub correction_cooldown: u64,
    /// Timer balance (ticks) the cadence check allows before flagging.
    pub timer_balance_limit: f64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            speed_tolerance: 0.25,
            flight_tolerance: 0.3,
            velocity_min_response: 0.4,
            velocity_window: 6,
            correction_threshold: 0.1,
            correction_cooldown: 20,
            timer_balance_limit: 5.0,
        }
    }
}

/// World-interaction detector tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Protocol version from which clients always send a real click
    /// position; zero vectors below this version are legitimate.
    pub scaffold_min_protocol: i32,
    /// Block breaks per second `NukerA` tolerates.
    pub nuker_breaks_per_second: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            scaffold_min_protocol: 712,
            nuker_breaks_per_second: 12,
        }
    }
}

/// Top-level configuration of the anticheat core.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    /// Combat detector tuning.
    pub combat: CombatConfig,
    /// Autoclicker detector tuning.
    pub clicks: ClicksConfig,
    /// Movement detector tuning.
    pub movement: MovementConfig,
    /// World detector tuning.
    pub world: WorldConfig,
}

#[cfg(test)]
mod tests {
    use super::WardenConfig;

    #[test]
    fn defaults_round_trip_through_json() {
        let config = WardenConfig::default();
        let json = serde_json::to_string(&config).expect("serialize");
        let back: WardenConfig = serde_json::from_str(&json).expect("deserialize");
        assert!((back.combat.reach_min - config.combat.reach_min).abs() < f64::EPSILON);
        assert_eq!(back.clicks.left_cps_limit, config.clicks.left_cps_limit);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let back: WardenConfig =
            serde_json::from_str(r#"{"clicks": {"left_cps_limit": 15}}"#).expect("deserialize");
        assert_eq!(back.clicks.left_cps_limit, 15);
        assert_eq!(back.world.scaffold_min_protocol, 712);
    }
}
