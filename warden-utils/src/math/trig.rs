//! Engine-accurate trigonometry.
//!
//! The client computes movement direction with a 65536-entry sine lookup
//! table, not full-precision trig. The server simulation has to make the same
//! rounding, otherwise yaw-rotated impulse acceleration drifts from what the
//! client actually did and every sprint turn looks like a deviation.

use std::sync::LazyLock;

/// Radians-to-index scale: `65536 / (2 * PI)`.
const INDEX_SCALE: f32 = 10430.378;

/// Quarter period of the table, added to the index for cosine.
const COS_OFFSET: f32 = 16384.0;

/// Shared lookup tables, built once on first use and read-only afterwards.
pub static TRIG_TABLES: LazyLock<TrigTables> = LazyLock::new(TrigTables::new);

/// A 65536-entry sine table indexed in 1/10430.378 radian steps.
pub struct TrigTables {
    sin: Box<[f32; 65536]>,
}

impl TrigTables {
    fn new() -> Self {
        let mut sin = Box::new([0.0f32; 65536]);
        for (i, v) in sin.iter_mut().enumerate() {
            *v = ((i as f64) * std::f64::consts::TAU / 65536.0).sin() as f32;
        }
        tracing::debug!("built 65536-entry sine table");
        Self { sin }
    }

    /// Table sine of `value` radians.
    ///
    /// The `as i32` cast truncates toward zero rather than flooring, so
    /// negative angles land one slot off a floored index. That is the
    /// client's own lookup, and the simulation has to round the same way.
    #[inline]
    #[must_use]
    pub fn sin(&self, value: f32) -> f32 {
        self.sin[(value * INDEX_SCALE) as i32 as usize & 0xFFFF]
    }

    /// Table cosine of `value` radians, via a quarter-period offset into the
    /// same table.
    #[inline]
    #[must_use]
    pub fn cos(&self, value: f32) -> f32 {
        self.sin[(value * INDEX_SCALE + COS_OFFSET) as i32 as usize & 0xFFFF]
    }
}

#[cfg(test)]
mod tests {
    use super::TRIG_TABLES;

    #[test]
    fn matches_reference_within_table_resolution() {
        let mut angle = -720.0f32;
        while angle <= 720.0 {
            let rad = angle.to_radians();
            assert!(
                (TRIG_TABLES.sin(rad) - rad.sin()).abs() < 2.0e-4,
                "sin diverged at {angle} deg"
            );
            assert!(
                (TRIG_TABLES.cos(rad) - rad.cos()).abs() < 2.0e-4,
                "cos diverged at {angle} deg"
            );
            angle += 3.7;
        }
    }

    #[test]
    fn quarter_period_identity() {
        assert!((TRIG_TABLES.sin(0.0)).abs() < 1e-6);
        assert!((TRIG_TABLES.cos(0.0) - 1.0).abs() < 1e-4);
    }
}
