//! Statistical functions over click-interval samples.
//!
//! Every function returns `None` below its minimum sample count: too few
//! samples is the normal warm-up state, not an error, and callers simply
//! skip their check for the tick.

/// Minimum samples for the standard deviation.
pub const MIN_STDDEV_SAMPLES: usize = 5;
/// Minimum samples for the higher-moment and sequence statistics.
pub const MIN_SHAPE_SAMPLES: usize = 20;
/// Histogram bins for the entropy estimate.
const ENTROPY_BINS: usize = 8;

/// Arithmetic mean. `None` on an empty slice.
#[must_use]
pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Population standard deviation. Requires [`MIN_STDDEV_SAMPLES`].
#[must_use]
pub fn std_dev(samples: &[f64]) -> Option<f64> {
    if samples.len() < MIN_STDDEV_SAMPLES {
        return None;
    }
    let m = mean(samples)?;
    let variance = samples.iter().map(|s| (s - m) * (s - m)).sum::<f64>() / samples.len() as f64;
    Some(variance.sqrt())
}

/// Excess kurtosis: fourth standardized moment minus 3, so a normal
/// distribution scores 0. Requires [`MIN_SHAPE_SAMPLES`]; `None` for
/// zero-variance samples.
#[must_use]
pub fn excess_kurtosis(samples: &[f64]) -> Option<f64> {
    standardized_moment(samples, 4).map(|m4| m4 - 3.0)
}

/// Skewness: third standardized moment. Requires [`MIN_SHAPE_SAMPLES`].
#[must_use]
pub fn skewness(samples: &[f64]) -> Option<f64> {
    standardized_moment(samples, 3)
}

fn standardized_moment(samples: &[f64], order: i32) -> Option<f64> {
    if samples.len() < MIN_SHAPE_SAMPLES {
        return None;
    }
    let m = mean(samples)?;
    let n = samples.len() as f64;
    let variance = samples.iter().map(|s| (s - m) * (s - m)).sum::<f64>() / n;
    if variance < 1.0e-12 {
        return None;
    }
    let sigma = variance.sqrt();
    Some(
        samples
            .iter()
            .map(|s| ((s - m) / sigma).powi(order))
            .sum::<f64>()
            / n,
    )
}

/// Shannon entropy in bits over an 8-bin histogram of the sample range.
/// Requires [`MIN_SHAPE_SAMPLES`]; `None` when all samples are equal (the
/// histogram would have a single occupied bin by construction — callers
/// treat that case through the stddev check instead).
#[must_use]
pub fn shannon_entropy(samples: &[f64]) -> Option<f64> {
    if samples.len() < MIN_SHAPE_SAMPLES {
        return None;
    }
    let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range < 1.0e-12 {
        return None;
    }

    let mut bins = [0usize; ENTROPY_BINS];
    for &s in samples {
        let idx = (((s - min) / range) * ENTROPY_BINS as f64) as usize;
        bins[idx.min(ENTROPY_BINS - 1)] += 1;
    }

    let n = samples.len() as f64;
    let mut entropy = 0.0;
    for &count in &bins {
        if count > 0 {
            let p = count as f64 / n;
            entropy -= p * p.log2();
        }
    }
    Some(entropy)
}

/// Wald–Wolfowitz runs-test Z-score against the sample median. Requires
/// [`MIN_SHAPE_SAMPLES`] and at least 2 samples on each side of the median.
/// Large |Z| means the above/below-median sequence is too regular or too
/// alternating to be human.
#[must_use]
pub fn runs_test_z(samples: &[f64]) -> Option<f64> {
    if samples.len() < MIN_SHAPE_SAMPLES {
        return None;
    }
    let median = median_of(samples)?;

    // Samples equal to the median carry no sign and are skipped.
    let signs: Vec<bool> = samples
        .iter()
        .filter(|&&s| (s - median).abs() > 1.0e-12)
        .map(|&s| s > median)
        .collect();

    let n_above = signs.iter().filter(|&&above| above).count() as f64;
    let n_below = signs.len() as f64 - n_above;
    if n_above < 2.0 || n_below < 2.0 {
        return None;
    }

    let runs = 1 + signs.windows(2).filter(|w| w[0] != w[1]).count();
    let n = n_above + n_below;
    let expected = 2.0 * n_above * n_below / n + 1.0;
    let variance =
        2.0 * n_above * n_below * (2.0 * n_above * n_below - n) / (n * n * (n - 1.0));
    if variance < 1.0e-12 {
        return None;
    }
    Some((runs as f64 - expected) / variance.sqrt())
}

/// Lag-1 autocorrelation. Requires [`MIN_SHAPE_SAMPLES`]; `None` for
/// zero-variance samples. Values near ±1 mean each interval predicts the
/// next, typical of patterned clickers.
#[must_use]
pub fn autocorrelation_lag1(samples: &[f64]) -> Option<f64> {
    if samples.len() < MIN_SHAPE_SAMPLES {
        return None;
    }
    let m = mean(samples)?;
    let denom = samples.iter().map(|s| (s - m) * (s - m)).sum::<f64>();
    if denom < 1.0e-12 {
        return None;
    }
    let numer = samples
        .windows(2)
        .map(|w| (w[0] - m) * (w[1] - m))
        .sum::<f64>();
    Some(numer / denom)
}

fn median_of(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_stddev_basics() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[2.0, 4.0]), Some(3.0));
        // Below the minimum sample count.
        assert_eq!(std_dev(&[1.0, 2.0, 3.0]), None);
        let sd = std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).expect("enough samples");
        assert!((sd - 2.0).abs() < 1e-12);
    }

    #[test]
    fn shape_statistics_need_twenty_samples() {
        let nineteen = vec![1.0; 19];
        assert_eq!(excess_kurtosis(&nineteen), None);
        assert_eq!(skewness(&nineteen), None);
        assert_eq!(shannon_entropy(&nineteen), None);
        assert_eq!(runs_test_z(&nineteen), None);
        assert_eq!(autocorrelation_lag1(&nineteen), None);
    }

    #[test]
    fn constant_samples_have_no_shape() {
        let constant = vec![3.0; 32];
        assert_eq!(excess_kurtosis(&constant), None);
        assert_eq!(shannon_entropy(&constant), None);
        assert_eq!(autocorrelation_lag1(&constant), None);
    }

    #[test]
    fn entropy_of_uniform_spread_is_high() {
        let spread: Vec<f64> = (0..32).map(f64::from).collect();
        let entropy = shannon_entropy(&spread).expect("varied samples");
        assert!(entropy > 2.9, "got {entropy}");
    }

    #[test]
    fn alternating_sequence_fails_runs_test() {
        // Perfectly alternating above/below median: far too many runs.
        let alternating: Vec<f64> = (0..30).map(|i| if i % 2 == 0 { 1.0 } else { 5.0 }).collect();
        let z = runs_test_z(&alternating).expect("balanced sides");
        assert!(z > 2.0, "got {z}");
    }

    #[test]
    fn skewed_samples_have_positive_skewness() {
        let mut samples = vec![1.0; 25];
        samples.extend_from_slice(&[10.0, 11.0, 12.0]);
        let skew = skewness(&samples).expect("enough samples");
        assert!(skew > 1.0, "got {skew}");
    }

    #[test]
    fn trending_sequence_autocorrelates() {
        let ramp: Vec<f64> = (0..40).map(|i| f64::from(i) * 0.5).collect();
        let ac = autocorrelation_lag1(&ramp).expect("varied samples");
        assert!(ac > 0.8, "got {ac}");
    }
}
