//! Goodness-of-fit bias test for a single die.
//!
//! Compares the observed face counts against a uniform distribution and
//! reports the chi-squared statistic, its upper-tail p-value, Cramér's V,
//! total variation distance and per-face standardized residuals.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Significance level used by [`analyze`].
pub const DEFAULT_SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Below this many rolls the chi-squared approximation is not trusted.
pub const DEFAULT_MIN_TOTAL_ROLLS: usize = 30;

/// Below this expected count per face the chi-squared approximation is not trusted.
pub const DEFAULT_MIN_EXPECTED_PER_FACE: f64 = 5.0;

/// Thresholds that turn the raw statistics into a verdict.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub significance_level: f64,
    pub min_total_rolls: usize,
    pub min_expected_per_face: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            significance_level: DEFAULT_SIGNIFICANCE_LEVEL,
            min_total_rolls: DEFAULT_MIN_TOTAL_ROLLS,
            min_expected_per_face: DEFAULT_MIN_EXPECTED_PER_FACE,
        }
    }
}

/// Bias analysis of one roll sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasReport {
    pub total_rolls: usize,
    pub chi_squared: f64,
    /// Probability of a statistic at least this extreme from a fair die.
    pub p_value: f64,
    pub cramers_v: f64,
    pub total_variation_distance: f64,
    pub is_biased: bool,
    /// Set when the sample is too small for the chi-squared approximation.
    pub small_sample_warning: bool,
    /// One entry per face, ascending.
    pub per_face_stats: Vec<FaceStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceStats {
    pub face: u32,
    pub observed_frequency: u64,
    pub expected_frequency: f64,
    pub estimated_probability: f64,
    pub standardized_residual: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum BiasError {
    #[error("a die needs at least one face")]
    NoFaces,
    #[error("a single-faced die has zero degrees of freedom")]
    SingleFace,
    #[error("significance level must lie in (0, 1), got {0}")]
    InvalidSignificance(f64),
    #[error("chi-squared distribution with {df} degrees of freedom: {reason}")]
    Distribution { df: f64, reason: String },
}

/// Analyze `rolls` of a `sides`-faced die with the classical thresholds.
///
/// Returns `Ok(None)` for an empty sample. Rolls are expected to be filtered
/// to `[1, sides]` already; values outside that range are not tallied.
pub fn analyze(rolls: &[u32], sides: u32) -> Result<Option<BiasReport>, BiasError> {
    analyze_with(rolls, sides, &Thresholds::default())
}

/// Like [`analyze`], with caller-supplied verdict thresholds.
pub fn analyze_with(
    rolls: &[u32],
    sides: u32,
    thresholds: &Thresholds,
) -> Result<Option<BiasReport>, BiasError> {
    match sides {
        0 => return Err(BiasError::NoFaces),
        1 => return Err(BiasError::SingleFace),
        _ => {}
    }
    let alpha = thresholds.significance_level;
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(BiasError::InvalidSignificance(alpha));
    }

    let n = rolls.len();
    if n == 0 {
        return Ok(None);
    }

    let mut observed = vec![0u64; sides as usize];
    for &roll in rolls {
        if let Some(slot) = (roll as usize)
            .checked_sub(1)
            .and_then(|i| observed.get_mut(i))
        {
            *slot += 1;
        }
    }

    let n_f = n as f64;
    let k = sides as f64;
    let expected = n_f / k;
    let uniform = 1.0 / k;

    let mut chi_squared = 0.0;
    let mut total_variation_distance = 0.0;
    let mut per_face_stats = Vec::with_capacity(observed.len());

    for (face, &count) in (1..=sides).zip(&observed) {
        let oi = count as f64;
        let diff = oi - expected;
        chi_squared += diff * diff / expected;

        let pi = oi / n_f;
        total_variation_distance += (pi - uniform).abs();

        per_face_stats.push(FaceStats {
            face,
            observed_frequency: count,
            expected_frequency: expected,
            estimated_probability: pi,
            standardized_residual: diff / expected.sqrt(),
        });
    }
    total_variation_distance /= 2.0;

    let df = k - 1.0;
    let p_value = upper_tail(df, chi_squared)?;
    let cramers_v = (chi_squared / (n_f * df)).sqrt();

    let small_sample_warning =
        n < thresholds.min_total_rolls || expected < thresholds.min_expected_per_face;

    Ok(Some(BiasReport {
        total_rolls: n,
        chi_squared,
        p_value,
        cramers_v,
        total_variation_distance,
        is_biased: p_value < alpha && !small_sample_warning,
        small_sample_warning,
        per_face_stats,
    }))
}

fn upper_tail(df: f64, statistic: f64) -> Result<f64, BiasError> {
    let dist = ChiSquared::new(df).map_err(|e| BiasError::Distribution {
        df,
        reason: e.to_string(),
    })?;
    Ok(dist.sf(statistic))
}
