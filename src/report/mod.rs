//! Goodness-of-fit evaluation and terminal reporting.
//!
//! - residuals, RSS, TSS and R² for a fitted curve
//! - the R² acceptance threshold
//! - formatted run summary (`format`)

use tracing::{info, warn};

use crate::domain::{GoodnessOfFit, SampleSet};
use crate::error::AppError;

pub mod format;

pub use format::*;

/// Observed minus fitted value for each sample.
pub fn compute_residuals<F>(samples: &SampleSet, f: F) -> Vec<f64>
where
    F: Fn(f64) -> f64,
{
    samples.iter().map(|(x, y)| y - f(x)).collect()
}

/// Coefficient of determination of `f` against `samples`.
///
/// `R² = 1 - RSS/TSS`. Constant observations make TSS zero and R² undefined,
/// which is reported as `DegenerateData`.
pub fn goodness_of_fit<F>(samples: &SampleSet, f: F) -> Result<GoodnessOfFit, AppError>
where
    F: Fn(f64) -> f64,
{
    let y = samples.y();
    let first = y[0];
    if y.iter().all(|&v| v == first) {
        return Err(AppError::DegenerateData);
    }

    let mean = y.iter().sum::<f64>() / y.len() as f64;
    let tss: f64 = y.iter().map(|&v| (v - mean) * (v - mean)).sum();
    if tss == 0.0 {
        return Err(AppError::DegenerateData);
    }

    let rss: f64 = compute_residuals(samples, f).iter().map(|r| r * r).sum();
    let r_squared = 1.0 - rss / tss;

    info!(rss, tss, r_squared, "goodness of fit");
    Ok(GoodnessOfFit { rss, tss, r_squared })
}

/// Fail with `PoorFit` when R² is below `threshold` (or not a number).
pub fn check_threshold(goodness: &GoodnessOfFit, threshold: f64) -> Result<(), AppError> {
    if goodness.r_squared >= threshold {
        return Ok(());
    }
    warn!(r_squared = goodness.r_squared, threshold, "fit below acceptance threshold");
    Err(AppError::PoorFit {
        r_squared: goodness.r_squared,
        threshold,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DEFAULT_R2_THRESHOLD;

    fn samples(x: &[f64], y: &[f64]) -> SampleSet {
        SampleSet::new(x.to_vec(), y.to_vec()).unwrap()
    }

    #[test]
    fn perfect_fit_has_r_squared_exactly_one() {
        let s = samples(&[1.0, 2.0, 3.0, 4.0], &[2.0, 4.0, 6.0, 8.0]);
        let g = goodness_of_fit(&s, |x| 2.0 * x).unwrap();
        assert_eq!(g.rss, 0.0);
        assert_eq!(g.tss, 20.0);
        assert_eq!(g.r_squared, 1.0);
    }

    #[test]
    fn constant_observations_are_degenerate() {
        let s = samples(&[1.0, 2.0, 3.0], &[0.1, 0.1, 0.1]);
        let err = goodness_of_fit(&s, |_| 0.1).unwrap_err();
        assert!(matches!(err, AppError::DegenerateData));

        let single = samples(&[1.0], &[5.0]);
        assert!(matches!(
            goodness_of_fit(&single, |_| 5.0),
            Err(AppError::DegenerateData)
        ));
    }

    #[test]
    fn r_squared_matches_hand_computation() {
        // y = [1, 3, 2], mean 2, TSS = 2; f(x) = 2 gives RSS = 2 -> R² = 0.
        let s = samples(&[0.0, 1.0, 2.0], &[1.0, 3.0, 2.0]);
        let g = goodness_of_fit(&s, |_| 2.0).unwrap();
        assert_eq!(g.tss, 2.0);
        assert_eq!(g.rss, 2.0);
        assert_eq!(g.r_squared, 0.0);

        let residuals = compute_residuals(&s, |x| x);
        assert_eq!(residuals, vec![1.0, 2.0, 0.0]);
    }

    #[test]
    fn threshold_rejects_poor_and_nan_fits() {
        let good = GoodnessOfFit { rss: 0.1, tss: 10.0, r_squared: 0.99 };
        assert!(check_threshold(&good, DEFAULT_R2_THRESHOLD).is_ok());

        let edge = GoodnessOfFit { rss: 0.5, tss: 10.0, r_squared: 0.95 };
        assert!(check_threshold(&edge, DEFAULT_R2_THRESHOLD).is_ok());

        let poor = GoodnessOfFit { rss: 5.0, tss: 10.0, r_squared: 0.5 };
        let err = check_threshold(&poor, DEFAULT_R2_THRESHOLD).unwrap_err();
        assert!(matches!(err, AppError::PoorFit { .. }));
        assert_eq!(err.exit_code(), 5);

        let nan = GoodnessOfFit { rss: f64::NAN, tss: 10.0, r_squared: f64::NAN };
        assert!(check_threshold(&nan, DEFAULT_R2_THRESHOLD).is_err());
    }
}
