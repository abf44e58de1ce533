//! Nonlinear least-squares fit of a single curve model.
//!
//! Given samples `(x_i, y_i)` and a model `f(x; p)` we minimize
//!
//! ```text
//! Σ (f(x_i; p) - y_i)^2
//! ```
//!
//! with the `levenberg-marquardt` crate (a MINPACK port on nalgebra), using the
//! model's analytic gradient as the Jacobian and `p = [1.0; arity]` as the
//! starting point. The covariance is estimated from the Jacobian at the optimum.

use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt};
use nalgebra::storage::Owned;
use nalgebra::{DMatrix, DVector, Dyn};
use tracing::{debug, info};

use crate::domain::{DEFAULT_PATIENCE, FitResult, SampleSet};
use crate::error::AppError;
use crate::math::covariance_from_jacobian;
use crate::models::CurveModel;

/// Solver settings.
#[derive(Debug, Clone)]
pub struct FitOptions {
    /// Starting value for every parameter.
    pub initial_value: f64,
    /// Max residual evaluations = `patience · (arity + 1)`.
    pub patience: usize,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            initial_value: 1.0,
            patience: DEFAULT_PATIENCE,
        }
    }
}

/// The curve-fitting problem as seen by the solver.
///
/// Residuals are `f(x_i; p) - y_i`, so the Jacobian is the model gradient.
struct CurveProblem<'a> {
    model: CurveModel,
    x: &'a [f64],
    y: &'a [f64],
    params: DVector<f64>,
}

impl LeastSquaresProblem<f64, Dyn, Dyn> for CurveProblem<'_> {
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;
    type ParameterStorage = Owned<f64, Dyn>;

    fn set_params(&mut self, p: &DVector<f64>) {
        self.params.copy_from(p);
    }

    fn params(&self) -> DVector<f64> {
        self.params.clone()
    }

    fn residuals(&self) -> Option<DVector<f64>> {
        let p = self.params.as_slice();
        let r = DVector::from_iterator(
            self.x.len(),
            self.x
                .iter()
                .zip(self.y.iter())
                .map(|(&xi, &yi)| self.model.predict(xi, p) - yi),
        );
        r.iter().all(|v| v.is_finite()).then_some(r)
    }

    fn jacobian(&self) -> Option<DMatrix<f64>> {
        let p = self.params.as_slice();
        let n = self.model.arity();
        let mut jac = DMatrix::<f64>::zeros(self.x.len(), n);
        let mut row = vec![0.0; n];
        for (i, &xi) in self.x.iter().enumerate() {
            self.model.gradient(xi, p, &mut row);
            for (j, &g) in row.iter().enumerate() {
                jac[(i, j)] = g;
            }
        }
        jac.iter().all(|v| v.is_finite()).then_some(jac)
    }
}

/// Fit `model` to `samples`.
///
/// Fails with `FitDidNotConverge` when there are fewer samples than
/// parameters, the data is non-finite, the solver stops unsuccessfully, or the
/// fitted parameters are non-finite.
pub fn fit_model(
    model: CurveModel,
    samples: &SampleSet,
    opts: &FitOptions,
) -> Result<FitResult, AppError> {
    let n = model.arity();
    let m = samples.len();

    if m < n {
        return Err(AppError::FitDidNotConverge(format!(
            "{} needs at least {n} samples, got {m}",
            model.display_name()
        )));
    }
    if samples.iter().any(|(x, y)| !(x.is_finite() && y.is_finite())) {
        return Err(AppError::FitDidNotConverge(
            "input contains non-finite values".to_string(),
        ));
    }

    let problem = CurveProblem {
        model,
        x: samples.x(),
        y: samples.y(),
        params: DVector::from_element(n, opts.initial_value),
    };

    let solver = LevenbergMarquardt::new().with_patience(opts.patience.max(1));
    let (problem, report) = solver.minimize(problem);

    debug!(
        model = model.key(),
        evaluations = report.number_of_evaluations,
        termination = ?report.termination,
        "solver finished"
    );

    if !report.termination.was_successful() {
        return Err(AppError::FitDidNotConverge(format!(
            "{} fit stopped after {} evaluations: {:?}",
            model.display_name(),
            report.number_of_evaluations,
            report.termination
        )));
    }

    let params: Vec<f64> = problem.params.iter().copied().collect();
    if params.iter().any(|v| !v.is_finite()) {
        return Err(AppError::FitDidNotConverge(format!(
            "{} fit produced non-finite parameters",
            model.display_name()
        )));
    }

    let residuals = problem.residuals().ok_or_else(|| {
        AppError::FitDidNotConverge("non-finite residuals at the optimum".to_string())
    })?;
    let rss = residuals.norm_squared();
    let jac = problem.jacobian().ok_or_else(|| {
        AppError::FitDidNotConverge("non-finite Jacobian at the optimum".to_string())
    })?;
    let covariance = covariance_from_jacobian(&jac, rss);

    info!(
        model = model.key(),
        ?params,
        rss,
        evaluations = report.number_of_evaluations,
        "fit converged"
    );

    Ok(FitResult {
        model,
        params,
        covariance,
        rss,
        evaluations: report.number_of_evaluations,
        termination: format!("{:?}", report.termination),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, Normal};

    fn samples(x: &[f64], y: &[f64]) -> SampleSet {
        SampleSet::new(x.to_vec(), y.to_vec()).unwrap()
    }

    #[test]
    fn linear_fit_recovers_exact_line() {
        let s = samples(&[1.0, 2.0, 3.0, 4.0], &[2.0, 4.0, 6.0, 8.0]);
        let fit = fit_model(CurveModel::Linear, &s, &FitOptions::default()).unwrap();

        assert_eq!(fit.params.len(), 2);
        assert!((fit.params[0] - 2.0).abs() < 1e-8, "{:?}", fit.params);
        assert!(fit.params[1].abs() < 1e-8, "{:?}", fit.params);
        assert!(fit.rss < 1e-12);
        assert_eq!(fit.covariance.shape(), (2, 2));
    }

    #[test]
    fn quadratic_fit_recovers_parabola() {
        let x: Vec<f64> = (0..12).map(|i| -3.0 + 0.5 * i as f64).collect();
        let y: Vec<f64> = x.iter().map(|&x| 0.5 * x * x - 2.0 * x + 3.0).collect();
        let fit = fit_model(CurveModel::Quadratic, &samples(&x, &y), &FitOptions::default()).unwrap();

        for (got, want) in fit.params.iter().zip([0.5, -2.0, 3.0]) {
            assert!((got - want).abs() < 1e-7, "{:?}", fit.params);
        }
    }

    #[test]
    fn square_fit_ignores_linear_term() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y: Vec<f64> = x.iter().map(|&x| 3.0 * x * x - 1.0).collect();
        let fit = fit_model(CurveModel::Square, &samples(&x, &y), &FitOptions::default()).unwrap();

        assert!((fit.params[0] - 3.0).abs() < 1e-8);
        assert!((fit.params[1] + 1.0).abs() < 1e-8);
    }

    #[test]
    fn sinusoidal_fit_from_nearby_frequency() {
        let x: Vec<f64> = (0..40).map(|i| i as f64 * 0.15).collect();
        let y: Vec<f64> = x.iter().map(|&x| 2.0 * (1.1 * x).sin() + 0.5).collect();
        let fit = fit_model(CurveModel::Sinusoidal, &samples(&x, &y), &FitOptions::default())
            .unwrap();

        assert!((fit.params[0] - 2.0).abs() < 1e-6, "{:?}", fit.params);
        assert!((fit.params[1] - 1.1).abs() < 1e-6, "{:?}", fit.params);
        assert!((fit.params[2] - 0.5).abs() < 1e-6, "{:?}", fit.params);
    }

    #[test]
    fn noisy_linear_fit_has_finite_positive_uncertainty() {
        let mut rng = StdRng::seed_from_u64(7);
        let noise = Normal::new(0.0, 0.2).unwrap();
        let x: Vec<f64> = (0..50).map(|i| i as f64 * 0.2).collect();
        let y: Vec<f64> = x.iter().map(|&x| 1.5 * x - 4.0 + noise.sample(&mut rng)).collect();

        let fit = fit_model(CurveModel::Linear, &samples(&x, &y), &FitOptions::default()).unwrap();
        assert!((fit.params[0] - 1.5).abs() < 0.1, "{:?}", fit.params);
        assert!((fit.params[1] + 4.0).abs() < 0.5, "{:?}", fit.params);

        let se = fit.standard_errors();
        assert!(se.iter().all(|v| v.is_finite() && *v > 0.0), "{se:?}");
        assert!((fit.covariance[(0, 1)] - fit.covariance[(1, 0)]).abs() < 1e-12);
    }

    #[test]
    fn too_few_samples_do_not_converge() {
        let s = samples(&[1.0, 2.0], &[1.0, 4.0]);
        let err = fit_model(CurveModel::Quadratic, &s, &FitOptions::default()).unwrap_err();
        assert!(matches!(err, AppError::FitDidNotConverge(_)), "{err}");
        assert_eq!(err.exit_code(), 999);
    }

    #[test]
    fn non_finite_samples_are_rejected() {
        let s = samples(&[1.0, f64::NAN, 3.0], &[1.0, 2.0, 3.0]);
        let err = fit_model(CurveModel::Linear, &s, &FitOptions::default()).unwrap_err();
        assert!(matches!(err, AppError::FitDidNotConverge(_)));
    }

    #[test]
    fn exactly_determined_fit_has_infinite_covariance() {
        let s = samples(&[1.0, 3.0], &[5.0, 9.0]);
        let fit = fit_model(CurveModel::Linear, &s, &FitOptions::default()).unwrap();
        assert!((fit.params[0] - 2.0).abs() < 1e-8);
        assert!((fit.params[1] - 3.0).abs() < 1e-8);
        assert!(fit.covariance.iter().all(|v| v.is_infinite()));
    }
}
