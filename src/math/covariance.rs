//! Parameter covariance from the Jacobian at the optimum.
//!
//! For a least-squares fit with Jacobian `J` (m × n) and residual sum of
//! squares `RSS`, the covariance estimate is
//!
//! ```text
//! pcov = pinv(JᵀJ) · RSS / (m - n)
//! ```
//!
//! `pinv(JᵀJ)` is built from the SVD of `J` (`J = U S Vᵀ` gives
//! `JᵀJ = V S² Vᵀ`), discarding singular values below
//! `eps · max(m, n) · s_max`. This avoids forming `JᵀJ` explicitly, which
//! squares the condition number.

use nalgebra::DMatrix;

/// Estimate the parameter covariance matrix.
///
/// With no spare degrees of freedom (`m <= n`) the covariance cannot be
/// estimated and every entry is `+∞`.
pub fn covariance_from_jacobian(jac: &DMatrix<f64>, rss: f64) -> DMatrix<f64> {
    let (m, n) = jac.shape();
    let undetermined = DMatrix::from_element(n, n, f64::INFINITY);
    if m <= n {
        return undetermined;
    }

    let svd = jac.clone().svd(false, true);
    let Some(v_t) = svd.v_t.as_ref() else {
        return undetermined;
    };

    let s_max = svd.singular_values.iter().copied().fold(0.0, f64::max);
    let cutoff = f64::EPSILON * m.max(n) as f64 * s_max;

    let mut inv = DMatrix::<f64>::zeros(n, n);
    for (k, &s) in svd.singular_values.iter().enumerate() {
        if s <= cutoff {
            continue;
        }
        let v = v_t.row(k).transpose();
        inv += (&v * v.transpose()) / (s * s);
    }

    inv * (rss / (m - n) as f64)
}
