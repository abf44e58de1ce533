//! Model registry: the closed set of curve families.
//!
//! Each variant owns its behaviour (evaluation, gradient, arity, equation
//! template), so consumers never branch on the model themselves.
//!
//! - `Linear`:     `y = a·x + b`
//! - `Square`:     `y = a·x² + b`
//! - `Quadratic`:  `y = a·x² + b·x + c` (also registered as `parabolic`)
//! - `Sinusoidal`: `y = a·sin(b·x) + c`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveModel {
    Linear,
    Square,
    Quadratic,
    Sinusoidal,
}

/// Registration table: lookup key -> model.
///
/// `1` and `2` are legacy numeric model ids.
const REGISTRY: &[(&str, CurveModel)] = &[
    ("linear", CurveModel::Linear),
    ("square", CurveModel::Square),
    ("quadratic", CurveModel::Quadratic),
    ("parabolic", CurveModel::Quadratic),
    ("sin", CurveModel::Sinusoidal),
    ("sinusoidal", CurveModel::Sinusoidal),
    ("1", CurveModel::Linear),
    ("2", CurveModel::Square),
];

impl CurveModel {
    pub const ALL: [CurveModel; 4] = [
        CurveModel::Linear,
        CurveModel::Square,
        CurveModel::Quadratic,
        CurveModel::Sinusoidal,
    ];

    /// Look up a model by key (case-insensitive, surrounding whitespace ignored).
    pub fn lookup(key: &str) -> Result<Self, AppError> {
        let wanted = key.trim().to_ascii_lowercase();
        REGISTRY
            .iter()
            .find(|(k, _)| *k == wanted)
            .map(|(_, model)| *model)
            .ok_or_else(|| AppError::UnknownModel(key.to_string()))
    }

    /// Canonical registry key.
    pub fn key(self) -> &'static str {
        match self {
            CurveModel::Linear => "linear",
            CurveModel::Square => "square",
            CurveModel::Quadratic => "quadratic",
            CurveModel::Sinusoidal => "sin",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            CurveModel::Linear => "Linear",
            CurveModel::Square => "Square",
            CurveModel::Quadratic => "Quadratic",
            CurveModel::Sinusoidal => "Sinusoidal",
        }
    }

    /// Number of free parameters.
    pub fn arity(self) -> usize {
        match self {
            CurveModel::Linear | CurveModel::Square => 2,
            CurveModel::Quadratic | CurveModel::Sinusoidal => 3,
        }
    }

    /// Evaluate `f(x; params)`, checking the parameter count.
    pub fn evaluate(self, x: f64, params: &[f64]) -> Result<f64, AppError> {
        self.check_arity(params)?;
        Ok(self.predict(x, params))
    }

    /// Evaluate `f(x; params)` without checking the parameter count.
    ///
    /// # Panics
    /// Panics if `params` is shorter than `self.arity()`.
    pub fn predict(self, x: f64, p: &[f64]) -> f64 {
        match self {
            CurveModel::Linear => p[0] * x + p[1],
            CurveModel::Square => p[0] * x * x + p[1],
            CurveModel::Quadratic => p[0] * x * x + p[1] * x + p[2],
            CurveModel::Sinusoidal => p[0] * (p[1] * x).sin() + p[2],
        }
    }

    /// Fill `out` with the partial derivatives `∂f/∂p_j` at `x`.
    ///
    /// # Panics
    /// Panics if `params` or `out` are shorter than `self.arity()`.
    pub fn gradient(self, x: f64, p: &[f64], out: &mut [f64]) {
        match self {
            CurveModel::Linear => {
                out[0] = x;
                out[1] = 1.0;
            }
            CurveModel::Square => {
                out[0] = x * x;
                out[1] = 1.0;
            }
            CurveModel::Quadratic => {
                out[0] = x * x;
                out[1] = x;
                out[2] = 1.0;
            }
            CurveModel::Sinusoidal => {
                let (s, c) = (p[1] * x).sin_cos();
                out[0] = s;
                out[1] = p[0] * x * c;
                out[2] = 1.0;
            }
        }
    }

    /// Render fitted parameters into the model's equation template.
    ///
    /// Coefficients use 3 significant digits in scientific notation; every
    /// coefficient but the leading one carries an explicit sign.
    pub fn format_equation(self, params: &[f64]) -> Result<String, AppError> {
        self.check_arity(params)?;
        let p = params;
        let eq = match self {
            CurveModel::Linear => format!("y = {}*x {}", sci(p[0]), signed_sci(p[1])),
            CurveModel::Square => format!("y = {}*x^2 {}", sci(p[0]), signed_sci(p[1])),
            CurveModel::Quadratic => format!(
                "y = {}*x^2 {}*x {}",
                sci(p[0]),
                signed_sci(p[1]),
                signed_sci(p[2])
            ),
            CurveModel::Sinusoidal => format!(
                "y = {}*sin({}*x) {}",
                sci(p[0]),
                signed_sci(p[1]),
                signed_sci(p[2])
            ),
        };
        Ok(eq)
    }

    fn check_arity(self, params: &[f64]) -> Result<(), AppError> {
        if params.len() != self.arity() {
            return Err(AppError::InvalidModel {
                model: self.key(),
                expected: self.arity(),
                actual: params.len(),
            });
        }
        Ok(())
    }
}

impl FromStr for CurveModel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CurveModel::lookup(s)
    }
}

impl fmt::Display for CurveModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// `2.00e+00`-style scientific notation (3 significant digits, signed
/// two-digit exponent).
fn sci(v: f64) -> String {
    if !v.is_finite() {
        return format!("{v}");
    }
    let raw = format!("{v:.2e}");
    match raw.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.abs())
        }
        None => raw,
    }
}

fn signed_sci(v: f64) -> String {
    let s = sci(v);
    if s.starts_with('-') { s } else { format!("+{s}") }
}
