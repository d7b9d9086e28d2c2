//! Conic backbone function
//!
//! Four-parameter curve used by the PISA design models: initial slope `k`,
//! curvature `n` (0 = very curved, 1 = bilinear), ultimate normalized
//! displacement `x_u` and ultimate normalized reaction `y_u`. Beyond `x_u` the
//! reaction stays at `y_u`.

use serde::{Deserialize, Serialize};

use crate::errors::{PileError, PileResult};
use crate::springs::SpringCurve;

use super::refined_abscissa;

/// Normalized conic curve parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConicParameters {
    /// Initial stiffness
    pub k: f64,
    /// Curvature, 0 ≤ n ≤ 1
    pub n: f64,
    /// Ultimate normalized displacement
    pub x_u: f64,
    /// Ultimate normalized reaction
    pub y_u: f64,
}

impl ConicParameters {
    pub fn new(k: f64, n: f64, x_u: f64, y_u: f64) -> Self {
        Self { k, n, x_u, y_u }
    }

    /// Validate parameters, `family` names the curve in error messages
    pub fn validate(&self, family: &str) -> PileResult<()> {
        if !(self.k > 0.0) {
            return Err(PileError::invalid_input(
                format!("{family}.k"),
                self.k.to_string(),
                "Initial stiffness must be positive",
            ));
        }
        if !(0.0..=1.0).contains(&self.n) {
            return Err(PileError::invalid_input(
                format!("{family}.n"),
                self.n.to_string(),
                "Curvature must lie in [0, 1]",
            ));
        }
        if !(self.x_u > 0.0) || !(self.y_u > 0.0) {
            return Err(PileError::invalid_input(
                format!("{family}.x_u/y_u"),
                format!("{}/{}", self.x_u, self.y_u),
                "Ultimate displacement and reaction must be positive",
            ));
        }
        Ok(())
    }

    /// Normalized reaction at normalized displacement `x`
    pub fn evaluate(&self, x: f64) -> f64 {
        let Self { k, n, x_u, y_u } = *self;
        if x >= x_u {
            return y_u;
        }
        let a = 1.0 - 2.0 * n;
        let b = 2.0 * n * x / x_u - (1.0 - n) * (1.0 + x * k / y_u);
        let c = x * (k / y_u) * (1.0 - n) - n * (x / x_u).powi(2);
        let denominator = -b + (b * b - 4.0 * a * c).max(0.0).sqrt();
        if denominator == 0.0 {
            return 0.0;
        }
        y_u * 2.0 * c / denominator
    }

    /// Curve on `n` points, scaled back with `x_scale` and `y_scale`
    pub fn curve(&self, x_scale: f64, y_scale: f64, n: usize) -> SpringCurve {
        let normalized = refined_abscissa(self.x_u, n);
        let value = normalized.iter().map(|&x| self.evaluate(x) * y_scale).collect();
        let abscissa = normalized.iter().map(|&x| x * x_scale).collect();
        SpringCurve::new(value, abscissa)
    }
}
