//! API RP2A Clay
//!
//! - p–y: Matlock (1970) soft clay curves, static and cyclic
//! - shaft friction: alpha method `f = α·Su`, with `ψ = Su/σv'`
//!   and `α = 0.5·ψ^-0.5` (ψ ≤ 1) or `0.5·ψ^-0.25` (ψ > 1), `α ≤ 1`
//! - end bearing: `q = 9·Su`
//! - t–z: API clay backbone with 0.9 residual friction
//!
//! Undrained shear strength varies linearly from `su_top` at the top of the
//! layer to `su_bottom` at its base.

use serde::{Deserialize, Serialize};

use crate::errors::{PileError, PileResult};
use crate::springs::SpringCurve;

use super::{
    default_multiplier, refined_abscissa, validate_multiplier, resample_backbone, AxialModel, AxialQuery, LateralModel, LateralQuery,
    Loading, ShaftSignature, SpringSupport,
};

// API clay t–z backbone: z/D vs t/t_max
const TZ_DISP: [f64; 8] = [0.0, 0.0016, 0.0031, 0.0057, 0.0080, 0.0100, 0.0200, 0.0300];
const TZ_LOAD: [f64; 8] = [0.0, 0.30, 0.50, 0.75, 0.90, 1.00, 0.90, 0.90];

fn default_j() -> f64 {
    0.5
}

fn default_eps50() -> f64 {
    0.01
}

/// Linear strength profile within a layer
fn interpolate_su(su_top: f64, su_bottom: f64, depth_from_top_of_layer: f64, layer_height: f64) -> f64 {
    if layer_height <= 0.0 {
        return su_top;
    }
    let ratio = (depth_from_top_of_layer / layer_height).clamp(0.0, 1.0);
    su_top + (su_bottom - su_top) * ratio
}

fn validate_su(su_top: f64, su_bottom: f64) -> PileResult<()> {
    if !(su_top > 0.0) || !(su_bottom > 0.0) {
        return Err(PileError::invalid_input(
            "su_top/su_bottom",
            format!("{su_top}/{su_bottom}"),
            "Undrained shear strength must be positive",
        ));
    }
    Ok(())
}

/// Matlock soft clay lateral model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiClay {
    /// Undrained shear strength at the top of the layer (kPa)
    pub su_top: f64,

    /// Undrained shear strength at the bottom of the layer (kPa)
    pub su_bottom: f64,

    /// Strain at half the maximum deviator stress
    #[serde(default = "default_eps50")]
    pub eps50: f64,

    /// Empirical constant J (0.25 stiff to 0.5 soft clay)
    #[serde(default = "default_j")]
    pub j: f64,

    /// Static or cyclic curves
    #[serde(default)]
    pub loading: Loading,

    /// Factor on soil reaction
    #[serde(default = "default_multiplier")]
    pub p_multiplier: f64,

    /// Factor on displacement
    #[serde(default = "default_multiplier")]
    pub y_multiplier: f64,
}

impl ApiClay {
    pub fn new(su_top: f64, su_bottom: f64, eps50: f64, loading: Loading) -> Self {
        Self {
            su_top,
            su_bottom,
            eps50,
            j: default_j(),
            loading,
            p_multiplier: 1.0,
            y_multiplier: 1.0,
        }
    }

    /// Set J (builder pattern)
    pub fn with_j(mut self, j: f64) -> Self {
        self.j = j;
        self
    }

    /// Set the reaction multiplier (builder pattern)
    pub fn with_p_multiplier(mut self, factor: f64) -> Self {
        self.p_multiplier = factor;
        self
    }

    /// Set the displacement multiplier (builder pattern)
    pub fn with_y_multiplier(mut self, factor: f64) -> Self {
        self.y_multiplier = factor;
        self
    }

    /// Undrained shear strength at a depth within the layer (kPa)
    pub fn su(&self, depth_from_top_of_layer: f64, layer_height: f64) -> f64 {
        interpolate_su(self.su_top, self.su_bottom, depth_from_top_of_layer, layer_height)
    }

    /// Ultimate lateral resistance per unit length (kN/m)
    pub fn ultimate_resistance(&self, su: f64, sigma_v: f64, depth: f64, diameter: f64) -> f64 {
        let shallow = (3.0 + sigma_v / su + self.j * depth / diameter) * su * diameter;
        let deep = 9.0 * su * diameter;
        shallow.min(deep)
    }

    /// Depth of reduced resistance under cyclic loading (m)
    fn transition_depth(&self, su: f64, sigma_v: f64, depth: f64, diameter: f64) -> f64 {
        let gamma = if depth > 0.0 { sigma_v / depth } else { 0.0 };
        6.0 * diameter / (gamma * diameter / su + self.j)
    }

    /// Normalized reaction p/pu at y/y50 = `r`
    fn backbone(&self, r: f64, depth: f64, xr: f64) -> f64 {
        match self.loading {
            Loading::Static => {
                if r < 8.0 {
                    0.5 * r.cbrt()
                } else {
                    1.0
                }
            }
            Loading::Cyclic => {
                if r <= 3.0 {
                    (0.5 * r.cbrt()).min(0.72)
                } else if depth >= xr {
                    0.72
                } else {
                    let residual = 0.72 * depth / xr;
                    if r >= 15.0 {
                        residual
                    } else {
                        0.72 + (residual - 0.72) * (r - 3.0) / 12.0
                    }
                }
            }
        }
    }
}

impl LateralModel for ApiClay {
    fn name(&self) -> &'static str {
        "API clay"
    }

    fn spring_support(&self) -> SpringSupport {
        SpringSupport::PY_ONLY
    }

    fn py(&self, query: &LateralQuery) -> SpringCurve {
        let depth = query.depth.max(0.0);
        let diameter = query.diameter;
        let su = self.su(query.depth_from_top_of_layer, query.layer_height);
        let pu = self.ultimate_resistance(su, query.sigma_v, depth, diameter);
        let xr = self.transition_depth(su, query.sigma_v, depth, diameter);
        let y50 = 2.5 * self.eps50 * diameter;

        let y = refined_abscissa(16.0 * y50, query.output_length);
        let p = y
            .iter()
            .map(|&y| pu * self.backbone(y / y50, depth, xr) * self.p_multiplier)
            .collect();
        let y = y.into_iter().map(|y| y * self.y_multiplier).collect();
        SpringCurve::new(p, y)
    }

    fn validate(&self) -> PileResult<()> {
        validate_su(self.su_top, self.su_bottom)?;
        if !(self.eps50 > 0.0) {
            return Err(PileError::invalid_input(
                "eps50",
                self.eps50.to_string(),
                "Strain at 50% must be positive",
            ));
        }
        if !(self.j > 0.0) {
            return Err(PileError::invalid_input("j", self.j.to_string(), "J must be positive"));
        }
        validate_multiplier("p_multiplier", self.p_multiplier, false)?;
        validate_multiplier("y_multiplier", self.y_multiplier, true)
    }
}

/// API clay axial model (alpha method)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiClayAxial {
    /// Undrained shear strength at the top of the layer (kPa)
    pub su_top: f64,

    /// Undrained shear strength at the bottom of the layer (kPa)
    pub su_bottom: f64,

    /// Factor on shaft friction
    #[serde(default = "default_multiplier")]
    pub shaft_multiplier: f64,

    /// Factor on tip resistance
    #[serde(default = "default_multiplier")]
    pub tip_multiplier: f64,

    /// Outer/inner wall split
    #[serde(default)]
    pub signature: ShaftSignature,
}

impl ApiClayAxial {
    pub fn new(su_top: f64, su_bottom: f64) -> Self {
        Self {
            su_top,
            su_bottom,
            shaft_multiplier: 1.0,
            tip_multiplier: 1.0,
            signature: ShaftSignature::default(),
        }
    }

    /// Set the shaft friction multiplier (builder pattern)
    pub fn with_shaft_multiplier(mut self, factor: f64) -> Self {
        self.shaft_multiplier = factor;
        self
    }

    /// Set the tip resistance multiplier (builder pattern)
    pub fn with_tip_multiplier(mut self, factor: f64) -> Self {
        self.tip_multiplier = factor;
        self
    }

    /// Set the outer/inner split (builder pattern)
    pub fn with_signature(mut self, outer: f64, inner: f64) -> Self {
        self.signature = ShaftSignature { outer, inner };
        self
    }

    /// Adhesion factor α for a strength ratio ψ = Su/σv'
    pub fn alpha(su: f64, sigma_v: f64) -> f64 {
        if sigma_v <= 0.0 {
            return 1.0;
        }
        let psi = su / sigma_v;
        let alpha = if psi <= 1.0 { 0.5 * psi.powf(-0.5) } else { 0.5 * psi.powf(-0.25) };
        alpha.min(1.0)
    }
}

impl AxialModel for ApiClayAxial {
    fn name(&self) -> &'static str {
        "API clay"
    }

    fn unit_shaft_friction(&self, sigma_v: f64, depth: f64, layer_height: f64) -> f64 {
        let su = interpolate_su(self.su_top, self.su_bottom, depth, layer_height);
        Self::alpha(su, sigma_v) * su
    }

    fn unit_tip_resistance(&self, _sigma_v: f64, depth: f64, layer_height: f64) -> f64 {
        9.0 * interpolate_su(self.su_top, self.su_bottom, depth, layer_height)
    }

    fn shaft_signature(&self) -> ShaftSignature {
        self.signature
    }

    fn shaft_multiplier(&self) -> f64 {
        self.shaft_multiplier
    }

    fn tip_multiplier(&self) -> f64 {
        self.tip_multiplier
    }

    fn tz(&self, query: &AxialQuery) -> SpringCurve {
        let t_max = self.unit_shaft_friction(query.sigma_v, query.depth_from_top_of_layer, query.layer_height)
            * self.shaft_multiplier;
        resample_backbone(&TZ_DISP, &TZ_LOAD, query.diameter, t_max, query.output_length)
    }

    fn validate(&self) -> PileResult<()> {
        validate_su(self.su_top, self.su_bottom)
    }
}
