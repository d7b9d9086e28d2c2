//! # Constitutive Models
//!
//! Soil layers carry up to two constitutive models:
//!
//! - a **lateral** model ([`LateralModel`]) generating p–y, m–t, Hb and Mb curves
//! - an **axial** model ([`AxialModel`]) giving unit shaft friction, unit tip
//!   resistance and the t–z / Q–z curves
//!
//! Both are capability traits with pure methods. The built-in families are
//! stored in layers through the serde-tagged [`LateralSoilModel`] and
//! [`AxialSoilModel`] enums, which also accept user implementations through
//! their `Custom` variants.
//!
//! ## Available Families
//!
//! - [`api_sand`] - API RP2A sand (p–y, shaft friction, end bearing)
//! - [`api_clay`] - Matlock soft clay p–y and the API alpha method
//! - [`pisa`] - PISA-style conic curves calibrated by the user (sand and clay)
//!
//! ## Example
//!
//! ```rust
//! use pile_core::models::{LateralQuery, LateralSoilModel, Loading};
//! use pile_core::models::api_sand::ApiSand;
//!
//! let model = LateralSoilModel::ApiSand(ApiSand::new(35.0, Loading::Static));
//! let query = LateralQuery {
//!     sigma_v: 80.0,
//!     depth: 10.0,
//!     layer_height: 20.0,
//!     depth_from_top_of_layer: 10.0,
//!     diameter: 2.0,
//!     embedment: 30.0,
//!     below_water_table: true,
//!     output_length: 15,
//! };
//! let curve = model.as_model().py(&query);
//! assert_eq!(curve.len(), 15);
//! ```

pub mod api_clay;
pub mod api_sand;
pub mod conic;
pub mod pisa;

use std::fmt::Debug;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{PileError, PileResult};
use crate::springs::SpringCurve;

pub use api_clay::{ApiClay, ApiClayAxial};
pub use api_sand::{ApiSand, ApiSandAxial};
pub use conic::ConicParameters;
pub use pisa::{PisaClay, PisaMultipliers, PisaParameters, PisaSand};

// ============================================================================
// Queries
// ============================================================================

/// Monotonic or cyclic loading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Loading {
    #[default]
    Static,
    Cyclic,
}

/// Everything a lateral model may use at one point along the pile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LateralQuery {
    /// Vertical effective stress (kPa)
    pub sigma_v: f64,
    /// Depth below mudline (m)
    pub depth: f64,
    /// Thickness of the layer (m)
    pub layer_height: f64,
    /// Depth below the top of the layer (m)
    pub depth_from_top_of_layer: f64,
    /// Pile width at the point (m)
    pub diameter: f64,
    /// Embedded length of the pile (m)
    pub embedment: f64,
    /// Whether the point lies below the water line
    pub below_water_table: bool,
    /// Number of points of the generated curve
    pub output_length: usize,
}

/// Everything an axial model may use at one point along the pile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxialQuery {
    /// Vertical effective stress (kPa)
    pub sigma_v: f64,
    /// Thickness of the layer (m)
    pub layer_height: f64,
    /// Depth below the top of the layer (m)
    pub depth_from_top_of_layer: f64,
    /// Pile width at the point (m)
    pub diameter: f64,
    /// Number of points of the generated curve
    pub output_length: usize,
}

/// Curve families a lateral model is able to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpringSupport {
    pub py: bool,
    pub mt: bool,
    pub hb: bool,
    pub mb: bool,
}

impl SpringSupport {
    /// p–y only
    pub const PY_ONLY: SpringSupport = SpringSupport {
        py: true,
        mt: false,
        hb: false,
        mb: false,
    };

    /// All four families
    pub const ALL: SpringSupport = SpringSupport {
        py: true,
        mt: true,
        hb: true,
        mb: true,
    };
}

/// Split of the shaft friction between outer and inner pile walls
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShaftSignature {
    /// Factor applied on the outer wall
    pub outer: f64,
    /// Factor applied on the inner wall
    pub inner: f64,
}

impl Default for ShaftSignature {
    fn default() -> Self {
        Self { outer: 1.0, inner: 1.0 }
    }
}

// ============================================================================
// Capabilities
// ============================================================================

/// Lateral soil reaction model.
///
/// Families that do not produce a curve keep the zero default; the spring
/// engine only calls a generator when [`LateralModel::spring_support`] declares it.
pub trait LateralModel: Debug + Send + Sync {
    /// Short family name used in diagnostics
    fn name(&self) -> &'static str;

    /// Families produced by this model
    fn spring_support(&self) -> SpringSupport;

    /// Distributed lateral load (kN/m) vs. displacement (m)
    fn py(&self, query: &LateralQuery) -> SpringCurve {
        SpringCurve::zeros(query.output_length)
    }

    /// Distributed moment (kNm/m) vs. rotation (rad)
    fn mt(&self, query: &LateralQuery) -> SpringCurve {
        SpringCurve::zeros(query.output_length)
    }

    /// Base shear (kN) vs. displacement (m)
    fn hb(&self, query: &LateralQuery) -> SpringCurve {
        SpringCurve::zeros(query.output_length)
    }

    /// Base moment (kNm) vs. rotation (rad)
    fn mb(&self, query: &LateralQuery) -> SpringCurve {
        SpringCurve::zeros(query.output_length)
    }

    /// Check model parameters
    fn validate(&self) -> PileResult<()> {
        Ok(())
    }
}

/// Axial soil resistance model.
pub trait AxialModel: Debug + Send + Sync {
    /// Short family name used in diagnostics
    fn name(&self) -> &'static str;

    /// Unit shaft friction (kPa).
    ///
    /// `depth` is relative to the layer top for t–z springs and relative to
    /// the mudline in shaft capacity.
    fn unit_shaft_friction(&self, sigma_v: f64, depth: f64, layer_height: f64) -> f64;

    /// Unit tip resistance (kPa); capacity passes the profile depth as `depth`
    fn unit_tip_resistance(&self, sigma_v: f64, depth: f64, layer_height: f64) -> f64;

    /// Outer/inner wall split of the shaft friction
    fn shaft_signature(&self) -> ShaftSignature {
        ShaftSignature::default()
    }

    /// Calibration factor on shaft friction
    fn shaft_multiplier(&self) -> f64 {
        1.0
    }

    /// Calibration factor on tip resistance
    fn tip_multiplier(&self) -> f64 {
        1.0
    }

    /// Unit shaft friction (kPa) vs. axial displacement (m)
    fn tz(&self, query: &AxialQuery) -> SpringCurve;

    /// Unit tip resistance (kPa) vs. tip displacement (m)
    fn qz(&self, query: &AxialQuery) -> SpringCurve {
        let qp = self.unit_tip_resistance(query.sigma_v, query.depth_from_top_of_layer, query.layer_height)
            * self.tip_multiplier();
        api_qz(qp, query.diameter, query.output_length)
    }

    /// Check model parameters
    fn validate(&self) -> PileResult<()> {
        Ok(())
    }
}

// ============================================================================
// Layer storage
// ============================================================================

/// Lateral model attached to a soil layer.
///
/// ## JSON Example
///
/// ```json
/// { "type": "ApiSand", "phi": 35.0, "loading": "Static" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LateralSoilModel {
    ApiSand(ApiSand),
    ApiClay(ApiClay),
    PisaSand(PisaSand),
    PisaClay(PisaClay),
    /// User-supplied model (not serializable)
    #[serde(skip)]
    Custom(Arc<dyn LateralModel>),
}

impl LateralSoilModel {
    /// Access the model through its capability trait
    pub fn as_model(&self) -> &dyn LateralModel {
        match self {
            LateralSoilModel::ApiSand(m) => m,
            LateralSoilModel::ApiClay(m) => m,
            LateralSoilModel::PisaSand(m) => m,
            LateralSoilModel::PisaClay(m) => m,
            LateralSoilModel::Custom(m) => m.as_ref(),
        }
    }
}

/// Axial model attached to a soil layer.
///
/// ## JSON Example
///
/// ```json
/// { "type": "ApiClay", "su_top": 30.0, "su_bottom": 60.0 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AxialSoilModel {
    ApiSand(ApiSandAxial),
    ApiClay(ApiClayAxial),
    /// User-supplied model (not serializable)
    #[serde(skip)]
    Custom(Arc<dyn AxialModel>),
}

impl AxialSoilModel {
    /// Access the model through its capability trait
    pub fn as_model(&self) -> &dyn AxialModel {
        match self {
            AxialSoilModel::ApiSand(m) => m,
            AxialSoilModel::ApiClay(m) => m,
            AxialSoilModel::Custom(m) => m.as_ref(),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn default_multiplier() -> f64 {
    1.0
}

/// Reaction multipliers may be zero, displacement multipliers must be positive
fn validate_multiplier(field: &str, value: f64, on_displacement: bool) -> PileResult<()> {
    let valid = if on_displacement { value > 0.0 } else { value >= 0.0 };
    if !valid || !value.is_finite() {
        let reason = if on_displacement {
            "Displacement multiplier must be positive"
        } else {
            "Reaction multiplier must not be negative"
        };
        return Err(PileError::invalid_input(field, value.to_string(), reason));
    }
    Ok(())
}

/// `n` abscissae from 0 to `max`, denser near the origin
pub(crate) fn refined_abscissa(max: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => (0..n)
            .map(|i| {
                let s = i as f64 / (n - 1) as f64;
                max * s * s
            })
            .collect(),
    }
}

/// Piecewise-linear interpolation, clamped to the end values
pub(crate) fn interpolate(x: f64, xs: &[f64], ys: &[f64]) -> f64 {
    debug_assert_eq!(xs.len(), ys.len());
    if xs.is_empty() {
        return 0.0;
    }
    if x <= xs[0] {
        return ys[0];
    }
    for i in 1..xs.len() {
        if x <= xs[i] {
            let t = (x - xs[i - 1]) / (xs[i] - xs[i - 1]);
            return ys[i - 1] + t * (ys[i] - ys[i - 1]);
        }
    }
    ys[ys.len() - 1]
}

/// Resample a normalized backbone (x/x_ref, y/y_ref) on `n` points
pub(crate) fn resample_backbone(xs: &[f64], ys: &[f64], x_ref: f64, y_ref: f64, n: usize) -> SpringCurve {
    let x_max = xs.last().copied().unwrap_or(0.0);
    let normalized = refined_abscissa(x_max, n);
    let value = normalized.iter().map(|&x| interpolate(x, xs, ys) * y_ref).collect();
    let abscissa = normalized.iter().map(|&x| x * x_ref).collect();
    SpringCurve::new(value, abscissa)
}

// API RP2A Q–z backbone: z/D vs Q/Qp
const QZ_DISP: [f64; 7] = [0.0, 0.002, 0.013, 0.042, 0.073, 0.100, 0.150];
const QZ_LOAD: [f64; 7] = [0.0, 0.25, 0.50, 0.75, 0.90, 1.00, 1.00];

/// API RP2A tip load–displacement curve
pub(crate) fn api_qz(qp: f64, diameter: f64, n: usize) -> SpringCurve {
    resample_backbone(&QZ_DISP, &QZ_LOAD, diameter, qp, n)
}
