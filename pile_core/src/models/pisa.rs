//! PISA-style conic models
//!
//! All four reaction families (distributed load, distributed moment, base
//! shear, base moment) follow the [`ConicParameters`] backbone in normalized
//! space. The user supplies the calibrated parameters; the model only handles
//! normalization.
//!
//! | family | sand (σ = σv')                 | clay (Su)                    |
//! |--------|--------------------------------|------------------------------|
//! | p–y    | p/(σ·D) vs. y·G0/(σ·D)         | p/(Su·D) vs. y·G0/(Su·D)     |
//! | m–t    | m/(σ·D²) vs. ψ·G0/σ            | m/(Su·D²) vs. ψ·G0/Su        |
//! | Hb     | H/(σ·D²) vs. y·G0/(σ·D)        | H/(Su·D²) vs. y·G0/(Su·D)    |
//! | Mb     | M/(σ·D³) vs. ψ·G0/σ            | M/(Su·D³) vs. ψ·G0/Su        |
//!
//! [`PisaMultipliers`] scale the distributed curves after denormalization.

use serde::{Deserialize, Serialize};

use crate::errors::{PileError, PileResult};
use crate::springs::SpringCurve;

use super::{default_multiplier, validate_multiplier, ConicParameters, LateralModel, LateralQuery, SpringSupport};

/// Calibrated parameters for the four curve families
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PisaParameters {
    pub py: ConicParameters,
    pub mt: ConicParameters,
    pub hb: ConicParameters,
    pub mb: ConicParameters,
}

impl PisaParameters {
    fn validate(&self) -> PileResult<()> {
        self.py.validate("py")?;
        self.mt.validate("mt")?;
        self.hb.validate("hb")?;
        self.mb.validate("mb")
    }
}

/// Factors on the distributed p–y and m–t curves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PisaMultipliers {
    /// Factor on p
    #[serde(default = "default_multiplier")]
    pub p: f64,
    /// Factor on y
    #[serde(default = "default_multiplier")]
    pub y: f64,
    /// Factor on m
    #[serde(default = "default_multiplier")]
    pub m: f64,
    /// Factor on the rotation t
    #[serde(default = "default_multiplier")]
    pub t: f64,
}

impl Default for PisaMultipliers {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0, 1.0)
    }
}

impl PisaMultipliers {
    pub fn new(p: f64, y: f64, m: f64, t: f64) -> Self {
        Self { p, y, m, t }
    }

    fn validate(&self) -> PileResult<()> {
        validate_multiplier("p_multiplier", self.p, false)?;
        validate_multiplier("y_multiplier", self.y, true)?;
        validate_multiplier("m_multiplier", self.m, false)?;
        validate_multiplier("t_multiplier", self.t, true)
    }

    fn py(&self, curve: SpringCurve) -> SpringCurve {
        scale(curve, self.p, self.y)
    }

    fn mt(&self, curve: SpringCurve) -> SpringCurve {
        scale(curve, self.m, self.t)
    }
}

fn scale(curve: SpringCurve, value: f64, abscissa: f64) -> SpringCurve {
    SpringCurve::new(
        curve.value.into_iter().map(|v| v * value).collect(),
        curve.abscissa.into_iter().map(|x| x * abscissa).collect(),
    )
}

fn validate_g0(g0: f64) -> PileResult<()> {
    if !(g0 > 0.0) {
        return Err(PileError::invalid_input(
            "g0",
            g0.to_string(),
            "Small-strain shear modulus must be positive",
        ));
    }
    Ok(())
}

/// Scales turning normalized (displacement, reaction) into physical values
struct Scales {
    stress: f64,
    g0: f64,
    diameter: f64,
}

impl Scales {
    fn py(&self, params: &ConicParameters, n: usize) -> SpringCurve {
        let y_scale = self.stress * self.diameter / self.g0;
        params.curve(y_scale, self.stress * self.diameter, n)
    }

    fn mt(&self, params: &ConicParameters, n: usize) -> SpringCurve {
        params.curve(self.stress / self.g0, self.stress * self.diameter.powi(2), n)
    }

    fn hb(&self, params: &ConicParameters, n: usize) -> SpringCurve {
        let y_scale = self.stress * self.diameter / self.g0;
        params.curve(y_scale, self.stress * self.diameter.powi(2), n)
    }

    fn mb(&self, params: &ConicParameters, n: usize) -> SpringCurve {
        params.curve(self.stress / self.g0, self.stress * self.diameter.powi(3), n)
    }
}

/// PISA-style sand model, normalized by vertical effective stress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PisaSand {
    /// Small-strain shear modulus (kPa)
    pub g0: f64,

    /// Calibrated conic parameters
    pub parameters: PisaParameters,

    /// Factors on the distributed curves
    #[serde(default)]
    pub multipliers: PisaMultipliers,
}

impl PisaSand {
    pub fn new(g0: f64, parameters: PisaParameters) -> Self {
        Self {
            g0,
            parameters,
            multipliers: PisaMultipliers::default(),
        }
    }

    /// Set the p, y, m and t multipliers (builder pattern)
    pub fn with_multipliers(mut self, multipliers: PisaMultipliers) -> Self {
        self.multipliers = multipliers;
        self
    }

    fn scales(&self, query: &LateralQuery) -> Scales {
        Scales {
            stress: query.sigma_v.max(0.0),
            g0: self.g0,
            diameter: query.diameter,
        }
    }
}

impl LateralModel for PisaSand {
    fn name(&self) -> &'static str {
        "PISA sand"
    }

    fn spring_support(&self) -> SpringSupport {
        SpringSupport::ALL
    }

    fn py(&self, query: &LateralQuery) -> SpringCurve {
        let curve = self.scales(query).py(&self.parameters.py, query.output_length);
        self.multipliers.py(curve)
    }

    fn mt(&self, query: &LateralQuery) -> SpringCurve {
        let curve = self.scales(query).mt(&self.parameters.mt, query.output_length);
        self.multipliers.mt(curve)
    }

    fn hb(&self, query: &LateralQuery) -> SpringCurve {
        self.scales(query).hb(&self.parameters.hb, query.output_length)
    }

    fn mb(&self, query: &LateralQuery) -> SpringCurve {
        self.scales(query).mb(&self.parameters.mb, query.output_length)
    }

    fn validate(&self) -> PileResult<()> {
        validate_g0(self.g0)?;
        self.multipliers.validate()?;
        self.parameters.validate()
    }
}

/// PISA-style clay model, normalized by undrained shear strength
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PisaClay {
    /// Small-strain shear modulus (kPa)
    pub g0: f64,

    /// Undrained shear strength at the top of the layer (kPa)
    pub su_top: f64,

    /// Undrained shear strength at the bottom of the layer (kPa)
    pub su_bottom: f64,

    /// Calibrated conic parameters
    pub parameters: PisaParameters,

    /// Factors on the distributed curves
    #[serde(default)]
    pub multipliers: PisaMultipliers,
}

impl PisaClay {
    pub fn new(g0: f64, su_top: f64, su_bottom: f64, parameters: PisaParameters) -> Self {
        Self {
            g0,
            su_top,
            su_bottom,
            parameters,
            multipliers: PisaMultipliers::default(),
        }
    }

    /// Set the p, y, m and t multipliers (builder pattern)
    pub fn with_multipliers(mut self, multipliers: PisaMultipliers) -> Self {
        self.multipliers = multipliers;
        self
    }

    fn scales(&self, query: &LateralQuery) -> Scales {
        let ratio = if query.layer_height > 0.0 {
            (query.depth_from_top_of_layer / query.layer_height).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Scales {
            stress: self.su_top + (self.su_bottom - self.su_top) * ratio,
            g0: self.g0,
            diameter: query.diameter,
        }
    }
}

impl LateralModel for PisaClay {
    fn name(&self) -> &'static str {
        "PISA clay"
    }

    fn spring_support(&self) -> SpringSupport {
        SpringSupport::ALL
    }

    fn py(&self, query: &LateralQuery) -> SpringCurve {
        let curve = self.scales(query).py(&self.parameters.py, query.output_length);
        self.multipliers.py(curve)
    }

    fn mt(&self, query: &LateralQuery) -> SpringCurve {
        let curve = self.scales(query).mt(&self.parameters.mt, query.output_length);
        self.multipliers.mt(curve)
    }

    fn hb(&self, query: &LateralQuery) -> SpringCurve {
        self.scales(query).hb(&self.parameters.hb, query.output_length)
    }

    fn mb(&self, query: &LateralQuery) -> SpringCurve {
        self.scales(query).mb(&self.parameters.mb, query.output_length)
    }

    fn validate(&self) -> PileResult<()> {
        validate_g0(self.g0)?;
        if !(self.su_top > 0.0) || !(self.su_bottom > 0.0) {
            return Err(PileError::invalid_input(
                "su_top/su_bottom",
                format!("{}/{}", self.su_top, self.su_bottom),
                "Undrained shear strength must be positive",
            ));
        }
        self.multipliers.validate()?;
        self.parameters.validate()
    }
}
