//! API RP2A Sand
//!
//! - p–y: hyperbolic tangent curve `p = A·pu·tanh(k·X·y / (A·pu))`
//! - shaft friction: `f = K·σv'·tan(δ) ≤ f_lim`, with `δ = φ − 5°`
//! - end bearing: `q = Nq·σv' ≤ q_lim`
//! - t–z: linear up to 0.1 in (2.54 mm), then perfectly plastic
//!
//! Limits `f_lim`, `Nq` and `q_lim` follow the API RP2A table for
//! cohesionless soils, interpolated on δ and clamped at its ends.

use serde::{Deserialize, Serialize};

use crate::errors::{PileError, PileResult};
use crate::springs::SpringCurve;

use super::{
    default_multiplier, interpolate, validate_multiplier, refined_abscissa, resample_backbone, AxialModel, AxialQuery, LateralModel,
    LateralQuery, Loading, ShaftSignature, SpringSupport,
};

/// At-rest earth pressure coefficient used in the ultimate resistance
const K0: f64 = 0.4;

// Initial modulus of subgrade reaction (kN/m³) vs. friction angle
const K_PHI: [f64; 3] = [29.0, 33.0, 38.0];
const K_SUBMERGED: [f64; 3] = [5_400.0, 16_300.0, 34_000.0];
const K_DRY: [f64; 3] = [6_800.0, 24_400.0, 61_000.0];

// Axial limits vs. interface friction angle δ (degrees)
const DELTA: [f64; 5] = [15.0, 20.0, 25.0, 30.0, 35.0];
const F_LIMIT: [f64; 5] = [47.8, 67.0, 81.3, 95.7, 114.8];
const NQ: [f64; 5] = [8.0, 12.0, 20.0, 40.0, 50.0];
const Q_LIMIT: [f64; 5] = [1_900.0, 2_900.0, 4_800.0, 9_600.0, 12_000.0];

/// Displacement to mobilize peak shaft friction in sand (m)
const TZ_PEAK_DISPLACEMENT: f64 = 0.00254;

fn validate_phi(phi: f64) -> PileResult<()> {
    if !(phi > 15.0 && phi <= 45.0) {
        return Err(PileError::invalid_input(
            "phi",
            phi.to_string(),
            "Friction angle must lie in (15°, 45°]",
        ));
    }
    Ok(())
}

fn default_earth_pressure() -> f64 {
    0.8
}

/// API sand lateral model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSand {
    /// Internal friction angle (degrees)
    pub phi: f64,

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

impl ApiSand {
    pub fn new(phi: f64, loading: Loading) -> Self {
        Self {
            phi,
            loading,
            p_multiplier: 1.0,
            y_multiplier: 1.0,
        }
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

    /// Coefficients C1, C2, C3 of the ultimate resistance
    pub fn coefficients(&self) -> (f64, f64, f64) {
        let phi = self.phi.to_radians();
        let alpha = phi / 2.0;
        let beta = std::f64::consts::FRAC_PI_4 + phi / 2.0;
        let ka = (std::f64::consts::FRAC_PI_4 - phi / 2.0).tan().powi(2);
        let tb = beta.tan();
        let tbp = (beta - phi).tan();

        let c1 = tb.powi(2) * alpha.tan() / tbp
            + K0 * (phi.tan() * beta.sin() / (alpha.cos() * tbp) + tb * (phi.tan() * beta.sin() - alpha.tan()));
        let c2 = tb / tbp - ka;
        let c3 = ka * (tb.powi(8) - 1.0) + K0 * phi.tan() * tb.powi(4);
        (c1, c2, c3)
    }

    /// Initial modulus of subgrade reaction (kN/m³)
    pub fn initial_modulus(&self, below_water_table: bool) -> f64 {
        let table = if below_water_table { &K_SUBMERGED } else { &K_DRY };
        interpolate(self.phi, &K_PHI, table)
    }

    /// Ultimate lateral resistance per unit length (kN/m)
    pub fn ultimate_resistance(&self, sigma_v: f64, depth: f64, diameter: f64) -> f64 {
        let (c1, c2, c3) = self.coefficients();
        let shallow = (c1 * depth + c2 * diameter) * sigma_v;
        let deep = c3 * diameter * sigma_v;
        shallow.min(deep)
    }

    fn loading_factor(&self, depth: f64, diameter: f64) -> f64 {
        match self.loading {
            Loading::Static => (3.0 - 0.8 * depth / diameter).max(0.9),
            Loading::Cyclic => 0.9,
        }
    }
}

impl LateralModel for ApiSand {
    fn name(&self) -> &'static str {
        "API sand"
    }

    fn spring_support(&self) -> SpringSupport {
        SpringSupport::PY_ONLY
    }

    fn py(&self, query: &LateralQuery) -> SpringCurve {
        let depth = query.depth.max(0.0);
        let diameter = query.diameter;
        let apu = self.loading_factor(depth, diameter) * self.ultimate_resistance(query.sigma_v, depth, diameter);
        let kx = self.initial_modulus(query.below_water_table) * depth;

        let y_max = if apu > 0.0 && kx > 0.0 {
            4.0 * apu / kx
        } else {
            0.1 * diameter
        };
        let y = refined_abscissa(y_max, query.output_length);
        let p = y
            .iter()
            .map(|&y| {
                if apu > 0.0 {
                    apu * (kx * y / apu).tanh() * self.p_multiplier
                } else {
                    0.0
                }
            })
            .collect();
        let y = y.into_iter().map(|y| y * self.y_multiplier).collect();
        SpringCurve::new(p, y)
    }

    fn validate(&self) -> PileResult<()> {
        validate_phi(self.phi)?;
        validate_multiplier("p_multiplier", self.p_multiplier, false)?;
        validate_multiplier("y_multiplier", self.y_multiplier, true)
    }
}

/// API sand axial model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSandAxial {
    /// Internal friction angle (degrees)
    pub phi: f64,

    /// Coefficient of lateral earth pressure on the shaft
    #[serde(default = "default_earth_pressure")]
    pub earth_pressure: f64,

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

impl ApiSandAxial {
    pub fn new(phi: f64) -> Self {
        Self {
            phi,
            earth_pressure: default_earth_pressure(),
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

    /// Interface friction angle δ = φ − 5° (degrees)
    pub fn delta(&self) -> f64 {
        self.phi - 5.0
    }
}

impl AxialModel for ApiSandAxial {
    fn name(&self) -> &'static str {
        "API sand"
    }

    fn unit_shaft_friction(&self, sigma_v: f64, _depth: f64, _layer_height: f64) -> f64 {
        let delta = self.delta();
        let limit = interpolate(delta, &DELTA, &F_LIMIT);
        (self.earth_pressure * sigma_v * delta.to_radians().tan()).min(limit)
    }

    fn unit_tip_resistance(&self, sigma_v: f64, _depth: f64, _layer_height: f64) -> f64 {
        let delta = self.delta();
        let nq = interpolate(delta, &DELTA, &NQ);
        let limit = interpolate(delta, &DELTA, &Q_LIMIT);
        (nq * sigma_v).min(limit)
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
        resample_backbone(&[0.0, 1.0, 2.0], &[0.0, 1.0, 1.0], TZ_PEAK_DISPLACEMENT, t_max, query.output_length)
    }

    fn validate(&self) -> PileResult<()> {
        validate_phi(self.phi)?;
        if !(self.earth_pressure > 0.0) {
            return Err(PileError::invalid_input(
                "earth_pressure",
                self.earth_pressure.to_string(),
                "Earth pressure coefficient must be positive",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(sigma_v: f64, depth: f64) -> LateralQuery {
        LateralQuery {
            sigma_v,
            depth,
            layer_height: 40.0,
            depth_from_top_of_layer: depth,
            diameter: 2.0,
            embedment: 40.0,
            below_water_table: true,
            output_length: 15,
        }
    }

    #[test]
    fn test_coefficients_match_chart() {
        // API RP2A chart at φ = 35°: C1 ≈ 2.97, C2 ≈ 3.42, C3 ≈ 53.8
        let (c1, c2, c3) = ApiSand::new(35.0, Loading::Static).coefficients();
        assert!((c1 - 2.97).abs() < 0.01);
        assert!((c2 - 3.42).abs() < 0.01);
        assert!((c3 - 53.79).abs() < 0.05);
    }

    #[test]
    fn test_py_shape() {
        let sand = ApiSand::new(35.0, Loading::Static);
        let curve = sand.py(&query(80.0, 10.0));
        assert_eq!(curve.len(), 15);
        assert_eq!(curve.value[0], 0.0);
        assert!(curve.value.windows(2).all(|w| w[1] >= w[0]));

        // Last point is close to A·pu
        let apu = 0.9 * sand.ultimate_resistance(80.0, 10.0, 2.0);
        assert!((curve.value[14] - apu).abs() / apu < 1e-3);
    }

    #[test]
    fn test_py_at_mudline_is_zero() {
        let sand = ApiSand::new(30.0, Loading::Static);
        let curve = sand.py(&query(0.0, 0.0));
        assert!(curve.value.iter().all(|&p| p == 0.0));
        assert!(curve.value.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_cyclic_is_softer_near_surface() {
        let q = query(20.0, 2.0);
        let stat = ApiSand::new(35.0, Loading::Static).py(&q);
        let cyc = ApiSand::new(35.0, Loading::Cyclic).py(&q);
        assert!(cyc.value[14] < stat.value[14]);
    }

    #[test]
    fn test_p_multiplier_scales_reaction() {
        let q = query(50.0, 6.0);
        let base = ApiSand::new(33.0, Loading::Static).py(&q);
        let half = ApiSand::new(33.0, Loading::Static).with_p_multiplier(0.5).py(&q);
        for (a, b) in base.value.iter().zip(&half.value) {
            assert!((a * 0.5 - b).abs() < 1e-9);
        }
        assert!(ApiSand::new(33.0, Loading::Static).with_y_multiplier(-1.0).validate().is_err());
        assert!(ApiSand::new(33.0, Loading::Static).with_p_multiplier(-1.0).validate().is_err());
    }

    #[test]
    fn test_shaft_friction_limited() {
        let axial = ApiSandAxial::new(35.0);
        // δ = 30° → f_lim = 95.7 kPa
        let low = axial.unit_shaft_friction(50.0, 0.0, 10.0);
        assert!((low - 0.8 * 50.0 * 30f64.to_radians().tan()).abs() < 1e-9);
        assert!((axial.unit_shaft_friction(1_000.0, 0.0, 10.0) - 95.7).abs() < 1e-9);
    }

    #[test]
    fn test_tip_resistance_limited() {
        let axial = ApiSandAxial::new(35.0);
        // δ = 30° → Nq = 40, q_lim = 9.6 MPa
        assert!((axial.unit_tip_resistance(100.0, 0.0, 10.0) - 4_000.0).abs() < 1e-9);
        assert!((axial.unit_tip_resistance(1_000.0, 0.0, 10.0) - 9_600.0).abs() < 1e-9);
    }

    #[test]
    fn test_tz_plateau() {
        let axial = ApiSandAxial::new(35.0).with_shaft_multiplier(2.0);
        let q = AxialQuery {
            sigma_v: 1_000.0,
            layer_height: 10.0,
            depth_from_top_of_layer: 5.0,
            diameter: 2.0,
            output_length: 10,
        };
        let curve = axial.tz(&q);
        assert!((curve.value[9] - 2.0 * 95.7).abs() < 1e-9);
        assert!((curve.abscissa[9] - 2.0 * TZ_PEAK_DISPLACEMENT).abs() < 1e-12);
    }

    #[test]
    fn test_validation() {
        assert!(ApiSand::new(10.0, Loading::Static).validate().is_err());
        assert!(ApiSandAxial::new(32.0).validate().is_ok());
    }
}
