//! # Axial Capacity
//!
//! Closed-form axial capacity of a meshed pile, integrated element by element:
//!
//! - shaft resistance from the axial model of each element's layer
//! - unit end bearing from the axial model of the layer at the toe
//! - weights of the pile (buoyant below the water line) and of the soil plug
//!
//! The plug state decides which terms enter compression and tension capacity:
//!
//! | state     | compression                          | tension                  |
//! |-----------|--------------------------------------|--------------------------|
//! | plugged   | Q_out + q·A_footprint − W_plug       | Q_out + W_plug           |
//! | unplugged | Q_out + Q_in + q·A_steel             | Q_out + Q_in             |
//!
//! Nothing is cached; every call integrates over the mesh again.
//!
//! ## Example
//!
//! ```rust
//! use pile_core::capacity::axial_capacity;
//! use pile_core::model::ModelInput;
//! use pile_core::models::{ApiSandAxial, AxialSoilModel};
//! use pile_core::pile::{Pile, PileMaterial};
//! use pile_core::soil::{Layer, SoilProfile};
//!
//! let layer = Layer::new("Sand", 0.0, -40.0, 18.0)
//!     .with_axial_model(AxialSoilModel::ApiSand(ApiSandAxial::new(35.0)));
//! let soil = SoilProfile::new("Site", 0.0, 0.0, vec![layer]).unwrap();
//! let pile = Pile::tubular("P1", 0.0, 30.0, 1.2, 0.03, PileMaterial::Steel).unwrap();
//! let model = ModelInput::new(pile).with_soil(soil).build().unwrap();
//!
//! let capacity = axial_capacity(&model, "API-87").unwrap();
//! assert!(capacity.compression_capacity > capacity.tensile_capacity);
//! ```

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{PileError, PileResult};
use crate::model::Model;
use crate::models::AxialModel;
use crate::soil::{buoyant_unit_weight, SoilProfile};

/// Plug footprint-equivalent diameter below which ICP-05 considers a pile plugged (m)
const ICP05_PLUG_DIAMETER: f64 = 1.4;

// ============================================================================
// Methods
// ============================================================================

/// Soil plug criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PluggingMethod {
    /// API RP2A-87: compare plug resistance with plug weight
    #[serde(rename = "API-87")]
    Api87,
    /// ICP-05: plugged below a footprint-equivalent diameter of 1.4 m
    #[serde(rename = "ICP-05")]
    Icp05,
}

impl PluggingMethod {
    pub const ALL: [PluggingMethod; 2] = [PluggingMethod::Api87, PluggingMethod::Icp05];

    pub fn as_str(&self) -> &'static str {
        match self {
            PluggingMethod::Api87 => "API-87",
            PluggingMethod::Icp05 => "ICP-05",
        }
    }
}

impl fmt::Display for PluggingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PluggingMethod {
    type Err = PileError;

    fn from_str(s: &str) -> PileResult<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| PileError::unsupported_method(s, &Self::ALL.map(|m| m.as_str())))
    }
}

/// Direction of the axial load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoadKind {
    Compression,
    Tension,
}

// ============================================================================
// Weights
// ============================================================================

fn soil_of<'a>(model: &'a Model, operation: &str) -> PileResult<&'a SoilProfile> {
    model.soil().ok_or_else(|| PileError::missing_soil_profile(operation))
}

/// Pile weight with buoyancy below the water line (kN)
pub fn effective_pile_weight(model: &Model) -> PileResult<f64> {
    let soil = soil_of(model, "effective_pile_weight")?;
    let gamma = model.pile().material().unit_weight();
    Ok(model
        .mesh()
        .elements()
        .iter()
        .map(|e| buoyant_unit_weight(gamma, soil.is_below_water(e.x_bottom)) * e.volume())
        .sum())
}

/// Weight of the soil inside the pile (kN); zero without soil
pub fn entrapped_soil_weight(model: &Model) -> f64 {
    let Some(soil) = model.soil() else {
        return 0.0;
    };
    model
        .mesh()
        .elements()
        .iter()
        .filter_map(|e| {
            let layer = &soil.layers()[e.layer_index?];
            let gamma = layer.buoyant_unit_weight(soil.is_below_water(e.midpoint()));
            Some(gamma * e.inner_area() * e.length())
        })
        .sum()
}

// ============================================================================
// Resistances
// ============================================================================

/// Shaft resistance (kN) along the outer and/or inner wall.
///
/// Unit friction is evaluated at each element's mean effective stress and
/// mean depth below the mudline.
pub fn shaft_resistance(model: &Model, outer: bool, inner: bool) -> f64 {
    let Some(soil) = model.soil() else {
        return 0.0;
    };
    let mut total = 0.0;
    for e in model.mesh().elements() {
        let Some(layer_index) = e.layer_index else {
            continue;
        };
        let layer = &soil.layers()[layer_index];
        let Some(axial) = &layer.axial_model else {
            continue;
        };
        let axial = axial.as_model();
        let signature = axial.shaft_signature();

        let f = axial.unit_shaft_friction(e.sigma_v_mean(), e.xg_mean().abs(), layer.thickness());
        let mut perimeter = 0.0;
        if outer {
            perimeter += signature.outer * e.outer_perimeter;
        }
        if inner {
            perimeter += signature.inner * e.inner_perimeter;
        }
        total += f * perimeter * e.length() * axial.shaft_multiplier();
    }
    total
}

/// Unit end bearing at the toe (kPa); zero when no axial model is found there.
///
/// The tip layer's model is evaluated at the toe stress with the full
/// profile depth as its depth argument.
pub fn unit_end_bearing(model: &Model) -> f64 {
    let (Some(soil), Some(toe)) = (model.soil(), model.mesh().toe_element()) else {
        return 0.0;
    };
    let Some(layer_index) = toe.layer_index else {
        return 0.0;
    };
    let layer = &soil.layers()[layer_index];
    let Some(axial) = &layer.axial_model else {
        return 0.0;
    };
    let axial = axial.as_model();
    let profile_depth = soil.top_elevation() - soil.bottom_elevation();
    axial.unit_tip_resistance(toe.sigma_v_bottom, profile_depth, layer.thickness()) * axial.tip_multiplier()
}

// ============================================================================
// Plug and capacity
// ============================================================================

/// Whether the soil plug moves with the pile
pub fn is_plugged(model: &Model, method: &str, kind: LoadKind) -> PileResult<bool> {
    let method: PluggingMethod = method.parse()?;
    soil_of(model, "is_plugged")?;
    Ok(plugged(model, method, kind))
}

fn plugged(model: &Model, method: PluggingMethod, kind: LoadKind) -> bool {
    let pile = model.pile();
    match method {
        PluggingMethod::Api87 => {
            let entrapped = entrapped_soil_weight(model);
            let inner = shaft_resistance(model, false, true);
            match kind {
                LoadKind::Compression => {
                    unit_end_bearing(model) * (pile.tip_footprint() - pile.tip_area()) < inner - entrapped
                }
                LoadKind::Tension => entrapped < inner,
            }
        }
        PluggingMethod::Icp05 => (4.0 * pile.tip_footprint() / PI).sqrt() < ICP05_PLUG_DIAMETER,
    }
}

/// Compression capacity (kN)
pub fn compression_capacity(model: &Model, method: &str) -> PileResult<f64> {
    let method: PluggingMethod = method.parse()?;
    soil_of(model, "compression_capacity")?;
    Ok(compression(model, method))
}

fn compression(model: &Model, method: PluggingMethod) -> f64 {
    let pile = model.pile();
    let outer = shaft_resistance(model, true, false);
    let ueb = unit_end_bearing(model);
    if plugged(model, method, LoadKind::Compression) {
        outer + ueb * pile.tip_footprint() - entrapped_soil_weight(model)
    } else {
        outer + shaft_resistance(model, false, true) + ueb * pile.tip_area()
    }
}

/// Tensile capacity (kN)
pub fn tensile_capacity(model: &Model, method: &str) -> PileResult<f64> {
    let method: PluggingMethod = method.parse()?;
    soil_of(model, "tensile_capacity")?;
    Ok(tension(model, method))
}

fn tension(model: &Model, method: PluggingMethod) -> f64 {
    let outer = shaft_resistance(model, true, false);
    if plugged(model, method, LoadKind::Tension) {
        outer + entrapped_soil_weight(model)
    } else {
        outer + shaft_resistance(model, false, true)
    }
}

/// Every axial capacity figure of a model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxialCapacity {
    pub method: PluggingMethod,
    /// Buoyant pile weight (kN)
    pub effective_pile_weight: f64,
    /// Soil plug weight (kN)
    pub entrapped_soil_weight: f64,
    /// Outer shaft resistance (kN)
    pub outer_shaft_resistance: f64,
    /// Inner shaft resistance (kN)
    pub inner_shaft_resistance: f64,
    /// Unit end bearing at the toe (kPa)
    pub unit_end_bearing: f64,
    pub plugged_compression: bool,
    pub plugged_tension: bool,
    /// Compression capacity (kN)
    pub compression_capacity: f64,
    /// Tensile capacity (kN)
    pub tensile_capacity: f64,
}

/// Evaluate all capacity figures with one plugging method
pub fn axial_capacity(model: &Model, method: &str) -> PileResult<AxialCapacity> {
    let method: PluggingMethod = method.parse()?;
    Ok(AxialCapacity {
        method,
        effective_pile_weight: effective_pile_weight(model)?,
        entrapped_soil_weight: entrapped_soil_weight(model),
        outer_shaft_resistance: shaft_resistance(model, true, false),
        inner_shaft_resistance: shaft_resistance(model, false, true),
        unit_end_bearing: unit_end_bearing(model),
        plugged_compression: plugged(model, method, LoadKind::Compression),
        plugged_tension: plugged(model, method, LoadKind::Tension),
        compression_capacity: compression(model, method),
        tensile_capacity: tension(model, method),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelInput;
    use crate::models::{ApiClayAxial, ApiSandAxial, AxialSoilModel};
    use crate::pile::{Pile, PileMaterial};
    use crate::soil::Layer;

    fn pile(diameter: f64) -> Pile {
        Pile::tubular("P", 0.0, 20.0, diameter, 0.04, PileMaterial::Steel).unwrap()
    }

    fn model_with(diameter: f64, layers: Vec<Layer>, water_line: f64) -> Model {
        let soil = SoilProfile::new("S", 0.0, water_line, layers).unwrap();
        ModelInput::new(pile(diameter)).with_soil(soil).build().unwrap()
    }

    fn sand(unit_weight: f64) -> Layer {
        Layer::new("Sand", 0.0, -30.0, unit_weight)
            .with_axial_model(AxialSoilModel::ApiSand(ApiSandAxial::new(32.0)))
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("API-87".parse::<PluggingMethod>().unwrap(), PluggingMethod::Api87);
        assert_eq!("ICP-05".parse::<PluggingMethod>().unwrap(), PluggingMethod::Icp05);
        let err = "API-2000".parse::<PluggingMethod>().unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_METHOD");
        assert!(err.to_string().contains("API-87, ICP-05"));
    }

    #[test]
    fn test_entrapped_weight_linear_in_unit_weight() {
        let light = model_with(2.0, vec![sand(15.0)], -100.0);
        let heavy = model_with(2.0, vec![sand(30.0)], -100.0);
        let w = entrapped_soil_weight(&light);
        assert!(w > 0.0);
        assert!((entrapped_soil_weight(&heavy) - 2.0 * w).abs() < 1e-9 * w);

        // Dry plug weight = γ × inner area × embedded length
        let inner_area = PI * (2.0 - 0.08_f64).powi(2) / 4.0;
        assert!((w - 15.0 * inner_area * 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_shaft_resistance_linear_in_multiplier() {
        let base = model_with(2.0, vec![sand(18.0)], 0.0);
        let layer = Layer::new("Sand", 0.0, -30.0, 18.0)
            .with_axial_model(AxialSoilModel::ApiSand(ApiSandAxial::new(32.0).with_shaft_multiplier(2.0)));
        let doubled = model_with(2.0, vec![layer], 0.0);

        let q = shaft_resistance(&base, true, true);
        assert!(q > 0.0);
        assert!((shaft_resistance(&doubled, true, true) - 2.0 * q).abs() < 1e-9 * q);

        let outer = shaft_resistance(&base, true, false);
        let inner = shaft_resistance(&base, false, true);
        assert!((outer + inner - q).abs() < 1e-9 * q);
        assert!(outer > inner);
        assert_eq!(shaft_resistance(&base, false, false), 0.0);
    }

    #[test]
    fn test_signature_zeroes_inner_friction() {
        let layer = Layer::new("Clay", 0.0, -30.0, 18.0)
            .with_axial_model(AxialSoilModel::ApiClay(ApiClayAxial::new(50.0, 100.0).with_signature(1.0, 0.0)));
        let model = model_with(2.0, vec![layer], 0.0);
        assert_eq!(shaft_resistance(&model, false, true), 0.0);
        assert!(shaft_resistance(&model, true, false) > 0.0);
    }

    #[test]
    fn test_end_bearing_requires_axial_model() {
        let bare = model_with(2.0, vec![Layer::new("Fill", 0.0, -30.0, 18.0)], 0.0);
        assert_eq!(unit_end_bearing(&bare), 0.0);
        assert_eq!(shaft_resistance(&bare, true, true), 0.0);

        let upper_only = model_with(
            2.0,
            vec![sand(18.0), Layer::new("Fill", -30.0, -40.0, 18.0)],
            0.0,
        );
        // Toe at -20 m is still in the sand
        assert!(unit_end_bearing(&upper_only) > 0.0);
    }

    #[test]
    fn test_tip_layer_without_axial_model() {
        let shallow = Layer::new("Sand", 0.0, -10.0, 18.0)
            .with_axial_model(AxialSoilModel::ApiSand(ApiSandAxial::new(32.0)));
        let model = model_with(2.0, vec![shallow, Layer::new("Fill", -10.0, -30.0, 18.0)], 0.0);
        assert_eq!(unit_end_bearing(&model), 0.0);
        assert!(shaft_resistance(&model, true, false) > 0.0);
    }

    /// Sand without an axial model over a clay whose Su grows with depth
    fn sand_over_clay(clay: ApiClayAxial) -> Model {
        let layers = vec![
            Layer::new("Sand", 0.0, -10.0, 18.0),
            Layer::new("Clay", -10.0, -30.0, 18.0).with_axial_model(AxialSoilModel::ApiClay(clay)),
        ];
        let soil = SoilProfile::new("S", 0.0, 0.0, layers).unwrap();
        let pile = Pile::tubular("P", 0.0, 25.0, 2.0, 0.04, PileMaterial::Steel).unwrap();
        ModelInput::new(pile).with_soil(soil).build().unwrap()
    }

    #[test]
    fn test_shaft_friction_uses_depth_below_mudline() {
        let clay = ApiClayAxial::new(40.0, 80.0);
        let model = sand_over_clay(clay.clone());

        let friction = |depth: fn(&crate::mesh::ElementProperties) -> f64| -> f64 {
            model
                .mesh()
                .elements()
                .iter()
                .filter(|e| e.layer_index == Some(1))
                .map(|e| clay.unit_shaft_friction(e.sigma_v_mean(), depth(e), 20.0) * e.outer_perimeter * e.length())
                .sum()
        };
        let below_mudline = friction(|e| e.xg_mean().abs());
        let below_layer_top = friction(|e| -10.0 - e.midpoint());

        let outer = shaft_resistance(&model, true, false);
        assert!((outer - below_mudline).abs() < 1e-9 * outer);
        assert!((outer - 4758.81).abs() < 0.5);
        assert!((outer - below_layer_top).abs() > 100.0);
    }

    #[test]
    fn test_end_bearing_uses_profile_depth() {
        let model = sand_over_clay(ApiClayAxial::new(40.0, 80.0).with_tip_multiplier(0.5));
        // Profile depth 30 m over a 20 m layer clamps Su to its base value
        assert!((unit_end_bearing(&model) - 0.5 * 9.0 * 80.0).abs() < 1e-9);

        let deep = vec![
            Layer::new("Clay", 0.0, -40.0, 18.0)
                .with_axial_model(AxialSoilModel::ApiClay(ApiClayAxial::new(40.0, 80.0))),
            Layer::new("Rock", -40.0, -80.0, 22.0),
        ];
        let soil = SoilProfile::new("S", 0.0, 0.0, deep).unwrap();
        let pile = Pile::tubular("P", 0.0, 20.0, 2.0, 0.04, PileMaterial::Steel).unwrap();
        let model = ModelInput::new(pile).with_soil(soil).build().unwrap();
        // Depth argument 80 m over the 40 m clay layer
        assert!((unit_end_bearing(&model) - 9.0 * 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_soil() {
        let model = ModelInput::new(pile(2.0)).build().unwrap();
        let err = effective_pile_weight(&model).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_SOIL_PROFILE");
        assert!(axial_capacity(&model, "API-87").is_err());
        assert!(is_plugged(&model, "ICP-05", LoadKind::Compression).is_err());
        assert_eq!(entrapped_soil_weight(&model), 0.0);
    }

    #[test]
    fn test_icp05_plug_diameter() {
        let small = model_with(1.0, vec![sand(18.0)], 0.0);
        let large = model_with(2.0, vec![sand(18.0)], 0.0);
        assert!(is_plugged(&small, "ICP-05", LoadKind::Compression).unwrap());
        assert!(is_plugged(&small, "ICP-05", LoadKind::Tension).unwrap());
        assert!(!is_plugged(&large, "ICP-05", LoadKind::Compression).unwrap());
        assert!(is_plugged(&large, "API-99", LoadKind::Compression).is_err());
    }

    #[test]
    fn test_capacity_follows_plug_state() {
        let model = model_with(2.0, vec![sand(18.0)], 0.0);
        let result = axial_capacity(&model, "API-87").unwrap();
        let pile = model.pile();

        let expected_compression = if result.plugged_compression {
            result.outer_shaft_resistance + result.unit_end_bearing * pile.tip_footprint() - result.entrapped_soil_weight
        } else {
            result.outer_shaft_resistance + result.inner_shaft_resistance + result.unit_end_bearing * pile.tip_area()
        };
        assert!((result.compression_capacity - expected_compression).abs() < 1e-9);

        let expected_tension = if result.plugged_tension {
            result.outer_shaft_resistance + result.entrapped_soil_weight
        } else {
            result.outer_shaft_resistance + result.inner_shaft_resistance
        };
        assert!((result.tensile_capacity - expected_tension).abs() < 1e-9);
        assert_eq!(
            result.plugged_tension,
            result.entrapped_soil_weight < result.inner_shaft_resistance
        );
        assert_eq!(compression_capacity(&model, "API-87").unwrap(), result.compression_capacity);
        assert_eq!(tensile_capacity(&model, "API-87").unwrap(), result.tensile_capacity);
    }

    #[test]
    fn test_result_json() {
        let model = model_with(2.0, vec![sand(18.0)], 0.0);
        let result = axial_capacity(&model, "ICP-05").unwrap();
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"method\":\"ICP-05\""));
    }
}
