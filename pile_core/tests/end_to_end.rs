//! 40 m steel monopile in a single sand layer

use std::f64::consts::PI;

use pile_core::capacity::{
    axial_capacity, effective_pile_weight, entrapped_soil_weight, shaft_resistance, unit_end_bearing,
};
use pile_core::models::{ApiSand, ApiSandAxial, AxialSoilModel, LateralSoilModel, Loading};
use pile_core::springs::{Diagnostic, SpringConfig};
use pile_core::{Layer, Model, ModelInput, Pile, PileMaterial, SoilProfile};

const DIAMETER: f64 = 7.5;
const WALL: f64 = 0.07;
const LENGTH: f64 = 40.0;

fn input() -> ModelInput {
    let sand = Layer::new("Sand", 0.0, -40.0, 18.0)
        .with_lateral_model(LateralSoilModel::ApiSand(ApiSand::new(35.0, Loading::Static)))
        .with_axial_model(AxialSoilModel::ApiSand(ApiSandAxial::new(35.0)));
    let soil = SoilProfile::new("North Sea", 0.0, 0.0, vec![sand]).unwrap();
    let pile = Pile::tubular("MP01", 0.0, LENGTH, DIAMETER, WALL, PileMaterial::Steel).unwrap();
    ModelInput::new(pile)
        .with_soil(soil)
        .with_coarseness(0.5)
        .with_spring_config(SpringConfig::all())
}

fn model() -> Model {
    input().build().unwrap()
}

#[test]
fn effective_weight_is_buoyant_steel_volume() {
    let model = model();
    let volume = PI * (DIAMETER.powi(2) - (DIAMETER - 2.0 * WALL).powi(2)) / 4.0 * LENGTH;
    assert!((model.pile().volume() - volume).abs() < 1e-9);

    let weight = effective_pile_weight(&model).unwrap();
    assert!((weight - (78.0 - 10.0) * volume).abs() < 1e-6 * weight);
}

#[test]
fn resistances_are_non_negative() {
    let model = model();
    let outer = shaft_resistance(&model, true, false);
    assert!(outer > 0.0);
    assert!(unit_end_bearing(&model) >= 0.0);
    assert!(entrapped_soil_weight(&model) > 0.0);

    let capacity = axial_capacity(&model, "API-87").unwrap();
    assert!(capacity.compression_capacity > 0.0);
    assert!(capacity.tensile_capacity > 0.0);
    assert!(!axial_capacity(&model, "ICP-05").unwrap().plugged_compression);
}

#[test]
fn springs_cover_the_embedded_pile() {
    let model = model();
    let springs = model.springs();
    assert_eq!(model.mesh().len(), 80);
    assert_eq!(springs.py.len(), 80);

    // Below the mudline node every p–y curve is non-zero
    for element in &springs.py[1..] {
        assert!(!element.ends[0].is_zero());
    }
    assert!(springs.qz.value.iter().all(|v| *v >= 0.0));
    assert!(!springs.qz.is_zero());

    // API sand has no m–t, Hb or Mb curves
    let unsupported = model
        .diagnostics()
        .iter()
        .filter(|d| matches!(d, Diagnostic::UnsupportedFamily { .. }))
        .count();
    assert_eq!(unsupported, 3);
    assert!(springs.hb.is_zero() && springs.mb.is_zero());
}

#[test]
fn rebuilding_is_idempotent() {
    let a = model();
    let b = model();
    assert_eq!(a.mesh(), b.mesh());
    assert_eq!(a.springs(), b.springs());
    assert_eq!(
        axial_capacity(&a, "API-87").unwrap(),
        axial_capacity(&b, "API-87").unwrap()
    );
}

#[test]
fn inputs_roundtrip_through_json() {
    let original = input();
    let json = serde_json::to_string_pretty(&original).unwrap();
    let restored: ModelInput = serde_json::from_str(&json).unwrap();

    let a = original.build().unwrap();
    let b = restored.build().unwrap();
    assert_eq!(a.mesh(), b.mesh());
    assert_eq!(a.springs(), b.springs());
    assert_eq!(a.soil().unwrap().layers()[0].color(), b.soil().unwrap().layers()[0].color());
}
