//! # Pile–Soil Model
//!
//! A [`Model`] binds a pile, an optional soil profile, point loads, supports
//! and a spring configuration, meshes them and assembles the springs once.
//! The result is immutable; to change an input, build a new model.
//!
//! The pile must not extend below the soil profile.
//!
//! ## Example
//!
//! ```rust
//! use pile_core::model::ModelInput;
//! use pile_core::pile::{Pile, PileMaterial};
//!
//! let pile = Pile::tubular("MP01", 0.0, 30.0, 5.0, 0.06, PileMaterial::Steel).unwrap();
//! let model = ModelInput::new(pile).with_coarseness(1.0).build().unwrap();
//!
//! assert_eq!(model.mesh().len(), 30);
//! assert!(model.diagnostics().is_empty());
//! ```
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "pile": {
//!     "name": "MP01",
//!     "material": { "type": "Steel" },
//!     "sections": [{ "top_elevation": 0.0, "bottom_elevation": -30.0, "width": 5.0, "wall_thickness": 0.06 }]
//!   },
//!   "soil": null,
//!   "coarseness": 1.0,
//!   "springs": { "base_shear": true },
//!   "point_loads": [{ "elevation": 0.0, "py": 500.0, "mz": 2000.0 }],
//!   "supports": [{ "elevation": -30.0, "tx": true }]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::boundary::{check_elevation, resolve, NodalConditions, PointDisplacement, PointLoad, Support};
use crate::constants::{DEFAULT_COARSENESS, ELEVATION_TOLERANCE};
use crate::errors::{PileError, PileResult};
use crate::mesh::Mesh;
use crate::pile::Pile;
use crate::soil::SoilProfile;
use crate::springs::{assemble, Diagnostic, SpringConfig, SpringSet};

fn default_coarseness() -> f64 {
    DEFAULT_COARSENESS
}

/// Everything needed to build a [`Model`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInput {
    /// The pile
    pub pile: Pile,

    /// Soil profile; springs and capacity need one
    #[serde(default)]
    pub soil: Option<SoilProfile>,

    /// Elevations that must become mesh nodes (m)
    #[serde(default)]
    pub forced_elevations: Vec<f64>,

    /// Maximum element length (m)
    #[serde(default = "default_coarseness")]
    pub coarseness: f64,

    /// Spring families to generate
    #[serde(default)]
    pub springs: SpringConfig,

    /// Concentrated loads, applied in order
    #[serde(default)]
    pub point_loads: Vec<PointLoad>,

    /// Prescribed displacements, applied in order
    #[serde(default)]
    pub point_displacements: Vec<PointDisplacement>,

    /// Supports, applied in order
    #[serde(default)]
    pub supports: Vec<Support>,
}

impl ModelInput {
    /// Input for a pile without soil, default meshing and springs
    pub fn new(pile: Pile) -> Self {
        Self {
            pile,
            soil: None,
            forced_elevations: Vec::new(),
            coarseness: DEFAULT_COARSENESS,
            springs: SpringConfig::default(),
            point_loads: Vec::new(),
            point_displacements: Vec::new(),
            supports: Vec::new(),
        }
    }

    /// Attach a soil profile (builder pattern)
    pub fn with_soil(mut self, soil: SoilProfile) -> Self {
        self.soil = Some(soil);
        self
    }

    /// Force mesh nodes at the given elevations (builder pattern)
    pub fn with_forced_elevations(mut self, elevations: impl IntoIterator<Item = f64>) -> Self {
        self.forced_elevations.extend(elevations);
        self
    }

    /// Set the maximum element length (builder pattern)
    pub fn with_coarseness(mut self, coarseness: f64) -> Self {
        self.coarseness = coarseness;
        self
    }

    /// Set the spring configuration (builder pattern)
    pub fn with_spring_config(mut self, config: SpringConfig) -> Self {
        self.springs = config;
        self
    }

    /// Add a point load (builder pattern)
    pub fn with_point_load(mut self, load: PointLoad) -> Self {
        self.point_loads.push(load);
        self
    }

    /// Add a prescribed displacement (builder pattern)
    pub fn with_point_displacement(mut self, displacement: PointDisplacement) -> Self {
        self.point_displacements.push(displacement);
        self
    }

    /// Add a support (builder pattern)
    pub fn with_support(mut self, support: Support) -> Self {
        self.supports.push(support);
        self
    }

    /// Elevations of every point load, displacement and support
    fn condition_elevations(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        let loads = self.point_loads.iter().map(|l| ("point_loads", l.elevation));
        let displacements = self.point_displacements.iter().map(|d| ("point_displacements", d.elevation));
        let supports = self.supports.iter().map(|s| ("supports", s.elevation));
        loads.chain(displacements).chain(supports)
    }

    /// Mesh the pile and assemble the springs
    pub fn build(self) -> PileResult<Model> {
        Model::new(self)
    }
}

/// A meshed pile with its springs
#[derive(Debug, Clone, Serialize)]
pub struct Model {
    input: ModelInput,
    mesh: Mesh,
    springs: SpringSet,
    conditions: NodalConditions,
}

impl Model {
    /// Validate the inputs, mesh the pile, assemble the springs and resolve
    /// point loads and supports onto the nodes.
    ///
    /// Fails when the pile extends below the soil profile or when a point
    /// load, displacement or support lies off the pile.
    pub fn new(input: ModelInput) -> PileResult<Self> {
        let pile = &input.pile;
        let soil = input.soil.as_ref();

        if let Some(soil) = soil {
            if pile.bottom_elevation() < soil.bottom_elevation() - ELEVATION_TOLERANCE {
                return Err(PileError::invalid_input(
                    "pile",
                    pile.bottom_elevation().to_string(),
                    format!(
                        "Pile bottom lies below the soil profile, which ends at {}",
                        soil.bottom_elevation()
                    ),
                ));
            }
        }

        let mut forced = input.forced_elevations.clone();
        for (field, elevation) in input.condition_elevations() {
            check_elevation(pile, field, elevation)?;
            forced.push(elevation);
        }

        let mesh = Mesh::build(pile, soil, &forced, input.coarseness)?;
        let springs = assemble(&mesh, pile, soil, &input.springs)?;
        let conditions = resolve(&mesh, &input.point_loads, &input.point_displacements, &input.supports)?;
        Ok(Self {
            input,
            mesh,
            springs,
            conditions,
        })
    }

    /// Inputs the model was built from
    pub fn input(&self) -> &ModelInput {
        &self.input
    }

    pub fn pile(&self) -> &Pile {
        &self.input.pile
    }

    pub fn soil(&self) -> Option<&SoilProfile> {
        self.input.soil.as_ref()
    }

    pub fn spring_config(&self) -> &SpringConfig {
        &self.input.springs
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn springs(&self) -> &SpringSet {
        &self.springs
    }

    /// Point loads, displacements and restraints per mesh node
    pub fn conditions(&self) -> &NodalConditions {
        &self.conditions
    }

    /// Findings of the spring assembly
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.springs.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApiSand, LateralSoilModel, Loading};
    use crate::pile::PileMaterial;
    use crate::soil::Layer;

    fn pile() -> Pile {
        Pile::tubular("MP", 2.0, 22.0, 4.0, 0.05, PileMaterial::Steel).unwrap()
    }

    #[test]
    fn test_build_with_soil() {
        let layer = Layer::new("Sand", 0.0, -25.0, 19.0)
            .with_lateral_model(LateralSoilModel::ApiSand(ApiSand::new(33.0, Loading::Cyclic)));
        let soil = SoilProfile::new("S", 0.0, 0.0, vec![layer]).unwrap();
        let model = ModelInput::new(pile())
            .with_soil(soil)
            .with_forced_elevations([-4.25])
            .with_coarseness(1.0)
            .build()
            .unwrap();

        assert!(model.soil().is_some());
        assert!(model.mesh().nodes().iter().any(|n| (n + 4.25).abs() < 1e-9));
        assert_eq!(model.springs().py.len(), model.mesh().len());
        // m–t is on by default and API sand only gives p–y
        assert_eq!(model.diagnostics().len(), 1);
    }

    #[test]
    fn test_pile_below_soil_rejected() {
        let soil = SoilProfile::new("S", 0.0, 0.0, vec![Layer::new("Sand", 0.0, -10.0, 18.0)]).unwrap();
        let pile = Pile::tubular("P", 0.0, 25.0, 2.0, 0.04, PileMaterial::Steel).unwrap();
        let err = ModelInput::new(pile).with_soil(soil.clone()).build().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");

        let flush = Pile::tubular("P", 0.0, 10.0005, 2.0, 0.04, PileMaterial::Steel).unwrap();
        assert!(ModelInput::new(flush).with_soil(soil).build().is_ok());
    }

    #[test]
    fn test_point_loads_and_supports() {
        let head = PointLoad::new(2.0).with_py(500.0).with_mz(1200.0);
        let model = ModelInput::new(pile())
            .with_coarseness(1.0)
            .with_point_load(head)
            .with_point_load(PointLoad::new(-7.35).with_px(-50.0))
            .with_point_displacement(PointDisplacement::new(-7.35).with_ty(0.02))
            .with_support(Support::fixed(-20.0))
            .build()
            .unwrap();

        let nodes = model.mesh().nodes();
        let node = nodes.iter().position(|n| (n + 7.35).abs() < 1e-9).unwrap();
        let conditions = model.conditions();
        assert_eq!(conditions.forces.len(), nodes.len());
        assert_eq!(conditions.forces[0], [0.0, 500.0, 1200.0]);
        assert_eq!(conditions.forces[node], [-50.0, 0.0, 0.0]);
        assert_eq!(conditions.restrained[node], [false, true, false]);
        assert_eq!(conditions.displacements[node][1], 0.02);
        assert_eq!(conditions.restrained[nodes.len() - 1], [true; 3]);

        // The input itself is left untouched
        assert!(model.input().forced_elevations.is_empty());
        assert_eq!(model.input().point_loads.len(), 2);
    }

    #[test]
    fn test_conditions_off_the_pile_rejected() {
        let above = ModelInput::new(pile()).with_point_load(PointLoad::new(3.0).with_py(1.0));
        assert_eq!(above.build().unwrap_err().error_code(), "INVALID_INPUT");
        let below = ModelInput::new(pile()).with_support(Support::fixed(-21.0));
        assert!(below.build().is_err());
        let nan = ModelInput::new(pile()).with_point_displacement(PointDisplacement::new(f64::NAN).with_tx(0.0));
        assert!(nan.build().is_err());
    }

    #[test]
    fn test_invalid_coarseness_fails() {
        assert!(ModelInput::new(pile()).with_coarseness(0.0).build().is_err());
    }

    #[test]
    fn test_json_input() {
        let json = r#"{
            "pile": {
                "name": "MP01",
                "sections": [{ "top_elevation": 0.0, "bottom_elevation": -30.0, "width": 5.0, "wall_thickness": 0.06 }]
            },
            "coarseness": 1.0,
            "springs": { "base_shear": true }
        }"#;
        let input: ModelInput = serde_json::from_str(json).unwrap();
        assert!(input.point_loads.is_empty() && input.supports.is_empty());
        assert!(input.springs.base_shear);
        assert!(input.springs.distributed_lateral);
        let model = input.build().unwrap();
        assert_eq!(model.mesh().len(), 30);
        assert!(model.conditions().is_empty());
        assert!(serde_json::to_string(&model).is_ok());
    }
}
