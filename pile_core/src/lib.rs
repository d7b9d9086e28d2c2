//! # pile_core - Pile–Soil Interaction Engine
//!
//! `pile_core` turns a pile and a layered soil profile into the inputs of a
//! beam-on-nonlinear-springs analysis and into closed-form axial capacities.
//! All inputs and results are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Validated once**: piles and soil profiles are checked at construction and immutable afterwards
//! - **Pure**: mesh, springs and capacities are deterministic functions of the inputs
//! - **Pluggable soil**: constitutive models are traits; built-in families cover API and PISA-style curves
//! - **Rich Errors**: structured error types, numeric warnings as diagnostics
//!
//! ## Quick Start
//!
//! ```rust
//! use pile_core::capacity::effective_pile_weight;
//! use pile_core::models::{ApiSand, ApiSandAxial, AxialSoilModel, LateralSoilModel, Loading};
//! use pile_core::{Layer, ModelInput, Pile, PileMaterial, SoilProfile};
//!
//! let sand = Layer::new("Sand", 0.0, -40.0, 18.0)
//!     .with_lateral_model(LateralSoilModel::ApiSand(ApiSand::new(35.0, Loading::Static)))
//!     .with_axial_model(AxialSoilModel::ApiSand(ApiSandAxial::new(35.0)));
//! let soil = SoilProfile::new("Site", 0.0, 0.0, vec![sand]).unwrap();
//! let pile = Pile::tubular("MP01", 0.0, 40.0, 7.5, 0.07, PileMaterial::Steel).unwrap();
//!
//! let model = ModelInput::new(pile).with_soil(soil).build().unwrap();
//!
//! let weight = effective_pile_weight(&model).unwrap();
//! assert!(weight > 0.0);
//! assert_eq!(model.springs().py.len(), model.mesh().len());
//! ```
//!
//! ## Modules
//!
//! - [`pile`] - Pile sections and derived geometry
//! - [`soil`] - Soil layers, profile and effective stress
//! - [`models`] - Lateral and axial constitutive models
//! - [`mesh`] - Discretization and per-element properties
//! - [`springs`] - p–y, m–t, t–z and base springs
//! - [`capacity`] - Shaft friction, end bearing and soil plug
//! - [`boundary`] - Point loads, prescribed displacements and supports
//! - [`model`] - Pile + soil + mesh + springs, built once
//! - [`errors`] - Structured error types

pub mod boundary;
pub mod capacity;
pub mod constants;
pub mod errors;
pub mod mesh;
pub mod model;
pub mod models;
pub mod pile;
pub mod soil;
pub mod springs;

// Re-export commonly used types at crate root for convenience
pub use boundary::{NodalConditions, PointDisplacement, PointLoad, Support};
pub use capacity::{AxialCapacity, LoadKind, PluggingMethod};
pub use errors::{PileError, PileResult};
pub use mesh::{ElementProperties, Mesh};
pub use model::{Model, ModelInput};
pub use pile::{Pile, PileMaterial, PileSection, SectionShape};
pub use soil::{Layer, SoilProfile};
pub use springs::{Diagnostic, SpringConfig, SpringCurve, SpringSet};
