//! # Point Loads and Supports
//!
//! Nodal boundary conditions given by elevation. Each elevation must lie on
//! the pile; the model forces a mesh node there and resolves the condition
//! onto that node.
//!
//! Degrees of freedom per node, in order:
//!
//! | index | force       | displacement |
//! |-------|-------------|--------------|
//! | 0     | `px` axial  | `tx`         |
//! | 1     | `py` shear  | `ty`         |
//! | 2     | `mz` moment | `rz`         |
//!
//! Conditions are applied in input order. A later point load or prescribed
//! displacement overwrites only the components it sets; a later support
//! overwrites all three restraints.

use serde::{Deserialize, Serialize};

use crate::constants::ELEVATION_TOLERANCE;
use crate::errors::{PileError, PileResult};
use crate::mesh::Mesh;
use crate::pile::Pile;

// ============================================================================
// Inputs
// ============================================================================

/// Concentrated force and/or moment at an elevation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLoad {
    /// Elevation (m)
    pub elevation: f64,
    /// Axial force (kN)
    #[serde(default)]
    pub px: Option<f64>,
    /// Lateral force (kN)
    #[serde(default)]
    pub py: Option<f64>,
    /// Bending moment (kNm)
    #[serde(default)]
    pub mz: Option<f64>,
}

impl PointLoad {
    pub fn new(elevation: f64) -> Self {
        Self {
            elevation,
            px: None,
            py: None,
            mz: None,
        }
    }

    /// Set the axial force (builder pattern)
    pub fn with_px(mut self, force: f64) -> Self {
        self.px = Some(force);
        self
    }

    /// Set the lateral force (builder pattern)
    pub fn with_py(mut self, force: f64) -> Self {
        self.py = Some(force);
        self
    }

    /// Set the moment (builder pattern)
    pub fn with_mz(mut self, moment: f64) -> Self {
        self.mz = Some(moment);
        self
    }

    fn components(&self) -> [Option<f64>; 3] {
        [self.px, self.py, self.mz]
    }
}

/// Prescribed displacement and/or rotation at an elevation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointDisplacement {
    /// Elevation (m)
    pub elevation: f64,
    /// Axial displacement (m)
    #[serde(default)]
    pub tx: Option<f64>,
    /// Lateral displacement (m)
    #[serde(default)]
    pub ty: Option<f64>,
    /// Rotation (rad)
    #[serde(default)]
    pub rz: Option<f64>,
}

impl PointDisplacement {
    pub fn new(elevation: f64) -> Self {
        Self {
            elevation,
            tx: None,
            ty: None,
            rz: None,
        }
    }

    /// Set the axial displacement (builder pattern)
    pub fn with_tx(mut self, displacement: f64) -> Self {
        self.tx = Some(displacement);
        self
    }

    /// Set the lateral displacement (builder pattern)
    pub fn with_ty(mut self, displacement: f64) -> Self {
        self.ty = Some(displacement);
        self
    }

    /// Set the rotation (builder pattern)
    pub fn with_rz(mut self, rotation: f64) -> Self {
        self.rz = Some(rotation);
        self
    }

    fn components(&self) -> [Option<f64>; 3] {
        [self.tx, self.ty, self.rz]
    }
}

/// Restrained degrees of freedom at an elevation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Support {
    /// Elevation (m)
    pub elevation: f64,
    #[serde(default)]
    pub tx: bool,
    #[serde(default)]
    pub ty: bool,
    #[serde(default)]
    pub rz: bool,
}

impl Support {
    pub fn new(elevation: f64, tx: bool, ty: bool, rz: bool) -> Self {
        Self { elevation, tx, ty, rz }
    }

    /// All three degrees of freedom restrained
    pub fn fixed(elevation: f64) -> Self {
        Self::new(elevation, true, true, true)
    }
}

// ============================================================================
// Nodal conditions
// ============================================================================

/// Boundary conditions resolved onto mesh nodes, head to toe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodalConditions {
    /// `[px, py, mz]` per node
    pub forces: Vec<[f64; 3]>,
    /// `[tx, ty, rz]` per node
    pub displacements: Vec<[f64; 3]>,
    /// Restraint flags per node; set by supports and prescribed displacements
    pub restrained: Vec<[bool; 3]>,
}

impl NodalConditions {
    fn empty(nodes: usize) -> Self {
        Self {
            forces: vec![[0.0; 3]; nodes],
            displacements: vec![[0.0; 3]; nodes],
            restrained: vec![[false; 3]; nodes],
        }
    }

    /// True when no node carries a load or a restraint
    pub fn is_empty(&self) -> bool {
        self.forces.iter().all(|f| f.iter().all(|v| *v == 0.0))
            && self.restrained.iter().all(|r| !r.iter().any(|b| *b))
    }
}

/// Reject non-finite elevations and elevations off the pile
pub fn check_elevation(pile: &Pile, field: &str, elevation: f64) -> PileResult<()> {
    let on_pile = elevation <= pile.top_elevation() + ELEVATION_TOLERANCE
        && elevation >= pile.bottom_elevation() - ELEVATION_TOLERANCE;
    if !elevation.is_finite() || !on_pile {
        return Err(PileError::invalid_input(
            field,
            elevation.to_string(),
            format!(
                "Elevation must lie on the pile, between {} and {}",
                pile.bottom_elevation(),
                pile.top_elevation()
            ),
        ));
    }
    Ok(())
}

fn node_at(mesh: &Mesh, elevation: f64) -> PileResult<usize> {
    mesh.nodes()
        .iter()
        .position(|n| (n - elevation).abs() <= ELEVATION_TOLERANCE)
        .ok_or_else(|| PileError::Internal {
            message: format!("No mesh node at elevation {elevation}"),
        })
}

/// Resolve point loads, displacements and supports onto the mesh nodes
pub fn resolve(
    mesh: &Mesh,
    loads: &[PointLoad],
    displacements: &[PointDisplacement],
    supports: &[Support],
) -> PileResult<NodalConditions> {
    let mut nodal = NodalConditions::empty(mesh.nodes().len());

    for load in loads {
        let node = node_at(mesh, load.elevation)?;
        for (dof, value) in load.components().into_iter().enumerate() {
            if let Some(value) = value {
                nodal.forces[node][dof] = value;
            }
        }
    }

    for displacement in displacements {
        let node = node_at(mesh, displacement.elevation)?;
        for (dof, value) in displacement.components().into_iter().enumerate() {
            if let Some(value) = value {
                nodal.displacements[node][dof] = value;
                nodal.restrained[node][dof] = true;
            }
        }
    }

    for support in supports {
        let node = node_at(mesh, support.elevation)?;
        nodal.restrained[node] = [support.tx, support.ty, support.rz];
    }

    Ok(nodal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pile::PileMaterial;

    fn pile() -> Pile {
        Pile::tubular("P", 0.0, 10.0, 1.0, 0.02, PileMaterial::Steel).unwrap()
    }

    fn mesh(forced: &[f64]) -> Mesh {
        Mesh::build(&pile(), None, forced, 1.0).unwrap()
    }

    #[test]
    fn test_elevation_must_lie_on_pile() {
        let pile = pile();
        assert!(check_elevation(&pile, "point_loads", 0.0).is_ok());
        assert!(check_elevation(&pile, "point_loads", -10.0005).is_ok());
        let err = check_elevation(&pile, "point_loads", 1.0).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(check_elevation(&pile, "supports", -10.5).is_err());
        assert!(check_elevation(&pile, "supports", f64::NAN).is_err());
    }

    #[test]
    fn test_later_load_overwrites_given_components() {
        let mesh = mesh(&[-2.5]);
        let loads = [
            PointLoad::new(-2.5).with_px(-100.0).with_py(50.0),
            PointLoad::new(-2.5).with_py(80.0),
        ];
        let nodal = resolve(&mesh, &loads, &[], &[]).unwrap();
        let node = mesh.nodes().iter().position(|n| (n + 2.5).abs() < 1e-9).unwrap();
        assert_eq!(nodal.forces[node], [-100.0, 80.0, 0.0]);
        assert_eq!(nodal.forces.len(), mesh.nodes().len());
        assert!(nodal.restrained.iter().all(|r| *r == [false; 3]));
    }

    #[test]
    fn test_displacement_restrains_its_components() {
        let mesh = mesh(&[]);
        let displacement = PointDisplacement::new(0.0).with_ty(0.01);
        let nodal = resolve(&mesh, &[], &[displacement], &[]).unwrap();
        assert_eq!(nodal.displacements[0], [0.0, 0.01, 0.0]);
        assert_eq!(nodal.restrained[0], [false, true, false]);
        assert!(!nodal.is_empty());
    }

    #[test]
    fn test_support_overwrites_restraints() {
        let mesh = mesh(&[]);
        let supports = [Support::fixed(-10.0), Support::new(-10.0, false, true, false)];
        let nodal = resolve(&mesh, &[], &[], &supports).unwrap();
        let toe = mesh.nodes().len() - 1;
        assert_eq!(nodal.restrained[toe], [false, true, false]);
    }

    #[test]
    fn test_missing_node_is_internal() {
        let mesh = mesh(&[]);
        let err = resolve(&mesh, &[PointLoad::new(-2.5).with_py(1.0)], &[], &[]).unwrap_err();
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_json_defaults() {
        let support: Support = serde_json::from_str(r#"{ "elevation": -3.0, "ty": true }"#).unwrap();
        assert_eq!(support, Support::new(-3.0, false, true, false));
        let load: PointLoad = serde_json::from_str(r#"{ "elevation": 0.0, "py": 250.0 }"#).unwrap();
        assert_eq!(load, PointLoad::new(0.0).with_py(250.0));
    }
}
