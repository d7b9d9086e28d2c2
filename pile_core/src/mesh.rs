//! # Mesh and Property Mapping
//!
//! Discretizes a pile into 1D elements and maps pile and soil properties onto
//! them. Element boundaries always include:
//!
//! - every pile section boundary
//! - every soil layer boundary within the pile span
//! - caller-forced elevations within the pile span
//!
//! Each segment between consecutive boundaries is then split into
//! `ceil(length / coarseness)` equal elements, so every element lies inside
//! exactly one section and at most one layer.
//!
//! Elements and nodes are ordered head to toe. For `n` elements there are
//! `n + 1` nodes and `n` midpoints.

use serde::{Deserialize, Serialize};

use crate::constants::NODE_MERGE_TOLERANCE;
use crate::errors::{PileError, PileResult};
use crate::pile::{Pile, PileSection};
use crate::soil::SoilProfile;

// ============================================================================
// Element Properties
// ============================================================================

/// Properties of one mesh element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementProperties {
    /// Position in the mesh, head to toe
    pub index: usize,

    /// Elevation of the top node (m)
    pub x_top: f64,

    /// Elevation of the bottom node (m)
    pub x_bottom: f64,

    /// Depth of the top node below mudline (m, negative above)
    pub xg_top: f64,

    /// Depth of the bottom node below mudline (m, negative above)
    pub xg_bottom: f64,

    /// Owning pile section
    pub section_index: usize,

    /// Owning soil layer, if any
    pub layer_index: Option<usize>,

    /// Outer width (m)
    pub width: f64,

    /// Effective wall thickness (m)
    pub wall_thickness: f64,

    /// Material area (m²)
    pub area: f64,

    /// Gross area enclosed by the outer boundary (m²)
    pub footprint: f64,

    /// Second moment of area (m⁴)
    pub second_moment_of_area: f64,

    /// Outer perimeter (m)
    pub outer_perimeter: f64,

    /// Inner perimeter (m)
    pub inner_perimeter: f64,

    /// Vertical effective stress at the top node (kPa)
    pub sigma_v_top: f64,

    /// Vertical effective stress at the bottom node (kPa)
    pub sigma_v_bottom: f64,
}

impl ElementProperties {
    /// Element length (m)
    pub fn length(&self) -> f64 {
        self.x_top - self.x_bottom
    }

    /// Elevation of the midpoint (m)
    pub fn midpoint(&self) -> f64 {
        0.5 * (self.x_top + self.x_bottom)
    }

    /// Depth of the midpoint below mudline (m)
    pub fn xg_mean(&self) -> f64 {
        0.5 * (self.xg_top + self.xg_bottom)
    }

    /// Mean vertical effective stress (kPa)
    pub fn sigma_v_mean(&self) -> f64 {
        0.5 * (self.sigma_v_top + self.sigma_v_bottom)
    }

    /// Area enclosed by the inner wall (m²)
    pub fn inner_area(&self) -> f64 {
        self.footprint - self.area
    }

    /// Material volume (m³)
    pub fn volume(&self) -> f64 {
        self.area * self.length()
    }

    /// Whether an elevation lies within the element (boundaries included)
    pub fn contains(&self, elevation: f64) -> bool {
        elevation <= self.x_top + NODE_MERGE_TOLERANCE && elevation >= self.x_bottom - NODE_MERGE_TOLERANCE
    }
}

/// Soil-side view of an element, see [`Mesh::soil_properties`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilPropertyRow {
    pub x_top: f64,
    pub x_bottom: f64,
    pub xg_top: f64,
    pub xg_bottom: f64,
    pub layer_index: Option<usize>,
    pub sigma_v_top: f64,
    pub sigma_v_bottom: f64,
}

/// Structural view of an element, see [`Mesh::structural_properties`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StructuralPropertyRow {
    pub x_top: f64,
    pub x_bottom: f64,
    pub width: f64,
    pub wall_thickness: f64,
    pub area: f64,
    pub second_moment_of_area: f64,
    pub young_modulus: f64,
}

// ============================================================================
// Mesh
// ============================================================================

/// Discretized pile with per-element properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    elements: Vec<ElementProperties>,
    nodes: Vec<f64>,
    midpoints: Vec<f64>,
    young_modulus: f64,
}

impl Mesh {
    /// Build the mesh of a pile, optionally embedded in a soil profile.
    ///
    /// `coarseness` is the maximum element length (m). Forced elevations
    /// outside the pile span are ignored.
    pub fn build(pile: &Pile, soil: Option<&SoilProfile>, forced_elevations: &[f64], coarseness: f64) -> PileResult<Self> {
        if !(coarseness > 0.0) || !coarseness.is_finite() {
            return Err(PileError::invalid_input(
                "coarseness",
                coarseness.to_string(),
                "Maximum element length must be positive",
            ));
        }
        if let Some(bad) = forced_elevations.iter().find(|x| !x.is_finite()) {
            return Err(PileError::invalid_input(
                "forced_elevations",
                bad.to_string(),
                "Forced elevations must be finite",
            ));
        }

        let nodes = nodes(pile, soil, forced_elevations, coarseness);
        let midpoints: Vec<f64> = nodes.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect();

        let mudline = soil.map_or(pile.top_elevation(), SoilProfile::top_elevation);
        let stress = |x: f64| soil.map_or(0.0, |s| s.effective_stress_at(x));

        let mut elements = Vec::with_capacity(midpoints.len());
        for (index, (pair, &mid)) in nodes.windows(2).zip(&midpoints).enumerate() {
            let (x_top, x_bottom) = (pair[0], pair[1]);

            let section_index = owning_section(pile, mid).ok_or_else(|| PileError::Internal {
                message: format!("Element {index} at elevation {mid} has no pile section"),
            })?;
            let section: &PileSection = &pile.sections()[section_index];

            let layer_index = soil.and_then(|s| s.layers().iter().position(|l| mid <= l.top && mid >= l.bottom));

            elements.push(ElementProperties {
                index,
                x_top,
                x_bottom,
                xg_top: mudline - x_top,
                xg_bottom: mudline - x_bottom,
                section_index,
                layer_index,
                width: section.width,
                wall_thickness: section.thickness(),
                area: section.area(),
                footprint: section.footprint(),
                second_moment_of_area: section.second_moment_of_area(),
                outer_perimeter: section.outer_perimeter(),
                inner_perimeter: section.inner_perimeter(),
                sigma_v_top: stress(x_top),
                sigma_v_bottom: stress(x_bottom),
            });
        }

        Ok(Self {
            elements,
            nodes,
            midpoints,
            young_modulus: pile.material().young_modulus(),
        })
    }

    /// Elements, head to toe
    pub fn elements(&self) -> &[ElementProperties] {
        &self.elements
    }

    /// Node elevations, head to toe
    pub fn nodes(&self) -> &[f64] {
        &self.nodes
    }

    /// Element midpoint elevations, head to toe
    pub fn midpoints(&self) -> &[f64] {
        &self.midpoints
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the mesh has no elements
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The element whose span contains the pile toe
    pub fn toe_element(&self) -> Option<&ElementProperties> {
        self.elements.last()
    }

    /// Soil-side property table, one row per element
    pub fn soil_properties(&self) -> Vec<SoilPropertyRow> {
        self.elements
            .iter()
            .map(|e| SoilPropertyRow {
                x_top: e.x_top,
                x_bottom: e.x_bottom,
                xg_top: e.xg_top,
                xg_bottom: e.xg_bottom,
                layer_index: e.layer_index,
                sigma_v_top: e.sigma_v_top,
                sigma_v_bottom: e.sigma_v_bottom,
            })
            .collect()
    }

    /// Structural property table, one row per element
    pub fn structural_properties(&self) -> Vec<StructuralPropertyRow> {
        self.elements
            .iter()
            .map(|e| StructuralPropertyRow {
                x_top: e.x_top,
                x_bottom: e.x_bottom,
                width: e.width,
                wall_thickness: e.wall_thickness,
                area: e.area,
                second_moment_of_area: e.second_moment_of_area,
                young_modulus: self.young_modulus,
            })
            .collect()
    }
}

/// Node elevations: merged breakpoints, each segment split by `coarseness`
fn nodes(pile: &Pile, soil: Option<&SoilProfile>, forced_elevations: &[f64], coarseness: f64) -> Vec<f64> {
    let top = pile.top_elevation();
    let bottom = pile.bottom_elevation();

    let mut breakpoints: Vec<f64> = vec![top, bottom];
    for section in pile.sections() {
        breakpoints.push(section.top_elevation);
        breakpoints.push(section.bottom_elevation);
    }
    if let Some(soil) = soil {
        breakpoints.push(soil.top_elevation());
        for layer in soil.layers() {
            breakpoints.push(layer.top);
            breakpoints.push(layer.bottom);
        }
    }
    breakpoints.extend_from_slice(forced_elevations);

    breakpoints.retain(|&x| x <= top && x >= bottom);
    breakpoints.sort_by(|a, b| b.total_cmp(a));
    breakpoints.dedup_by(|lower, upper| (*upper - *lower).abs() < NODE_MERGE_TOLERANCE);

    let mut nodes = vec![breakpoints[0]];
    for pair in breakpoints.windows(2) {
        let (upper, lower) = (pair[0], pair[1]);
        let count = ((upper - lower) / coarseness).ceil().max(1.0) as usize;
        let step = (upper - lower) / count as f64;
        for i in 1..count {
            nodes.push(upper - step * i as f64);
        }
        nodes.push(lower);
    }
    nodes
}

/// Section spanning an elevation, or the nearest one when it falls in a joint
fn owning_section(pile: &Pile, elevation: f64) -> Option<usize> {
    let distance = |s: &PileSection| (s.bottom_elevation - elevation).max(elevation - s.top_elevation).max(0.0);
    pile.sections()
        .iter()
        .enumerate()
        .min_by(|a, b| distance(a.1).total_cmp(&distance(b.1)))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pile::PileMaterial;
    use crate::soil::Layer;

    fn pile() -> Pile {
        Pile::new(
            "P",
            PileMaterial::Steel,
            vec![
                PileSection::circular(5.0, -10.0, 2.0, Some(0.05)),
                PileSection::circular(-10.0, -20.0, 2.0, Some(0.04)),
            ],
        )
        .unwrap()
    }

    fn soil() -> SoilProfile {
        SoilProfile::new(
            "S",
            0.0,
            0.0,
            vec![Layer::new("A", 0.0, -7.3, 18.0), Layer::new("B", -7.3, -30.0, 19.0)],
        )
        .unwrap()
    }

    #[test]
    fn test_node_layout() {
        let mesh = Mesh::build(&pile(), Some(&soil()), &[], 1.0).unwrap();
        let nodes = mesh.nodes();
        assert_eq!(nodes[0], 5.0);
        assert_eq!(*nodes.last().unwrap(), -20.0);
        assert_eq!(nodes.len(), mesh.len() + 1);
        assert_eq!(mesh.midpoints().len(), mesh.len());
        assert!(nodes.windows(2).all(|w| w[0] > w[1]));
        assert!(mesh.elements().iter().all(|e| e.length() <= 1.0 + 1e-9));

        // Mudline, layer and section boundaries are nodes
        for x in [0.0, -7.3, -10.0] {
            assert!(nodes.iter().any(|n| (n - x).abs() < 1e-9), "missing node at {x}");
        }
    }

    #[test]
    fn test_sections_meeting_within_tolerance() {
        let pile = Pile::new(
            "Near",
            PileMaterial::Steel,
            vec![
                PileSection::circular(0.0, -10.0, 2.0, Some(0.05)),
                PileSection::circular(-10.0005, -20.0, 2.0, Some(0.04)),
            ],
        )
        .unwrap();
        let mesh = Mesh::build(&pile, Some(&soil()), &[], 0.5).unwrap();
        assert!(mesh.nodes().iter().all(|n| (n + 10.0005).abs() > 1e-9));
        for e in mesh.elements() {
            assert_eq!(e.section_index, if e.midpoint() > -10.0 { 0 } else { 1 });
        }
        assert!((mesh.toe_element().unwrap().wall_thickness - 0.04).abs() < 1e-12);
    }

    #[test]
    fn test_owning_section_falls_back_to_nearest() {
        let pile = pile();
        assert_eq!(owning_section(&pile, 0.0), Some(0));
        assert_eq!(owning_section(&pile, -10.0), Some(0));
        assert_eq!(owning_section(&pile, -10.2), Some(1));
        assert_eq!(owning_section(&pile, 6.0), Some(0));
        assert_eq!(owning_section(&pile, -20.3), Some(1));
    }

    #[test]
    fn test_forced_elevations() {
        let mesh = Mesh::build(&pile(), None, &[-3.33, 40.0, -3.3300000001], 10.0).unwrap();
        let hits = mesh.nodes().iter().filter(|n| (*n + 3.33).abs() < 1e-6).count();
        assert_eq!(hits, 1);
        assert!(mesh.nodes().iter().all(|&n| n <= 5.0));
    }

    #[test]
    fn test_ownership() {
        let mesh = Mesh::build(&pile(), Some(&soil()), &[], 0.5).unwrap();
        for e in mesh.elements() {
            let mid = e.midpoint();
            assert_eq!(e.section_index, if mid > -10.0 { 0 } else { 1 });
            let expected = if mid > 0.0 {
                None
            } else if mid > -7.3 {
                Some(0)
            } else {
                Some(1)
            };
            assert_eq!(e.layer_index, expected);
        }
        let toe = mesh.toe_element().unwrap();
        assert!(toe.contains(-20.0));
        assert!((toe.wall_thickness - 0.04).abs() < 1e-12);
    }

    #[test]
    fn test_depth_and_stress_columns() {
        let mesh = Mesh::build(&pile(), Some(&soil()), &[], 0.5).unwrap();
        let first = &mesh.elements()[0];
        assert_eq!(first.xg_top, -5.0);
        assert_eq!(first.sigma_v_top, 0.0);

        let last = mesh.toe_element().unwrap();
        assert!((last.xg_bottom - 20.0).abs() < 1e-9);
        let expected = 8.0 * 7.3 + 9.0 * 12.7;
        assert!((last.sigma_v_bottom - expected).abs() < 1e-9);

        let soil_rows = mesh.soil_properties();
        assert_eq!(soil_rows.len(), mesh.len());
        assert_eq!(soil_rows[3].layer_index, mesh.elements()[3].layer_index);
    }

    #[test]
    fn test_without_soil() {
        let mesh = Mesh::build(&pile(), None, &[], 2.0).unwrap();
        assert!(mesh.elements().iter().all(|e| e.layer_index.is_none()));
        assert!(mesh.elements().iter().all(|e| e.sigma_v_top == 0.0 && e.sigma_v_bottom == 0.0));
        assert_eq!(mesh.elements()[0].xg_top, 0.0);

        let structural = mesh.structural_properties();
        assert!(structural.iter().all(|r| r.young_modulus == 210e6));
    }

    #[test]
    fn test_invalid_coarseness() {
        assert!(Mesh::build(&pile(), None, &[], 0.0).is_err());
        assert!(Mesh::build(&pile(), None, &[], -1.0).is_err());
        assert!(Mesh::build(&pile(), None, &[f64::NAN], 1.0).is_err());
    }

    #[test]
    fn test_deterministic() {
        let a = Mesh::build(&pile(), Some(&soil()), &[-1.5], 0.7).unwrap();
        let b = Mesh::build(&pile(), Some(&soil()), &[-1.5], 0.7).unwrap();
        assert_eq!(a, b);
    }
}
