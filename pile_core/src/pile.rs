//! # Pile Geometry
//!
//! A pile is an ordered stack of sections, sorted from the pile head down to
//! the toe. Each section is a circular or square prism, hollow when a wall
//! thickness smaller than half its width is given.
//!
//! ## Example
//!
//! ```rust
//! use pile_core::pile::{Pile, PileMaterial};
//!
//! // 40 m steel monopile, 7.5 m diameter, 70 mm wall, head at mudline
//! let pile = Pile::tubular("MP01", 0.0, 40.0, 7.5, 0.07, PileMaterial::Steel).unwrap();
//!
//! assert_eq!(pile.bottom_elevation(), -40.0);
//! assert!(pile.tip_footprint() > pile.tip_area());
//! ```

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::constants::ELEVATION_TOLERANCE;
use crate::errors::{PileError, PileResult};

// ============================================================================
// Material
// ============================================================================

/// Pile material
///
/// Only the unit weight and Young's modulus are needed by the engines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type")]
pub enum PileMaterial {
    /// Structural steel (78 kN/m³, 210 GPa)
    #[default]
    Steel,
    /// Reinforced concrete (24 kN/m³, 30 GPa)
    Concrete,
    /// User-defined material
    Custom {
        /// Unit weight (kN/m³)
        unit_weight: f64,
        /// Young's modulus (kPa)
        young_modulus: f64,
    },
}

impl PileMaterial {
    /// Unit weight in kN/m³
    pub fn unit_weight(&self) -> f64 {
        match self {
            PileMaterial::Steel => 78.0,
            PileMaterial::Concrete => 24.0,
            PileMaterial::Custom { unit_weight, .. } => *unit_weight,
        }
    }

    /// Young's modulus in kPa
    pub fn young_modulus(&self) -> f64 {
        match self {
            PileMaterial::Steel => 210.0e6,
            PileMaterial::Concrete => 30.0e6,
            PileMaterial::Custom { young_modulus, .. } => *young_modulus,
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            PileMaterial::Steel => "Steel",
            PileMaterial::Concrete => "Concrete",
            PileMaterial::Custom { .. } => "Custom",
        }
    }

    fn validate(&self) -> PileResult<()> {
        if self.unit_weight() <= 0.0 {
            return Err(PileError::invalid_input(
                "material.unit_weight",
                self.unit_weight().to_string(),
                "Unit weight must be positive",
            ));
        }
        if self.young_modulus() <= 0.0 {
            return Err(PileError::invalid_input(
                "material.young_modulus",
                self.young_modulus().to_string(),
                "Young's modulus must be positive",
            ));
        }
        Ok(())
    }
}

impl std::fmt::Display for PileMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Section
// ============================================================================

/// Cross-section shape of a pile section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SectionShape {
    /// Circular (width is the outer diameter)
    #[default]
    Circular,
    /// Square (width is the outer side length)
    Rectangular,
}

/// A prismatic portion of the pile between two elevations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PileSection {
    /// Elevation of the top of the section (m)
    pub top_elevation: f64,

    /// Elevation of the bottom of the section (m)
    pub bottom_elevation: f64,

    /// Cross-section shape
    #[serde(default)]
    pub shape: SectionShape,

    /// Outer diameter or side length (m)
    pub width: f64,

    /// Wall thickness (m); `None` for a solid section
    pub wall_thickness: Option<f64>,
}

impl PileSection {
    /// Create a circular section (tubular when `wall_thickness` is given)
    pub fn circular(top_elevation: f64, bottom_elevation: f64, diameter: f64, wall_thickness: Option<f64>) -> Self {
        Self {
            top_elevation,
            bottom_elevation,
            shape: SectionShape::Circular,
            width: diameter,
            wall_thickness,
        }
    }

    /// Create a square section (box when `wall_thickness` is given)
    pub fn rectangular(top_elevation: f64, bottom_elevation: f64, width: f64, wall_thickness: Option<f64>) -> Self {
        Self {
            top_elevation,
            bottom_elevation,
            shape: SectionShape::Rectangular,
            width,
            wall_thickness,
        }
    }

    /// Validate geometry
    pub fn validate(&self) -> PileResult<()> {
        if !(self.bottom_elevation < self.top_elevation) {
            return Err(PileError::invalid_input(
                "bottom_elevation",
                self.bottom_elevation.to_string(),
                format!("Section bottom must lie below its top ({})", self.top_elevation),
            ));
        }
        if !(self.width > 0.0) {
            return Err(PileError::invalid_input(
                "width",
                self.width.to_string(),
                "Section width must be positive",
            ));
        }
        if let Some(t) = self.wall_thickness {
            if !(t > 0.0) {
                return Err(PileError::invalid_input(
                    "wall_thickness",
                    t.to_string(),
                    "Wall thickness must be positive (omit it for a solid section)",
                ));
            }
        }
        Ok(())
    }

    /// Length of the section (m)
    pub fn length(&self) -> f64 {
        self.top_elevation - self.bottom_elevation
    }

    /// True when the section has no void
    pub fn is_solid(&self) -> bool {
        self.wall_thickness.map_or(true, |t| t >= self.width / 2.0)
    }

    /// Effective wall thickness (half the width for solid sections)
    pub fn thickness(&self) -> f64 {
        if self.is_solid() {
            self.width / 2.0
        } else {
            self.wall_thickness.unwrap_or(self.width / 2.0)
        }
    }

    /// Width of the void (m); zero for solid sections
    pub fn inner_width(&self) -> f64 {
        (self.width - 2.0 * self.thickness()).max(0.0)
    }

    fn enclosed_area(&self, width: f64) -> f64 {
        match self.shape {
            SectionShape::Circular => PI * width.powi(2) / 4.0,
            SectionShape::Rectangular => width.powi(2),
        }
    }

    /// Gross area enclosed by the outer boundary (m²)
    pub fn footprint(&self) -> f64 {
        self.enclosed_area(self.width)
    }

    /// Material cross-sectional area (m²)
    pub fn area(&self) -> f64 {
        self.footprint() - self.inner_area()
    }

    /// Area of the void, i.e. the soil plug cross-section (m²)
    pub fn inner_area(&self) -> f64 {
        self.enclosed_area(self.inner_width())
    }

    /// Second moment of area about a diametral axis (m⁴)
    pub fn second_moment_of_area(&self) -> f64 {
        let d4 = self.width.powi(4) - self.inner_width().powi(4);
        match self.shape {
            SectionShape::Circular => PI * d4 / 64.0,
            SectionShape::Rectangular => d4 / 12.0,
        }
    }

    /// Outer perimeter (m)
    pub fn outer_perimeter(&self) -> f64 {
        match self.shape {
            SectionShape::Circular => PI * self.width,
            SectionShape::Rectangular => 4.0 * self.width,
        }
    }

    /// Inner perimeter (m); zero for solid sections
    pub fn inner_perimeter(&self) -> f64 {
        match self.shape {
            SectionShape::Circular => PI * self.inner_width(),
            SectionShape::Rectangular => 4.0 * self.inner_width(),
        }
    }

    /// Material volume (m³)
    pub fn volume(&self) -> f64 {
        self.area() * self.length()
    }

    /// Whether an elevation lies within the section (boundaries included)
    pub fn contains(&self, elevation: f64) -> bool {
        elevation <= self.top_elevation + ELEVATION_TOLERANCE
            && elevation >= self.bottom_elevation - ELEVATION_TOLERANCE
    }
}

// ============================================================================
// Pile
// ============================================================================

/// One row of the pile geometry table, see [`Pile::data`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PileDataRow {
    /// Elevation (m)
    pub elevation: f64,
    /// Outer width (m)
    pub width: f64,
    /// Effective wall thickness (m)
    pub wall_thickness: f64,
    /// Material area (m²)
    pub area: f64,
    /// Second moment of area (m⁴)
    pub second_moment_of_area: f64,
}

#[derive(Deserialize)]
struct RawPile {
    name: String,
    #[serde(default)]
    material: PileMaterial,
    sections: Vec<PileSection>,
}

impl TryFrom<RawPile> for Pile {
    type Error = PileError;

    fn try_from(raw: RawPile) -> PileResult<Self> {
        Pile::new(raw.name, raw.material, raw.sections)
    }
}

/// A validated, immutable pile.
///
/// Sections are sorted by descending top elevation and are contiguous.
///
/// ## JSON Example
///
/// ```json
/// {
///   "name": "MP01",
///   "material": { "type": "Steel" },
///   "sections": [
///     { "top_elevation": 0.0, "bottom_elevation": -10.0, "width": 7.5, "wall_thickness": 0.08 },
///     { "top_elevation": -10.0, "bottom_elevation": -40.0, "width": 7.5, "wall_thickness": 0.07 }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPile")]
pub struct Pile {
    name: String,
    material: PileMaterial,
    sections: Vec<PileSection>,
}

impl Pile {
    /// Validate sections, sort them head-to-toe and build the pile.
    ///
    /// Fails if any section is invalid or if consecutive sections do not
    /// meet within [`ELEVATION_TOLERANCE`]. Joints that meet within the
    /// tolerance are moved onto the upper section's bottom.
    pub fn new(name: impl Into<String>, material: PileMaterial, mut sections: Vec<PileSection>) -> PileResult<Self> {
        material.validate()?;
        if sections.is_empty() {
            return Err(PileError::invalid_input("sections", "[]", "A pile needs at least one section"));
        }
        for section in &sections {
            section.validate()?;
        }

        sections.sort_by(|a, b| b.top_elevation.total_cmp(&a.top_elevation));

        for pair in sections.windows(2) {
            let (upper, lower) = (&pair[0], &pair[1]);
            if (upper.bottom_elevation - lower.top_elevation).abs() > ELEVATION_TOLERANCE {
                return Err(PileError::non_contiguous(
                    "Pile sections",
                    upper.bottom_elevation,
                    lower.top_elevation,
                ));
            }
        }

        // Joints within tolerance are snapped to the upper section's bottom
        for i in 1..sections.len() {
            sections[i].top_elevation = sections[i - 1].bottom_elevation;
        }

        Ok(Self {
            name: name.into(),
            material,
            sections,
        })
    }

    /// Single-section circular tubular pile
    pub fn tubular(
        name: impl Into<String>,
        top_elevation: f64,
        length: f64,
        diameter: f64,
        wall_thickness: f64,
        material: PileMaterial,
    ) -> PileResult<Self> {
        let section = PileSection::circular(top_elevation, top_elevation - length, diameter, Some(wall_thickness));
        Self::new(name, material, vec![section])
    }

    /// Pile name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pile material
    pub fn material(&self) -> PileMaterial {
        self.material
    }

    /// Sections, head to toe
    pub fn sections(&self) -> &[PileSection] {
        &self.sections
    }

    fn head(&self) -> &PileSection {
        // Non-empty by construction
        &self.sections[0]
    }

    fn toe(&self) -> &PileSection {
        &self.sections[self.sections.len() - 1]
    }

    /// Elevation of the pile head (m)
    pub fn top_elevation(&self) -> f64 {
        self.head().top_elevation
    }

    /// Elevation of the pile toe (m)
    pub fn bottom_elevation(&self) -> f64 {
        self.toe().bottom_elevation
    }

    /// Total length (m)
    pub fn length(&self) -> f64 {
        self.top_elevation() - self.bottom_elevation()
    }

    /// Material area at the toe (m²)
    pub fn tip_area(&self) -> f64 {
        self.toe().area()
    }

    /// Gross area at the toe (m²)
    pub fn tip_footprint(&self) -> f64 {
        self.toe().footprint()
    }

    /// Outer width at the toe (m)
    pub fn tip_width(&self) -> f64 {
        self.toe().width
    }

    /// Total material volume (m³)
    pub fn volume(&self) -> f64 {
        self.sections.iter().map(PileSection::volume).sum()
    }

    /// Dry weight of the pile (kN)
    pub fn weight(&self) -> f64 {
        self.volume() * self.material.unit_weight()
    }

    /// Index of the first section (from the head) containing an elevation
    pub fn section_index_at(&self, elevation: f64) -> Option<usize> {
        self.sections.iter().position(|s| s.contains(elevation))
    }

    /// Section containing an elevation
    pub fn section_at(&self, elevation: f64) -> Option<&PileSection> {
        self.section_index_at(elevation).map(|i| &self.sections[i])
    }

    /// Geometry table: two rows (top, bottom) per section, head to toe
    pub fn data(&self) -> Vec<PileDataRow> {
        self.sections
            .iter()
            .flat_map(|s| {
                let row = |elevation| PileDataRow {
                    elevation,
                    width: s.width,
                    wall_thickness: s.thickness(),
                    area: s.area(),
                    second_moment_of_area: s.second_moment_of_area(),
                };
                [row(s.top_elevation), row(s.bottom_elevation)]
            })
            .collect()
    }
}
