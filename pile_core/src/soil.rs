//! # Soil Stratigraphy
//!
//! A soil profile is a stack of contiguous layers starting at the mudline
//! (`top_elevation`). Each layer carries a total unit weight and optionally a
//! lateral and an axial constitutive model. Vertical effective stress is
//! integrated from the mudline with buoyant unit weights below the water line.
//!
//! ## Example
//!
//! ```rust
//! use pile_core::models::{AxialSoilModel, LateralSoilModel, Loading};
//! use pile_core::models::{ApiSand, ApiSandAxial};
//! use pile_core::soil::{Layer, SoilProfile};
//!
//! let sand = Layer::new("Dense sand", 0.0, -40.0, 18.0)
//!     .with_lateral_model(LateralSoilModel::ApiSand(ApiSand::new(35.0, Loading::Static)))
//!     .with_axial_model(AxialSoilModel::ApiSand(ApiSandAxial::new(35.0)));
//!
//! let profile = SoilProfile::new("Site A", 0.0, 0.0, vec![sand]).unwrap();
//!
//! // Fully submerged: σv' = (18 - 10) × 10 = 80 kPa at 10 m depth
//! assert!((profile.effective_stress_at(-10.0) - 80.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{ELEVATION_TOLERANCE, UNIT_WEIGHT_WATER};
use crate::errors::{PileError, PileResult};
use crate::models::{AxialModel, AxialSoilModel, LateralModel, LateralSoilModel};

/// Unit weight with the water unit weight removed below the water table (kN/m³)
pub fn buoyant_unit_weight(unit_weight: f64, below_water_table: bool) -> f64 {
    if below_water_table {
        unit_weight - UNIT_WEIGHT_WATER
    } else {
        unit_weight
    }
}

// ============================================================================
// Layer
// ============================================================================

/// A horizontal soil layer.
///
/// ## JSON Example
///
/// ```json
/// {
///   "name": "Soft clay",
///   "top": 0.0,
///   "bottom": -8.0,
///   "unit_weight": 17.0,
///   "lateral_model": { "type": "ApiClay", "su_top": 15.0, "su_bottom": 40.0, "eps50": 0.02 },
///   "axial_model": { "type": "ApiClay", "su_top": 15.0, "su_bottom": 40.0 }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    /// Unique identifier
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// Layer name (e.g., "Dense sand")
    pub name: String,

    /// Elevation of the top of the layer (m)
    pub top: f64,

    /// Elevation of the bottom of the layer (m)
    pub bottom: f64,

    /// Total unit weight (kN/m³)
    pub unit_weight: f64,

    /// Display color as `#rrggbb`; derived from `id` when unset
    #[serde(default)]
    pub color: Option<String>,

    /// Lateral constitutive model
    #[serde(default)]
    pub lateral_model: Option<LateralSoilModel>,

    /// Axial constitutive model
    #[serde(default)]
    pub axial_model: Option<AxialSoilModel>,
}

impl Layer {
    /// Create a layer without constitutive models
    pub fn new(name: impl Into<String>, top: f64, bottom: f64, unit_weight: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            top,
            bottom,
            unit_weight,
            color: None,
            lateral_model: None,
            axial_model: None,
        }
    }

    /// Set the lateral model (builder pattern)
    pub fn with_lateral_model(mut self, model: LateralSoilModel) -> Self {
        self.lateral_model = Some(model);
        self
    }

    /// Set the axial model (builder pattern)
    pub fn with_axial_model(mut self, model: AxialSoilModel) -> Self {
        self.axial_model = Some(model);
        self
    }

    /// Set the display color (builder pattern)
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Set a specific ID (for deserialization or testing)
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Validate elevations, unit weight and attached models
    pub fn validate(&self) -> PileResult<()> {
        if !(self.top > self.bottom) {
            return Err(PileError::invalid_input(
                format!("{}.bottom", self.name),
                self.bottom.to_string(),
                format!("Layer bottom must lie below its top ({})", self.top),
            ));
        }
        if !(self.unit_weight > UNIT_WEIGHT_WATER) {
            return Err(PileError::invalid_input(
                format!("{}.unit_weight", self.name),
                self.unit_weight.to_string(),
                "Unit weight must exceed the unit weight of water (10 kN/m³)",
            ));
        }
        if let Some(model) = &self.lateral_model {
            model.as_model().validate()?;
        }
        if let Some(model) = &self.axial_model {
            model.as_model().validate()?;
        }
        Ok(())
    }

    /// Layer thickness (m)
    pub fn thickness(&self) -> f64 {
        self.top - self.bottom
    }

    /// Display color, explicit or derived from the layer id
    pub fn color(&self) -> String {
        match &self.color {
            Some(color) => color.clone(),
            None => {
                let bytes = self.id.as_bytes();
                format!("#{:02x}{:02x}{:02x}", bytes[0], bytes[1], bytes[2])
            }
        }
    }

    /// Unit weight accounting for buoyancy (kN/m³)
    pub fn buoyant_unit_weight(&self, below_water_table: bool) -> f64 {
        buoyant_unit_weight(self.unit_weight, below_water_table)
    }

    /// Whether an elevation lies within the layer (boundaries included)
    pub fn contains(&self, elevation: f64) -> bool {
        elevation <= self.top + ELEVATION_TOLERANCE && elevation >= self.bottom - ELEVATION_TOLERANCE
    }
}

// ============================================================================
// Soil Profile
// ============================================================================

#[derive(Deserialize)]
struct RawSoilProfile {
    name: String,
    top_elevation: f64,
    water_line: f64,
    layers: Vec<Layer>,
}

impl TryFrom<RawSoilProfile> for SoilProfile {
    type Error = PileError;

    fn try_from(raw: RawSoilProfile) -> PileResult<Self> {
        SoilProfile::new(raw.name, raw.top_elevation, raw.water_line, raw.layers)
    }
}

/// A validated, immutable soil profile.
///
/// Layers are sorted top-down, the first layer starts at `top_elevation` and
/// consecutive layers are contiguous.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawSoilProfile")]
pub struct SoilProfile {
    name: String,
    top_elevation: f64,
    water_line: f64,
    layers: Vec<Layer>,
}

impl SoilProfile {
    /// Validate layers, sort them top-down and build the profile.
    pub fn new(name: impl Into<String>, top_elevation: f64, water_line: f64, mut layers: Vec<Layer>) -> PileResult<Self> {
        if layers.is_empty() {
            return Err(PileError::invalid_input("layers", "[]", "A soil profile needs at least one layer"));
        }
        for layer in &layers {
            layer.validate()?;
        }

        layers.sort_by(|a, b| b.top.total_cmp(&a.top));

        if (layers[0].top - top_elevation).abs() > ELEVATION_TOLERANCE {
            return Err(PileError::invalid_input(
                "top_elevation",
                top_elevation.to_string(),
                format!("Topmost layer '{}' starts at {}", layers[0].name, layers[0].top),
            ));
        }

        for pair in layers.windows(2) {
            let (upper, lower) = (&pair[0], &pair[1]);
            if (upper.bottom - lower.top).abs() > ELEVATION_TOLERANCE {
                return Err(PileError::non_contiguous(
                    format!("Soil layers '{}' and '{}'", upper.name, lower.name),
                    upper.bottom,
                    lower.top,
                ));
            }
        }

        // Boundaries within tolerance are snapped so every elevation has a layer
        layers[0].top = top_elevation;
        for i in 1..layers.len() {
            layers[i].top = layers[i - 1].bottom;
        }

        Ok(Self {
            name: name.into(),
            top_elevation,
            water_line,
            layers,
        })
    }

    /// Profile name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mudline elevation (m)
    pub fn top_elevation(&self) -> f64 {
        self.top_elevation
    }

    /// Bottom of the deepest layer (m)
    pub fn bottom_elevation(&self) -> f64 {
        self.layers[self.layers.len() - 1].bottom
    }

    /// Water line elevation (m)
    pub fn water_line(&self) -> f64 {
        self.water_line
    }

    /// Layers, top-down
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Whether an elevation is below the water line
    pub fn is_below_water(&self, elevation: f64) -> bool {
        elevation < self.water_line
    }

    /// Index of the first layer (top-down) containing an elevation
    pub fn layer_index_at(&self, elevation: f64) -> Option<usize> {
        self.layers.iter().position(|l| l.contains(elevation))
    }

    /// Vertical effective stress at an elevation (kPa).
    ///
    /// Zero at and above the mudline; below the deepest layer the stress at
    /// the profile bottom is returned.
    pub fn effective_stress_at(&self, elevation: f64) -> f64 {
        let mut stress = 0.0;
        for layer in &self.layers {
            if elevation >= layer.top {
                break;
            }
            let top = layer.top;
            let bottom = layer.bottom.max(elevation);

            let dry = (top - bottom.max(self.water_line)).max(0.0);
            let wet = (top.min(self.water_line) - bottom).max(0.0);
            stress += layer.buoyant_unit_weight(false) * dry + layer.buoyant_unit_weight(true) * wet;

            if elevation >= layer.bottom {
                break;
            }
        }
        stress
    }
}
