//! Shared constants
//!
//! Units are SI throughout the crate: metres, kN, kPa, kN/m³.

/// Unit weight of water used for buoyancy (kN/m³)
pub const UNIT_WEIGHT_WATER: f64 = 10.0;

/// Tolerance when matching elevations of consecutive sections/layers (m)
pub const ELEVATION_TOLERANCE: f64 = 1e-3;

/// Mesh nodes closer than this are merged (m)
pub const NODE_MERGE_TOLERANCE: f64 = 1e-6;

/// Default number of points per spring curve
pub const DEFAULT_SPRING_POINTS: usize = 15;

/// Default maximum element length for meshing (m)
pub const DEFAULT_COARSENESS: f64 = 0.5;
