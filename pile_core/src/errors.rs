//! # Error Types
//!
//! Structured error types for pile_core. Geometry and stratigraphy problems are
//! reported at construction time, missing references (no soil profile, unknown
//! plugging method) at evaluation time. Numeric excursions of the soil springs
//! are *not* errors; see [`crate::springs::Diagnostic`].
//!
//! ## Example
//!
//! ```rust
//! use pile_core::errors::{PileError, PileResult};
//!
//! fn validate_coarseness(coarseness: f64) -> PileResult<()> {
//!     if coarseness <= 0.0 {
//!         return Err(PileError::invalid_input(
//!             "coarseness",
//!             coarseness.to_string(),
//!             "Maximum element length must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_coarseness(-1.0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for pile_core operations
pub type PileResult<T> = Result<T, PileError>;

/// Structured error type for model construction and evaluation.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum PileError {
    /// An input value is invalid (out of range, inverted elevations, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// Two consecutive pile sections or soil layers do not meet
    #[error("{what} are not contiguous: upper ends at {upper}, lower starts at {lower}")]
    NonContiguous { what: String, upper: f64, lower: f64 },

    /// An axial calculation was requested on a model without soil
    #[error("Soil profile required: '{operation}' cannot be evaluated without a soil profile")]
    MissingSoilProfile { operation: String },

    /// The requested design method is not implemented
    #[error("Unsupported method '{method}', expected one of: {supported}")]
    UnsupportedMethod { method: String, supported: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PileError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        PileError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a NonContiguous error
    pub fn non_contiguous(what: impl Into<String>, upper: f64, lower: f64) -> Self {
        PileError::NonContiguous {
            what: what.into(),
            upper,
            lower,
        }
    }

    /// Create a MissingSoilProfile error
    pub fn missing_soil_profile(operation: impl Into<String>) -> Self {
        PileError::MissingSoilProfile {
            operation: operation.into(),
        }
    }

    /// Create an UnsupportedMethod error
    pub fn unsupported_method(method: impl Into<String>, supported: &[&str]) -> Self {
        PileError::UnsupportedMethod {
            method: method.into(),
            supported: supported.join(", "),
        }
    }

    /// Check if this error comes from inconsistent input geometry
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, PileError::InvalidInput { .. } | PileError::NonContiguous { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            PileError::InvalidInput { .. } => "INVALID_INPUT",
            PileError::NonContiguous { .. } => "NON_CONTIGUOUS",
            PileError::MissingSoilProfile { .. } => "MISSING_SOIL_PROFILE",
            PileError::UnsupportedMethod { .. } => "UNSUPPORTED_METHOD",
            PileError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = PileError::non_contiguous("Pile sections", -10.0, -10.5);
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("NonContiguous"));
        let roundtrip: PileError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(PileError::missing_soil_profile("shaft_resistance").error_code(), "MISSING_SOIL_PROFILE");
        assert_eq!(
            PileError::unsupported_method("API-2000", &["API-87", "ICP-05"]).error_code(),
            "UNSUPPORTED_METHOD"
        );
    }

    #[test]
    fn test_unsupported_method_message() {
        let error = PileError::unsupported_method("Fleming", &["API-87", "ICP-05"]);
        assert_eq!(
            error.to_string(),
            "Unsupported method 'Fleming', expected one of: API-87, ICP-05"
        );
        assert!(!error.is_configuration_error());
    }
}
