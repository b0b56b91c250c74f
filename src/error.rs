//! Error types for the disk simulation core.

use thiserror::Error;

/// Result type alias for simulation operations.
pub type SimResult<T> = Result<T, SimError>;

/// Errors raised while building bodies, parameters or scenarios.
///
/// Bodies and parameters are checked before they reach the tree or the
/// collision solver; a tick only fails on parameters that cannot bound the
/// depth of the quadtree.
#[derive(Debug, Error)]
pub enum SimError {
    /// Body radius is zero, negative or not finite.
    #[error("body {id}: radius must be finite and positive, got {radius}")]
    InvalidRadius { id: usize, radius: f64 },

    /// Body position or velocity has a NaN/infinite component.
    #[error("body {id}: {field} must be finite")]
    NonFiniteState { id: usize, field: &'static str },

    /// Invalid simulation parameters.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// Invalid scenario configuration.
    #[error("invalid scenario: {0}")]
    InvalidScenario(String),
}

impl SimError {
    /// Create an invalid params error.
    #[must_use]
    pub fn invalid_params(details: impl Into<String>) -> Self {
        Self::InvalidParams(details.into())
    }

    /// Create an invalid scenario error.
    #[must_use]
    pub fn invalid_scenario(details: impl Into<String>) -> Self {
        Self::InvalidScenario(details.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SimError::InvalidRadius { id: 3, radius: -1.0 };
        let msg = format!("{err}");
        assert!(msg.contains("body 3"));
        assert!(msg.contains("-1"));

        let err = SimError::NonFiniteState { id: 0, field: "velocity" };
        assert!(format!("{err}").contains("velocity"));

        let err = SimError::invalid_params("node_capacity must be at least 1");
        assert!(format!("{err}").contains("node_capacity"));

        let err = SimError::invalid_scenario("no bodies");
        assert!(format!("{err}").contains("no bodies"));
    }
}
