//! Error types for the TSP genetic algorithm.

use thiserror::Error as ThisError;

/// Errors reported by the engine.
///
/// Configuration problems are detected once, before the first generation
/// runs. `InvariantViolation` indicates a defect in an operator and is
/// never expected from a well-formed run.
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum TspGaError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
}

pub type Result<T> = std::result::Result<T, TspGaError>;

impl TspGaError {
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invariant_violation(message: impl Into<String>) -> Self {
        Self::InvariantViolation(message.into())
    }
}
