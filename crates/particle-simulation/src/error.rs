//! Errors surfaced to the host

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("invalid {parameter}: {reason}")]
    InvalidConfiguration {
        parameter: &'static str,
        reason: String,
    },

    /// A frame panicked while holding the shared simulation
    #[error("simulation lock poisoned by a panicked frame")]
    LockPoisoned,
}

impl SimulationError {
    pub(crate) fn invalid(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            parameter,
            reason: reason.into(),
        }
    }
}
