//! Scan engine error types

use contracts::ContractError;
use thiserror::Error;

use crate::sensor::TickPhase;

/// Scan engine specific error
#[derive(Debug, Error)]
pub enum ScanError {
    /// A tick phase was invoked out of order
    #[error("tick phase out of order: expected {expected:?}, got {actual:?}")]
    PhaseOrder {
        expected: TickPhase,
        actual: TickPhase,
    },

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),
}

/// Result alias
pub type Result<T> = std::result::Result<T, ScanError>;
