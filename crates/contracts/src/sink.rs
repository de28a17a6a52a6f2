//! SonarSink trait - publish boundary interface
//!
//! Defines the abstract interface for sinks.

use crate::{ContractError, SonarEmission};

/// Emission output trait
///
/// All sink implementations must implement this trait.
#[trait_variant::make(SonarSink: Send)]
pub trait LocalSonarSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one emission
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write(&mut self, emission: &SonarEmission) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}
