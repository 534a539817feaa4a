use serde::{Deserialize, Serialize};

use crate::matching::MatchMode;
use crate::WeftError;

/// Configuration for a join run.
///
/// All knobs are explicit; nothing is inferred from the data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinConfig {
    /// Maximum allowed |Δt| in seconds for a sparse record to count as a
    /// match.
    pub tolerance: f64,
    /// Dense-stream window length, in records. A memory/throughput trade-off
    /// only: results are identical for any chunk size.
    pub chunk_size: usize,
    /// Matching policy.
    pub mode: MatchMode,
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.001,
            chunk_size: 1_000_000,
            mode: MatchMode::default(),
        }
    }
}

impl JoinConfig {
    /// Check the configuration for values the pipeline cannot run with.
    ///
    /// # Errors
    /// Returns `WeftError::InvalidArg` for a negative or non-finite tolerance
    /// or a zero chunk size.
    pub fn validate(&self) -> Result<(), WeftError> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(WeftError::invalid(format!(
                "tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        if self.chunk_size == 0 {
            return Err(WeftError::invalid("chunk size must be at least 1"));
        }
        Ok(())
    }
}
