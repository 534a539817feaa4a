use core::fmt;

use serde::{Deserialize, Serialize};

/// Informational summary of a completed join run.
///
/// Produced by the driver on success; never used for control flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinSummary {
    /// Dense records processed (equals joined rows emitted).
    pub dense_rows: u64,
    /// Joined rows carrying a matched payload.
    pub matched: u64,
    /// Joined rows with no match within tolerance.
    pub unmatched: u64,
    /// Sparse records loaded at the start of the run.
    pub sparse_total: u64,
    /// Sparse records never used for a match.
    pub sparse_unconsumed: u64,
    /// Dense chunks pulled before exhaustion.
    pub chunks: u64,
}

impl fmt::Display for JoinSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "joined {} dense rows in {} chunks: {} matched, {} unmatched, {}/{} sparse records unconsumed",
            self.dense_rows,
            self.chunks,
            self.matched,
            self.unmatched,
            self.sparse_unconsumed,
            self.sparse_total
        )
    }
}
