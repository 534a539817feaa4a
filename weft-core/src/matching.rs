use serde::{Deserialize, Serialize};

use crate::record::{SparseRecord, TimePoint};
use crate::WeftError;

/// Policy deciding how often a sparse record may annotate dense records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum MatchMode {
    /// Each sparse record may be consumed by at most one dense record.
    #[default]
    ExactlyOnce,
    /// A sparse record may annotate any number of dense records. Intended for
    /// sparse streams whose rate is comparable to or exceeds the dense
    /// stream's.
    ManyToOne,
}

/// Position of the matching engine within the sparse arena.
///
/// The cursor names the current candidate index; the next candidate is always
/// the following index. It is owned by the engine, carried across chunk
/// boundaries by the driver, and never retreats or resets mid-join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    index: usize,
}

impl Cursor {
    /// A cursor positioned at the given arena index.
    #[must_use]
    pub const fn at(index: usize) -> Self {
        Self { index }
    }

    /// Arena index of the current candidate.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }
}

/// Nearest-timestamp matcher over an in-memory sparse arena.
///
/// The engine exclusively owns both the arena and the cursor for the duration
/// of a run; the driver is its sole caller. Matching walks the cursor forward
/// with a two-pointer scan that relies on both streams being monotonic,
/// giving amortized O(1) work per dense record and O(n + m) across a run.
#[derive(Debug)]
pub struct MatchingEngine<P> {
    records: Vec<SparseRecord<P>>,
    cursor: Cursor,
    consumed: usize,
}

impl<P> MatchingEngine<P> {
    /// Build an engine over records already sorted by timestamp.
    ///
    /// The engine does not re-sort; feeding it an unsorted arena voids the
    /// nearest-match guarantee.
    #[must_use]
    pub const fn new(records: Vec<SparseRecord<P>>) -> Self {
        Self {
            records,
            cursor: Cursor::at(0),
            consumed: 0,
        }
    }

    /// Build an engine resuming from a previously obtained cursor, for
    /// continuing a join across disjoint partitions of the dense stream.
    #[must_use]
    pub const fn with_cursor(records: Vec<SparseRecord<P>>, cursor: Cursor) -> Self {
        Self {
            records,
            cursor,
            consumed: 0,
        }
    }

    /// Advance the cursor toward the dense timestamp and return the matching
    /// sparse record, if any.
    ///
    /// The cursor advances while the next record is strictly closer to
    /// `dense_ts` than the current one; on an exact tie the record already
    /// under the cursor wins, which keeps the walk deterministic and favors
    /// earlier sparse records. The post-advance candidate matches when it is
    /// within `tolerance` and, in [`MatchMode::ExactlyOnce`], not yet
    /// consumed. `None` is the expected no-match outcome, not an error.
    ///
    /// # Errors
    /// Returns `WeftError::CursorCorruption` if the cursor points outside a
    /// non-empty arena. That can only happen through a defective resume; the
    /// engine itself never moves the cursor out of bounds.
    pub fn advance_and_match(
        &mut self,
        dense_ts: TimePoint,
        tolerance: f64,
        mode: MatchMode,
    ) -> Result<Option<&SparseRecord<P>>, WeftError> {
        if self.records.is_empty() {
            return Ok(None);
        }
        if self.cursor.index >= self.records.len() {
            return Err(WeftError::CursorCorruption {
                index: self.cursor.index,
                len: self.records.len(),
            });
        }

        let mut i = self.cursor.index;
        while i + 1 < self.records.len() {
            let current_delta = (dense_ts - self.records[i].timestamp).abs();
            let next_delta = (dense_ts - self.records[i + 1].timestamp).abs();
            if next_delta < current_delta {
                i += 1;
            } else {
                break;
            }
        }
        self.cursor = Cursor::at(i);

        let candidate = &mut self.records[i];
        if (dense_ts - candidate.timestamp).abs() > tolerance {
            return Ok(None);
        }
        match mode {
            MatchMode::ExactlyOnce => {
                if candidate.consumed {
                    return Ok(None);
                }
                candidate.consumed = true;
                self.consumed += 1;
            }
            MatchMode::ManyToOne => {
                // Flag first use so the summary still reports never-used records.
                if !candidate.consumed {
                    candidate.consumed = true;
                    self.consumed += 1;
                }
            }
        }
        Ok(Some(&self.records[i]))
    }

    /// Number of records in the sparse arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the sparse arena is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records consumed so far.
    #[must_use]
    pub const fn consumed_count(&self) -> usize {
        self.consumed
    }

    /// Number of records never yet used for a match.
    #[must_use]
    pub fn unconsumed_count(&self) -> usize {
        self.records.len() - self.consumed
    }

    /// Current cursor position.
    #[must_use]
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Read-only view of the arena, for verification and reporting.
    #[must_use]
    pub fn records(&self) -> &[SparseRecord<P>] {
        &self.records
    }
}
