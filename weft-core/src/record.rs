//! The record data model shared by the matching engine, the driver, and the
//! source/sink collaborators.

/// A monotonic numeric timestamp in epoch seconds.
///
/// Floating precision is retained to at least microsecond resolution. Within
/// a single stream, values are non-decreasing in traversal order; the driver
/// sorts each stream (and each dense chunk) before handing records to the
/// matching engine.
pub type TimePoint = f64;

/// One record of the sparse, tagged-event stream.
///
/// Created once when the sparse stream is loaded and resident for the whole
/// run. The `consumed` flag flips irreversibly from `false` to `true` the
/// first time the record is matched; the flag is private so that only the
/// matching engine can flip it.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseRecord<P> {
    /// Normalized timestamp of the tagged event.
    pub timestamp: TimePoint,
    /// Opaque attribute set carried into the joined output on a match.
    pub payload: P,
    pub(crate) consumed: bool,
}

impl<P> SparseRecord<P> {
    /// Create an unconsumed record.
    pub const fn new(timestamp: TimePoint, payload: P) -> Self {
        Self {
            timestamp,
            payload,
            consumed: false,
        }
    }

    /// Whether this record has already annotated a dense record.
    #[must_use]
    pub const fn is_consumed(&self) -> bool {
        self.consumed
    }
}

/// One record of the dense, measurement stream.
///
/// Streamed in bounded chunks; never held beyond the chunk that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseRecord<D> {
    /// Normalized timestamp of the measurement.
    pub timestamp: TimePoint,
    /// Opaque attribute set (e.g. the measured value plus its raw fields).
    pub payload: D,
}

impl<D> DenseRecord<D> {
    /// Create a dense record.
    pub const fn new(timestamp: TimePoint, payload: D) -> Self {
        Self { timestamp, payload }
    }
}

/// One joined output row: a dense record plus the payload of the sparse
/// record matched to it, if any.
///
/// Exactly one `JoinedRecord` is emitted per dense record, in dense-stream
/// order, regardless of match success.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRecord<D, P> {
    /// The dense record driving this output row.
    pub dense: DenseRecord<D>,
    /// Payload of the matched sparse record, or `None` when no eligible
    /// record was within tolerance at match time.
    pub matched: Option<P>,
}

impl<D, P> JoinedRecord<D, P> {
    /// Pair a dense record with an optional matched payload.
    pub const fn new(dense: DenseRecord<D>, matched: Option<P>) -> Self {
        Self { dense, matched }
    }
}
