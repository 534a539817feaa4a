//! Contracts implemented by the stream collaborators at the edges of a run.
//!
//! Sources hand the driver *raw* clock fields; the driver owns normalization
//! so the matching cursor only ever sees one timestamp domain. An empty chunk
//! from a [`SampleSource`] signals exhaustion and ends the run normally.

use crate::record::JoinedRecord;
use crate::WeftError;

/// Raw, un-normalized clock fields as read from a stream.
#[derive(Debug, Clone, PartialEq)]
pub enum RawClock {
    /// A calendar date and time-of-day string pair.
    WallClock {
        /// Calendar date text (e.g. `2026-02-17`).
        date: String,
        /// Time-of-day text, optionally with fractional seconds.
        time: String,
    },
    /// A relative offset in seconds from the stream's reference epoch.
    Offset(f64),
}

/// One record as read from a source, before timestamp normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord<T> {
    /// The record's raw clock fields.
    pub clock: RawClock,
    /// The record's opaque payload.
    pub payload: T,
}

impl<T> RawRecord<T> {
    /// Pair raw clock fields with a payload.
    pub const fn new(clock: RawClock, payload: T) -> Self {
        Self { clock, payload }
    }
}

/// A readable, ordered sparse stream of tagged events.
///
/// The whole stream is materialized once per run; its cardinality must fit in
/// memory (tens to low hundreds of thousands of records).
pub trait EventSource {
    /// Opaque per-record attribute set carried into the joined output.
    type Payload: Clone;

    /// Name used in error messages and logs, usually a path.
    fn name(&self) -> &str;

    /// Read the entire stream.
    ///
    /// # Errors
    /// Returns `WeftError::Io` when the underlying stream is unreadable.
    fn load(&mut self) -> Result<Vec<RawRecord<Self::Payload>>, WeftError>;
}

/// A readable, ordered dense stream of measurements, pulled in bounded
/// windows.
pub trait SampleSource {
    /// Opaque per-record attribute set preserved in the joined output.
    type Payload;

    /// Name used in error messages and logs, usually a path.
    fn name(&self) -> &str;

    /// Pull up to `max_records` further records.
    ///
    /// Returning an empty vector signals exhaustion; the driver will not call
    /// again after that.
    ///
    /// # Errors
    /// Returns `WeftError::Io` when the underlying stream is unreadable.
    fn next_chunk(&mut self, max_records: usize)
    -> Result<Vec<RawRecord<Self::Payload>>, WeftError>;
}

/// An append-only writer consuming joined rows in arrival order.
pub trait JoinSink<D, P> {
    /// Append one joined row.
    ///
    /// # Errors
    /// Returns `WeftError::Io` when the row cannot be written.
    fn write(&mut self, record: JoinedRecord<D, P>) -> Result<(), WeftError>;

    /// Flush and release the sink. Called once, after the dense stream is
    /// drained.
    ///
    /// # Errors
    /// Returns `WeftError::Io` when buffered rows cannot be flushed.
    fn close(&mut self) -> Result<(), WeftError>;
}
