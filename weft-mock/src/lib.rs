//! Deterministic in-memory collaborators for tests, examples, and CI.
//!
//! Epoch-based constructors pair with [`epoch_clock`], which resolves
//! [`RawClock::Offset`] values against a zero reference epoch, so mock
//! timestamps read as plain epoch seconds.

use weft_core::{
    ClockSpec, EventSource, JoinSink, JoinedRecord, RawClock, RawRecord, SampleSource, WeftError,
};

/// Clock spec for mock streams: offsets measured from epoch zero.
#[must_use]
pub fn epoch_clock() -> ClockSpec {
    ClockSpec {
        reference_epoch: Some(0.0),
        ..ClockSpec::default()
    }
}

/// Sparse source serving a fixed record set.
pub struct MemoryEventSource<P> {
    name: String,
    records: Vec<RawRecord<P>>,
}

impl<P: Clone> MemoryEventSource<P> {
    /// Serve the given raw records.
    #[must_use]
    pub fn new(records: Vec<RawRecord<P>>) -> Self {
        Self {
            name: "memory-events".to_string(),
            records,
        }
    }

    /// Serve records at the given epoch timestamps (see [`epoch_clock`]).
    #[must_use]
    pub fn at_epochs(records: Vec<(f64, P)>) -> Self {
        Self::new(
            records
                .into_iter()
                .map(|(ts, payload)| RawRecord::new(RawClock::Offset(ts), payload))
                .collect(),
        )
    }
}

impl<P: Clone> EventSource for MemoryEventSource<P> {
    type Payload = P;

    fn name(&self) -> &str {
        &self.name
    }

    fn load(&mut self) -> Result<Vec<RawRecord<P>>, WeftError> {
        Ok(self.records.clone())
    }
}

/// Dense source serving a fixed record set in bounded windows.
pub struct MemorySampleSource<P> {
    name: String,
    records: Vec<RawRecord<P>>,
    pos: usize,
}

impl<P: Clone> MemorySampleSource<P> {
    /// Serve the given raw records.
    #[must_use]
    pub fn new(records: Vec<RawRecord<P>>) -> Self {
        Self {
            name: "memory-samples".to_string(),
            records,
            pos: 0,
        }
    }

    /// Serve records at the given epoch timestamps (see [`epoch_clock`]).
    #[must_use]
    pub fn at_epochs(records: Vec<(f64, P)>) -> Self {
        Self::new(
            records
                .into_iter()
                .map(|(ts, payload)| RawRecord::new(RawClock::Offset(ts), payload))
                .collect(),
        )
    }
}

impl<P: Clone> SampleSource for MemorySampleSource<P> {
    type Payload = P;

    fn name(&self) -> &str {
        &self.name
    }

    fn next_chunk(&mut self, max_records: usize) -> Result<Vec<RawRecord<P>>, WeftError> {
        let end = (self.pos + max_records).min(self.records.len());
        let chunk = self.records[self.pos..end].to_vec();
        self.pos = end;
        Ok(chunk)
    }
}

/// Sink collecting joined rows for inspection.
#[derive(Default)]
pub struct MemorySink<D, P> {
    rows: Vec<JoinedRecord<D, P>>,
    closed: bool,
}

impl<D, P> MemorySink<D, P> {
    /// An empty, open sink.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rows: Vec::new(),
            closed: false,
        }
    }

    /// Rows written so far, in arrival order.
    #[must_use]
    pub fn rows(&self) -> &[JoinedRecord<D, P>] {
        &self.rows
    }

    /// Whether `close` has been called.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<D, P> JoinSink<D, P> for MemorySink<D, P> {
    fn write(&mut self, record: JoinedRecord<D, P>) -> Result<(), WeftError> {
        if self.closed {
            return Err(WeftError::io("memory-sink", "write after close"));
        }
        self.rows.push(record);
        Ok(())
    }

    fn close(&mut self) -> Result<(), WeftError> {
        self.closed = true;
        Ok(())
    }
}

/// Dense source that fails with an injected I/O error after serving a number
/// of chunks.
pub struct FailingSampleSource<P> {
    inner: MemorySampleSource<P>,
    fail_after_chunks: usize,
    served: usize,
}

impl<P: Clone> FailingSampleSource<P> {
    /// Fail once `fail_after_chunks` chunks have been served.
    #[must_use]
    pub fn at_epochs(records: Vec<(f64, P)>, fail_after_chunks: usize) -> Self {
        Self {
            inner: MemorySampleSource::at_epochs(records),
            fail_after_chunks,
            served: 0,
        }
    }
}

impl<P: Clone> SampleSource for FailingSampleSource<P> {
    type Payload = P;

    fn name(&self) -> &str {
        "failing-samples"
    }

    fn next_chunk(&mut self, max_records: usize) -> Result<Vec<RawRecord<P>>, WeftError> {
        if self.served >= self.fail_after_chunks {
            return Err(WeftError::io(self.name(), "injected read failure"));
        }
        self.served += 1;
        self.inner.next_chunk(max_records)
    }
}

/// Sink that fails with an injected I/O error after a number of writes.
#[derive(Default)]
pub struct FailingSink {
    fail_after_writes: usize,
    written: usize,
}

impl FailingSink {
    /// Fail once `fail_after_writes` rows have been written.
    #[must_use]
    pub const fn new(fail_after_writes: usize) -> Self {
        Self {
            fail_after_writes,
            written: 0,
        }
    }
}

impl<D, P> JoinSink<D, P> for FailingSink {
    fn write(&mut self, _record: JoinedRecord<D, P>) -> Result<(), WeftError> {
        if self.written >= self.fail_after_writes {
            return Err(WeftError::io("failing-sink", "injected write failure"));
        }
        self.written += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), WeftError> {
        Ok(())
    }
}
