//! Weft drives the temporal alignment of two independently sampled,
//! monotonically time-ordered streams.
//!
//! Overview
//! - A sparse "tagged-event" stream (packet captures, log marks; up to a few
//!   hundred thousand records) is loaded into memory once.
//! - A dense "measurement" stream (sensor samples; effectively unbounded) is
//!   pulled in bounded chunks and never fully materialized.
//! - Each dense record is annotated with the nearest eligible tagged event
//!   within a tolerance; in the default exactly-once mode each event
//!   annotates at most one measurement.
//! - Output cardinality and order always equal the dense stream's: one joined
//!   row per measurement, matched or not.
//!
//! Key behaviors and trade-offs
//! - The matching cursor persists across chunk boundaries, which is what
//!   makes exactly-once matching correct globally rather than only within a
//!   chunk; results are bit-identical for any chunk size.
//! - The pipeline is single-threaded and synchronous: every match mutates
//!   shared consumption state, so matches must be applied in order. Parallel
//!   runs over disjoint stream partitions are possible, but that is a caller
//!   concern.
//! - Timestamp parsing failures are fatal; skipping a row would silently
//!   desynchronize the cursor from the stream.
//!
//! Example
//! ```rust,ignore
//! use weft::Joiner;
//! use weft_core::ClockSpec;
//!
//! let joiner = Joiner::builder()
//!     .tolerance(0.0006)
//!     .chunk_size(5_000_000)
//!     .clock(ClockSpec::default())
//!     .build()?;
//! let summary = joiner.run(&mut events, &mut samples, &mut sink)?;
//! println!("{summary}");
//! ```
//!
//! See `weft/examples/` for runnable demonstrations against the in-memory
//! collaborators from `weft-mock`.
#![warn(missing_docs)]

pub(crate) mod core;

pub use core::{Joiner, JoinerBuilder};

// Re-export core types for convenience
pub use weft_core::{
    ClockSpec,
    Cursor,
    DenseRecord,
    EventSource,
    JoinConfig,
    JoinSink,
    JoinSummary,
    JoinedRecord,
    MatchMode,
    MatchingEngine,
    RawClock,
    RawRecord,
    SampleSource,
    SparseRecord,
    TimeNormalizer,
    TimePoint,
    WeftError,
};
