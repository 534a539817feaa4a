use thiserror::Error;

/// Unified error type for the weft workspace.
///
/// Every fatal condition a run can hit is represented here. Absence of a
/// match is never an error; it is the `None` arm of the matching engine's
/// result. All variants abort the run and bubble to the driver's caller
/// unrecovered; there is no partial-chunk retry.
#[derive(Debug, Error)]
pub enum WeftError {
    /// A timestamp field could not be parsed against the configured format.
    ///
    /// Fatal for the run: silently dropping timestamp fields would
    /// desynchronize the cursor from the stream.
    #[error("malformed timestamp {value:?}: {reason}")]
    MalformedTimestamp {
        /// The raw input text that failed to parse.
        value: String,
        /// Why it failed, including stream and approximate position when the
        /// driver has attached them.
        reason: String,
    },

    /// A source was unreadable or the sink unwritable.
    #[error("{source_name}: i/o failure: {message}")]
    Io {
        /// Name of the source or sink that failed (usually a path).
        source_name: String,
        /// Human-readable failure message.
        message: String,
    },

    /// The matching cursor points outside the sparse arena.
    ///
    /// This is a programming invariant violation, not a data problem.
    #[error("cursor index {index} out of bounds for {len} sparse records")]
    CursorCorruption {
        /// Offending cursor index.
        index: usize,
        /// Length of the sparse arena.
        len: usize,
    },

    /// Invalid configuration or input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),
}

impl WeftError {
    /// Helper: build a `MalformedTimestamp` error.
    pub fn malformed(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedTimestamp {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Helper: build an `Io` error from any displayable cause.
    pub fn io(source_name: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::Io {
            source_name: source_name.into(),
            message: cause.to_string(),
        }
    }

    /// Helper: build an `InvalidArg` error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArg(msg.into())
    }

    /// Attach a stream/position note to a `MalformedTimestamp`; other
    /// variants pass through unchanged.
    ///
    /// The driver uses this to point at the offending source and the
    /// approximate record or chunk where parsing failed.
    #[must_use]
    pub fn located(mut self, location: &str) -> Self {
        if let Self::MalformedTimestamp { reason, .. } = &mut self {
            reason.push_str(" (");
            reason.push_str(location);
            reason.push(')');
        }
        self
    }
}
