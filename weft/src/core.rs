use weft_core::{
    ClockSpec, DenseRecord, EventSource, JoinConfig, JoinSink, JoinSummary, JoinedRecord,
    MatchMode, MatchingEngine, SampleSource, SparseRecord, TimeNormalizer, WeftError,
};

/// Chunked pipeline driver joining a dense stream against a resident sparse
/// stream.
///
/// Lifecycle of a run: load and normalize the full sparse stream (the only
/// point where it is materialized), then pull, normalize, and match dense
/// chunks until the source signals exhaustion with an empty chunk, then flush
/// and release the sink. The matching engine and its cursor live for the
/// whole run; they are never reinitialized between chunks.
#[derive(Debug)]
pub struct Joiner {
    cfg: JoinConfig,
    event_clock: TimeNormalizer,
    sample_clock: TimeNormalizer,
}

/// Builder for constructing a [`Joiner`] with custom configuration.
pub struct JoinerBuilder {
    cfg: JoinConfig,
    clock: ClockSpec,
    event_clock: Option<ClockSpec>,
    sample_clock: Option<ClockSpec>,
}

impl Default for JoinerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl JoinerBuilder {
    /// Create a builder with conservative defaults: 1 ms tolerance, one
    /// million records per chunk, exactly-once matching, UTC wall-clock
    /// timestamps, no quantization.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cfg: JoinConfig::default(),
            clock: ClockSpec::default(),
            event_clock: None,
            sample_clock: None,
        }
    }

    /// Maximum allowed |Δt| in seconds for a match.
    #[must_use]
    pub const fn tolerance(mut self, seconds: f64) -> Self {
        self.cfg.tolerance = seconds;
        self
    }

    /// Dense-stream window length in records.
    ///
    /// Purely a memory/throughput trade-off: the persistent cursor makes the
    /// joined output identical for any chunk size.
    #[must_use]
    pub const fn chunk_size(mut self, records: usize) -> Self {
        self.cfg.chunk_size = records;
        self
    }

    /// Matching policy.
    ///
    /// `ExactlyOnce` is the default. `ManyToOne` drops the consumption check
    /// and is only appropriate when the tagged-event rate is comparable to or
    /// exceeds the measurement rate.
    #[must_use]
    pub const fn mode(mut self, mode: MatchMode) -> Self {
        self.cfg.mode = mode;
        self
    }

    /// Clock spec shared by both streams.
    ///
    /// Per-stream overrides (see [`event_clock`](Self::event_clock) and
    /// [`sample_clock`](Self::sample_clock)) take precedence; keep the
    /// quantization interval common to both sides so quantized timestamps
    /// stay comparable.
    #[must_use]
    pub fn clock(mut self, spec: ClockSpec) -> Self {
        self.clock = spec;
        self
    }

    /// Clock spec override for the sparse event stream.
    #[must_use]
    pub fn event_clock(mut self, spec: ClockSpec) -> Self {
        self.event_clock = Some(spec);
        self
    }

    /// Clock spec override for the dense sample stream.
    #[must_use]
    pub fn sample_clock(mut self, spec: ClockSpec) -> Self {
        self.sample_clock = Some(spec);
        self
    }

    /// Validate the configuration and build the joiner.
    ///
    /// # Errors
    /// Returns `WeftError::InvalidArg` for a non-finite or negative
    /// tolerance, a zero chunk size, or an invalid clock spec.
    pub fn build(self) -> Result<Joiner, WeftError> {
        self.cfg.validate()?;
        let event_clock = TimeNormalizer::new(self.event_clock.unwrap_or_else(|| self.clock.clone()))?;
        let sample_clock = TimeNormalizer::new(self.sample_clock.unwrap_or(self.clock))?;
        Ok(Joiner {
            cfg: self.cfg,
            event_clock,
            sample_clock,
        })
    }
}

impl Joiner {
    /// Start building a joiner.
    #[must_use]
    pub fn builder() -> JoinerBuilder {
        JoinerBuilder::new()
    }

    /// The configuration this joiner runs with.
    #[must_use]
    pub const fn config(&self) -> &JoinConfig {
        &self.cfg
    }

    /// Run the join to completion.
    ///
    /// Loads the full sparse stream from `events` (a documented scale
    /// assumption: its cardinality must fit in memory), then streams `samples`
    /// in windows of at most `chunk_size` records, emitting exactly one
    /// joined row per dense record to `sink`, in dense order. At most one
    /// chunk of dense records is held in memory at a time.
    ///
    /// Both streams are expected to be time-ordered overall; each chunk is
    /// additionally sorted after normalization so sub-interval jitter from
    /// quantization cannot reorder matching within a window.
    ///
    /// # Errors
    /// - `WeftError::MalformedTimestamp` when a clock field of either stream
    ///   cannot be parsed; the message names the stream and approximate
    ///   position. Fatal, no partial-row skipping.
    /// - `WeftError::Io` when a source or the sink fails; no partial-chunk
    ///   retry is attempted, and recovery of partial sink output (e.g.
    ///   truncate and restart) is the caller's concern.
    /// - `WeftError::CursorCorruption` on an internal invariant violation.
    pub fn run<E, S, K>(
        &self,
        events: &mut E,
        samples: &mut S,
        sink: &mut K,
    ) -> Result<JoinSummary, WeftError>
    where
        E: EventSource,
        S: SampleSource,
        K: JoinSink<S::Payload, E::Payload>,
    {
        let mut engine = self.load_events(events)?;

        let mut summary = JoinSummary {
            sparse_total: u64::try_from(engine.len()).unwrap_or(u64::MAX),
            ..JoinSummary::default()
        };

        loop {
            let raw_chunk = samples.next_chunk(self.cfg.chunk_size)?;
            if raw_chunk.is_empty() {
                break;
            }
            summary.chunks += 1;

            let mut chunk: Vec<DenseRecord<S::Payload>> = Vec::with_capacity(raw_chunk.len());
            for raw in raw_chunk {
                let ts = self.sample_clock.resolve(&raw.clock).map_err(|e| {
                    e.located(&format!("{}, chunk {}", samples.name(), summary.chunks))
                })?;
                chunk.push(DenseRecord::new(ts, raw.payload));
            }
            // Stable sort: records with equal timestamps keep arrival order.
            chunk.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

            for dense in chunk {
                let matched = engine
                    .advance_and_match(dense.timestamp, self.cfg.tolerance, self.cfg.mode)?
                    .map(|r| r.payload.clone());
                if matched.is_some() {
                    summary.matched += 1;
                } else {
                    summary.unmatched += 1;
                }
                summary.dense_rows += 1;
                sink.write(JoinedRecord::new(dense, matched))?;
            }

            tracing::debug!(
                chunk = summary.chunks,
                dense_rows = summary.dense_rows,
                matched = summary.matched,
                cursor = engine.cursor().index(),
                "chunk joined"
            );
        }

        sink.close()?;

        summary.sparse_unconsumed = u64::try_from(engine.unconsumed_count()).unwrap_or(u64::MAX);
        tracing::info!(
            dense_rows = summary.dense_rows,
            matched = summary.matched,
            unmatched = summary.unmatched,
            sparse_unconsumed = summary.sparse_unconsumed,
            chunks = summary.chunks,
            "join complete"
        );
        Ok(summary)
    }

    /// Materialize, normalize, and sort the sparse stream.
    fn load_events<E>(&self, events: &mut E) -> Result<MatchingEngine<E::Payload>, WeftError>
    where
        E: EventSource,
    {
        let raw = events.load()?;
        let mut sparse: Vec<SparseRecord<E::Payload>> = Vec::with_capacity(raw.len());
        for (row, record) in raw.into_iter().enumerate() {
            let ts = self
                .event_clock
                .resolve(&record.clock)
                .map_err(|e| e.located(&format!("{}, record {row}", events.name())))?;
            sparse.push(SparseRecord::new(ts, record.payload));
        }
        sparse.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        tracing::info!(
            records = sparse.len(),
            source = events.name(),
            "sparse stream loaded"
        );
        Ok(MatchingEngine::new(sparse))
    }
}
