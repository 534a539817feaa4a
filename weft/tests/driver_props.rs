use proptest::prelude::*;
use weft::{JoinSummary, JoinedRecord, Joiner, MatchMode};
use weft_mock::{epoch_clock, MemoryEventSource, MemorySampleSource, MemorySink};

fn arb_sorted_epochs(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(0i64..500_000i64, 0..max_len).prop_map(|mut v| {
        v.sort_unstable();
        v.into_iter().map(|t| t as f64 / 1000.0).collect()
    })
}

fn run(
    sparse: &[f64],
    dense: &[f64],
    tolerance: f64,
    chunk_size: usize,
    mode: MatchMode,
) -> (Vec<JoinedRecord<usize, usize>>, JoinSummary) {
    let joiner = Joiner::builder()
        .tolerance(tolerance)
        .chunk_size(chunk_size)
        .mode(mode)
        .clock(epoch_clock())
        .build()
        .unwrap();
    let mut events =
        MemoryEventSource::at_epochs(sparse.iter().copied().enumerate().map(|(i, t)| (t, i)).collect());
    let mut samples =
        MemorySampleSource::at_epochs(dense.iter().copied().enumerate().map(|(i, t)| (t, i)).collect());
    let mut sink = MemorySink::new();
    let summary = joiner.run(&mut events, &mut samples, &mut sink).unwrap();
    (sink.rows().to_vec(), summary)
}

proptest! {
    // The persistent cursor must make chunking invisible: any window length
    // produces bit-identical output.
    #[test]
    fn chunk_size_never_changes_the_output(
        sparse in arb_sorted_epochs(40),
        dense in arb_sorted_epochs(120),
        tol_ms in 0i64..2_000i64,
        small_chunk in 1usize..7usize,
    ) {
        let tolerance = tol_ms as f64 / 1000.0;
        let (rows_small, summary_small) = run(&sparse, &dense, tolerance, small_chunk, MatchMode::ExactlyOnce);
        let (rows_big, summary_big) = run(&sparse, &dense, tolerance, 1_000_000, MatchMode::ExactlyOnce);
        prop_assert_eq!(rows_small, rows_big);
        prop_assert_eq!(summary_small.matched, summary_big.matched);
        prop_assert_eq!(summary_small.unmatched, summary_big.unmatched);
        prop_assert_eq!(summary_small.sparse_unconsumed, summary_big.sparse_unconsumed);
    }

    #[test]
    fn summary_counts_are_consistent(
        sparse in arb_sorted_epochs(40),
        dense in arb_sorted_epochs(120),
        tol_ms in 0i64..2_000i64,
        many in any::<bool>(),
    ) {
        let tolerance = tol_ms as f64 / 1000.0;
        let mode = if many { MatchMode::ManyToOne } else { MatchMode::ExactlyOnce };
        let (rows, summary) = run(&sparse, &dense, tolerance, 16, mode);
        prop_assert_eq!(rows.len() as u64, summary.dense_rows);
        prop_assert_eq!(summary.dense_rows, summary.matched + summary.unmatched);
        prop_assert_eq!(summary.sparse_total, sparse.len() as u64);
        let matched_rows = rows.iter().filter(|r| r.matched.is_some()).count() as u64;
        prop_assert_eq!(matched_rows, summary.matched);
        // Consumption never exceeds emitted matches, in either mode.
        prop_assert!(summary.sparse_total - summary.sparse_unconsumed <= summary.matched);
    }

    #[test]
    fn every_match_is_within_tolerance(
        sparse in arb_sorted_epochs(40),
        dense in arb_sorted_epochs(120),
        tol_ms in 0i64..2_000i64,
    ) {
        let tolerance = tol_ms as f64 / 1000.0;
        let (rows, _) = run(&sparse, &dense, tolerance, 32, MatchMode::ExactlyOnce);
        for row in &rows {
            if let Some(event_idx) = row.matched {
                prop_assert!((row.dense.timestamp - sparse[event_idx]).abs() <= tolerance);
            }
        }
    }

    #[test]
    fn exactly_once_holds_across_chunk_boundaries(
        sparse in arb_sorted_epochs(40),
        dense in arb_sorted_epochs(120),
        tol_ms in 0i64..2_000i64,
        chunk in 1usize..9usize,
    ) {
        let tolerance = tol_ms as f64 / 1000.0;
        let (rows, _) = run(&sparse, &dense, tolerance, chunk, MatchMode::ExactlyOnce);
        let mut seen: Vec<usize> = rows.iter().filter_map(|r| r.matched).collect();
        let before = seen.len();
        seen.sort_unstable();
        seen.dedup();
        prop_assert_eq!(seen.len(), before);
    }
}
