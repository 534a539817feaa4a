use weft_core::{Cursor, MatchMode, MatchingEngine, SparseRecord, WeftError};

fn arena(records: &[(f64, &'static str)]) -> Vec<SparseRecord<&'static str>> {
    records
        .iter()
        .map(|&(ts, p)| SparseRecord::new(ts, p))
        .collect()
}

#[test]
fn nearest_record_within_tolerance_matches() {
    let mut engine = MatchingEngine::new(arena(&[(10.0, "A"), (10.5, "B"), (20.0, "C")]));
    let m = engine
        .advance_and_match(9.9, 0.3, MatchMode::ExactlyOnce)
        .unwrap();
    assert_eq!(m.map(|r| r.payload), Some("A"));
}

#[test]
fn consumed_records_are_skipped_not_rematched() {
    // The worked scenario: A is taken at 9.9; at 10.2 the cursor stays on A
    // (B is no strict improvement) and A is already consumed; B is taken at
    // 10.6; 15.0 is out of tolerance from everything.
    let mut engine = MatchingEngine::new(arena(&[(10.0, "A"), (10.5, "B"), (20.0, "C")]));
    let outcomes: Vec<Option<&str>> = [9.9, 10.2, 10.6, 15.0]
        .iter()
        .map(|&ts| {
            engine
                .advance_and_match(ts, 0.3, MatchMode::ExactlyOnce)
                .unwrap()
                .map(|r| r.payload)
        })
        .collect();
    assert_eq!(outcomes, vec![Some("A"), None, Some("B"), None]);
    assert_eq!(engine.consumed_count(), 2);
    assert_eq!(engine.unconsumed_count(), 1);
}

#[test]
fn equidistant_tie_keeps_the_cursor_record() {
    let mut engine = MatchingEngine::new(arena(&[(10.0, "A"), (12.0, "B")]));
    let m = engine
        .advance_and_match(11.0, 2.0, MatchMode::ExactlyOnce)
        .unwrap();
    assert_eq!(m.map(|r| r.payload), Some("A"));
    assert_eq!(engine.cursor().index(), 0);
}

#[test]
fn out_of_tolerance_candidate_yields_none() {
    let mut engine = MatchingEngine::new(arena(&[(10.0, "A")]));
    let m = engine
        .advance_and_match(15.0, 0.5, MatchMode::ExactlyOnce)
        .unwrap();
    assert!(m.is_none());
    assert_eq!(engine.consumed_count(), 0);
}

#[test]
fn empty_arena_always_yields_none() {
    let mut engine: MatchingEngine<&str> = MatchingEngine::new(vec![]);
    for ts in [0.0, 100.0, 1e9] {
        assert!(engine
            .advance_and_match(ts, 1.0, MatchMode::ExactlyOnce)
            .unwrap()
            .is_none());
    }
}

#[test]
fn dense_before_first_sparse_matches_index_zero() {
    let mut engine = MatchingEngine::new(arena(&[(100.0, "A"), (200.0, "B")]));
    let m = engine
        .advance_and_match(99.9, 0.2, MatchMode::ExactlyOnce)
        .unwrap();
    assert_eq!(m.map(|r| r.payload), Some("A"));
    assert_eq!(engine.cursor().index(), 0);
}

#[test]
fn exhausted_arena_holds_at_last_record() {
    let mut engine = MatchingEngine::new(arena(&[(10.0, "A"), (11.0, "B")]));
    let _ = engine.advance_and_match(11.0, 0.1, MatchMode::ExactlyOnce);
    // Far beyond the last record: the cursor holds there and everything
    // fails the tolerance check.
    for ts in [50.0, 60.0, 70.0] {
        assert!(engine
            .advance_and_match(ts, 1.0, MatchMode::ExactlyOnce)
            .unwrap()
            .is_none());
        assert_eq!(engine.cursor().index(), 1);
    }
}

#[test]
fn many_to_one_allows_repeat_annotation() {
    let mut engine = MatchingEngine::new(arena(&[(10.0, "A")]));
    for ts in [10.1, 10.2, 9.9] {
        let m = engine
            .advance_and_match(ts, 0.3, MatchMode::ManyToOne)
            .unwrap();
        assert_eq!(m.map(|r| r.payload), Some("A"));
    }
    // Used-at-least-once is still tracked for the summary.
    assert_eq!(engine.consumed_count(), 1);
}

#[test]
fn cursor_never_retreats() {
    let mut engine = MatchingEngine::new(arena(&[(10.0, "A"), (20.0, "B"), (30.0, "C")]));
    let _ = engine.advance_and_match(29.0, 0.5, MatchMode::ExactlyOnce);
    assert_eq!(engine.cursor().index(), 2);
    // A dense timestamp behind the cursor cannot pull it back.
    let _ = engine.advance_and_match(29.5, 0.5, MatchMode::ExactlyOnce);
    assert_eq!(engine.cursor().index(), 2);
}

#[test]
fn resumed_cursor_out_of_bounds_is_corruption() {
    let mut engine = MatchingEngine::with_cursor(arena(&[(10.0, "A")]), Cursor::at(7));
    let err = engine
        .advance_and_match(10.0, 1.0, MatchMode::ExactlyOnce)
        .unwrap_err();
    assert!(matches!(
        err,
        WeftError::CursorCorruption { index: 7, len: 1 }
    ));
}

#[test]
fn consumption_is_visible_on_the_record() {
    let mut engine = MatchingEngine::new(arena(&[(10.0, "A"), (20.0, "B")]));
    let _ = engine.advance_and_match(10.0, 0.5, MatchMode::ExactlyOnce);
    assert!(engine.records()[0].is_consumed());
    assert!(!engine.records()[1].is_consumed());
}
