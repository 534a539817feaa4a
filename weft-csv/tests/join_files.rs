use std::path::{Path, PathBuf};

use weft::Joiner;
use weft_csv::{CsvEventSource, CsvJoinSink, CsvLayout, CsvSampleSource, DEFAULT_SENTINEL};

const EVENTS: &str = "\
Date,Time,Source,Destination,Protocol,Length,Info
2026-02-17,13:32:33.000100,10.0.0.1,10.0.0.67,TCP,60,SYN
2026-02-17,13:32:33.000500,10.0.0.67,10.0.0.1,TCP,60,SYN ACK
2026-02-17,13:32:43.000000,10.0.0.1,10.0.0.67,UDP,120,payload
";

const SAMPLES: &str = "\
Date,Time,Current Average
2026-02-17,13:32:33.000000,0.101
2026-02-17,13:32:33.000200,0.102
2026-02-17,13:32:33.000600,0.103
2026-02-17,13:32:38.000000,0.104
";

fn write_inputs(dir: &Path) {
    std::fs::write(dir.join("events.csv"), EVENTS).unwrap();
    std::fs::write(dir.join("samples.csv"), SAMPLES).unwrap();
}

fn run_join(dir: &Path, chunk_size: usize) -> PathBuf {
    let mut events =
        CsvEventSource::open(dir.join("events.csv"), CsvLayout::default()).unwrap();
    let mut samples = CsvSampleSource::open(
        dir.join("samples.csv"),
        CsvLayout::default().rename("current average", "current"),
    )
    .unwrap();
    let out = dir.join("joined.csv");
    let mut sink = CsvJoinSink::create(
        &out,
        samples.payload_headers(),
        events.payload_headers(),
        DEFAULT_SENTINEL,
    )
    .unwrap();
    let joiner = Joiner::builder()
        .tolerance(0.0006)
        .chunk_size(chunk_size)
        .build()
        .unwrap();
    joiner.run(&mut events, &mut samples, &mut sink).unwrap();
    out
}

fn read_all(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut rdr = csv::Reader::from_path(path).unwrap();
    let headers = rdr.headers().unwrap().iter().map(String::from).collect();
    let rows = rdr
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect();
    (headers, rows)
}

#[test]
fn file_join_annotates_nearest_packets_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path());
    let out = run_join(dir.path(), 1_000_000);
    let (headers, rows) = read_all(&out);

    assert_eq!(
        headers,
        vec!["date", "time", "current", "source", "destination", "protocol", "length", "info"]
    );
    assert_eq!(rows.len(), 4);

    // Sample at .000000 takes the SYN (Δ 0.1 ms); the next sample stays on
    // the consumed SYN (the SYN ACK is no strict improvement) and misses;
    // the sample at .000600 takes the SYN ACK; the last sample is seconds
    // away from anything.
    assert_eq!(rows[0][2], "0.101");
    assert_eq!(rows[0][6], "60");
    assert_eq!(rows[0][7], "SYN");
    assert_eq!(rows[1][2], "0.102");
    assert_eq!(&rows[1][3..], &["0", "0", "0", "0", "0"]);
    assert_eq!(rows[2][7], "SYN ACK");
    assert_eq!(&rows[3][3..], &["0", "0", "0", "0", "0"]);

    // The raw date/time text passes through untouched.
    assert_eq!(rows[0][0], "2026-02-17");
    assert_eq!(rows[0][1], "13:32:33.000000");
}

#[test]
fn file_join_is_chunk_size_independent() {
    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();
    write_inputs(dir_a.path());
    write_inputs(dir_b.path());
    let out_a = run_join(dir_a.path(), 1);
    let out_b = run_join(dir_b.path(), 1_000_000);
    assert_eq!(
        std::fs::read_to_string(out_a).unwrap(),
        std::fs::read_to_string(out_b).unwrap()
    );
}

#[test]
fn leading_garbage_rows_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let samples_with_junk = format!("Power Logger v3\nSession,2026-02-17\nCalibrated,yes\n{SAMPLES}");
    std::fs::write(dir.path().join("events.csv"), EVENTS).unwrap();
    std::fs::write(dir.path().join("samples.csv"), samples_with_junk).unwrap();

    let mut events =
        CsvEventSource::open(dir.path().join("events.csv"), CsvLayout::default()).unwrap();
    let mut samples = CsvSampleSource::open(
        dir.path().join("samples.csv"),
        CsvLayout::default()
            .skip_rows(3)
            .rename("current average", "current"),
    )
    .unwrap();
    assert_eq!(
        samples.payload_headers(),
        &["date".to_string(), "time".to_string(), "current".to_string()]
    );

    let out = dir.path().join("joined.csv");
    let mut sink = CsvJoinSink::create(
        &out,
        samples.payload_headers(),
        events.payload_headers(),
        DEFAULT_SENTINEL,
    )
    .unwrap();
    let joiner = Joiner::builder().tolerance(0.0006).build().unwrap();
    let summary = joiner.run(&mut events, &mut samples, &mut sink).unwrap();
    assert_eq!(summary.dense_rows, 4);
    assert_eq!(summary.matched, 2);
}

#[test]
fn custom_sentinel_marks_unmatched_rows() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path());
    let mut events =
        CsvEventSource::open(dir.path().join("events.csv"), CsvLayout::default()).unwrap();
    let mut samples =
        CsvSampleSource::open(dir.path().join("samples.csv"), CsvLayout::default()).unwrap();
    let out = dir.path().join("joined.csv");
    let mut sink = CsvJoinSink::create(
        &out,
        samples.payload_headers(),
        events.payload_headers(),
        "n/a",
    )
    .unwrap();
    let joiner = Joiner::builder().tolerance(0.0006).build().unwrap();
    joiner.run(&mut events, &mut samples, &mut sink).unwrap();

    let (_, rows) = read_all(&out);
    assert_eq!(&rows[1][3..], &["n/a", "n/a", "n/a", "n/a", "n/a"]);
}

#[test]
fn malformed_time_field_aborts_the_join() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("events.csv"), EVENTS).unwrap();
    std::fs::write(
        dir.path().join("samples.csv"),
        "Date,Time,Current Average\n2026-02-17,half past one,0.101\n",
    )
    .unwrap();

    let mut events =
        CsvEventSource::open(dir.path().join("events.csv"), CsvLayout::default()).unwrap();
    let mut samples =
        CsvSampleSource::open(dir.path().join("samples.csv"), CsvLayout::default()).unwrap();
    let out = dir.path().join("joined.csv");
    let mut sink = CsvJoinSink::create(
        &out,
        samples.payload_headers(),
        events.payload_headers(),
        DEFAULT_SENTINEL,
    )
    .unwrap();
    let joiner = Joiner::builder().tolerance(0.0006).build().unwrap();
    let err = joiner.run(&mut events, &mut samples, &mut sink).unwrap_err();
    assert!(matches!(err, weft::WeftError::MalformedTimestamp { .. }));
}

#[test]
fn offset_layout_reads_relative_seconds() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("events.csv"),
        "seconds,label\n1.5,boot\n9.0,shutdown\n",
    )
    .unwrap();
    let mut events =
        CsvEventSource::open(dir.path().join("events.csv"), CsvLayout::offset(0)).unwrap();
    assert_eq!(events.payload_headers(), &["label".to_string()]);

    use weft_core::{EventSource, RawClock};
    let records = events.load().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].clock, RawClock::Offset(1.5));
    assert_eq!(records[1].payload, vec!["shutdown".to_string()]);
}
