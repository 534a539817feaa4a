use weft::Joiner;
use weft_mock::{epoch_clock, MemoryEventSource, MemorySampleSource, MemorySink};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Human-friendly tracing output with env-based filtering.
    // Suggested: RUST_LOG=info,weft=debug
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .try_init();

    // A handful of tagged events against a denser run of samples.
    let mut events = MemoryEventSource::at_epochs(vec![
        (10.0, "sensor boot"),
        (10.5, "tx burst"),
        (20.0, "rx ack"),
    ]);
    let mut samples = MemorySampleSource::at_epochs(
        (0..40).map(|i| (9.0 + f64::from(i) * 0.3, f64::from(i) * 0.01)).collect(),
    );
    let mut sink = MemorySink::new();

    let joiner = Joiner::builder()
        .tolerance(0.2)
        .chunk_size(8)
        .clock(epoch_clock())
        .build()?;
    let summary = joiner.run(&mut events, &mut samples, &mut sink)?;

    for row in sink.rows() {
        match &row.matched {
            Some(tag) => println!("{:>6.2}  {:<6.2}  {tag}", row.dense.timestamp, row.dense.payload),
            None => println!("{:>6.2}  {:<6.2}  -", row.dense.timestamp, row.dense.payload),
        }
    }
    println!("{summary}");

    Ok(())
}
