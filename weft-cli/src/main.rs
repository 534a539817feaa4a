//! weft CLI - align tagged-event captures with dense measurement streams.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use weft::Joiner;
use weft_core::{ClockSpec, MatchMode};
use weft_csv::{
    reclock_csv, verify_join, CsvEventSource, CsvJoinSink, CsvLayout, CsvSampleSource,
    ReclockConfig, VerifyOptions, DEFAULT_SENTINEL,
};

#[derive(Parser)]
#[command(name = "weft")]
#[command(version)]
#[command(about = "Annotate dense measurement streams with their nearest tagged events", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum ModeArg {
    /// Each tagged event annotates at most one measurement
    #[default]
    ExactlyOnce,
    /// A tagged event may annotate any number of measurements
    ManyToOne,
}

impl From<ModeArg> for MatchMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::ExactlyOnce => Self::ExactlyOnce,
            ModeArg::ManyToOne => Self::ManyToOne,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Join a measurement file against a tagged-event capture
    Join {
        /// Tagged-event capture (sparse input)
        events: PathBuf,

        /// Measurement file (dense input)
        samples: PathBuf,

        /// Joined output file
        output: PathBuf,

        /// Maximum |Δt| in seconds for a match
        #[arg(short, long, default_value = "0.001")]
        tolerance: f64,

        /// Dense-stream window length in records
        #[arg(long, default_value = "1000000")]
        chunk_size: usize,

        /// Matching policy
        #[arg(long, value_enum, default_value = "exactly-once")]
        mode: ModeArg,

        /// Quantization grid in seconds (0 disables)
        #[arg(long, default_value = "0")]
        quantize: f64,

        /// Wall-clock format for both inputs
        #[arg(long, default_value = weft_core::DEFAULT_WALL_CLOCK_FORMAT)]
        time_format: String,

        /// Timezone the wall-clock fields are expressed in (IANA name)
        #[arg(long)]
        timezone: Option<String>,

        /// Leading garbage rows to skip in the event capture
        #[arg(long, default_value = "0")]
        event_skip_rows: usize,

        /// Leading garbage rows to skip in the measurement file
        #[arg(long, default_value = "0")]
        sample_skip_rows: usize,

        /// Rename a measurement header, as from=to (repeatable)
        #[arg(long, value_name = "FROM=TO")]
        rename: Vec<String>,

        /// Per-field marker written for unmatched rows
        #[arg(long, default_value = DEFAULT_SENTINEL)]
        sentinel: String,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rewrite a relative-offset capture into master wall-clock time
    Reclock {
        /// Capture with a relative-offset column
        input: PathBuf,

        /// Reconstructed output file
        output: PathBuf,

        /// Master clock start, as "YYYY-MM-DD HH:MM:SS"
        #[arg(short, long)]
        start: String,

        /// Zero-based index of the offset column
        #[arg(long, default_value = "0")]
        offset_column: usize,

        /// Leading garbage rows to skip
        #[arg(long, default_value = "0")]
        skip_rows: usize,

        /// Rename a header by index, as INDEX=NAME (repeatable)
        #[arg(long, value_name = "INDEX=NAME")]
        rename: Vec<String>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Spot-check a joined output against its inputs
    Verify {
        /// Measurement file the join ran over
        samples: PathBuf,

        /// Tagged-event capture the join ran over
        events: PathBuf,

        /// Joined output file to check
        joined: PathBuf,

        /// Expected number of output columns
        #[arg(long)]
        expected_columns: Option<usize>,

        /// Annotation column for the parity check
        #[arg(long, requires = "value")]
        column: Option<String>,

        /// Annotation value for the parity check
        #[arg(long, requires = "column")]
        value: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_name_rename(spec: &str) -> Result<(String, String)> {
    match spec.split_once('=') {
        Some((from, to)) if !from.is_empty() && !to.is_empty() => {
            Ok((from.to_string(), to.to_string()))
        }
        _ => bail!("invalid rename {spec:?}, expected from=to"),
    }
}

fn parse_index_rename(spec: &str) -> Result<(usize, String)> {
    let Some((idx, name)) = spec.split_once('=') else {
        bail!("invalid rename {spec:?}, expected INDEX=NAME");
    };
    let idx: usize = idx
        .parse()
        .with_context(|| format!("invalid column index in rename {spec:?}"))?;
    Ok((idx, name.to_string()))
}

#[allow(clippy::too_many_arguments)]
fn run_join(
    events: &PathBuf,
    samples: &PathBuf,
    output: &PathBuf,
    tolerance: f64,
    chunk_size: usize,
    mode: ModeArg,
    quantize: f64,
    time_format: &str,
    timezone: Option<&str>,
    event_skip_rows: usize,
    sample_skip_rows: usize,
    rename: &[String],
    sentinel: &str,
    json: bool,
) -> Result<()> {
    let timezone = timezone
        .map(|tz| {
            tz.parse::<chrono_tz::Tz>()
                .map_err(|_| anyhow::anyhow!("unknown timezone {tz:?}"))
        })
        .transpose()?;
    let clock = ClockSpec {
        format: time_format.to_string(),
        timezone,
        reference_epoch: None,
        quantization_interval: quantize,
    };

    let mut sample_layout = CsvLayout::default().skip_rows(sample_skip_rows);
    for spec in rename {
        let (from, to) = parse_name_rename(spec)?;
        sample_layout = sample_layout.rename(from, to);
    }

    let mut event_source = CsvEventSource::open(
        events,
        CsvLayout::default().skip_rows(event_skip_rows),
    )?;
    let mut sample_source = CsvSampleSource::open(samples, sample_layout)?;
    let mut sink = CsvJoinSink::create(
        output,
        sample_source.payload_headers(),
        event_source.payload_headers(),
        sentinel,
    )?;

    let joiner = Joiner::builder()
        .tolerance(tolerance)
        .chunk_size(chunk_size)
        .mode(mode.into())
        .clock(clock)
        .build()?;

    info!(events = %events.display(), samples = %samples.display(), "starting join");
    let summary = joiner.run(&mut event_source, &mut sample_source, &mut sink)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{summary}");
    }
    Ok(())
}

fn run_reclock(
    input: &PathBuf,
    output: &PathBuf,
    start: &str,
    offset_column: usize,
    skip_rows: usize,
    rename: &[String],
    json: bool,
) -> Result<()> {
    let start: NaiveDateTime = NaiveDateTime::parse_from_str(start, "%Y-%m-%d %H:%M:%S")
        .with_context(|| format!("invalid start {start:?}, expected YYYY-MM-DD HH:MM:SS"))?;
    let renames = rename
        .iter()
        .map(|spec| parse_index_rename(spec))
        .collect::<Result<Vec<_>>>()?;

    let cfg = ReclockConfig {
        start,
        offset_column,
        skip_rows,
        renames,
    };
    let summary = reclock_csv(input, output, &cfg)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "reclocked {} rows into {}",
            summary.rows,
            output.display()
        );
    }
    Ok(())
}

fn run_verify(
    samples: &PathBuf,
    events: &PathBuf,
    joined: &PathBuf,
    expected_columns: Option<usize>,
    column: Option<String>,
    value: Option<String>,
    json: bool,
) -> Result<()> {
    let opts = VerifyOptions {
        expected_columns,
        annotation: column.zip(value),
    };
    let report = verify_join(samples, events, joined, &opts)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "samples: {} rows, joined: {} rows ({})",
            report.sample_rows,
            report.joined_rows,
            if report.row_count_ok { "ok" } else { "MISMATCH" }
        );
        println!(
            "joined columns: {} ({})",
            report.joined_columns,
            if report.column_count_ok { "ok" } else { "MISMATCH" }
        );
        if let Some(parity) = &report.annotation {
            println!(
                "{} = {:?}: {} in events, {} in joined ({})",
                parity.column,
                parity.value,
                parity.event_rows,
                parity.joined_rows,
                if parity.ok { "ok" } else { "MISMATCH" }
            );
        }
    }

    if !report.passed() {
        bail!("verification failed");
    }
    Ok(())
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .try_init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Join {
            events,
            samples,
            output,
            tolerance,
            chunk_size,
            mode,
            quantize,
            time_format,
            timezone,
            event_skip_rows,
            sample_skip_rows,
            rename,
            sentinel,
            json,
        } => run_join(
            &events,
            &samples,
            &output,
            tolerance,
            chunk_size,
            mode,
            quantize,
            &time_format,
            timezone.as_deref(),
            event_skip_rows,
            sample_skip_rows,
            &rename,
            &sentinel,
            json,
        ),
        Commands::Reclock {
            input,
            output,
            start,
            offset_column,
            skip_rows,
            rename,
            json,
        } => run_reclock(
            &input,
            &output,
            &start,
            offset_column,
            skip_rows,
            &rename,
            json,
        ),
        Commands::Verify {
            samples,
            events,
            joined,
            expected_columns,
            column,
            value,
            json,
        } => run_verify(
            &samples,
            &events,
            &joined,
            expected_columns,
            column,
            value,
            json,
        ),
    }
}
