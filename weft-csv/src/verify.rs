use std::path::Path;

use csv::{Reader, ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use weft_core::WeftError;

/// What to check beyond row-count parity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyOptions {
    /// Expected number of columns in the joined output, when known.
    pub expected_columns: Option<usize>,
    /// Annotation parity check: `(column, value)` counts rows whose column
    /// equals the value (trimmed, case-insensitive) in both the event input
    /// and the joined output. With exactly-once matching the counts must
    /// agree when every such event found a home.
    pub annotation: Option<(String, String)>,
}

/// Result of the annotation parity check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationParity {
    /// Column the check ran on.
    pub column: String,
    /// Value counted.
    pub value: String,
    /// Matching rows in the event input.
    pub event_rows: u64,
    /// Matching rows in the joined output.
    pub joined_rows: u64,
    /// Whether the two counts agree.
    pub ok: bool,
}

/// Spot-check report over a joined output file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyReport {
    /// Data rows in the sample (dense) input.
    pub sample_rows: u64,
    /// Data rows in the joined output.
    pub joined_rows: u64,
    /// Whether the joined output preserves the sample row count.
    pub row_count_ok: bool,
    /// Number of columns in the joined output's header.
    pub joined_columns: usize,
    /// Whether the column count matches `expected_columns` (vacuously true
    /// when no expectation was given).
    pub column_count_ok: bool,
    /// Annotation parity result, when requested.
    pub annotation: Option<AnnotationParity>,
}

impl VerifyReport {
    /// Whether every requested check passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.row_count_ok
            && self.column_count_ok
            && self.annotation.as_ref().is_none_or(|a| a.ok)
    }
}

fn open(path: &Path) -> Result<(Reader<std::fs::File>, String), WeftError> {
    let name = path.display().to_string();
    let rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| WeftError::io(&name, e))?;
    Ok((rdr, name))
}

fn count_rows(path: &Path) -> Result<u64, WeftError> {
    let (mut rdr, name) = open(path)?;
    let mut record = StringRecord::new();
    let mut rows = 0u64;
    while rdr
        .read_record(&mut record)
        .map_err(|e| WeftError::io(&name, e))?
    {
        rows += 1;
    }
    Ok(rows)
}

fn normalized(field: &str) -> String {
    field.trim().to_uppercase()
}

/// Count data rows whose `column` equals `value`, compared trimmed and
/// case-insensitively, the way the original spot checks did.
fn count_value(path: &Path, column: &str, value: &str) -> Result<u64, WeftError> {
    let (mut rdr, name) = open(path)?;
    let headers = rdr.headers().map_err(|e| WeftError::io(&name, e))?;
    let wanted = column.trim().to_lowercase();
    let Some(idx) = headers
        .iter()
        .position(|h| h.trim().to_lowercase() == wanted)
    else {
        return Err(WeftError::invalid(format!(
            "{name}: no column named {column:?}"
        )));
    };
    let expected = normalized(value);
    let mut record = StringRecord::new();
    let mut rows = 0u64;
    while rdr
        .read_record(&mut record)
        .map_err(|e| WeftError::io(&name, e))?
    {
        if record.get(idx).is_some_and(|f| normalized(f) == expected) {
            rows += 1;
        }
    }
    Ok(rows)
}

/// Verify a joined output file against its inputs.
///
/// Checks that output cardinality equals the sample input's, optionally that
/// the output column count matches an expectation, and optionally that an
/// annotation value occurs equally often in the event input and the joined
/// output. All three files are streamed; nothing is materialized.
///
/// # Errors
/// Returns `WeftError::Io` when any file is unreadable, and
/// `WeftError::InvalidArg` when the annotation column does not exist.
pub fn verify_join(
    samples: impl AsRef<Path>,
    events: impl AsRef<Path>,
    joined: impl AsRef<Path>,
    opts: &VerifyOptions,
) -> Result<VerifyReport, WeftError> {
    let samples = samples.as_ref();
    let events = events.as_ref();
    let joined = joined.as_ref();

    let sample_rows = count_rows(samples)?;
    let joined_rows = count_rows(joined)?;

    let (mut joined_rdr, joined_name) = open(joined)?;
    let joined_columns = joined_rdr
        .headers()
        .map_err(|e| WeftError::io(&joined_name, e))?
        .len();

    let annotation = match &opts.annotation {
        Some((column, value)) => {
            let event_rows = count_value(events, column, value)?;
            let out_rows = count_value(joined, column, value)?;
            Some(AnnotationParity {
                column: column.clone(),
                value: value.clone(),
                event_rows,
                joined_rows: out_rows,
                ok: event_rows == out_rows,
            })
        }
        None => None,
    };

    let report = VerifyReport {
        sample_rows,
        joined_rows,
        row_count_ok: sample_rows == joined_rows,
        joined_columns,
        column_count_ok: opts
            .expected_columns
            .is_none_or(|expected| expected == joined_columns),
        annotation,
    };
    tracing::debug!(passed = report.passed(), "verification finished");
    Ok(report)
}
