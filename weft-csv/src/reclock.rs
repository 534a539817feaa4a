use std::path::Path;

use chrono::{DateTime, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::Serialize;
use weft_core::{ClockSpec, TimeNormalizer, WeftError};

/// Configuration for master-time reconstruction.
///
/// Captures that record a relative offset in seconds are rewritten against
/// the master clock's start instant, replacing the offset column with a
/// calendar `date` column and a fractional-seconds `time` column. Downstream,
/// those files join against each other on wall-clock layouts.
#[derive(Debug, Clone)]
pub struct ReclockConfig {
    /// Start instant of the master clock, i.e. what offset `0.0` means.
    pub start: NaiveDateTime,
    /// Zero-based index of the relative-offset column.
    pub offset_column: usize,
    /// Leading garbage rows to skip before the header.
    pub skip_rows: usize,
    /// Header renames by column index, applied to the output header (e.g.
    /// giving a meaningful name to an unlabeled measurement column).
    pub renames: Vec<(usize, String)>,
}

impl ReclockConfig {
    /// Reconstruct against the given master start instant, offsets in
    /// column 0, no skipped rows, no renames.
    #[must_use]
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            start,
            offset_column: 0,
            skip_rows: 0,
            renames: Vec::new(),
        }
    }
}

/// Counters from a completed reconstruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReclockSummary {
    /// Data rows rewritten.
    pub rows: u64,
}

/// Rewrite a relative-offset capture into master wall-clock time.
///
/// The offset column is replaced in place by a `date` column
/// (`%Y-%m-%d`) and a `time` column (`%H:%M:%S%.6f`); all other columns pass
/// through untouched. The input is streamed row by row, so file size is
/// bounded only by disk.
///
/// # Errors
/// - `WeftError::Io` when the input is unreadable or the output unwritable.
/// - `WeftError::MalformedTimestamp` when an offset field is not a finite
///   number of seconds, or falls outside the representable datetime range.
pub fn reclock_csv(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    cfg: &ReclockConfig,
) -> Result<ReclockSummary, WeftError> {
    let input = input.as_ref();
    let output = output.as_ref();
    let in_name = input.display().to_string();
    let out_name = output.display().to_string();

    let normalizer = TimeNormalizer::new(ClockSpec {
        reference_epoch: Some(cfg.start.and_utc().timestamp_micros() as f64 / 1e6),
        ..ClockSpec::default()
    })?;

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(input)
        .map_err(|e| WeftError::io(&in_name, e))?;
    let mut wtr = WriterBuilder::new()
        .from_path(output)
        .map_err(|e| WeftError::io(&out_name, e))?;

    let mut record = StringRecord::new();
    for _ in 0..cfg.skip_rows {
        let more = rdr
            .read_record(&mut record)
            .map_err(|e| WeftError::io(&in_name, e))?;
        if !more {
            wtr.flush().map_err(|e| WeftError::io(&out_name, e))?;
            return Ok(ReclockSummary::default());
        }
    }

    // Header: rename requested columns, then swap the offset column for the
    // reconstructed date/time pair.
    let has_header = rdr
        .read_record(&mut record)
        .map_err(|e| WeftError::io(&in_name, e))?;
    if !has_header {
        wtr.flush().map_err(|e| WeftError::io(&out_name, e))?;
        return Ok(ReclockSummary::default());
    }
    let mut header: Vec<String> = Vec::with_capacity(record.len() + 1);
    for (i, raw) in record.iter().enumerate() {
        let name = cfg
            .renames
            .iter()
            .find(|(idx, _)| *idx == i)
            .map_or_else(|| raw.trim().to_lowercase(), |(_, to)| to.clone());
        if i == cfg.offset_column {
            header.push("date".to_string());
            header.push("time".to_string());
        } else {
            header.push(name);
        }
    }
    wtr.write_record(&header)
        .map_err(|e| WeftError::io(&out_name, e))?;

    let mut summary = ReclockSummary::default();
    let mut out_row: Vec<String> = Vec::with_capacity(header.len());
    loop {
        let more = rdr
            .read_record(&mut record)
            .map_err(|e| WeftError::io(&in_name, e))?;
        if !more {
            break;
        }
        out_row.clear();
        for (i, field) in record.iter().enumerate() {
            if i == cfg.offset_column {
                let offset: f64 = field.trim().parse().map_err(|_| {
                    WeftError::malformed(
                        field,
                        format!("{in_name}: record {}: not a number of seconds", summary.rows),
                    )
                })?;
                let t = normalizer.offset(offset)?;
                let micros = (t * 1e6).round();
                let dt = if micros.is_finite() {
                    DateTime::from_timestamp_micros(micros as i64)
                } else {
                    None
                };
                let Some(dt) = dt else {
                    return Err(WeftError::malformed(
                        field,
                        format!(
                            "{in_name}: record {}: offset outside the representable range",
                            summary.rows
                        ),
                    ));
                };
                out_row.push(dt.format("%Y-%m-%d").to_string());
                out_row.push(dt.format("%H:%M:%S%.6f").to_string());
            } else {
                out_row.push(field.to_string());
            }
        }
        wtr.write_record(&out_row)
            .map_err(|e| WeftError::io(&out_name, e))?;
        summary.rows += 1;
    }

    wtr.flush().map_err(|e| WeftError::io(&out_name, e))?;
    tracing::info!(input = %in_name, output = %out_name, rows = summary.rows, "reclock complete");
    Ok(summary)
}
