use std::fs::File;
use std::path::Path;

use csv::{Reader, ReaderBuilder, StringRecord};
use weft_core::{EventSource, RawClock, RawRecord, SampleSource, WeftError};

use crate::layout::{CsvLayout, TimeColumns};

/// Open a reader, skip leading garbage rows, and consume the header row when
/// the layout declares one. Returns the reader positioned at the first data
/// record, plus the raw header record if there was one.
fn open_reader(
    path: &Path,
    layout: &CsvLayout,
    name: &str,
) -> Result<(Reader<File>, Option<StringRecord>), WeftError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| WeftError::io(name, e))?;

    let mut record = StringRecord::new();
    for _ in 0..layout.skip_rows {
        let more = rdr
            .read_record(&mut record)
            .map_err(|e| WeftError::io(name, e))?;
        if !more {
            return Ok((rdr, None));
        }
    }

    if layout.has_headers {
        let more = rdr
            .read_record(&mut record)
            .map_err(|e| WeftError::io(name, e))?;
        if more {
            return Ok((rdr, Some(record.clone())));
        }
    }
    Ok((rdr, None))
}

fn clock_fields(
    record: &StringRecord,
    time: TimeColumns,
    name: &str,
    row: u64,
) -> Result<RawClock, WeftError> {
    let field = |idx: usize| -> Result<&str, WeftError> {
        record.get(idx).ok_or_else(|| {
            WeftError::malformed(
                "<missing>",
                format!("{name}: record {row} has no column {idx}"),
            )
        })
    };
    match time {
        TimeColumns::WallClock { date, time } => Ok(RawClock::WallClock {
            date: field(date)?.to_string(),
            time: field(time)?.to_string(),
        }),
        TimeColumns::Offset { seconds } => {
            let raw = field(seconds)?;
            let parsed: f64 = raw.trim().parse().map_err(|_| {
                WeftError::malformed(raw, format!("{name}: record {row}: not a number of seconds"))
            })?;
            Ok(RawClock::Offset(parsed))
        }
    }
}

fn payload_fields(record: &StringRecord, time: TimeColumns, keep_clock: bool) -> Vec<String> {
    record
        .iter()
        .enumerate()
        .filter(|&(i, _)| keep_clock || !time.contains(i))
        .map(|(_, f)| f.to_string())
        .collect()
}

/// Sparse source reading a tagged-event capture from a columnar text file.
///
/// The payload excludes the clock columns: it is the annotation set carried
/// into the joined output (e.g. source, destination, protocol, length, info).
pub struct CsvEventSource {
    name: String,
    rdr: Reader<File>,
    layout: CsvLayout,
    payload_headers: Vec<String>,
}

impl CsvEventSource {
    /// Open the file and position the reader past skipped rows and header.
    ///
    /// # Errors
    /// Returns `WeftError::Io` when the file cannot be opened or read.
    pub fn open(path: impl AsRef<Path>, layout: CsvLayout) -> Result<Self, WeftError> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let (rdr, header) = open_reader(path, &layout, &name)?;
        let payload_headers = header
            .map(|h| {
                h.iter()
                    .enumerate()
                    .filter(|&(i, _)| !layout.time.contains(i))
                    .map(|(_, raw)| layout.header_name(raw))
                    .collect()
            })
            .unwrap_or_default();
        Ok(Self {
            name,
            rdr,
            layout,
            payload_headers,
        })
    }

    /// Normalized header names of the payload columns.
    #[must_use]
    pub fn payload_headers(&self) -> &[String] {
        &self.payload_headers
    }
}

impl EventSource for CsvEventSource {
    type Payload = Vec<String>;

    fn name(&self) -> &str {
        &self.name
    }

    fn load(&mut self) -> Result<Vec<RawRecord<Vec<String>>>, WeftError> {
        let mut out = Vec::new();
        let mut record = StringRecord::new();
        let mut row: u64 = 0;
        loop {
            let more = self
                .rdr
                .read_record(&mut record)
                .map_err(|e| WeftError::io(&self.name, e))?;
            if !more {
                break;
            }
            let clock = clock_fields(&record, self.layout.time, &self.name, row)?;
            out.push(RawRecord::new(
                clock,
                payload_fields(&record, self.layout.time, false),
            ));
            row += 1;
        }
        tracing::debug!(source = %self.name, records = out.len(), "event capture read");
        Ok(out)
    }
}

/// Dense source reading a measurement file chunk by chunk.
///
/// The payload keeps every column, clock fields included, so the sink can
/// reproduce the original row verbatim alongside its annotation.
pub struct CsvSampleSource {
    name: String,
    rdr: Reader<File>,
    layout: CsvLayout,
    payload_headers: Vec<String>,
    row: u64,
}

impl CsvSampleSource {
    /// Open the file and position the reader past skipped rows and header.
    ///
    /// # Errors
    /// Returns `WeftError::Io` when the file cannot be opened or read.
    pub fn open(path: impl AsRef<Path>, layout: CsvLayout) -> Result<Self, WeftError> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let (rdr, header) = open_reader(path, &layout, &name)?;
        let payload_headers = header
            .map(|h| h.iter().map(|raw| layout.header_name(raw)).collect())
            .unwrap_or_default();
        Ok(Self {
            name,
            rdr,
            layout,
            payload_headers,
            row: 0,
        })
    }

    /// Normalized header names of the payload columns (all columns).
    #[must_use]
    pub fn payload_headers(&self) -> &[String] {
        &self.payload_headers
    }
}

impl SampleSource for CsvSampleSource {
    type Payload = Vec<String>;

    fn name(&self) -> &str {
        &self.name
    }

    fn next_chunk(
        &mut self,
        max_records: usize,
    ) -> Result<Vec<RawRecord<Vec<String>>>, WeftError> {
        let mut out = Vec::with_capacity(max_records.min(65_536));
        let mut record = StringRecord::new();
        while out.len() < max_records {
            let more = self
                .rdr
                .read_record(&mut record)
                .map_err(|e| WeftError::io(&self.name, e))?;
            if !more {
                break;
            }
            let clock = clock_fields(&record, self.layout.time, &self.name, self.row)?;
            out.push(RawRecord::new(
                clock,
                payload_fields(&record, self.layout.time, true),
            ));
            self.row += 1;
        }
        Ok(out)
    }
}
