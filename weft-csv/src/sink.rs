use std::fs::File;
use std::path::Path;

use csv::{Writer, WriterBuilder};
use weft_core::{JoinSink, JoinedRecord, WeftError};

/// Per-field marker written for unmatched rows.
///
/// Follows the downstream convention of the captures this tool grew out of:
/// a literal `"0"` in every annotation column. Configurable at sink creation
/// for consumers that need a sentinel distinguishable from legitimate zeros.
pub const DEFAULT_SENTINEL: &str = "0";

/// Append-only writer producing one output row per joined record.
///
/// Rows are `<sample fields..., annotation fields...>`; unmatched records get
/// the sentinel in every annotation column so the output stays rectangular.
pub struct CsvJoinSink {
    name: String,
    wtr: Writer<File>,
    sentinel: String,
    annotation_width: usize,
}

impl CsvJoinSink {
    /// Create the output file and write its header row.
    ///
    /// `sample_headers` and `event_headers` become the output header, in that
    /// order; `event_headers` also fixes the annotation width used for
    /// sentinel fill. When both are empty (headerless inputs) no header row
    /// is written and matched/unmatched rows are assumed to be shaped by the
    /// caller.
    ///
    /// # Errors
    /// Returns `WeftError::Io` when the file cannot be created or the header
    /// cannot be written.
    pub fn create(
        path: impl AsRef<Path>,
        sample_headers: &[String],
        event_headers: &[String],
        sentinel: impl Into<String>,
    ) -> Result<Self, WeftError> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let mut wtr = WriterBuilder::new()
            .from_path(path)
            .map_err(|e| WeftError::io(&name, e))?;
        if !(sample_headers.is_empty() && event_headers.is_empty()) {
            wtr.write_record(sample_headers.iter().chain(event_headers.iter()))
                .map_err(|e| WeftError::io(&name, e))?;
        }
        Ok(Self {
            name,
            wtr,
            sentinel: sentinel.into(),
            annotation_width: event_headers.len(),
        })
    }

    /// Path-derived name used in error messages.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl JoinSink<Vec<String>, Vec<String>> for CsvJoinSink {
    fn write(&mut self, record: JoinedRecord<Vec<String>, Vec<String>>) -> Result<(), WeftError> {
        let result = match &record.matched {
            Some(annotation) => self
                .wtr
                .write_record(record.dense.payload.iter().chain(annotation.iter())),
            None => self.wtr.write_record(
                record
                    .dense
                    .payload
                    .iter()
                    .map(String::as_str)
                    .chain(std::iter::repeat_n(
                        self.sentinel.as_str(),
                        self.annotation_width,
                    )),
            ),
        };
        result.map_err(|e| WeftError::io(&self.name, e))
    }

    fn close(&mut self) -> Result<(), WeftError> {
        self.wtr.flush().map_err(|e| WeftError::io(&self.name, e))
    }
}
