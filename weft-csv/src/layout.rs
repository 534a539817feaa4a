use serde::{Deserialize, Serialize};

/// Positions of the clock fields within a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeColumns {
    /// A calendar date column and a time-of-day column.
    WallClock {
        /// Zero-based index of the date column.
        date: usize,
        /// Zero-based index of the time column.
        time: usize,
    },
    /// A single column holding a relative offset in seconds.
    Offset {
        /// Zero-based index of the offset column.
        seconds: usize,
    },
}

impl Default for TimeColumns {
    fn default() -> Self {
        Self::WallClock { date: 0, time: 1 }
    }
}

impl TimeColumns {
    /// Whether the given column index carries a clock field.
    #[must_use]
    pub const fn contains(&self, index: usize) -> bool {
        match *self {
            Self::WallClock { date, time } => index == date || index == time,
            Self::Offset { seconds } => index == seconds,
        }
    }
}

/// Layout of a columnar text file fed to the joiner.
///
/// Column positions are fixed and known ahead of time; nothing is inferred
/// from the data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvLayout {
    /// Where the clock fields live.
    pub time: TimeColumns,
    /// Leading garbage rows to skip before the header (or the first record).
    pub skip_rows: usize,
    /// Whether a header row follows the skipped rows.
    pub has_headers: bool,
    /// Header renames applied after trimming and lowercasing, e.g.
    /// `("current average", "current")`.
    pub renames: Vec<(String, String)>,
}

impl Default for CsvLayout {
    fn default() -> Self {
        Self {
            time: TimeColumns::default(),
            skip_rows: 0,
            has_headers: true,
            renames: Vec::new(),
        }
    }
}

impl CsvLayout {
    /// Layout with wall-clock columns at the given positions.
    #[must_use]
    pub fn wall_clock(date: usize, time: usize) -> Self {
        Self {
            time: TimeColumns::WallClock { date, time },
            ..Self::default()
        }
    }

    /// Layout with a relative-offset column at the given position.
    #[must_use]
    pub fn offset(seconds: usize) -> Self {
        Self {
            time: TimeColumns::Offset { seconds },
            ..Self::default()
        }
    }

    /// Skip the given number of leading rows.
    #[must_use]
    pub fn skip_rows(mut self, rows: usize) -> Self {
        self.skip_rows = rows;
        self
    }

    /// Mark the input as headerless.
    #[must_use]
    pub fn headerless(mut self) -> Self {
        self.has_headers = false;
        self
    }

    /// Rename a header after normalization.
    #[must_use]
    pub fn rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.renames.push((from.into(), to.into()));
        self
    }

    /// Normalize a raw header name: trim, lowercase, then apply renames.
    #[must_use]
    pub fn header_name(&self, raw: &str) -> String {
        let normalized = raw.trim().to_lowercase();
        for (from, to) in &self.renames {
            if normalized == *from {
                return to.clone();
            }
        }
        normalized
    }
}
