//! Access log source - reads a tab-separated export of the room access table
//!
//! The export must start with a header row. Columns are located by name, so
//! extra columns and any column order are accepted. Required columns:
//! `datetime`, `userid`, `db_firstname`, `db_lastname`, `roomid`, `direction`.
//! Header names match case-insensitively and fields may be double-quoted.
//!
//! [`AccessLog::query`] applies the same selection the access database query
//! uses: valid users only, one room, a half-open date range, ordered by user
//! then time.

use crate::domain::types::{AccessEvent, Direction};
use anyhow::{bail, Context};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use std::fs::File;
use std::io::{self, Read};
use tracing::{debug, info, warn};

const REQUIRED_COLUMNS: [&str; 6] =
    ["datetime", "userid", "db_firstname", "db_lastname", "roomid", "direction"];

/// One row of the access log export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRecord {
    pub timestamp: NaiveDateTime,
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub room_id: i64,
    pub direction: String,
}

impl AccessRecord {
    /// Person identity used for grouping: "<first> <last>"
    pub fn person(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn to_event(&self, in_direction: &str) -> AccessEvent {
        AccessEvent::new(
            self.person(),
            self.timestamp,
            Direction::from_label(&self.direction, in_direction),
        )
    }
}

/// Room and half-open date range `[start, end)` to report on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessQuery {
    pub room_id: i64,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl AccessQuery {
    pub fn new(room_id: i64, start: NaiveDate, end: NaiveDate) -> anyhow::Result<Self> {
        if end <= start {
            bail!("end date {} must be after start date {}", end, start);
        }
        Ok(Self { room_id, start, end })
    }

    /// Parse `YYYY-MM-DD` dates and build a query
    pub fn parse(room_id: i64, start: &str, end: &str) -> anyhow::Result<Self> {
        let start = parse_date(start).context("invalid start date")?;
        let end = parse_date(end).context("invalid end date")?;
        Self::new(room_id, start, end)
    }

    /// Whether a record passes the user/room/date filter
    pub fn matches(&self, record: &AccessRecord) -> bool {
        let start = self.start.and_time(NaiveTime::MIN);
        let end = self.end.and_time(NaiveTime::MIN);

        record.user_id > 0
            && record.room_id == self.room_id
            && record.timestamp >= start
            && record.timestamp < end
    }
}

fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("expected YYYY-MM-DD, got '{}'", s))
}

/// Counters collected while reading the export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub rows_read: u64,
    pub rows_malformed: u64,
}

/// Export row, keyed by lowercased header name. Extra columns are ignored.
#[derive(Debug, Deserialize)]
struct ExportRow {
    datetime: String,
    userid: i64,
    db_firstname: String,
    db_lastname: String,
    roomid: i64,
    direction: String,
}

impl ExportRow {
    fn into_record(self, timestamp_format: &str) -> anyhow::Result<AccessRecord> {
        let timestamp = NaiveDateTime::parse_from_str(&self.datetime, timestamp_format)
            .with_context(|| format!("bad datetime '{}'", self.datetime))?;

        Ok(AccessRecord {
            timestamp,
            user_id: self.userid,
            first_name: self.db_firstname,
            last_name: self.db_lastname,
            room_id: self.roomid,
            direction: self.direction,
        })
    }
}

/// Lowercase the header names and check every required column is present
fn normalize_headers(headers: &StringRecord) -> anyhow::Result<StringRecord> {
    let normalized: StringRecord = headers.iter().map(|h| h.to_ascii_lowercase()).collect();
    for name in REQUIRED_COLUMNS {
        if !normalized.iter().any(|h| h == name) {
            bail!("access log header is missing column '{}'", name);
        }
    }
    Ok(normalized)
}

/// Parsed access log export held in memory
#[derive(Debug, Clone)]
pub struct AccessLog {
    records: Vec<AccessRecord>,
    in_direction: String,
    stats: LoadStats,
}

impl AccessLog {
    /// Open an export file, or stdin when `path` is "-"
    pub fn open(path: &str, timestamp_format: &str, in_direction: &str) -> anyhow::Result<Self> {
        if path == "-" {
            return Self::from_reader(io::stdin().lock(), "stdin", timestamp_format, in_direction);
        }

        let file =
            File::open(path).with_context(|| format!("Failed to open access log {}", path))?;
        Self::from_reader(file, path, timestamp_format, in_direction)
    }

    /// Parse an export from any reader. Malformed rows are skipped and counted.
    pub fn from_reader<R: Read>(
        reader: R,
        source: &str,
        timestamp_format: &str,
        in_direction: &str,
    ) -> anyhow::Result<Self> {
        let mut reader = ReaderBuilder::new().delimiter(b'\t').trim(Trim::All).from_reader(reader);

        let headers = reader
            .headers()
            .with_context(|| format!("Failed to read header from {}", source))?;
        let headers =
            normalize_headers(headers).with_context(|| format!("Invalid header in {}", source))?;

        let mut records = Vec::new();
        let mut stats = LoadStats::default();

        for result in reader.records() {
            let (line, parsed) = match result {
                Ok(row) => {
                    let line = row.position().map_or(0, |p| p.line());
                    let parsed = row
                        .deserialize::<ExportRow>(Some(&headers))
                        .map_err(anyhow::Error::from)
                        .and_then(|r| r.into_record(timestamp_format));
                    (line, parsed)
                }
                Err(e) if e.is_io_error() => {
                    return Err(e).with_context(|| format!("Failed to read {}", source));
                }
                Err(e) => (e.position().map_or(0, |p| p.line()), Err(e.into())),
            };

            stats.rows_read += 1;
            match parsed {
                Ok(record) => records.push(record),
                Err(e) => {
                    stats.rows_malformed += 1;
                    warn!(
                        source = %source,
                        line = %line,
                        error = %format!("{:#}", e),
                        "access_log_row_skipped"
                    );
                }
            }
        }

        info!(
            source = %source,
            rows = %stats.rows_read,
            malformed = %stats.rows_malformed,
            "access_log_loaded"
        );

        Ok(Self { records, in_direction: in_direction.to_string(), stats })
    }

    pub fn records(&self) -> &[AccessRecord] {
        &self.records
    }

    pub fn stats(&self) -> LoadStats {
        self.stats
    }

    /// Select events for a room and date range, ordered by user then timestamp
    pub fn query(&self, query: &AccessQuery) -> Vec<AccessEvent> {
        let mut selected: Vec<&AccessRecord> =
            self.records.iter().filter(|r| query.matches(r)).collect();
        selected.sort_by_key(|r| (r.user_id, r.timestamp));

        debug!(
            room_id = %query.room_id,
            start = %query.start,
            end = %query.end,
            events = %selected.len(),
            "access_query_applied"
        );

        selected.into_iter().map(|r| r.to_event(&self.in_direction)).collect()
    }
}
