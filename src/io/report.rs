//! Visit report - renders consolidated visits as a pivot-ready table
//!
//! TSV output has the header `Name Start End Time` (tab separated), plus an
//! optional `Hours` column. Missing values are empty fields, and fields holding a
//! tab or quote are quoted. JSONL output
//! writes one object per visit with the same fields as lowercase keys.

use crate::domain::visit::Visit;
use crate::infra::config::{Config, ReportFormat};
use anyhow::Context;
use chrono::NaiveDateTime;
use csv::WriterBuilder;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

const HEADERS: [&str; 4] = ["Name", "Start", "End", "Time"];
const HOURS_HEADER: &str = "Hours";

/// One visit as it appears in the JSONL report
#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    name: &'a str,
    start: Option<String>,
    end: Option<String>,
    time: Option<i64>,
}

/// Renders visits in the configured report format
#[derive(Debug, Clone)]
pub struct ReportWriter {
    format: ReportFormat,
    timestamp_format: String,
    include_hours: bool,
}

impl ReportWriter {
    pub fn new(format: ReportFormat, timestamp_format: &str, include_hours: bool) -> Self {
        Self { format, timestamp_format: timestamp_format.to_string(), include_hours }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.report_format(), config.timestamp_format(), config.include_hours())
    }

    /// TSV header fields
    fn header_record(&self) -> Vec<&'static str> {
        let mut headers = HEADERS.to_vec();
        if self.include_hours {
            headers.push(HOURS_HEADER);
        }
        headers
    }

    /// TSV fields for one visit. Missing values are empty fields.
    fn tsv_record(&self, visit: &Visit) -> anyhow::Result<Vec<String>> {
        let mut fields = vec![
            visit.person.clone(),
            self.format_optional(visit.entry)?.unwrap_or_default(),
            self.format_optional(visit.exit)?.unwrap_or_default(),
            visit.duration_seconds.map(|s| s.to_string()).unwrap_or_default(),
        ];
        if self.include_hours {
            fields.push(visit.duration_hours().map(|h| format!("{:.2}", h)).unwrap_or_default());
        }
        Ok(fields)
    }

    /// One JSONL line for a visit (without newline)
    fn json_line(&self, visit: &Visit) -> anyhow::Result<String> {
        let row = ReportRow {
            name: &visit.person,
            start: self.format_optional(visit.entry)?,
            end: self.format_optional(visit.exit)?,
            time: visit.duration_seconds,
        };
        serde_json::to_string(&row).context("Failed to serialize visit")
    }

    /// Write the full report. Returns the number of visit rows written.
    pub fn write<W: Write>(&self, out: &mut W, visits: &[Visit]) -> anyhow::Result<usize> {
        match self.format {
            ReportFormat::Tsv => {
                let mut tsv =
                    WriterBuilder::new().delimiter(b'\t').has_headers(false).from_writer(&mut *out);
                tsv.write_record(self.header_record())?;

                for visit in visits {
                    let record = self.tsv_record(visit)?;
                    tsv.write_record(&record)?;
                    debug!(person = %visit.person, fields = %record.len(), "visit_written");
                }
                tsv.flush()?;
            }
            ReportFormat::Jsonl => {
                for visit in visits {
                    let line = self.json_line(visit)?;
                    writeln!(out, "{}", line)?;
                    debug!(person = %visit.person, bytes = %line.len(), "visit_written");
                }
            }
        }

        out.flush()?;
        Ok(visits.len())
    }

    /// Write the report to a file (truncating it) or stdout when `path` is "-"
    pub fn write_to_path(&self, path: &str, visits: &[Visit]) -> anyhow::Result<usize> {
        let count = if path == "-" {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            self.write(&mut out, visits)?
        } else {
            let file_path = Path::new(path);

            // Create parent directories if they don't exist
            if let Some(parent) = file_path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create report directory {}", parent.display())
                    })?;
                }
            }

            let file = File::create(file_path)
                .with_context(|| format!("Failed to create report file {}", path))?;
            let mut out = BufWriter::new(file);
            self.write(&mut out, visits)
                .with_context(|| format!("Failed to write report file {}", path))?
        };

        info!(output = %path, format = %self.format.as_str(), visits = %count, "report_written");
        Ok(count)
    }

    fn format_optional(&self, ts: Option<NaiveDateTime>) -> anyhow::Result<Option<String>> {
        ts.map(|ts| self.format_timestamp(ts)).transpose()
    }

    fn format_timestamp(&self, ts: NaiveDateTime) -> anyhow::Result<String> {
        let mut buf = String::new();
        write!(buf, "{}", ts.format(&self.timestamp_format))
            .with_context(|| format!("Invalid timestamp format '{}'", self.timestamp_format))?;
        Ok(buf)
    }
}
