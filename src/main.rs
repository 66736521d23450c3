//! Clean room visits - occupancy report from door access logs
//!
//! Reads a room access export, selects one room and date range, consolidates
//! badge events into per-person, per-day visits and writes a table suitable
//! for pivoting.
//!
//! Module structure:
//! - `domain/` - Core types (AccessEvent, Visit)
//! - `io/` - Access log input and report output
//! - `services/` - Visit consolidation
//! - `infra/` - Config and run summary

use clap::Parser;
use cleanroom_visits::infra::{Config, ReportFormat, RunSummary};
use cleanroom_visits::io::{AccessLog, AccessQuery, ReportWriter};
use cleanroom_visits::services::consolidate_with_stats;
use tracing::info;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// Clean room visits - per-person, per-day occupancy from door access events
#[derive(Parser, Debug)]
#[command(name = "cleanroom-visits", version, about)]
struct Args {
    /// Start date YYYY-MM-DD (inclusive)
    #[arg(long)]
    start: String,

    /// End date YYYY-MM-DD (exclusive)
    #[arg(long)]
    end: String,

    /// Room ID. Defaults to site.room_id from config (clean room, 24)
    #[arg(long)]
    room: Option<i64>,

    /// Path to TOML configuration file
    ///
    /// Falls back to the CONFIG_FILE environment variable, then config/cleanroom.toml.
    /// Missing or invalid files fall back to built-in defaults.
    #[arg(short, long)]
    config: Option<String>,

    /// Access log export (tab separated, "-" for stdin)
    #[arg(short, long)]
    input: Option<String>,

    /// Report destination ("-" for stdout)
    #[arg(short, long)]
    output: Option<String>,

    /// Report format: tsv or jsonl
    #[arg(short, long)]
    format: Option<ReportFormat>,

    /// Add an Hours column to the TSV report
    #[arg(long)]
    hours: bool,
}

impl Args {
    /// Build the effective config: file (or defaults), then command line overrides
    fn into_config(self) -> (Config, String, String) {
        let config_path = self.config.unwrap_or_else(Config::resolve_config_path);
        let mut config = Config::load_from_path(&config_path);

        if let Some(room) = self.room {
            config = config.with_room_id(room);
        }
        if let Some(input) = &self.input {
            config = config.with_access_log(input);
        }
        if let Some(output) = &self.output {
            config = config.with_report_output(output);
        }
        if let Some(format) = self.format {
            config = config.with_report_format(format);
        }
        if self.hours {
            config = config.with_include_hours(true);
        }

        (config, self.start, self.end)
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize structured logging with configurable level via RUST_LOG env var
    // Logs go to stderr so the report can be piped from stdout
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), git_hash = env!("GIT_HASH"), "cleanroom_visits_starting");

    let args = Args::parse();
    let (config, start, end) = args.into_config();

    info!(
        config_file = %config.config_file(),
        site = %config.site_name(),
        room_id = %config.room_id(),
        access_log = %config.access_log(),
        report_output = %config.report_output(),
        report_format = %config.report_format().as_str(),
        include_hours = %config.include_hours(),
        "config_loaded"
    );

    let query = AccessQuery::parse(config.room_id(), &start, &end)?;

    let log = AccessLog::open(config.access_log(), config.timestamp_format(), config.in_direction())?;
    let events = log.query(&query);
    info!(
        room_id = %query.room_id,
        start = %query.start,
        end = %query.end,
        events = %events.len(),
        "events_selected"
    );

    let (visits, stats) = consolidate_with_stats(&events);

    let writer = ReportWriter::from_config(&config);
    writer.write_to_path(config.report_output(), &visits)?;

    RunSummary::new(log.stats(), stats, &visits).log();

    info!("cleanroom_visits_done");
    Ok(())
}
