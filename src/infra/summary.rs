//! Run summary - counters collected over one report run, logged at the end

use crate::domain::visit::Visit;
use crate::io::access_log::LoadStats;
use crate::services::consolidator::ConsolidationStats;
use tracing::info;

/// Summary of a single report run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Data rows read from the access log
    pub rows_read: u64,
    /// Rows skipped because they could not be parsed
    pub rows_malformed: u64,
    /// Events left after the room/date/user filter
    pub events: u64,
    pub visits: u64,
    pub complete_visits: u64,
    /// Visits with an entry but no exit
    pub entry_only: u64,
    /// Visits with an exit but no entry (only the trailing visit can be one)
    pub exit_only: u64,
    /// Out-only visits discarded at person/day boundaries
    pub out_only_dropped: u64,
    /// Visits whose exit precedes their entry
    pub negative_durations: u64,
    pub total_seconds: i64,
}

impl RunSummary {
    pub fn new(load: LoadStats, consolidation: ConsolidationStats, visits: &[Visit]) -> Self {
        let mut summary = Self {
            rows_read: load.rows_read,
            rows_malformed: load.rows_malformed,
            events: consolidation.events,
            visits: visits.len() as u64,
            out_only_dropped: consolidation.out_only_dropped,
            ..Self::default()
        };

        for visit in visits {
            match (visit.entry, visit.exit, visit.duration_seconds) {
                (Some(_), Some(_), Some(seconds)) => {
                    summary.complete_visits += 1;
                    summary.total_seconds += seconds;
                    if seconds < 0 {
                        summary.negative_durations += 1;
                    }
                }
                (Some(_), None, _) => summary.entry_only += 1,
                (None, Some(_), _) => summary.exit_only += 1,
                _ => {}
            }
        }

        summary
    }

    /// Total complete-visit time in hours
    pub fn total_hours(&self) -> f64 {
        self.total_seconds as f64 / 3600.0
    }

    /// Log summary (structured)
    pub fn log(&self) {
        info!(
            rows_read = %self.rows_read,
            rows_malformed = %self.rows_malformed,
            events = %self.events,
            visits = %self.visits,
            complete = %self.complete_visits,
            entry_only = %self.entry_only,
            exit_only = %self.exit_only,
            out_only_dropped = %self.out_only_dropped,
            negative_durations = %self.negative_durations,
            total_hours = format!("{:.2}", self.total_hours()),
            "run_summary"
        );
    }
}
