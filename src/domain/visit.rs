//! Visit data model - one person's stay in the clean room on one day

use chrono::NaiveDateTime;

/// Visit accumulator used while folding access events.
///
/// Either end may be missing while the visit is being built. Once sealed it
/// becomes a [`Visit`] via `From`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingVisit {
    pub person: String,
    pub entry: Option<NaiveDateTime>,
    pub exit: Option<NaiveDateTime>,
}

impl PendingVisit {
    pub fn new(person: &str) -> Self {
        Self { person: person.to_string(), entry: None, exit: None }
    }

    #[inline]
    pub fn has_entry(&self) -> bool {
        self.entry.is_some()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entry.is_none() && self.exit.is_none()
    }
}

/// Consolidated occupancy interval, possibly incomplete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    pub person: String,
    pub entry: Option<NaiveDateTime>,
    pub exit: Option<NaiveDateTime>,
    /// Whole seconds between entry and exit, floored. Present iff both ends are.
    pub duration_seconds: Option<i64>,
}

impl Visit {
    pub fn new(
        person: impl Into<String>,
        entry: Option<NaiveDateTime>,
        exit: Option<NaiveDateTime>,
    ) -> Self {
        let duration_seconds = match (entry, exit) {
            (Some(entry), Some(exit)) => Some(elapsed_seconds(entry, exit)),
            _ => None,
        };
        Self { person: person.into(), entry, exit, duration_seconds }
    }

    /// True when both entry and exit are known
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.duration_seconds.is_some()
    }

    /// Duration in hours, for the optional Hours report column
    pub fn duration_hours(&self) -> Option<f64> {
        self.duration_seconds.map(|s| s as f64 / 3600.0)
    }
}

impl From<PendingVisit> for Visit {
    fn from(pending: PendingVisit) -> Self {
        Self::new(pending.person, pending.entry, pending.exit)
    }
}

/// Floor of (exit - entry) in seconds. Negative when exit precedes entry.
fn elapsed_seconds(entry: NaiveDateTime, exit: NaiveDateTime) -> i64 {
    (exit - entry).num_milliseconds().div_euclid(1000)
}
