//! Visit consolidation - folds sorted access events into visits
//!
//! Events must arrive grouped by person and, within a person, in ascending
//! timestamp order. The consolidator does not sort or validate this.
//!
//! Transition rules per event, in order:
//! 1. Person change seals the current visit (kept only if it has an entry)
//! 2. Day change, for the same person, does the same
//! 3. `In` on a visit that already has an entry seals it unconditionally;
//!    `Out` overwrites the exit, so the last `Out` wins
//!
//! At end of stream the pending visit is always sealed, even if it only has an exit.

use crate::domain::types::{AccessEvent, Direction};
use crate::domain::visit::{PendingVisit, Visit};
use chrono::NaiveDate;
use tracing::debug;

/// Counters collected during one consolidation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsolidationStats {
    pub events: u64,
    pub visits_sealed: u64,
    /// Out-only visits discarded at a person or day boundary
    pub out_only_dropped: u64,
}

/// Stateful fold over access events
#[derive(Debug, Default)]
pub struct VisitConsolidator {
    sealed: Vec<PendingVisit>,
    current: Option<PendingVisit>,
    current_person: Option<String>,
    current_day: Option<NaiveDate>,
    stats: ConsolidationStats,
}

impl VisitConsolidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event to the fold
    pub fn push(&mut self, event: &AccessEvent) {
        self.stats.events += 1;
        let day = event.day();

        let same_person = self.current_person.as_deref().map(|p| p == event.person);
        match same_person {
            Some(false) => {
                self.seal_at_boundary();
                self.start(&event.person);
                self.current_person = Some(event.person.clone());
                self.current_day = Some(day);
            }
            Some(true) => {
                if self.current_day != Some(day) {
                    self.seal_at_boundary();
                    self.start(&event.person);
                    self.current_day = Some(day);
                }
            }
            None => {
                self.start(&event.person);
                self.current_person = Some(event.person.clone());
                self.current_day = Some(day);
            }
        }

        match event.direction {
            Direction::In => {
                if self.current.as_ref().is_some_and(PendingVisit::has_entry) {
                    // Second In before an Out: the entry-only visit is a real row
                    if let Some(visit) = self.current.take() {
                        self.seal(visit);
                    }
                    self.start(&event.person);
                }
                self.current_mut(&event.person).entry = Some(event.timestamp);
            }
            Direction::Out => {
                self.current_mut(&event.person).exit = Some(event.timestamp);
            }
        }
    }

    /// Seal the trailing visit and return every sealed visit in order
    pub fn finish(self) -> Vec<PendingVisit> {
        self.finish_with_stats().0
    }

    /// Like `finish`, also returning the final counters
    pub fn finish_with_stats(mut self) -> (Vec<PendingVisit>, ConsolidationStats) {
        if let Some(visit) = self.current.take() {
            if !visit.is_empty() {
                self.seal(visit);
            }
        }
        let stats = self.stats();
        (self.sealed, stats)
    }

    /// Counters for the events pushed so far. The trailing visit is not counted until `finish`.
    pub fn stats(&self) -> ConsolidationStats {
        ConsolidationStats { visits_sealed: self.sealed.len() as u64, ..self.stats }
    }

    fn start(&mut self, person: &str) {
        self.current = Some(PendingVisit::new(person));
    }

    fn current_mut(&mut self, person: &str) -> &mut PendingVisit {
        self.current.get_or_insert_with(|| PendingVisit::new(person))
    }

    /// Mid-stream seal at a person or day boundary: visits without an entry are dropped
    fn seal_at_boundary(&mut self) {
        let Some(visit) = self.current.take() else {
            return;
        };

        if visit.has_entry() {
            self.seal(visit);
        } else {
            self.stats.out_only_dropped += 1;
            debug!(
                person = %visit.person,
                exit = ?visit.exit,
                "visit_dropped_out_only"
            );
        }
    }

    fn seal(&mut self, visit: PendingVisit) {
        debug!(
            person = %visit.person,
            entry = ?visit.entry,
            exit = ?visit.exit,
            "visit_sealed"
        );
        self.sealed.push(visit);
    }
}

/// Consolidate pre-sorted events into visits with derived durations
pub fn consolidate(events: &[AccessEvent]) -> Vec<Visit> {
    consolidate_with_stats(events).0
}

/// Like [`consolidate`], also returning the fold counters
pub fn consolidate_with_stats(events: &[AccessEvent]) -> (Vec<Visit>, ConsolidationStats) {
    let mut consolidator = VisitConsolidator::new();
    for event in events {
        consolidator.push(event);
    }
    let (sealed, stats) = consolidator.finish_with_stats();

    (derive_durations(sealed), stats)
}

/// Post-pass over sealed visits: compute durations where both ends are known
pub fn derive_durations(sealed: Vec<PendingVisit>) -> Vec<Visit> {
    sealed.into_iter().map(Visit::from).collect()
}
