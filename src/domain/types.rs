//! Shared types for clean room access processing

use chrono::{NaiveDate, NaiveDateTime};

/// Badge direction as recorded by the door reader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    /// Classify a raw direction label.
    ///
    /// Only the configured in-label means `In`; every other label is treated as `Out`.
    pub fn from_label(label: &str, in_label: &str) -> Self {
        if label == in_label {
            Direction::In
        } else {
            Direction::Out
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single badge-in or badge-out for one person
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessEvent {
    pub person: String,
    pub timestamp: NaiveDateTime,
    pub direction: Direction,
}

impl AccessEvent {
    #[inline]
    pub fn new(person: impl Into<String>, timestamp: NaiveDateTime, direction: Direction) -> Self {
        Self { person: person.into(), timestamp, direction }
    }

    /// Calendar day of the event, used as the visit grouping key
    #[inline]
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date()
    }
}
