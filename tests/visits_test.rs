//! Integration tests: access log export -> query -> consolidation -> report

use chrono::{NaiveDate, NaiveDateTime};
use cleanroom_visits::domain::{AccessEvent, Direction, Visit};
use cleanroom_visits::infra::ReportFormat;
use cleanroom_visits::io::{AccessLog, AccessQuery, ReportWriter};
use cleanroom_visits::services::{consolidate, consolidate_with_stats};
use std::fs;
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 3, day).unwrap().and_hms_opt(h, m, 0).unwrap()
}

fn ev(person: &str, day: u32, h: u32, m: u32, direction: Direction) -> AccessEvent {
    AccessEvent::new(person, at(day, h, m), direction)
}

#[test]
fn test_scenarios() {
    use Direction::{In, Out};

    let cases: Vec<(Vec<AccessEvent>, Vec<Visit>)> = vec![
        (
            vec![ev("A", 1, 9, 0, In), ev("A", 1, 17, 0, Out)],
            vec![Visit::new("A", Some(at(1, 9, 0)), Some(at(1, 17, 0)))],
        ),
        (
            vec![ev("A", 1, 9, 0, In), ev("A", 1, 12, 0, Out), ev("A", 1, 13, 0, Out)],
            vec![Visit::new("A", Some(at(1, 9, 0)), Some(at(1, 13, 0)))],
        ),
        (
            vec![ev("A", 1, 9, 0, In), ev("A", 1, 9, 30, In), ev("A", 1, 17, 0, Out)],
            vec![
                Visit::new("A", Some(at(1, 9, 0)), None),
                Visit::new("A", Some(at(1, 9, 30)), Some(at(1, 17, 0))),
            ],
        ),
        (vec![ev("A", 1, 17, 0, Out)], vec![Visit::new("A", None, Some(at(1, 17, 0)))]),
        (
            vec![ev("A", 1, 9, 0, In), ev("B", 1, 10, 0, In), ev("B", 1, 18, 0, Out)],
            vec![
                Visit::new("A", Some(at(1, 9, 0)), None),
                Visit::new("B", Some(at(1, 10, 0)), Some(at(1, 18, 0))),
            ],
        ),
        (
            vec![ev("A", 1, 9, 0, In), ev("A", 2, 9, 5, In), ev("A", 2, 17, 0, Out)],
            vec![
                Visit::new("A", Some(at(1, 9, 0)), None),
                Visit::new("A", Some(at(2, 9, 5)), Some(at(2, 17, 0))),
            ],
        ),
    ];

    let expected_durations = [
        vec![Some(28800)],
        vec![Some(14400)],
        vec![None, Some(27000)],
        vec![None],
        vec![None, Some(28800)],
        vec![None, Some(28500)],
    ];

    for (idx, ((events, expected), durations)) in
        cases.into_iter().zip(expected_durations).enumerate()
    {
        let visits = consolidate(&events);
        assert_eq!(visits, expected, "scenario {}", idx + 1);
        let actual: Vec<Option<i64>> = visits.iter().map(|v| v.duration_seconds).collect();
        assert_eq!(actual, durations, "scenario {}", idx + 1);
    }
}

#[test]
fn test_same_person_same_day_splits_only_on_double_in() {
    use Direction::{In, Out};

    // In/Out pairs with brief re-entries that never re-badge In stay one visit
    let events = vec![
        ev("A", 1, 8, 0, In),
        ev("A", 1, 10, 0, Out),
        ev("A", 1, 10, 5, Out),
        ev("A", 1, 16, 0, Out),
    ];
    assert_eq!(consolidate(&events).len(), 1);

    let events = vec![
        ev("A", 1, 8, 0, In),
        ev("A", 1, 10, 0, Out),
        ev("A", 1, 11, 0, In),
        ev("A", 1, 16, 0, Out),
    ];
    let visits = consolidate(&events);
    assert_eq!(visits.len(), 2);
    assert_eq!(visits[0].duration_seconds, Some(7200));
    assert_eq!(visits[1].duration_seconds, Some(18000));
}

#[test]
fn test_export_to_tsv_report() {
    let mut export = NamedTempFile::new().unwrap();
    write!(
        export,
        "datetime\tuserid\tdb_firstname\tdb_lastname\troomid\tdirection\n\
         2020-03-27 09:00:00\t7\tAda\tLovelace\t24\tInDirection\n\
         2020-03-27 12:00:00\t7\tAda\tLovelace\t24\tOutDirection\n\
         2020-03-27 13:00:00\t7\tAda\tLovelace\t24\tOutDirection\n\
         2020-03-28 08:00:00\t7\tAda\tLovelace\t24\tInDirection\n\
         2020-03-27 08:30:00\t3\tGrace\tHopper\t24\tOutDirection\n\
         2020-03-27 09:15:00\t3\tGrace\tHopper\t24\tInDirection\n\
         2020-03-27 10:00:00\t3\tGrace\tHopper\t11\tOutDirection\n\
         2020-03-27 11:00:00\t-1\tUnknown\tBadge\t24\tInDirection\n\
         garbage row\n\
         2020-03-30 09:00:00\t7\tAda\tLovelace\t24\tInDirection\n"
    )
    .unwrap();
    export.flush().unwrap();

    let log = AccessLog::open(export.path().to_str().unwrap(), FORMAT, "InDirection").unwrap();
    assert_eq!(log.stats().rows_read, 10);
    assert_eq!(log.stats().rows_malformed, 1);

    let query = AccessQuery::parse(24, "2020-03-27", "2020-03-29").unwrap();
    let events = log.query(&query);
    // Grace (user 3) first, room 11, user -1 and the 30th are filtered out
    assert_eq!(events.len(), 6);
    assert_eq!(events[0].person, "Grace Hopper");

    let (visits, stats) = consolidate_with_stats(&events);
    assert_eq!(stats.events, 6);
    assert_eq!(stats.out_only_dropped, 0);

    let dir = tempdir().unwrap();
    let report_path = dir.path().join("visits.tsv");
    let writer = ReportWriter::new(ReportFormat::Tsv, FORMAT, false);
    let written = writer.write_to_path(report_path.to_str().unwrap(), &visits).unwrap();
    assert_eq!(written, 3);

    let report = fs::read_to_string(&report_path).unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Name\tStart\tEnd\tTime",
            // Out before In on the same day: one visit, negative duration surfaced
            "Grace Hopper\t2020-03-27 09:15:00\t2020-03-27 08:30:00\t-2700",
            "Ada Lovelace\t2020-03-27 09:00:00\t2020-03-27 13:00:00\t14400",
            "Ada Lovelace\t2020-03-28 08:00:00\t\t",
        ]
    );
}

#[test]
fn test_export_to_jsonl_report() {
    let data = "datetime\tuserid\tdb_firstname\tdb_lastname\troomid\tdirection\n\
                2020-03-27 17:00:00\t7\tAda\tLovelace\t24\tOutDirection\n";
    let log = AccessLog::from_reader(data.as_bytes(), "inline", FORMAT, "InDirection").unwrap();
    let query = AccessQuery::parse(24, "2020-03-27", "2020-03-28").unwrap();
    let visits = consolidate(&log.query(&query));

    let writer = ReportWriter::new(ReportFormat::Jsonl, FORMAT, false);
    let mut out = Vec::new();
    writer.write(&mut out, &visits).unwrap();

    let line = String::from_utf8(out).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
    assert_eq!(parsed["name"], "Ada Lovelace");
    assert!(parsed["start"].is_null());
    assert_eq!(parsed["end"], "2020-03-27 17:00:00");
    assert!(parsed["time"].is_null());
}
