use crate::common::{FixedClock, FIXED_TIMESTAMP};
use httpstatus::core::probe::{ProbeOutcome, ReadingBuilder, SENTINEL_STATUS};
use serde_json::json;
use std::time::Duration;

const URL: &str = "https://example.test/";

#[test]
fn test_build_wraps_success_in_single_measurement() {
    let builder = ReadingBuilder::with_clock(FixedClock::shared());
    let outcome = ProbeOutcome::success(200, Duration::from_millis(50));

    let reading = builder.build("probe1", &outcome, URL);

    assert_eq!(reading.asset, "probe1");
    assert_eq!(reading.timestamp, FIXED_TIMESTAMP);
    assert_eq!(reading.readings.len(), 1);
    let measurement = &reading.readings[0];
    assert_eq!(measurement.status, 200);
    assert!((measurement.time - 0.05).abs() < 1e-9);
    assert_eq!(measurement.error, "");
    assert_eq!(measurement.url, URL);
}

#[test]
fn test_error_text_present_only_for_sentinel_status() {
    let builder = ReadingBuilder::with_clock(FixedClock::shared());
    let outcomes = vec![
        ProbeOutcome::success(200, Duration::from_millis(12)),
        ProbeOutcome::success(301, Duration::from_millis(30)),
        ProbeOutcome::success(404, Duration::from_millis(8)),
        ProbeOutcome::success(500, Duration::from_secs(2)),
        ProbeOutcome::failure("Request failed: Could not resolve host: example.test"),
        ProbeOutcome::failure(""),
    ];

    for outcome in outcomes {
        let reading = builder.build("probe1", &outcome, URL);
        assert_eq!(reading.readings.len(), 1);
        let measurement = &reading.readings[0];
        assert_eq!(
            measurement.error.is_empty(),
            measurement.status != SENTINEL_STATUS,
            "invariant broken for {:?}",
            outcome
        );
    }
}

#[test]
fn test_failure_reading_has_zero_time() {
    let builder = ReadingBuilder::with_clock(FixedClock::shared());
    let outcome = ProbeOutcome::failure("Request failed: Connection refused");

    let reading = builder.build("probe1", &outcome, URL);

    assert_eq!(reading.readings[0].status, 999);
    assert_eq!(reading.readings[0].time, 0.0);
    assert_eq!(reading.readings[0].error, "Request failed: Connection refused");
}

#[test]
fn test_reading_serializes_to_ingest_shape() {
    let builder = ReadingBuilder::with_clock(FixedClock::shared());
    let reading = builder.build(
        "probe1",
        &ProbeOutcome::success(200, Duration::from_millis(250)),
        URL,
    );

    let value = serde_json::to_value(&reading).unwrap();

    assert_eq!(
        value,
        json!({
            "asset": "probe1",
            "timestamp": FIXED_TIMESTAMP,
            "readings": [
                {"status": 200, "time": 0.25, "error": "", "url": URL}
            ]
        })
    );
}

#[test]
fn test_system_clock_timestamp_is_local_with_offset() {
    let reading = ReadingBuilder::new().build(
        "probe1",
        &ProbeOutcome::success(200, Duration::ZERO),
        URL,
    );

    let parsed = chrono::DateTime::parse_from_str(&reading.timestamp, "%Y-%m-%d %H:%M:%S%.f%:z");
    assert!(parsed.is_ok(), "unexpected timestamp {}", reading.timestamp);
}
