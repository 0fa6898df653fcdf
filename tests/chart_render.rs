// tests/chart_render.rs
use event_chart_aggregator::{chart::ChartData, Bucket, Event, TimeRange};

const HOOK_LINES: &str = r#"
{"source_app":"cli","session_id":"a","hook_event_type":"PreToolUse","timestamp":118200}
{"source_app":"cli","session_id":"a","hook_event_type":"PostToolUse","timestamp":118900}
{"source_app":"cli","session_id":"b","hook_event_type":"PreToolUse","timestamp":112000}
{"source_app":"cli","session_id":"b","hook_event_type":"Stop"}
"#;

fn parse_lines(raw: &str) -> Vec<Event> {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| serde_json::from_str(l).expect("valid event line"))
        .collect()
}

#[test]
fn hook_events_render_to_chart_json() {
    let mut chart = ChartData::new(TimeRange::ThreeMinutes);
    for ev in parse_lines(HOOK_LINES) {
        chart.enqueue(ev);
    }
    let out = chart.flush(120_000);
    assert_eq!(out.bucketed, 3);
    assert_eq!(out.skipped, 1);

    let series = chart.render(120_000);
    assert_eq!(series.len(), 60);
    assert_eq!(series.last().map(|b| b.timestamp), Some(120_000));

    let json = serde_json::to_value(&series).unwrap();
    let hits: Vec<&serde_json::Value> = json
        .as_array()
        .unwrap()
        .iter()
        .filter(|p| p["count"].as_u64() != Some(0))
        .collect();
    assert_eq!(hits.len(), 2);
    // 118_200 and 118_900 share the 117_000 bucket (3s width)
    let shared = hits.iter().find(|p| p["timestamp"] == 117_000).unwrap();
    assert_eq!(shared["count"], 2);
    assert_eq!(shared["eventTypes"]["PreToolUse"], 1);
    assert_eq!(shared["eventTypes"]["PostToolUse"], 1);
    assert_eq!(shared["sessions"]["a"], 2);
}

#[test]
fn gaps_are_zero_filled() {
    let chart = ChartData::new(TimeRange::OneMinute);
    let series = chart.render(61_500);
    assert_eq!(series.len(), 60);
    assert!(series.iter().all(|b| *b == Bucket::empty(b.timestamp)));
    assert_eq!(series[0].timestamp, 2_000);
    assert_eq!(series[59].timestamp, 61_000);
}
