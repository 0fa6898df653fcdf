//! Demo that pushes a few bursts of synthetic events through the aggregator
//! and prints the rendered chart series as JSON.

use std::time::Duration;

use chrono::Utc;
use event_chart_aggregator::{AggregatorConfig, Event, RollingEventAggregator, TimeRange};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; CHART_CONFIG_PATH may come from there.
    let _ = dotenvy::dotenv();
    event_chart_aggregator::init_tracing();

    let cfg = AggregatorConfig::load_default()?;
    let mut agg = RollingEventAggregator::start(cfg);

    let kinds = ["PreToolUse", "PostToolUse", "Notification", "Stop"];
    let sessions = ["s-alpha", "s-beta"];

    for burst in 0..4 {
        let now = Utc::now().timestamp_millis();
        for i in 0..8usize {
            let ev = Event::new(
                now - (i as i64) * 700,
                kinds[(burst + i) % kinds.len()],
                sessions[i % sessions.len()],
            );
            agg.submit(ev);
        }
        tokio::time::sleep(Duration::from_millis(400)).await;
    }

    agg.set_range(TimeRange::ThreeMinutes);

    let series = agg.render();
    let non_empty: Vec<_> = series.iter().filter(|b| b.count > 0).collect();
    println!("{}", serde_json::to_string_pretty(&non_empty)?);
    println!(
        "range={} points={} live_buckets={} retained_events={}",
        agg.time_range(),
        series.len(),
        agg.data_points().len(),
        agg.retained_events()
    );

    agg.teardown();
    Ok(())
}
