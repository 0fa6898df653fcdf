//! # Rolling event aggregator
//! Timer-driven wrapper around [`ChartData`].
//!
//! Submissions are queued and flushed by a debounce timer, so a burst of
//! events turns into one flush shortly after the last one. A background tick
//! prunes stale buckets and raw events for as long as the aggregator lives.
//! [`RollingEventAggregator::teardown`] stops the tick and flushes anything
//! still waiting.

use std::sync::{Arc, Mutex};

use metrics::{counter, gauge};
use tokio::{task::JoinHandle, time::MissedTickBehavior};

use crate::{
    chart::ChartData,
    clock::{Clock, SystemClock},
    config::AggregatorConfig,
    debounce::Debouncer,
    event::{Bucket, Event},
    range::{RangeConfig, TimeRange},
};

pub struct RollingEventAggregator {
    state: Arc<Mutex<ChartData>>,
    clock: Arc<dyn Clock>,
    cfg: AggregatorConfig,
    debounce: Debouncer,
    pruner: Option<JoinHandle<()>>,
}

impl RollingEventAggregator {
    /// Start an aggregator on the wall clock. Must be called from within a
    /// tokio runtime.
    pub fn start(cfg: AggregatorConfig) -> Self {
        Self::start_with_clock(cfg, SystemClock)
    }

    pub fn start_with_clock<C: Clock>(cfg: AggregatorConfig, clock: C) -> Self {
        let state = Arc::new(Mutex::new(ChartData::with_retention(
            cfg.default_range,
            cfg.retention_ms,
        )));
        let clock: Arc<dyn Clock> = Arc::new(clock);
        let pruner = spawn_pruner(state.clone(), clock.clone(), cfg.prune_interval());

        tracing::info!(
            target: "chart",
            range = %cfg.default_range,
            debounce_ms = cfg.debounce_ms,
            prune_interval_ms = cfg.prune_interval_ms,
            "aggregator started"
        );

        Self {
            state,
            clock,
            cfg,
            debounce: Debouncer::new(),
            pruner: Some(pruner),
        }
    }

    /// Queue an event and (re)arm the debounce timer.
    pub fn submit(&mut self, event: Event) {
        self.lock().enqueue(event);
        counter!("chart_events_submitted_total").increment(1);

        let state = self.state.clone();
        let clock = self.clock.clone();
        self.debounce.arm(self.cfg.debounce(), async move {
            flush(&state, clock.as_ref());
        });
    }

    /// Switch the look-back window and rebuild buckets from retained events.
    pub fn set_range(&mut self, range: TimeRange) {
        let now = self.clock.now_ms();
        let mut st = self.lock();
        let previous = st.range();
        st.set_range(range, now);
        let live = st.buckets().len();
        drop(st);

        counter!("chart_range_switches_total").increment(1);
        gauge!("chart_live_buckets").set(live as f64);
        tracing::info!(
            target: "chart",
            from = %previous,
            to = %range,
            live_buckets = live,
            "time range switched"
        );
    }

    /// Gap-filled series for the current window, ready to plot.
    pub fn render(&self) -> Vec<Bucket> {
        let now = self.clock.now_ms();
        self.lock().render(now)
    }

    pub fn time_range(&self) -> TimeRange {
        self.lock().range()
    }

    pub fn current_config(&self) -> RangeConfig {
        self.lock().config()
    }

    /// Snapshot of the live buckets in insertion order.
    pub fn data_points(&self) -> Vec<Bucket> {
        self.lock().buckets().to_vec()
    }

    pub fn retained_events(&self) -> usize {
        self.lock().retained_events().len()
    }

    pub fn pending_len(&self) -> usize {
        self.lock().pending_len()
    }

    pub fn flush_count(&self) -> u64 {
        self.lock().flush_count()
    }

    /// Stop periodic pruning and flush whatever a pending debounce would
    /// have flushed. Safe to call more than once.
    pub fn teardown(&mut self) {
        if let Some(pruner) = self.pruner.take() {
            pruner.abort();
        }
        let flushed = if self.debounce.cancel() {
            flush(&self.state, self.clock.as_ref());
            true
        } else {
            false
        };
        tracing::info!(target: "chart", flushed_pending = flushed, "aggregator torn down");
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ChartData> {
        self.state.lock().expect("chart state mutex poisoned")
    }
}

impl Drop for RollingEventAggregator {
    fn drop(&mut self) {
        if let Some(pruner) = self.pruner.take() {
            pruner.abort();
        }
    }
}

fn flush(state: &Mutex<ChartData>, clock: &dyn Clock) {
    let now = clock.now_ms();
    let mut st = state.lock().expect("chart state mutex poisoned");
    let out = st.flush(now);
    let live = st.buckets().len();
    let retained = st.retained_events().len();
    drop(st);

    counter!("chart_flushes_total").increment(1);
    if out.skipped > 0 {
        counter!("chart_events_dropped_total").increment(out.skipped as u64);
    }
    gauge!("chart_live_buckets").set(live as f64);
    gauge!("chart_retained_events").set(retained as f64);
    tracing::debug!(
        target: "chart",
        bucketed = out.bucketed,
        skipped = out.skipped,
        live_buckets = live,
        retained,
        "flushed pending events"
    );
}

fn spawn_pruner(
    state: Arc<Mutex<ChartData>>,
    clock: Arc<dyn Clock>,
    period: std::time::Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let now = clock.now_ms();
            let (live, retained) = {
                let mut st = state.lock().expect("chart state mutex poisoned");
                st.prune_buckets(now);
                st.prune_events(now);
                (st.buckets().len(), st.retained_events().len())
            };
            gauge!("chart_live_buckets").set(live as f64);
            gauge!("chart_retained_events").set(retained as f64);
            tracing::trace!(target: "chart", live_buckets = live, retained, "prune tick");
        }
    })
}
