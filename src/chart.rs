//! # Chart data
//! Synchronous core of the rolling aggregator.
//!
//! Holds the live buckets, the raw-event retention buffer and the queue of
//! events waiting for the next flush. Every operation takes `now_ms`
//! explicitly; timers live in [`crate::aggregator`].

use crate::event::{Bucket, Event};
use crate::range::{RangeConfig, TimeRange};

/// Raw events are kept this long regardless of the active range (5 min).
pub const DEFAULT_RETENTION_MS: i64 = 5 * 60 * 1000;

/// Result of a single flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushOutcome {
    /// Events bucketed.
    pub bucketed: usize,
    /// Events without a timestamp (queued and retained, never bucketed).
    pub skipped: usize,
}

#[derive(Debug)]
pub struct ChartData {
    range: TimeRange,
    /// Live buckets in insertion order.
    buckets: Vec<Bucket>,
    /// Raw events kept for re-aggregation on range switch.
    events: Vec<Event>,
    pending: Vec<Event>,
    retention_ms: i64,
    flushes: u64,
}

impl Default for ChartData {
    fn default() -> Self {
        Self::new(TimeRange::default())
    }
}

impl ChartData {
    pub fn new(range: TimeRange) -> Self {
        Self::with_retention(range, DEFAULT_RETENTION_MS)
    }

    pub fn with_retention(range: TimeRange, retention_ms: i64) -> Self {
        Self {
            range,
            buckets: Vec::new(),
            events: Vec::new(),
            pending: Vec::new(),
            retention_ms,
            flushes: 0,
        }
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    pub fn config(&self) -> RangeConfig {
        self.range.config()
    }

    /// Live buckets in the order they were first created.
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn retained_events(&self) -> &[Event] {
        &self.events
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of flushes run so far.
    pub fn flush_count(&self) -> u64 {
        self.flushes
    }

    /// Queue an event for the next flush. No validation happens here.
    pub fn enqueue(&mut self, event: Event) {
        self.pending.push(event);
    }

    /// Take ownership of everything queued, leaving the queue empty.
    pub fn take_pending(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.pending)
    }

    /// Drain the pending queue into buckets, then prune buckets and events.
    pub fn flush(&mut self, now_ms: i64) -> FlushOutcome {
        let batch = self.take_pending();
        self.flushes += 1;
        let mut outcome = FlushOutcome::default();

        for ev in &batch {
            if self.bucketize(ev) {
                outcome.bucketed += 1;
            } else {
                outcome.skipped += 1;
            }
        }
        self.events.extend(batch);

        self.prune_buckets(now_ms);
        self.prune_events(now_ms);
        outcome
    }

    /// Drop buckets outside the look-back window, then cap the count by
    /// keeping the most recently created ones.
    pub fn prune_buckets(&mut self, now_ms: i64) {
        let cfg = self.config();
        let cutoff = now_ms - cfg.duration;
        self.buckets.retain(|b| b.timestamp >= cutoff);

        if self.buckets.len() > cfg.max_points {
            let excess = self.buckets.len() - cfg.max_points;
            self.buckets.drain(0..excess);
        }
    }

    /// Drop raw events older than the retention window. Events without a
    /// timestamp go too.
    pub fn prune_events(&mut self, now_ms: i64) {
        let cutoff = now_ms - self.retention_ms;
        self.events
            .retain(|ev| ev.timestamp_ms().is_some_and(|t| t >= cutoff));
    }

    /// Dense, ascending, gap-filled series for the current window.
    pub fn render(&self, now_ms: i64) -> Vec<Bucket> {
        let cfg = self.config();
        let start = now_ms - cfg.duration;

        let mut out = Vec::with_capacity((cfg.duration / cfg.bucket_size) as usize + 1);
        let mut t = start;
        while t <= now_ms {
            let ts = cfg.bucket_start(t);
            let bucket = self
                .find(ts)
                .cloned()
                .unwrap_or_else(|| Bucket::empty(ts));
            out.push(bucket);
            t += cfg.bucket_size;
        }

        if out.len() > cfg.max_points {
            let excess = out.len() - cfg.max_points;
            out.drain(0..excess);
        }
        out
    }

    /// Switch range and rebuild buckets from the retained events that fall
    /// inside the new window.
    pub fn set_range(&mut self, range: TimeRange, now_ms: i64) {
        self.range = range;
        self.buckets.clear();

        let cutoff = now_ms - self.config().duration;
        let relevant: Vec<Event> = self
            .events
            .iter()
            .filter(|ev| ev.timestamp_ms().is_some_and(|t| t >= cutoff))
            .cloned()
            .collect();
        for ev in &relevant {
            self.bucketize(ev);
        }

        self.prune_buckets(now_ms);
    }

    /// Returns `false` when the event has no usable timestamp.
    fn bucketize(&mut self, ev: &Event) -> bool {
        let Some(ts) = ev.timestamp_ms() else {
            return false;
        };
        let bucket_ts = self.config().bucket_start(ts);

        match self.buckets.iter_mut().find(|b| b.timestamp == bucket_ts) {
            Some(b) => b.record(ev),
            None => self.buckets.push(Bucket::first(bucket_ts, ev)),
        }
        true
    }

    fn find(&self, bucket_ts: i64) -> Option<&Bucket> {
        self.buckets.iter().find(|b| b.timestamp == bucket_ts)
    }
}
