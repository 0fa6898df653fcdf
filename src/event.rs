//! Incoming events and the per-bucket aggregates built from them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

fn default_session() -> String {
    "unknown".to_string()
}

/// A single event as emitted by the hook sender.
///
/// Only `timestamp`, `event_type` and `session_id` take part in aggregation;
/// the remaining fields are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Milliseconds since the UNIX epoch. `None` or `0` means "no timestamp".
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(rename = "hook_event_type", alias = "event_type")]
    pub event_type: String,
    #[serde(default = "default_session")]
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_app: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub payload: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl Event {
    pub fn new(timestamp: i64, event_type: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            timestamp: Some(timestamp),
            event_type: event_type.into(),
            session_id: session_id.into(),
            source_app: None,
            payload: serde_json::Value::Null,
            summary: None,
        }
    }

    /// Timestamp usable for bucketing; a zero timestamp counts as missing.
    pub fn timestamp_ms(&self) -> Option<i64> {
        self.timestamp.filter(|&t| t != 0)
    }
}

/// One fixed-width time slot of the chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    /// Bucket-aligned start time (ms).
    pub timestamp: i64,
    pub count: u64,
    pub event_types: BTreeMap<String, u64>,
    pub sessions: BTreeMap<String, u64>,
}

impl Bucket {
    /// Zero-count bucket used to fill gaps in a rendered series.
    pub fn empty(timestamp: i64) -> Self {
        Self {
            timestamp,
            ..Self::default()
        }
    }

    pub(crate) fn first(timestamp: i64, ev: &Event) -> Self {
        let mut b = Self::empty(timestamp);
        b.record(ev);
        b
    }

    pub(crate) fn record(&mut self, ev: &Event) {
        self.count += 1;
        *self.event_types.entry(ev.event_type.clone()).or_insert(0) += 1;
        *self.sessions.entry(ev.session_id.clone()).or_insert(0) += 1;
    }
}
