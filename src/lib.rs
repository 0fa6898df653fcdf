// src/lib.rs
// Public library surface for integration tests and the demo binary.

pub mod aggregator;
pub mod chart;
pub mod clock;
pub mod config;
pub mod debounce;
pub mod event;
pub mod range;

// ---- Re-exports for stable public API ----
pub use crate::aggregator::RollingEventAggregator;
pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::config::AggregatorConfig;
pub use crate::event::{Bucket, Event};
pub use crate::range::{RangeConfig, TimeRange};

/// Initialise compact `tracing` output for binaries.
/// Honours `RUST_LOG`; defaults to `chart=info,warn`.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chart=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}
