//! Observability: runtime telemetry (metrics) and sink abstractions.
//!
//! Counters are per thread and ephemeral. Pure engine functions never
//! record; store-facing callers do.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EntityCounters, EntitySummary, EventOps, EventReport, EventState};
pub use sink::{
    ExecKind, MetricsEvent, MetricsSink, Span, metrics_report, metrics_reset_all, record,
    with_metrics_sink,
};
