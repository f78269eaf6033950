//! Metrics sink boundary.
//!
//! Key, codec and query functions stay pure and never record anything.
//! Callers that execute store operations report through MetricsEvent and
//! MetricsSink; this module is the only bridge to the global metrics state.
use crate::obs::metrics::{self, EventReport, EventState};
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = RefCell::new(None);
}

///
/// ExecKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExecKind {
    Get,
    Put,
    Delete,
    Query,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent<'a> {
    ExecStart {
        kind: ExecKind,
        entity_path: &'a str,
    },
    ExecFinish {
        kind: ExecKind,
        entity_path: &'a str,
        items: u64,
    },
    ExecFailed {
        kind: ExecKind,
        entity_path: &'a str,
    },
    KeysGenerated {
        entity_path: &'a str,
    },
    ItemsDecoded {
        entity_path: &'a str,
        items: u64,
    },
    QueryBuilt {
        index: bool,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent<'_>);
}

/// GlobalMetricsSink
/// Default thread-local sink that writes into global metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent<'_>) {
        metrics::with_state_mut(|m| apply(m, event));
    }
}

fn apply(m: &mut EventState, event: MetricsEvent<'_>) {
    match event {
        MetricsEvent::ExecStart { kind, entity_path } => {
            let entry = m.entities.entry(entity_path.to_string()).or_default();
            match kind {
                ExecKind::Get => {
                    m.ops.get_calls = m.ops.get_calls.saturating_add(1);
                    entry.get_calls = entry.get_calls.saturating_add(1);
                }
                ExecKind::Put => {
                    m.ops.put_calls = m.ops.put_calls.saturating_add(1);
                    entry.put_calls = entry.put_calls.saturating_add(1);
                }
                ExecKind::Delete => {
                    m.ops.delete_calls = m.ops.delete_calls.saturating_add(1);
                    entry.delete_calls = entry.delete_calls.saturating_add(1);
                }
                ExecKind::Query => {
                    m.ops.query_calls = m.ops.query_calls.saturating_add(1);
                    entry.query_calls = entry.query_calls.saturating_add(1);
                }
            }
        }

        MetricsEvent::ExecFinish {
            kind,
            entity_path,
            items,
        } => {
            if kind == ExecKind::Put {
                m.ops.items_written = m.ops.items_written.saturating_add(items);
                let entry = m.entities.entry(entity_path.to_string()).or_default();
                entry.items_written = entry.items_written.saturating_add(items);
            }
        }

        MetricsEvent::ExecFailed { entity_path, .. } => {
            m.ops.failed_calls = m.ops.failed_calls.saturating_add(1);
            let entry = m.entities.entry(entity_path.to_string()).or_default();
            entry.failed_calls = entry.failed_calls.saturating_add(1);
        }

        MetricsEvent::KeysGenerated { entity_path } => {
            m.ops.keys_generated = m.ops.keys_generated.saturating_add(1);
            let entry = m.entities.entry(entity_path.to_string()).or_default();
            entry.keys_generated = entry.keys_generated.saturating_add(1);
        }

        MetricsEvent::ItemsDecoded { entity_path, items } => {
            m.ops.items_decoded = m.ops.items_decoded.saturating_add(items);
            let entry = m.entities.entry(entity_path.to_string()).or_default();
            entry.items_decoded = entry.items_decoded.saturating_add(items);
        }

        MetricsEvent::QueryBuilt { index } => {
            m.ops.queries_built = m.ops.queries_built.saturating_add(1);
            if index {
                m.ops.index_queries_built = m.ops.index_queries_built.saturating_add(1);
            }
        }
    }
}

/// Record one event on the current sink.
pub fn record(event: MetricsEvent<'_>) {
    // clone out of the slot so a sink may itself install overrides
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());

    match sink {
        Some(sink) => sink.record(event),
        None => GlobalMetricsSink.record(event),
    }
}

/// Snapshot the current thread's metrics state.
#[must_use]
pub fn metrics_report() -> EventReport {
    metrics::report()
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

/// Span
/// RAII guard that emits start/finish events for one store operation.
/// A span dropped without `finish` records a failure, so `?` exits count.

pub struct Span<'a> {
    kind: ExecKind,
    entity_path: &'a str,
    items: u64,
    finished: bool,
}

impl<'a> Span<'a> {
    /// Start a span for one entity path and operation kind.
    #[must_use]
    pub fn new(kind: ExecKind, entity_path: &'a str) -> Self {
        record(MetricsEvent::ExecStart { kind, entity_path });

        Self {
            kind,
            entity_path,
            items: 0,
            finished: false,
        }
    }

    pub const fn set_items(&mut self, items: u64) {
        self.items = items;
    }

    /// Close the span as a success.
    pub fn finish(mut self) {
        self.finished = true;
        record(MetricsEvent::ExecFinish {
            kind: self.kind,
            entity_path: self.entity_path,
            items: self.items,
        });
    }
}

impl Drop for Span<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.finished = true;
            record(MetricsEvent::ExecFailed {
                kind: self.kind,
                entity_path: self.entity_path,
            });
        }
    }
}
