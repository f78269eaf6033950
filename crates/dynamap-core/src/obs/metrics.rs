use serde::{Deserialize, Serialize};
use std::{cell::RefCell, cmp::Ordering, collections::BTreeMap};

///
/// EventState
/// Ephemeral, in-memory counters for store operations.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub entities: BTreeMap<String, EntityCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // Session entrypoints
    pub get_calls: u64,
    pub put_calls: u64,
    pub delete_calls: u64,
    pub query_calls: u64,
    pub failed_calls: u64,

    // Engine work
    pub keys_generated: u64,
    pub queries_built: u64,
    pub index_queries_built: u64,

    // Items moved
    pub items_written: u64,
    pub items_decoded: u64,
}

///
/// EntityCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EntityCounters {
    pub get_calls: u64,
    pub put_calls: u64,
    pub delete_calls: u64,
    pub query_calls: u64,
    pub failed_calls: u64,
    pub keys_generated: u64,
    pub items_written: u64,
    pub items_decoded: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

///
/// EventReport
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    pub counters: EventState,
    /// Per-entity counters with averages, busiest query paths first.
    pub entity_counters: Vec<EntitySummary>,
}

///
/// EntitySummary
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EntitySummary {
    pub path: String,
    pub get_calls: u64,
    pub put_calls: u64,
    pub delete_calls: u64,
    pub query_calls: u64,
    pub failed_calls: u64,
    pub items_decoded: u64,
    pub avg_items_per_query: f64,
}

/// Build a metrics report from the in-memory counters.
#[must_use]
#[expect(clippy::cast_precision_loss)]
pub(crate) fn report() -> EventReport {
    let snap = with_state(Clone::clone);

    let mut entity_counters: Vec<EntitySummary> = snap
        .entities
        .iter()
        .map(|(path, ops)| {
            let avg_items_per_query = if ops.query_calls > 0 {
                ops.items_decoded as f64 / ops.query_calls as f64
            } else {
                0.0
            };

            EntitySummary {
                path: path.clone(),
                get_calls: ops.get_calls,
                put_calls: ops.put_calls,
                delete_calls: ops.delete_calls,
                query_calls: ops.query_calls,
                failed_calls: ops.failed_calls,
                items_decoded: ops.items_decoded,
                avg_items_per_query,
            }
        })
        .collect();

    entity_counters.sort_by(|a, b| {
        b.avg_items_per_query
            .partial_cmp(&a.avg_items_per_query)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.items_decoded.cmp(&a.items_decoded))
            .then_with(|| a.path.cmp(&b.path))
    });

    EventReport {
        counters: snap,
        entity_counters,
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn reset_all_clears_state() {
        with_state_mut(|m| {
            m.ops.get_calls = 3;
            m.ops.keys_generated = 2;
            m.entities.insert(
                "alpha".to_string(),
                EntityCounters {
                    get_calls: 1,
                    ..Default::default()
                },
            );
        });

        reset_all();

        with_state(|m| {
            assert_eq!(m.ops.get_calls, 0);
            assert_eq!(m.ops.keys_generated, 0);
            assert!(m.entities.is_empty());
        });
    }

    #[test]
    fn report_sorts_entities_by_average_items() {
        reset_all();
        with_state_mut(|m| {
            m.entities.insert(
                "alpha".to_string(),
                EntityCounters {
                    query_calls: 2,
                    items_decoded: 6,
                    ..Default::default()
                },
            );
            m.entities.insert(
                "beta".to_string(),
                EntityCounters {
                    query_calls: 1,
                    items_decoded: 5,
                    ..Default::default()
                },
            );
            m.entities.insert(
                "gamma".to_string(),
                EntityCounters {
                    query_calls: 2,
                    items_decoded: 6,
                    ..Default::default()
                },
            );
        });

        let report = report();
        let paths: Vec<_> = report
            .entity_counters
            .iter()
            .map(|e| e.path.as_str())
            .collect();

        // avg items per query desc, then items decoded desc, then path asc
        assert_eq!(paths, ["beta", "alpha", "gamma"]);
        assert_eq!(report.entity_counters[0].avg_items_per_query, 5.0);
        assert_eq!(report.entity_counters[1].avg_items_per_query, 3.0);
    }
}
