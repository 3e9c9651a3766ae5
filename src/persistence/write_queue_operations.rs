//! Debounced write queue operations - Pure DOP functions
//!
//! Deltas for the same prim coalesce into one pending update. A prim is
//! flushed once no new delta arrived for the debounce window and no earlier
//! flush for it is still in flight. A rejected flush reloads the prim from
//! the store so the caller can discard its optimistic local state.

use super::prim_data::{PrimId, PrimUpdate};
use super::prim_operations::{is_empty_update, merge_updates};
use super::write_queue_data::{
    PendingWrite, WriteQueueData, WriteQueueEvent, WriteQueueStats, WriteResult,
};
use super::PrimStore;
use crate::config::PersistenceConfig;
use crate::tasks::TaskSpawner;
use futures::FutureExt;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub fn create_write_queue(config: &PersistenceConfig) -> WriteQueueData {
    let (results_tx, results_rx) = flume::unbounded();
    WriteQueueData {
        pending: FxHashMap::default(),
        in_flight: FxHashSet::default(),
        debounce: Duration::from_millis(config.debounce_ms),
        results_tx,
        results_rx,
        stats: WriteQueueStats::default(),
    }
}

// ============================================================================
// QUEUEING
// ============================================================================

/// Merge a delta into the prim's pending record and re-arm its deadline
pub fn queue_update(queue: &mut WriteQueueData, prim_id: PrimId, update: PrimUpdate, now: Instant) {
    if is_empty_update(&update) {
        return;
    }
    let deadline = now + queue.debounce;
    queue.stats.queued += 1;

    queue
        .pending
        .entry(prim_id)
        .and_modify(|pending| {
            pending.update = merge_updates(&pending.update, &update);
            pending.deadline = deadline;
            pending.coalesced += 1;
        })
        .or_insert(PendingWrite {
            update,
            deadline,
            first_queued: now,
            coalesced: 1,
        });
}

/// Drop a pending record without writing it
pub fn discard_pending(queue: &mut WriteQueueData, prim_id: PrimId) -> bool {
    queue.pending.remove(&prim_id).is_some()
}

pub fn pending_count(queue: &WriteQueueData) -> usize {
    queue.pending.len()
}

pub fn is_idle(queue: &WriteQueueData) -> bool {
    queue.pending.is_empty() && queue.in_flight.is_empty()
}

/// Prims whose deadline passed and that have no flush in flight
pub fn due_writes(queue: &WriteQueueData, now: Instant) -> Vec<PrimId> {
    let mut due: Vec<_> = queue
        .pending
        .iter()
        .filter(|(id, pending)| pending.deadline <= now && !queue.in_flight.contains(id))
        .map(|(id, _)| *id)
        .collect();
    due.sort_unstable();
    due
}

// ============================================================================
// FLUSHING
// ============================================================================

fn spawn_flush(
    queue: &mut WriteQueueData,
    prim_id: PrimId,
    store: &Arc<dyn PrimStore>,
    spawner: &dyn TaskSpawner,
) {
    let Some(pending) = queue.pending.remove(&prim_id) else {
        return;
    };
    queue.in_flight.insert(prim_id);
    queue.stats.flushed += 1;
    log::debug!(
        "[WriteQueue] Flushing prim {} ({} deltas coalesced)",
        prim_id,
        pending.coalesced
    );

    let store = Arc::clone(store);
    let tx = queue.results_tx.clone();
    let update = pending.update;
    spawner.spawn(
        async move {
            let result = match store.update_prim(prim_id, update).await {
                Ok(record) => WriteResult::Saved { prim_id, record },
                Err(error) => match store.fetch_prim(prim_id).await {
                    Ok(record) => WriteResult::Reloaded {
                        prim_id,
                        error: error.to_string(),
                        record,
                    },
                    Err(reload_error) => WriteResult::Failed {
                        prim_id,
                        error: error.to_string(),
                        reload_error: reload_error.to_string(),
                    },
                },
            };
            // Receiver gone means the engine shut down
            let _ = tx.send(result);
        }
        .boxed(),
    );
}

/// Flush every due prim. Returns the number of writes started.
pub fn flush_due(
    queue: &mut WriteQueueData,
    now: Instant,
    store: &Arc<dyn PrimStore>,
    spawner: &dyn TaskSpawner,
) -> usize {
    let due = due_writes(queue, now);
    for prim_id in &due {
        spawn_flush(queue, *prim_id, store, spawner);
    }
    due.len()
}

/// Flush everything not already in flight, ignoring deadlines
pub fn flush_all(
    queue: &mut WriteQueueData,
    store: &Arc<dyn PrimStore>,
    spawner: &dyn TaskSpawner,
) -> usize {
    let mut ids: Vec<_> = queue
        .pending
        .keys()
        .filter(|id| !queue.in_flight.contains(id))
        .copied()
        .collect();
    ids.sort_unstable();
    for prim_id in &ids {
        spawn_flush(queue, *prim_id, store, spawner);
    }
    ids.len()
}

/// Apply finished flushes. Never blocks.
pub fn poll_write_results(queue: &mut WriteQueueData) -> Vec<WriteQueueEvent> {
    let mut events = Vec::new();
    while let Ok(result) = queue.results_rx.try_recv() {
        match result {
            WriteResult::Saved { prim_id, .. } => {
                queue.in_flight.remove(&prim_id);
                queue.stats.saved += 1;
                events.push(WriteQueueEvent::Flushed { prim_id });
            }
            WriteResult::Reloaded {
                prim_id,
                error,
                record,
            } => {
                queue.in_flight.remove(&prim_id);
                // Later deltas were built on the rejected state
                queue.pending.remove(&prim_id);
                queue.stats.reloaded += 1;
                log::warn!(
                    "[WriteQueue] Flush for prim {} failed ({}); reloaded authoritative state",
                    prim_id,
                    error
                );
                events.push(WriteQueueEvent::Reloaded { prim_id, record });
            }
            WriteResult::Failed {
                prim_id,
                error,
                reload_error,
            } => {
                queue.in_flight.remove(&prim_id);
                queue.stats.failed += 1;
                log::warn!(
                    "[WriteQueue] Flush for prim {} failed ({}) and reload failed ({})",
                    prim_id,
                    error,
                    reload_error
                );
                events.push(WriteQueueEvent::Failed { prim_id, error });
            }
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::memory_store::{
        create_prim, create_region, get_prim, set_reject_updates, update_call_count,
    };
    use crate::persistence::{MemoryPrimStore, PrimShape, PrimTransform};
    use crate::tasks::test_support::DeferredSpawner;
    use crate::tasks::InlineSpawner;

    fn setup() -> (MemoryPrimStore, Arc<dyn PrimStore>, PrimId) {
        let memory = MemoryPrimStore::new();
        let region = create_region(&memory, "test", 0.0, 0.0, 15);
        let prim = create_prim(&memory, region.id, PrimShape::Box, &PrimTransform::default(), "#fff")
            .expect("Failed to create prim");
        let store: Arc<dyn PrimStore> = Arc::new(memory.clone());
        (memory, store, prim.id)
    }

    fn moved_x(x: f32) -> PrimUpdate {
        PrimUpdate {
            position_x: Some(x),
            ..PrimUpdate::default()
        }
    }

    #[test]
    fn test_deltas_coalesce_into_one_write() {
        let (memory, store, id) = setup();
        let mut queue = create_write_queue(&PersistenceConfig::default());
        let start = Instant::now();

        for i in 0..10 {
            queue_update(&mut queue, id, moved_x(i as f32), start + Duration::from_millis(i * 50));
        }
        // Deadline re-armed by the last delta at +450ms
        assert_eq!(flush_due(&mut queue, start + Duration::from_millis(800), &store, &InlineSpawner), 0);
        assert_eq!(flush_due(&mut queue, start + Duration::from_millis(850), &store, &InlineSpawner), 1);

        let events = poll_write_results(&mut queue);
        assert_eq!(events, vec![WriteQueueEvent::Flushed { prim_id: id }]);
        assert_eq!(update_call_count(&memory), 1);
        assert_eq!(get_prim(&memory, id).expect("prim").position[0], 9.0);
        assert!(is_idle(&queue));
    }

    #[test]
    fn test_no_second_flush_while_in_flight() {
        let (_memory, store, id) = setup();
        let mut queue = create_write_queue(&PersistenceConfig::default());
        let spawner = DeferredSpawner::default();
        let start = Instant::now();

        queue_update(&mut queue, id, moved_x(1.0), start);
        assert_eq!(flush_due(&mut queue, start + Duration::from_millis(400), &store, &spawner), 1);

        queue_update(&mut queue, id, moved_x(2.0), start + Duration::from_millis(410));
        assert_eq!(flush_due(&mut queue, start + Duration::from_millis(900), &store, &spawner), 0);

        spawner.run_all();
        poll_write_results(&mut queue);
        assert_eq!(flush_due(&mut queue, start + Duration::from_millis(900), &store, &spawner), 1);
    }

    #[test]
    fn test_failed_flush_reloads() {
        let (memory, store, id) = setup();
        set_reject_updates(&memory, true);
        let mut queue = create_write_queue(&PersistenceConfig::default());
        let start = Instant::now();

        queue_update(&mut queue, id, moved_x(5.0), start);
        flush_all(&mut queue, &store, &InlineSpawner);
        let events = poll_write_results(&mut queue);

        match &events[..] {
            [WriteQueueEvent::Reloaded { prim_id, record }] => {
                assert_eq!(*prim_id, id);
                assert_eq!(record.position[0], 0.0);
            }
            other => panic!("unexpected events {:?}", other),
        }
        assert_eq!(queue.stats.reloaded, 1);
    }

    #[test]
    fn test_failed_reload_reports_failure() {
        let (_memory, store, _id) = setup();
        let mut queue = create_write_queue(&PersistenceConfig::default());
        queue_update(&mut queue, 404, moved_x(1.0), Instant::now());
        flush_all(&mut queue, &store, &InlineSpawner);
        let events = poll_write_results(&mut queue);
        assert!(matches!(events[..], [WriteQueueEvent::Failed { prim_id: 404, .. }]));
    }

    #[test]
    fn test_empty_update_ignored() {
        let mut queue = create_write_queue(&PersistenceConfig::default());
        queue_update(&mut queue, 1, PrimUpdate::default(), Instant::now());
        assert_eq!(pending_count(&queue), 0);
    }
}
