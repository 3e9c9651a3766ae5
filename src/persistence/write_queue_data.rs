//! Debounced write queue data - Pure DOP
//!
//! NO METHODS. Just data.
//! One pending record per prim with a deadline that is pushed back on every
//! new delta; the tick flushes records whose deadline passed.

use super::prim_data::{PrimId, PrimRecord, PrimUpdate};
use rustc_hash::{FxHashMap, FxHashSet};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingWrite {
    pub update: PrimUpdate,
    pub deadline: Instant,
    pub first_queued: Instant,
    /// Deltas merged into this record
    pub coalesced: u32,
}

/// Result of one background flush, sent back to the tick
#[derive(Debug, Clone, PartialEq)]
pub enum WriteResult {
    Saved {
        prim_id: PrimId,
        record: PrimRecord,
    },
    /// Update failed; authoritative state was fetched instead
    Reloaded {
        prim_id: PrimId,
        error: String,
        record: PrimRecord,
    },
    /// Update and reload both failed
    Failed {
        prim_id: PrimId,
        error: String,
        reload_error: String,
    },
}

/// What the engine should react to after polling
#[derive(Debug, Clone, PartialEq)]
pub enum WriteQueueEvent {
    Flushed { prim_id: PrimId },
    /// Local optimistic state must be replaced by `record`
    Reloaded { prim_id: PrimId, record: PrimRecord },
    Failed { prim_id: PrimId, error: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct WriteQueueStats {
    pub queued: u64,
    pub flushed: u64,
    pub saved: u64,
    pub reloaded: u64,
    pub failed: u64,
}

#[derive(Debug)]
pub struct WriteQueueData {
    pub pending: FxHashMap<PrimId, PendingWrite>,
    pub in_flight: FxHashSet<PrimId>,
    pub debounce: Duration,
    pub results_tx: flume::Sender<WriteResult>,
    pub results_rx: flume::Receiver<WriteResult>,
    pub stats: WriteQueueStats,
}
