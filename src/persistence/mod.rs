//! Persistence Module - debounced delta writes to the storage collaborator
//!
//! The engine does not implement storage. It emits partial prim updates,
//! coalesced per prim and flushed after an idle window, through the
//! `PrimStore` trait. `MemoryPrimStore` is a complete in-process store.

// Data modules
pub mod prim_data;
pub mod write_queue_data;

// Operations modules
pub mod memory_store;
pub mod prim_operations;
pub mod write_queue_operations;

pub use memory_store::MemoryPrimStore;
pub use prim_data::{PrimId, PrimRecord, PrimShape, PrimTransform, PrimUpdate, RegionId, RegionRecord};
pub use prim_operations::{
    apply_update, diff_transform, is_empty_update, merge_updates, record_transform,
    set_record_transform, validate_update,
};
pub use write_queue_data::{PendingWrite, WriteQueueData, WriteQueueEvent, WriteQueueStats, WriteResult};
pub use write_queue_operations::{
    create_write_queue, discard_pending, due_writes, flush_all, flush_due, is_idle, pending_count,
    poll_write_results, queue_update,
};

use futures::future::BoxFuture;

pub type PersistenceResult<T> = Result<T, PersistenceError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PersistenceError {
    #[error("Update rejected for prim {prim_id}: {reason}")]
    UpdateRejected { prim_id: PrimId, reason: String },
    #[error("Prim not found: {0}")]
    PrimNotFound(PrimId),
    #[error("Region not found: {0}")]
    RegionNotFound(RegionId),
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Storage collaborator for prim records
pub trait PrimStore: Send + Sync {
    /// Apply a partial update and return the stored record
    fn update_prim(&self, id: PrimId, update: PrimUpdate) -> BoxFuture<'static, PersistenceResult<PrimRecord>>;

    /// Authoritative current record
    fn fetch_prim(&self, id: PrimId) -> BoxFuture<'static, PersistenceResult<PrimRecord>>;
}
