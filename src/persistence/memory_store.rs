//! In-process `PrimStore`
//!
//! Complete region/prim CRUD behind a `parking_lot::RwLock`. Used by the demo
//! and by tests; can be switched to reject updates to exercise self-healing.

use super::prim_data::{PrimId, PrimRecord, PrimShape, PrimTransform, PrimUpdate, RegionId, RegionRecord};
use super::prim_operations::{apply_update, record_transform, set_record_transform, validate_update};
use super::{PersistenceError, PersistenceResult, PrimStore};
use futures::future::{self, BoxFuture, FutureExt};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
struct MemoryStoreState {
    regions: FxHashMap<RegionId, RegionRecord>,
    prims: FxHashMap<PrimId, PrimRecord>,
    next_region_id: RegionId,
    next_prim_id: PrimId,
    reject_updates: bool,
    update_calls: u64,
}

/// Cheap to clone; clones share the same records
#[derive(Debug, Clone, Default)]
pub struct MemoryPrimStore {
    state: Arc<RwLock<MemoryStoreState>>,
}

impl MemoryPrimStore {
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// CRUD
// ============================================================================

pub fn create_region(
    store: &MemoryPrimStore,
    name: &str,
    center_lat: f64,
    center_lon: f64,
    zoom: u8,
) -> RegionRecord {
    let mut state = store.state.write();
    state.next_region_id += 1;
    let record = RegionRecord {
        id: state.next_region_id,
        name: name.to_string(),
        center_lat,
        center_lon,
        zoom,
    };
    state.regions.insert(record.id, record.clone());
    record
}

pub fn list_regions(store: &MemoryPrimStore) -> Vec<RegionRecord> {
    let mut regions: Vec<_> = store.state.read().regions.values().cloned().collect();
    regions.sort_by_key(|r| r.id);
    regions
}

pub fn create_prim(
    store: &MemoryPrimStore,
    region_id: RegionId,
    shape: PrimShape,
    transform: &PrimTransform,
    color: &str,
) -> PersistenceResult<PrimRecord> {
    let mut state = store.state.write();
    if !state.regions.contains_key(&region_id) {
        return Err(PersistenceError::RegionNotFound(region_id));
    }
    state.next_prim_id += 1;
    let mut record = PrimRecord {
        id: state.next_prim_id,
        region_id,
        shape,
        position: [0.0; 3],
        rotation: [0.0; 3],
        scale: [1.0; 3],
        color: color.to_string(),
    };
    set_record_transform(&mut record, transform);
    state.prims.insert(record.id, record.clone());
    Ok(record)
}

pub fn get_prim(store: &MemoryPrimStore, id: PrimId) -> Option<PrimRecord> {
    store.state.read().prims.get(&id).cloned()
}

pub fn list_prims(store: &MemoryPrimStore, region_id: RegionId) -> Vec<PrimRecord> {
    let mut prims: Vec<_> = store
        .state
        .read()
        .prims
        .values()
        .filter(|p| p.region_id == region_id)
        .cloned()
        .collect();
    prims.sort_by_key(|p| p.id);
    prims
}

pub fn delete_prim(store: &MemoryPrimStore, id: PrimId) -> bool {
    store.state.write().prims.remove(&id).is_some()
}

/// Make every subsequent `update_prim` fail (or succeed again)
pub fn set_reject_updates(store: &MemoryPrimStore, reject: bool) {
    store.state.write().reject_updates = reject;
}

pub fn update_call_count(store: &MemoryPrimStore) -> u64 {
    store.state.read().update_calls
}

fn update_sync(store: &MemoryPrimStore, id: PrimId, update: &PrimUpdate) -> PersistenceResult<PrimRecord> {
    let mut state = store.state.write();
    state.update_calls += 1;
    if state.reject_updates {
        return Err(PersistenceError::UpdateRejected {
            prim_id: id,
            reason: "store is rejecting updates".to_string(),
        });
    }
    validate_update(update).map_err(|reason| PersistenceError::UpdateRejected { prim_id: id, reason })?;

    let record = state.prims.get_mut(&id).ok_or(PersistenceError::PrimNotFound(id))?;
    let transform = apply_update(&record_transform(record), update);
    set_record_transform(record, &transform);
    Ok(record.clone())
}

impl PrimStore for MemoryPrimStore {
    fn update_prim(&self, id: PrimId, update: PrimUpdate) -> BoxFuture<'static, PersistenceResult<PrimRecord>> {
        future::ready(update_sync(self, id, &update)).boxed()
    }

    fn fetch_prim(&self, id: PrimId) -> BoxFuture<'static, PersistenceResult<PrimRecord>> {
        future::ready(get_prim(self, id).ok_or(PersistenceError::PrimNotFound(id))).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Point3;
    use futures::executor::block_on;

    fn store_with_prim() -> (MemoryPrimStore, PrimRecord) {
        let store = MemoryPrimStore::new();
        let region = create_region(&store, "harbor", 37.8, -122.4, 16);
        let transform = PrimTransform {
            position: Point3::new(1.0, 0.0, -3.0),
            ..PrimTransform::default()
        };
        let prim = create_prim(&store, region.id, PrimShape::Box, &transform, "#cccccc")
            .expect("Failed to create prim");
        (store, prim)
    }

    #[test]
    fn test_update_applies_only_set_fields() {
        let (store, prim) = store_with_prim();
        let update = PrimUpdate {
            position_y: Some(4.0),
            ..PrimUpdate::default()
        };
        let record = block_on(store.update_prim(prim.id, update)).expect("Failed to update");
        assert_eq!(record.position, [1.0, 4.0, -3.0]);
        assert_eq!(get_prim(&store, prim.id).expect("prim").position, [1.0, 4.0, -3.0]);
    }

    #[test]
    fn test_rejecting_store() {
        let (store, prim) = store_with_prim();
        set_reject_updates(&store, true);
        let result = block_on(store.update_prim(prim.id, PrimUpdate::default()));
        assert!(matches!(result, Err(PersistenceError::UpdateRejected { .. })));
        assert_eq!(update_call_count(&store), 1);
        // Reads still work
        assert!(block_on(store.fetch_prim(prim.id)).is_ok());
    }

    #[test]
    fn test_prim_requires_region() {
        let store = MemoryPrimStore::new();
        let result = create_prim(&store, 99, PrimShape::Sphere, &PrimTransform::default(), "#fff");
        assert!(matches!(result, Err(PersistenceError::RegionNotFound(99))));
    }

    #[test]
    fn test_list_and_delete() {
        let (store, prim) = store_with_prim();
        assert_eq!(list_prims(&store, prim.region_id).len(), 1);
        assert_eq!(list_regions(&store).len(), 1);
        assert!(delete_prim(&store, prim.id));
        assert!(list_prims(&store, prim.region_id).is_empty());
        assert!(matches!(
            block_on(store.fetch_prim(prim.id)),
            Err(PersistenceError::PrimNotFound(_))
        ));
    }
}
