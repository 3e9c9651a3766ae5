//! Physics Module - ray casts and the ground probe
//!
//! The engine needs no simulation beyond a single downward probe, so this
//! module is limited to ray/shape intersection and the terrain surface cache.

pub mod aabb;
pub mod ground_probe_data;
pub mod ground_probe_operations;
pub mod ray;

pub use aabb::AABB;
pub use ground_probe_data::{CachedSurface, GroundProbeData, GroundQuery};
pub use ground_probe_operations::{
    create_ground_probe, highest_surface_hit, needs_rebuild, probe_ground_height,
    rebuild_surface_cache, refresh_surface_cache,
};
pub use ray::{Ray, RayHit};
