//! Ground probe data - Pure DOP
//!
//! NO METHODS. Just data.

use crate::registry::{SurfaceGeometry, SurfaceId};
use std::time::Instant;

/// Horizontal candidate surface copied out of the registry
#[derive(Debug, Clone, PartialEq)]
pub struct CachedSurface {
    pub surface: SurfaceId,
    pub geometry: SurfaceGeometry,
}

/// Terrain surface cache plus its rebuild bookkeeping
#[derive(Debug, Clone, Default)]
pub struct GroundProbeData {
    pub surfaces: Vec<CachedSurface>,
    pub last_rebuild: Option<Instant>,
    /// Registry terrain generation the cache was built from
    pub cached_generation: u64,
    pub rebuild_count: u64,
}

/// Everything a ground query needs for one call
pub struct GroundQuery<'a> {
    pub probe: &'a mut GroundProbeData,
    pub registry: &'a crate::registry::SceneRegistryData,
    pub config: &'a crate::config::GroundProbeConfig,
    pub now: Instant,
}
