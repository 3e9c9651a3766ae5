/// Tile LOD Module - Data-Oriented Programming (DOP) style
///
/// - tile_data.rs: tiers, per-tile state, cache entries (NO methods)
/// - tile_fetch.rs: asset collaborator and tier composition
/// - tile_lod_operations.rs: hysteresis, evaluation, fetch results
/// - tile_cache_operations.rs: texture cache and eviction

pub mod tile_cache_operations;
pub mod tile_data;
pub mod tile_fetch;
pub mod tile_lod_operations;

// Re-export data structures
pub use tile_data::{
    CacheEntry, CacheStats, TextureTier, TileCoord, TileEvent, TileKey, TileLayout, TileLodData,
    TileLodState, TileTexture, TileUpdateReport, VisibleTile,
};

pub use tile_fetch::{child_tiles, composite_quad, fetch_tier_image, FetchError, TileFetcher};

// Re-export operations
pub use tile_lod_operations::{
    create_tile_lod, initial_tier, is_tile_in_flight, next_tier, poll_fetches, request_fetch,
    texture_for_tile, tile_at, tile_center, tile_tier, update_visible_tiles, visible_tiles_around,
};

pub use tile_cache_operations::{
    cache_contains, cache_get, cache_insert, cache_stats, clear_cache, enforce_cache_limit, evict,
    evict_tile,
};
