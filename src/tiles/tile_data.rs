//! Tile LOD data structures - Pure DOP
//!
//! NO METHODS. Just data.
//! All transformations happen in tile_lod_operations.rs and
//! tile_cache_operations.rs

use super::tile_fetch::FetchError;
use image::RgbaImage;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Slippy-map tile address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
    pub zoom: u8,
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextureTier {
    /// 2x2 composite of the child tiles
    High,
    Medium,
    Low,
}

/// Cache key: one texture per tile per tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKey {
    pub coord: TileCoord,
    pub tier: TextureTier,
}

/// Opaque texture handle handed to the renderer
#[derive(Debug, Clone)]
pub struct TileTexture {
    pub key: TileKey,
    pub image: Arc<RgbaImage>,
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub texture: TileTexture,
    pub last_used: Instant,
}

/// Per visible tile. Discarded when the tile leaves the visible set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileLodState {
    /// Tier in effect; its texture is shown once cached
    pub current_tier: TextureTier,
    /// Tier whose fetch is in flight; decisions wait for it
    pub pending_tier: Option<TextureTier>,
    pub last_evaluated: Option<Instant>,
    pub last_distance: f32,
}

/// Maps tile coordinates onto the world XZ plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileLayout {
    /// Tile whose min corner sits at the world origin
    pub origin_x: i32,
    pub origin_y: i32,
    pub zoom: u8,
    pub tile_world_size: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleTile {
    pub coord: TileCoord,
    pub distance: f32,
}

/// Finished fetch, sent back to the tick
#[derive(Debug)]
pub struct FetchOutcome {
    pub key: TileKey,
    pub result: Result<RgbaImage, FetchError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TileEvent {
    TierChanged {
        coord: TileCoord,
        from: TextureTier,
        to: TextureTier,
    },
    Loaded(TileKey),
    FetchFailed {
        key: TileKey,
        error: String,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileUpdateReport {
    pub visible: usize,
    pub evaluated: usize,
    pub fetches_started: usize,
    pub discarded: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub bytes: usize,
    pub evictions: u64,
}

#[derive(Debug)]
pub struct TileLodData {
    pub states: FxHashMap<TileCoord, TileLodState>,
    pub cache: FxHashMap<TileKey, CacheEntry>,
    pub in_flight: FxHashSet<TileKey>,
    pub results_tx: flume::Sender<FetchOutcome>,
    pub results_rx: flume::Receiver<FetchOutcome>,
    pub evictions: u64,
}
