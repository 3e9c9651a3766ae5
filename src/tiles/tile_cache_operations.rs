//! Tile texture cache - Pure DOP functions
//!
//! Keyed by (tile, tier). Unbounded unless a limit is configured, in which
//! case the least recently used entries go first.

use super::tile_data::{CacheEntry, CacheStats, TextureTier, TileCoord, TileKey, TileLodData, TileTexture};
use std::time::Instant;

pub fn cache_contains(lod: &TileLodData, key: &TileKey) -> bool {
    lod.cache.contains_key(key)
}

/// Look up a texture and mark it as used
pub fn cache_get(lod: &mut TileLodData, key: &TileKey, now: Instant) -> Option<TileTexture> {
    let entry = lod.cache.get_mut(key)?;
    entry.last_used = now;
    Some(entry.texture.clone())
}

pub fn cache_insert(
    lod: &mut TileLodData,
    texture: TileTexture,
    now: Instant,
    max_entries: Option<usize>,
) {
    lod.cache.insert(
        texture.key,
        CacheEntry {
            texture,
            last_used: now,
        },
    );
    if let Some(limit) = max_entries {
        enforce_cache_limit(lod, limit);
    }
}

/// Drop least recently used entries until at most `limit` remain.
/// Textures for a tile's current tier are evicted last.
pub fn enforce_cache_limit(lod: &mut TileLodData, limit: usize) -> usize {
    let excess = lod.cache.len().saturating_sub(limit);
    if excess == 0 {
        return 0;
    }

    let mut candidates: Vec<(bool, Instant, TileKey)> = lod
        .cache
        .iter()
        .map(|(key, entry)| {
            let in_use = lod
                .states
                .get(&key.coord)
                .is_some_and(|state| state.current_tier == key.tier);
            (in_use, entry.last_used, *key)
        })
        .collect();
    candidates.sort();

    for (_, _, key) in candidates.into_iter().take(excess) {
        lod.cache.remove(&key);
    }
    lod.evictions += excess as u64;
    log::debug!("[TileCache] Evicted {} textures", excess);
    excess
}

pub fn evict(lod: &mut TileLodData, key: &TileKey) -> bool {
    let removed = lod.cache.remove(key).is_some();
    if removed {
        lod.evictions += 1;
    }
    removed
}

/// Drop every tier of one tile
pub fn evict_tile(lod: &mut TileLodData, coord: TileCoord) -> usize {
    let before = lod.cache.len();
    lod.cache.retain(|key, _| key.coord != coord);
    let removed = before - lod.cache.len();
    lod.evictions += removed as u64;
    removed
}

pub fn clear_cache(lod: &mut TileLodData) {
    lod.evictions += lod.cache.len() as u64;
    lod.cache.clear();
}

pub fn cache_stats(lod: &TileLodData) -> CacheStats {
    let mut stats = CacheStats {
        entries: lod.cache.len(),
        evictions: lod.evictions,
        ..CacheStats::default()
    };
    for (key, entry) in &lod.cache {
        match key.tier {
            TextureTier::High => stats.high += 1,
            TextureTier::Medium => stats.medium += 1,
            TextureTier::Low => stats.low += 1,
        }
        stats.bytes += entry.texture.image.as_raw().len();
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::tile_lod_operations::create_tile_lod;
    use image::RgbaImage;
    use std::sync::Arc;
    use std::time::Duration;

    fn texture(x: i32, tier: TextureTier) -> TileTexture {
        TileTexture {
            key: TileKey {
                coord: TileCoord { x, y: 0, zoom: 16 },
                tier,
            },
            image: Arc::new(RgbaImage::new(4, 4)),
        }
    }

    #[test]
    fn test_unbounded_by_default() {
        let mut lod = create_tile_lod();
        let now = Instant::now();
        for x in 0..50 {
            cache_insert(&mut lod, texture(x, TextureTier::Medium), now, None);
        }
        let stats = cache_stats(&lod);
        assert_eq!(stats.entries, 50);
        assert_eq!(stats.medium, 50);
        assert_eq!(stats.bytes, 50 * 4 * 4 * 4);
        assert_eq!(stats.evictions, 0);
    }

    #[test]
    fn test_lru_eviction_with_limit() {
        let mut lod = create_tile_lod();
        let start = Instant::now();
        cache_insert(&mut lod, texture(0, TextureTier::Low), start, Some(2));
        cache_insert(&mut lod, texture(1, TextureTier::Low), start + Duration::from_millis(1), Some(2));

        // Touch the older entry so the newer one becomes least recent
        let first = texture(0, TextureTier::Low).key;
        assert!(cache_get(&mut lod, &first, start + Duration::from_millis(2)).is_some());

        cache_insert(&mut lod, texture(2, TextureTier::Low), start + Duration::from_millis(3), Some(2));
        assert!(cache_contains(&lod, &first));
        assert!(!cache_contains(&lod, &texture(1, TextureTier::Low).key));
        assert_eq!(lod.evictions, 1);
    }

    #[test]
    fn test_evict_tile_drops_all_tiers() {
        let mut lod = create_tile_lod();
        let now = Instant::now();
        cache_insert(&mut lod, texture(7, TextureTier::High), now, None);
        cache_insert(&mut lod, texture(7, TextureTier::Medium), now, None);
        cache_insert(&mut lod, texture(8, TextureTier::Medium), now, None);

        assert_eq!(evict_tile(&mut lod, TileCoord { x: 7, y: 0, zoom: 16 }), 2);
        assert_eq!(cache_stats(&lod).entries, 1);
        assert!(evict(&mut lod, &texture(8, TextureTier::Medium).key));
        clear_cache(&mut lod);
        assert_eq!(cache_stats(&lod).evictions, 3);
    }
}
