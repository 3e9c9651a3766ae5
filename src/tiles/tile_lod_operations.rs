//! Tile LOD operations - Pure DOP functions
//!
//! Distance-based tier selection with hysteresis, per-tile throttled
//! evaluation, and asynchronous fetches whose results are applied on a later
//! tick. While a tile has a fetch in flight its tier decision waits.

use super::tile_cache_operations::{cache_contains, cache_get, cache_insert};
use super::tile_data::{
    FetchOutcome, TextureTier, TileCoord, TileEvent, TileKey, TileLayout, TileLodData,
    TileLodState, TileTexture, TileUpdateReport, VisibleTile,
};
use super::tile_fetch::{fetch_tier_image, TileFetcher};
use crate::config::TileLodConfig;
use crate::constants::MAX_TILE_REACH;
use crate::tasks::TaskSpawner;
use cgmath::{MetricSpace, Point3};
use futures::FutureExt;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub fn create_tile_lod() -> TileLodData {
    let (results_tx, results_rx) = flume::unbounded();
    TileLodData {
        states: FxHashMap::default(),
        cache: FxHashMap::default(),
        in_flight: FxHashSet::default(),
        results_tx,
        results_rx,
        evictions: 0,
    }
}

// ============================================================================
// TIER SELECTION
// ============================================================================

/// Tier for a tile seen for the first time
pub fn initial_tier(distance: f32, config: &TileLodConfig) -> TextureTier {
    if distance < config.high_enter_distance {
        TextureTier::High
    } else if distance > config.low_enter_distance {
        TextureTier::Low
    } else {
        TextureTier::Medium
    }
}

/// Hysteresis step. Each tier has separate enter and exit thresholds.
pub fn next_tier(current: TextureTier, distance: f32, config: &TileLodConfig) -> TextureTier {
    match current {
        TextureTier::High if distance > config.high_exit_distance => TextureTier::Medium,
        TextureTier::Medium if distance < config.high_enter_distance => TextureTier::High,
        TextureTier::Medium if distance > config.low_enter_distance => TextureTier::Low,
        TextureTier::Low if distance < config.low_exit_distance => TextureTier::Medium,
        tier => tier,
    }
}

// ============================================================================
// LAYOUT
// ============================================================================

pub fn tile_center(layout: &TileLayout, coord: TileCoord) -> Point3<f32> {
    let size = layout.tile_world_size;
    Point3::new(
        ((coord.x as i64 - layout.origin_x as i64) as f32 + 0.5) * size,
        0.0,
        ((coord.y as i64 - layout.origin_y as i64) as f32 + 0.5) * size,
    )
}

pub fn tile_at(layout: &TileLayout, x: f32, z: f32) -> TileCoord {
    let size = layout.tile_world_size;
    TileCoord {
        x: layout.origin_x.saturating_add((x / size).floor() as i32),
        y: layout.origin_y.saturating_add((z / size).floor() as i32),
        zoom: layout.zoom,
    }
}

/// Tiles whose center is within `radius` of the viewer, nearest first.
/// At most `MAX_TILE_REACH` tiles are scanned in each direction.
pub fn visible_tiles_around(layout: &TileLayout, viewer: Point3<f32>, radius: f32) -> Vec<VisibleTile> {
    let size = layout.tile_world_size;
    if !(size.is_finite() && size > 0.0) || !radius.is_finite() {
        log::warn!("[TileLod] Unusable tile size {} or radius {}", size, radius);
        return Vec::new();
    }
    let center = tile_at(layout, viewer.x, viewer.z);
    let reach = ((radius / size).ceil() + 1.0).min(MAX_TILE_REACH as f32) as i32;

    let mut visible: Vec<_> = (center.y.saturating_sub(reach)..=center.y.saturating_add(reach))
        .flat_map(|y| {
            (center.x.saturating_sub(reach)..=center.x.saturating_add(reach)).map(move |x| (x, y))
        })
        .filter_map(|(x, y)| {
            let coord = TileCoord { x, y, zoom: layout.zoom };
            let distance = viewer.distance(tile_center(layout, coord));
            (distance <= radius).then_some(VisibleTile { coord, distance })
        })
        .collect();
    visible.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.coord.cmp(&b.coord)));
    visible
}

// ============================================================================
// FETCHING
// ============================================================================

pub fn is_tile_in_flight(lod: &TileLodData, coord: TileCoord) -> bool {
    lod.in_flight.iter().any(|key| key.coord == coord)
}

/// Start a background fetch unless this key is already in flight
pub fn request_fetch(
    lod: &mut TileLodData,
    key: TileKey,
    fetcher: &Arc<dyn TileFetcher>,
    spawner: &dyn TaskSpawner,
) -> bool {
    if !lod.in_flight.insert(key) {
        return false;
    }
    log::debug!("[TileLod] Fetching {} {:?}", key.coord, key.tier);

    let fetcher = Arc::clone(fetcher);
    let tx = lod.results_tx.clone();
    spawner.spawn(
        async move {
            let result = fetch_tier_image(&*fetcher, key).await;
            let _ = tx.send(FetchOutcome { key, result });
        }
        .boxed(),
    );
    true
}

// ============================================================================
// EVALUATION
// ============================================================================

/// Decide one tile's tier. Returns true when a fetch was started.
fn evaluate_tile(
    lod: &mut TileLodData,
    coord: TileCoord,
    distance: f32,
    now: Instant,
    fetcher: &Arc<dyn TileFetcher>,
    spawner: &dyn TaskSpawner,
    config: &TileLodConfig,
) -> Option<TileEvent> {
    let in_flight = is_tile_in_flight(lod, coord);
    let state = lod.states.get_mut(&coord)?;
    state.last_evaluated = Some(now);
    state.last_distance = distance;

    // Decision waits for the outstanding fetch
    if in_flight || state.pending_tier.is_some() {
        return None;
    }

    let current = state.current_tier;
    let wanted = next_tier(current, distance, config);
    let wanted_key = TileKey { coord, tier: wanted };

    if wanted != current && cache_contains(lod, &wanted_key) {
        if let Some(state) = lod.states.get_mut(&coord) {
            state.current_tier = wanted;
        }
        log::debug!("[TileLod] {} {:?} -> {:?} (cached)", coord, current, wanted);
        return Some(TileEvent::TierChanged {
            coord,
            from: current,
            to: wanted,
        });
    }

    if wanted != current || !cache_contains(lod, &wanted_key) {
        if request_fetch(lod, wanted_key, fetcher, spawner) {
            if let Some(state) = lod.states.get_mut(&coord) {
                state.pending_tier = Some(wanted);
            }
        }
    }
    None
}

/// Per-frame tile stage: track the visible set and evaluate due tiles
pub fn update_visible_tiles(
    lod: &mut TileLodData,
    visible: &[VisibleTile],
    now: Instant,
    fetcher: &Arc<dyn TileFetcher>,
    spawner: &dyn TaskSpawner,
    config: &TileLodConfig,
) -> (TileUpdateReport, Vec<TileEvent>) {
    let mut report = TileUpdateReport {
        visible: visible.len(),
        ..TileUpdateReport::default()
    };
    let mut events = Vec::new();

    let visible_set: FxHashSet<TileCoord> = visible.iter().map(|t| t.coord).collect();
    let before = lod.states.len();
    lod.states.retain(|coord, _| visible_set.contains(coord));
    report.discarded = before - lod.states.len();

    let interval = Duration::from_millis(config.evaluation_interval_ms);
    let in_flight_before = lod.in_flight.len();

    for tile in visible {
        if !tile.distance.is_finite() {
            continue;
        }
        let state = lod.states.entry(tile.coord).or_insert_with(|| TileLodState {
            current_tier: initial_tier(tile.distance, config),
            pending_tier: None,
            last_evaluated: None,
            last_distance: tile.distance,
        });
        let due = state
            .last_evaluated
            .map_or(true, |last| now.saturating_duration_since(last) >= interval);
        if !due {
            continue;
        }

        report.evaluated += 1;
        if let Some(event) = evaluate_tile(lod, tile.coord, tile.distance, now, fetcher, spawner, config) {
            events.push(event);
        }
    }

    report.fetches_started = lod.in_flight.len().saturating_sub(in_flight_before);
    (report, events)
}

/// Apply finished fetches. Stale results are cached even if the tile moved on.
pub fn poll_fetches(lod: &mut TileLodData, now: Instant, config: &TileLodConfig) -> Vec<TileEvent> {
    let mut events = Vec::new();
    while let Ok(outcome) = lod.results_rx.try_recv() {
        let key = outcome.key;
        lod.in_flight.remove(&key);

        match outcome.result {
            Ok(image) => {
                let texture = TileTexture {
                    key,
                    image: Arc::new(image),
                };
                cache_insert(lod, texture, now, config.max_cache_entries);
                events.push(TileEvent::Loaded(key));

                if let Some(state) = lod.states.get_mut(&key.coord) {
                    if state.pending_tier == Some(key.tier) {
                        state.pending_tier = None;
                        let from = state.current_tier;
                        state.current_tier = key.tier;
                        if from != key.tier {
                            log::debug!("[TileLod] {} {:?} -> {:?}", key.coord, from, key.tier);
                            events.push(TileEvent::TierChanged {
                                coord: key.coord,
                                from,
                                to: key.tier,
                            });
                        }
                    }
                }
            }
            Err(error) => {
                // Keep the previous tier; the next evaluation retries
                log::warn!("[TileLod] Fetch failed for {:?}: {}", key.tier, error);
                if let Some(state) = lod.states.get_mut(&key.coord) {
                    if state.pending_tier == Some(key.tier) {
                        state.pending_tier = None;
                    }
                }
                events.push(TileEvent::FetchFailed {
                    key,
                    error: error.to_string(),
                });
            }
        }
    }
    events
}

/// Texture to draw for a visible tile, if its current tier is cached
pub fn texture_for_tile(lod: &mut TileLodData, coord: TileCoord, now: Instant) -> Option<TileTexture> {
    let tier = lod.states.get(&coord)?.current_tier;
    cache_get(lod, &TileKey { coord, tier }, now)
}

pub fn tile_tier(lod: &TileLodData, coord: TileCoord) -> Option<TextureTier> {
    lod.states.get(&coord).map(|s| s.current_tier)
}
