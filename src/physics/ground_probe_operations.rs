//! Ground probe operations - Pure DOP functions
//!
//! A downward ray against a cached list of horizontal terrain surfaces. The
//! cache is rebuilt from the registry at most once per refresh interval,
//! immediately when empty, and whenever the registry's terrain set changed.

use super::ground_probe_data::{CachedSurface, GroundProbeData, GroundQuery};
use super::ray::{triangle_normal, Ray};
use crate::config::GroundProbeConfig;
use crate::registry::{surface_hit_distance, SceneRegistryData, SurfaceGeometry};
use cgmath::{Point3, Vector3};
use std::time::{Duration, Instant};

pub fn create_ground_probe() -> GroundProbeData {
    GroundProbeData::default()
}

// ============================================================================
// SURFACE CACHE
// ============================================================================

pub fn needs_rebuild(
    probe: &GroundProbeData,
    registry: &SceneRegistryData,
    now: Instant,
    config: &GroundProbeConfig,
) -> bool {
    let Some(last) = probe.last_rebuild else {
        return true;
    };
    probe.surfaces.is_empty()
        || probe.cached_generation != registry.terrain_generation
        || now.saturating_duration_since(last) >= Duration::from_millis(config.refresh_interval_ms)
}

/// Keep only the horizontal part of a surface
fn horizontal_part(geometry: &SurfaceGeometry, min_normal_y: f32) -> Option<SurfaceGeometry> {
    match geometry {
        SurfaceGeometry::HorizontalRect { .. } => Some(geometry.clone()),
        SurfaceGeometry::Triangles(triangles) => {
            let kept: Vec<_> = triangles
                .iter()
                .filter(|tri| triangle_normal(tri).y.abs() >= min_normal_y)
                .copied()
                .collect();
            (!kept.is_empty()).then_some(SurfaceGeometry::Triangles(kept))
        }
    }
}

/// Full traversal of the registered terrain
pub fn rebuild_surface_cache(
    probe: &mut GroundProbeData,
    registry: &SceneRegistryData,
    now: Instant,
    config: &GroundProbeConfig,
) {
    probe.surfaces = registry
        .terrain
        .values()
        .filter_map(|surface| {
            horizontal_part(&surface.geometry, config.horizontal_normal_min_y).map(|geometry| {
                CachedSurface {
                    surface: surface.id,
                    geometry,
                }
            })
        })
        .collect();
    probe.surfaces.sort_by_key(|cached| cached.surface);
    probe.last_rebuild = Some(now);
    probe.cached_generation = registry.terrain_generation;
    probe.rebuild_count += 1;

    log::trace!(
        "[GroundProbe] Rebuilt surface cache: {} surfaces (generation {})",
        probe.surfaces.len(),
        probe.cached_generation
    );
}

/// Rebuild if due. Returns true when a rebuild happened.
pub fn refresh_surface_cache(
    probe: &mut GroundProbeData,
    registry: &SceneRegistryData,
    now: Instant,
    config: &GroundProbeConfig,
) -> bool {
    if needs_rebuild(probe, registry, now, config) {
        rebuild_surface_cache(probe, registry, now, config);
        true
    } else {
        false
    }
}

// ============================================================================
// QUERIES
// ============================================================================

/// Height of the highest cached surface under a downward ray from `origin`
pub fn highest_surface_hit(probe: &GroundProbeData, origin: Point3<f32>) -> Option<f32> {
    let ray = Ray::downward(origin);
    probe
        .surfaces
        .iter()
        .filter_map(|cached| surface_hit_distance(&cached.geometry, &ray))
        .min_by(|a, b| a.total_cmp(b))
        .map(|distance| origin.y - distance)
}

/// Minimum standing height at `position`: highest ground plus `half_height`.
/// A miss falls back to the configured default ground height.
pub fn probe_ground_height(query: &mut GroundQuery<'_>, position: Point3<f32>, half_height: f32) -> f32 {
    refresh_surface_cache(query.probe, query.registry, query.now, query.config);

    let origin = position + Vector3::new(0.0, query.config.ray_start_height, 0.0);
    let ground = highest_surface_hit(query.probe, origin).unwrap_or(query.config.default_ground_height);
    ground + half_height
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{create_registry, register_terrain, unregister_terrain};

    fn flat(height: f32) -> SurfaceGeometry {
        SurfaceGeometry::HorizontalRect {
            height,
            min_xz: [-100.0, -100.0],
            max_xz: [100.0, 100.0],
        }
    }

    #[test]
    fn test_highest_surface_wins() {
        let mut registry = create_registry();
        register_terrain(&mut registry, flat(0.0));
        register_terrain(&mut registry, flat(3.0));
        let config = GroundProbeConfig::default();
        let mut probe = create_ground_probe();
        let mut query = GroundQuery {
            probe: &mut probe,
            registry: &registry,
            config: &config,
            now: Instant::now(),
        };

        let height = probe_ground_height(&mut query, Point3::new(0.0, 5.0, 0.0), 1.0);
        assert!((height - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_miss_returns_default_plus_half_height() {
        let registry = create_registry();
        let config = GroundProbeConfig {
            default_ground_height: -2.0,
            ..GroundProbeConfig::default()
        };
        let mut probe = create_ground_probe();
        let mut query = GroundQuery {
            probe: &mut probe,
            registry: &registry,
            config: &config,
            now: Instant::now(),
        };

        let height = probe_ground_height(&mut query, Point3::new(0.0, 0.0, 0.0), 1.0);
        assert!((height + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_surface_above_ray_start_is_ignored() {
        let mut registry = create_registry();
        register_terrain(&mut registry, flat(0.0));
        register_terrain(&mut registry, flat(50.0));
        let config = GroundProbeConfig::default();
        let mut probe = create_ground_probe();
        rebuild_surface_cache(&mut probe, &registry, Instant::now(), &config);

        let hit = highest_surface_hit(&probe, Point3::new(0.0, 20.0, 0.0)).expect("floor");
        assert!(hit.abs() < 1e-5);
    }

    #[test]
    fn test_cache_rebuild_is_throttled() {
        let mut registry = create_registry();
        register_terrain(&mut registry, flat(0.0));
        let config = GroundProbeConfig::default();
        let mut probe = create_ground_probe();
        let start = Instant::now();

        assert!(refresh_surface_cache(&mut probe, &registry, start, &config));
        assert!(!refresh_surface_cache(&mut probe, &registry, start + Duration::from_millis(100), &config));
        assert!(refresh_surface_cache(&mut probe, &registry, start + Duration::from_millis(500), &config));
        assert_eq!(probe.rebuild_count, 2);
    }

    #[test]
    fn test_terrain_change_forces_rebuild() {
        let mut registry = create_registry();
        let floor = register_terrain(&mut registry, flat(0.0));
        let config = GroundProbeConfig::default();
        let mut probe = create_ground_probe();
        let start = Instant::now();
        refresh_surface_cache(&mut probe, &registry, start, &config);

        unregister_terrain(&mut registry, floor);
        register_terrain(&mut registry, flat(2.0));
        assert!(refresh_surface_cache(&mut probe, &registry, start + Duration::from_millis(10), &config));

        let hit = highest_surface_hit(&probe, Point3::new(0.0, 20.0, 0.0)).expect("new floor");
        assert!((hit - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_walls_are_not_ground() {
        let mut registry = create_registry();
        let wall = [
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 10.0, 0.0),
        ];
        register_terrain(&mut registry, SurfaceGeometry::Triangles(vec![wall]));
        let config = GroundProbeConfig::default();
        let mut probe = create_ground_probe();
        rebuild_surface_cache(&mut probe, &registry, Instant::now(), &config);
        assert!(probe.surfaces.is_empty());
    }
}
