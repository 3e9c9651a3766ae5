//! Orbit camera operations - Pure DOP functions
//!
//! Follows the avatar at (distance, azimuth, pitch) plus a pan offset, with
//! frame-rate independent smoothing and a ground clamp for walking views.

use super::camera_data::{CameraTransform, OrbitState};
use crate::avatar::AvatarPose;
use crate::config::OrbitConfig;
use crate::input::IntentSnapshot;
use crate::physics::{probe_ground_height, GroundQuery};
use cgmath::{InnerSpace, Point3, Vector3, Zero};
use std::f32::consts::TAU;

// ============================================================================
// PURE HELPERS
// ============================================================================

/// Offset from the pivot to the camera. Azimuth 0 puts the camera on +Z.
pub fn spherical_offset(distance: f32, azimuth: f32, pitch: f32) -> Vector3<f32> {
    Vector3::new(
        distance * pitch.cos() * azimuth.sin(),
        distance * pitch.sin(),
        distance * pitch.cos() * azimuth.cos(),
    )
}

pub fn clamp_pitch(pitch: f32, config: &OrbitConfig) -> f32 {
    pitch.clamp(config.min_pitch, config.max_pitch)
}

pub fn clamp_distance(distance: f32, config: &OrbitConfig) -> f32 {
    distance.clamp(config.min_distance, config.max_distance)
}

pub fn wrap_azimuth(azimuth: f32) -> f32 {
    azimuth.rem_euclid(TAU)
}

/// Fraction of the remaining gap to close this frame
pub fn smoothing_factor(speed: f32, delta_time: f32) -> f32 {
    1.0 - (-speed * delta_time).exp()
}

/// Point the orbit camera looks at
pub fn orbit_pivot(orbit: &OrbitState, config: &OrbitConfig) -> Point3<f32> {
    orbit.smoothed_avatar + Vector3::new(0.0, config.head_height, 0.0) + orbit.pan_offset
}

/// Unsmoothed camera position for the current orbit parameters
pub fn orbit_camera_position(orbit: &OrbitState, config: &OrbitConfig) -> Point3<f32> {
    orbit_pivot(orbit, config) + spherical_offset(orbit.distance, orbit.azimuth, orbit.pitch)
}

/// Camera right/up for the current azimuth and pitch
fn orbit_basis(orbit: &OrbitState) -> (Vector3<f32>, Vector3<f32>) {
    let forward = -spherical_offset(1.0, orbit.azimuth, orbit.pitch);
    let right = Vector3::new(orbit.azimuth.cos(), 0.0, -orbit.azimuth.sin());
    let up = right.cross(forward).normalize();
    (right, up)
}

// ============================================================================
// GESTURES
// ============================================================================

pub fn apply_rotate(orbit: &mut OrbitState, delta: cgmath::Vector2<f32>, config: &OrbitConfig) {
    orbit.azimuth = wrap_azimuth(orbit.azimuth - delta.x * config.rotate_sensitivity);
    orbit.pitch = clamp_pitch(orbit.pitch + delta.y * config.rotate_sensitivity, config);
}

pub fn apply_zoom(orbit: &mut OrbitState, scroll: f32, config: &OrbitConfig) {
    if !scroll.is_finite() {
        return;
    }
    orbit.distance = clamp_distance(orbit.distance + scroll * config.zoom_sensitivity, config);
}

/// Drag right moves the scene right, so the pivot moves left
pub fn apply_pan(orbit: &mut OrbitState, delta: cgmath::Vector2<f32>, config: &OrbitConfig) {
    let (right, up) = orbit_basis(orbit);
    orbit.pan_offset += (-right * delta.x + up * delta.y) * config.pan_sensitivity;
}

/// Lift the target out of the ground and raise the pitch to match.
///
/// Only applies to walking avatars near the ground with the camera pulled out.
fn apply_ground_clamp(
    orbit: &mut OrbitState,
    target: &mut Point3<f32>,
    pivot: Point3<f32>,
    avatar: &AvatarPose,
    ground: &mut GroundQuery<'_>,
    config: &OrbitConfig,
) {
    if avatar.is_flying
        || avatar.position.y >= config.ground_clamp_max_avatar_height
        || orbit.distance <= config.ground_clamp_min_distance
    {
        return;
    }

    let min_height = probe_ground_height(ground, *target, config.ground_clearance);
    if target.y >= min_height {
        return;
    }
    target.y = min_height;

    let ratio = ((target.y - pivot.y) / orbit.distance).clamp(-1.0, 1.0);
    let required_pitch = ratio.asin();
    if orbit.pitch < required_pitch {
        orbit.pitch = clamp_pitch(required_pitch, config);
        log::trace!("[Camera] Ground clamp raised pitch to {:.3}", orbit.pitch);
    }
}

// ============================================================================
// UPDATE
// ============================================================================

/// Advance the orbit camera one frame.
///
/// `may_drag` is false while another owner holds pointer input; rotate and
/// pan are skipped then, zoom is not.
pub fn update_orbit(
    orbit: &mut OrbitState,
    intents: &IntentSnapshot,
    may_drag: bool,
    avatar: &AvatarPose,
    ground: &mut GroundQuery<'_>,
    delta_time: f32,
    config: &OrbitConfig,
) -> CameraTransform {
    // Per-frame blend, intentionally not scaled by delta time
    if orbit.initialized {
        let blend = config.avatar_blend.clamp(0.0, 1.0);
        orbit.smoothed_avatar += (avatar.position - orbit.smoothed_avatar) * blend;
    } else {
        orbit.smoothed_avatar = avatar.position;
    }

    if may_drag {
        apply_rotate(orbit, intents.rotate_delta, config);
        apply_pan(orbit, intents.pan_delta, config);
    }
    apply_zoom(orbit, intents.scroll, config);
    if intents.cancel {
        orbit.pan_offset = Vector3::zero();
    }

    let pivot = orbit_pivot(orbit, config);
    let mut target = orbit_camera_position(orbit, config);
    apply_ground_clamp(orbit, &mut target, pivot, avatar, ground, config);

    if orbit.initialized {
        let speed = if avatar.is_flying {
            config.follow_speed_flying
        } else {
            config.follow_speed_walking
        };
        let k = smoothing_factor(speed, delta_time);
        orbit.position += (target - orbit.position) * k;
        orbit.look_at += (pivot - orbit.look_at) * k;
    } else {
        orbit.position = target;
        orbit.look_at = pivot;
        orbit.initialized = true;
    }

    CameraTransform {
        position: orbit.position,
        look_at: orbit.look_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GroundProbeConfig;
    use crate::input::idle_snapshot;
    use crate::physics::{create_ground_probe, GroundProbeData};
    use crate::registry::{create_registry, register_terrain, SceneRegistryData, SurfaceGeometry};
    use cgmath::Vector2;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::time::Instant;

    fn orbit_state(config: &OrbitConfig) -> OrbitState {
        OrbitState {
            distance: config.initial_distance,
            azimuth: 0.0,
            pitch: config.initial_pitch,
            pan_offset: Vector3::zero(),
            smoothed_avatar: Point3::new(0.0, 1.0, 0.0),
            position: Point3::new(0.0, 1.0, 0.0),
            look_at: Point3::new(0.0, 1.0, 0.0),
            initialized: false,
        }
    }

    fn walker(position: Point3<f32>) -> AvatarPose {
        AvatarPose {
            position,
            yaw: 0.0,
            is_flying: false,
            is_walking: false,
        }
    }

    fn flat_world() -> SceneRegistryData {
        let mut registry = create_registry();
        register_terrain(
            &mut registry,
            SurfaceGeometry::HorizontalRect {
                height: 0.0,
                min_xz: [-500.0, -500.0],
                max_xz: [500.0, 500.0],
            },
        );
        registry
    }

    fn run(
        orbit: &mut OrbitState,
        intents: &IntentSnapshot,
        avatar: &AvatarPose,
        probe: &mut GroundProbeData,
        registry: &SceneRegistryData,
        config: &OrbitConfig,
    ) -> CameraTransform {
        let probe_config = GroundProbeConfig::default();
        let mut ground = GroundQuery {
            probe,
            registry,
            config: &probe_config,
            now: Instant::now(),
        };
        update_orbit(orbit, intents, true, avatar, &mut ground, 1.0 / 60.0, config)
    }

    #[test]
    fn test_pitch_and_distance_stay_clamped() {
        let config = OrbitConfig::default();
        let mut orbit = orbit_state(&config);
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..1000 {
            let delta = Vector2::new(rng.gen_range(-1e5..1e5), rng.gen_range(-1e5..1e5));
            apply_rotate(&mut orbit, delta, &config);
            apply_zoom(&mut orbit, rng.gen_range(-1e4..1e4), &config);
            assert!(orbit.pitch >= config.min_pitch && orbit.pitch <= config.max_pitch);
            assert!(orbit.distance >= 2.0 && orbit.distance <= 100.0);
            assert!(orbit.azimuth >= 0.0 && orbit.azimuth < TAU);
        }
    }

    #[test]
    fn test_nan_zoom_is_ignored() {
        let config = OrbitConfig::default();
        let mut orbit = orbit_state(&config);
        apply_zoom(&mut orbit, f32::NAN, &config);
        assert_eq!(orbit.distance, config.initial_distance);
    }

    #[test]
    fn test_smoothing_is_frame_rate_independent() {
        let one_step = smoothing_factor(4.0, 0.1);
        let two_steps = 1.0 - (1.0 - smoothing_factor(4.0, 0.05)).powi(2);
        assert!((one_step - two_steps).abs() < 1e-6);
    }

    #[test]
    fn test_first_frame_snaps_behind_avatar() {
        let config = OrbitConfig::default();
        let mut orbit = orbit_state(&config);
        let registry = flat_world();
        let mut probe = create_ground_probe();
        let transform = run(
            &mut orbit,
            &idle_snapshot(),
            &walker(Point3::new(0.0, 1.0, 0.0)),
            &mut probe,
            &registry,
            &config,
        );
        assert!(transform.position.z > 0.0);
        assert!((transform.look_at.y - 2.5).abs() < 1e-5);
    }

    #[test]
    fn test_ground_clamp_lifts_camera_and_pitch() {
        let config = OrbitConfig::default();
        let mut orbit = orbit_state(&config);
        orbit.pitch = config.min_pitch;
        orbit.distance = 20.0;
        let registry = flat_world();
        let mut probe = create_ground_probe();

        let transform = run(
            &mut orbit,
            &idle_snapshot(),
            &walker(Point3::new(0.0, 1.0, 0.0)),
            &mut probe,
            &registry,
            &config,
        );
        assert!(transform.position.y >= 0.5 - 1e-4);
        assert!(orbit.pitch > config.min_pitch);
    }

    #[test]
    fn test_ground_clamp_skipped_when_flying() {
        let config = OrbitConfig::default();
        let mut orbit = orbit_state(&config);
        orbit.pitch = config.min_pitch;
        orbit.distance = 20.0;
        let registry = flat_world();
        let mut probe = create_ground_probe();
        let mut avatar = walker(Point3::new(0.0, 1.0, 0.0));
        avatar.is_flying = true;

        let transform = run(&mut orbit, &idle_snapshot(), &avatar, &mut probe, &registry, &config);
        assert!(transform.position.y < 0.0);
        assert_eq!(orbit.pitch, config.min_pitch);
    }

    #[test]
    fn test_cancel_resets_pan() {
        let config = OrbitConfig::default();
        let mut orbit = orbit_state(&config);
        apply_pan(&mut orbit, Vector2::new(100.0, 0.0), &config);
        assert!(orbit.pan_offset.x < 0.0);

        let registry = flat_world();
        let mut probe = create_ground_probe();
        let cancel = IntentSnapshot {
            cancel: true,
            ..idle_snapshot()
        };
        run(&mut orbit, &cancel, &walker(Point3::new(0.0, 1.0, 0.0)), &mut probe, &registry, &config);
        assert_eq!(orbit.pan_offset, Vector3::zero());
    }

    #[test]
    fn test_camera_converges_toward_target() {
        let config = OrbitConfig::default();
        let mut orbit = orbit_state(&config);
        let registry = flat_world();
        let mut probe = create_ground_probe();
        let idle = idle_snapshot();
        run(&mut orbit, &idle, &walker(Point3::new(0.0, 1.0, 0.0)), &mut probe, &registry, &config);

        let moved = walker(Point3::new(0.0, 1.0, -20.0));
        for _ in 0..600 {
            run(&mut orbit, &idle, &moved, &mut probe, &registry, &config);
        }
        let target = orbit_camera_position(&orbit, &config);
        assert!((orbit.position - target).magnitude() < 0.01);
    }
}
