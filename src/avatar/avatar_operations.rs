//! Avatar operations - Pure DOP functions
//!
//! Walk/fly state machine and per-frame integration against the ground probe.

use super::avatar_data::{AvatarData, AvatarPose};
use crate::config::AvatarConfig;
use crate::input::IntentSnapshot;
use crate::physics::{probe_ground_height, GroundQuery};
use cgmath::{InnerSpace, Point3, Vector3};

// ============================================================================
// INITIALIZATION
// ============================================================================

pub fn create_avatar(position: Point3<f32>, yaw: f32) -> AvatarData {
    AvatarData {
        position,
        yaw,
        ..Default::default()
    }
}

pub fn avatar_pose(avatar: &AvatarData) -> AvatarPose {
    AvatarPose {
        position: avatar.position,
        yaw: avatar.yaw,
        is_flying: avatar.is_flying,
        is_walking: avatar.is_walking,
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn axis(positive: bool, negative: bool) -> f32 {
    (positive as i32 - negative as i32) as f32
}

/// Rotate an avatar-local vector about +Y by `yaw`
pub fn rotate_by_yaw(local: Vector3<f32>, yaw: f32) -> Vector3<f32> {
    let (sin, cos) = yaw.sin_cos();
    Vector3::new(
        local.x * cos + local.z * sin,
        local.y,
        -local.x * sin + local.z * cos,
    )
}

/// Direction the avatar faces on the ground plane
pub fn avatar_forward(yaw: f32) -> Vector3<f32> {
    rotate_by_yaw(Vector3::new(0.0, 0.0, -1.0), yaw)
}

/// Flip flight on the rising edge of the toggle only
fn apply_fly_toggle(avatar: &mut AvatarData, toggle_held: bool) {
    if toggle_held && !avatar.toggle_fly_was_held {
        avatar.is_flying = !avatar.is_flying;
        avatar.vertical_velocity = 0.0;
        log::debug!(
            "[Avatar] {} at ({:.1}, {:.1}, {:.1})",
            if avatar.is_flying { "Flying" } else { "Walking" },
            avatar.position.x,
            avatar.position.y,
            avatar.position.z
        );
    }
    avatar.toggle_fly_was_held = toggle_held;
}

// ============================================================================
// UPDATE
// ============================================================================

/// Advance the avatar one frame and publish its pose.
///
/// Post-condition: `position.y >= ground + half_height` at the new position.
pub fn update_avatar(
    avatar: &mut AvatarData,
    intents: &IntentSnapshot,
    delta_time: f32,
    ground: &mut GroundQuery<'_>,
    config: &AvatarConfig,
) -> AvatarPose {
    let dt = if delta_time.is_finite() { delta_time.max(0.0) } else { 0.0 };

    apply_fly_toggle(avatar, intents.toggle_fly);

    // Horizontal move in avatar space, then rotated into the world
    let local = Vector3::new(
        axis(intents.right, intents.left),
        0.0,
        axis(intents.backward, intents.forward),
    );
    avatar.is_walking = local.magnitude2() > 0.0;
    let speed = if avatar.is_flying {
        config.fly_speed
    } else {
        config.walk_speed
    };
    let horizontal = if avatar.is_walking {
        rotate_by_yaw(local.normalize() * speed * dt, avatar.yaw)
    } else {
        Vector3::new(0.0, 0.0, 0.0)
    };

    // Strafing keys also turn
    avatar.yaw += axis(intents.left, intents.right) * config.turn_rate * dt;

    if avatar.is_flying {
        let min_height = probe_ground_height(ground, avatar.position, config.half_height);
        let grounded = avatar.position.y <= min_height + config.ground_contact_epsilon;
        avatar.vertical_velocity = if intents.up {
            config.vertical_fly_speed
        } else if intents.down && !grounded {
            -config.vertical_fly_speed
        } else {
            0.0
        };
    } else {
        avatar.vertical_velocity += config.gravity * dt;
    }

    avatar.position += horizontal;
    avatar.position.y += avatar.vertical_velocity * dt;

    let min_height = probe_ground_height(ground, avatar.position, config.half_height);
    if avatar.position.y < min_height {
        avatar.position.y = min_height;
        if avatar.vertical_velocity < 0.0 {
            avatar.vertical_velocity = 0.0;
        }
    }

    log::trace!(
        "[Avatar] pos=({:.2}, {:.2}, {:.2}) yaw={:.3} vy={:.2}",
        avatar.position.x,
        avatar.position.y,
        avatar.position.z,
        avatar.yaw,
        avatar.vertical_velocity
    );

    avatar_pose(avatar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GroundProbeConfig;
    use crate::input::idle_snapshot;
    use crate::physics::{create_ground_probe, GroundProbeData};
    use crate::registry::{create_registry, register_terrain, SceneRegistryData, SurfaceGeometry};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::time::Instant;

    const DT: f32 = 1.0 / 60.0;

    fn flat_world(height: f32) -> SceneRegistryData {
        let mut registry = create_registry();
        register_terrain(
            &mut registry,
            SurfaceGeometry::HorizontalRect {
                height,
                min_xz: [-1000.0, -1000.0],
                max_xz: [1000.0, 1000.0],
            },
        );
        registry
    }

    fn step(
        avatar: &mut AvatarData,
        intents: &IntentSnapshot,
        probe: &mut GroundProbeData,
        registry: &SceneRegistryData,
    ) -> AvatarPose {
        let probe_config = GroundProbeConfig::default();
        let mut query = GroundQuery {
            probe,
            registry,
            config: &probe_config,
            now: Instant::now(),
        };
        update_avatar(avatar, intents, DT, &mut query, &AvatarConfig::default())
    }

    #[test]
    fn test_walk_forward_one_second() {
        let registry = flat_world(0.0);
        let mut probe = create_ground_probe();
        let mut avatar = create_avatar(Point3::new(0.0, 1.0, 0.0), 0.0);
        let intents = IntentSnapshot {
            forward: true,
            ..idle_snapshot()
        };

        for _ in 0..60 {
            let pose = step(&mut avatar, &intents, &mut probe, &registry);
            assert!((pose.position.y - 1.0).abs() < 1e-4);
            assert!(pose.is_walking);
        }
        assert!(avatar.position.x.abs() < 1e-4);
        assert!((avatar.position.z + 8.0).abs() < 1e-3);
    }

    #[test]
    fn test_fly_toggle_edge_triggered() {
        let registry = flat_world(0.0);
        let mut probe = create_ground_probe();
        let mut avatar = create_avatar(Point3::new(0.0, 1.0, 0.0), 0.0);
        let held = IntentSnapshot {
            toggle_fly: true,
            ..idle_snapshot()
        };

        for _ in 0..10 {
            step(&mut avatar, &held, &mut probe, &registry);
        }
        assert!(avatar.is_flying);

        step(&mut avatar, &idle_snapshot(), &mut probe, &registry);
        step(&mut avatar, &held, &mut probe, &registry);
        assert!(!avatar.is_flying);
    }

    #[test]
    fn test_yaw_rotates_movement() {
        // Facing -X after a quarter turn left
        let moved = rotate_by_yaw(Vector3::new(0.0, 0.0, -1.0), std::f32::consts::FRAC_PI_2);
        assert!((moved.x + 1.0).abs() < 1e-6);
        assert!(moved.z.abs() < 1e-6);
    }

    #[test]
    fn test_strafe_left_turns_left() {
        let registry = flat_world(0.0);
        let mut probe = create_ground_probe();
        let mut avatar = create_avatar(Point3::new(0.0, 1.0, 0.0), 0.0);
        let intents = IntentSnapshot {
            left: true,
            ..idle_snapshot()
        };
        step(&mut avatar, &intents, &mut probe, &registry);
        assert!((avatar.yaw - 2.0 * DT).abs() < 1e-6);
        assert!(avatar.position.x < 0.0);
    }

    #[test]
    fn test_flying_down_stops_at_ground() {
        let registry = flat_world(0.0);
        let mut probe = create_ground_probe();
        let mut avatar = create_avatar(Point3::new(0.0, 1.05, 0.0), 0.0);
        avatar.is_flying = true;
        let intents = IntentSnapshot {
            down: true,
            ..idle_snapshot()
        };
        step(&mut avatar, &intents, &mut probe, &registry);
        assert_eq!(avatar.vertical_velocity, 0.0);
        assert!((avatar.position.y - 1.05).abs() < 1e-6);
    }

    #[test]
    fn test_drop_from_flight_never_below_ground() {
        let registry = flat_world(0.0);
        let mut probe = create_ground_probe();
        let mut avatar = create_avatar(Point3::new(0.0, 30.0, 0.0), 0.0);
        avatar.is_flying = true;
        let toggle = IntentSnapshot {
            toggle_fly: true,
            ..idle_snapshot()
        };
        step(&mut avatar, &toggle, &mut probe, &registry);
        assert!(!avatar.is_flying);

        for _ in 0..600 {
            let pose = step(&mut avatar, &idle_snapshot(), &mut probe, &registry);
            assert!(pose.position.y >= 1.0);
        }
        assert!((avatar.position.y - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_random_moves_stay_above_ground() {
        let mut registry = flat_world(0.0);
        register_terrain(
            &mut registry,
            SurfaceGeometry::HorizontalRect {
                height: 5.0,
                min_xz: [-20.0, -20.0],
                max_xz: [20.0, 20.0],
            },
        );
        let probe_config = GroundProbeConfig::default();
        let config = AvatarConfig::default();
        let mut probe = create_ground_probe();
        let mut avatar = create_avatar(Point3::new(0.0, 6.0, 0.0), 0.0);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..2000 {
            let intents = IntentSnapshot {
                forward: rng.gen_bool(0.5),
                backward: rng.gen_bool(0.1),
                left: rng.gen_bool(0.2),
                right: rng.gen_bool(0.2),
                up: rng.gen_bool(0.2),
                down: rng.gen_bool(0.4),
                toggle_fly: rng.gen_bool(0.05),
                ..idle_snapshot()
            };
            let dt = rng.gen_range(0.0..0.1);
            let mut query = GroundQuery {
                probe: &mut probe,
                registry: &registry,
                config: &probe_config,
                now: Instant::now(),
            };
            let pose = update_avatar(&mut avatar, &intents, dt, &mut query, &config);
            let ground = probe_ground_height(&mut query, pose.position, config.half_height);
            assert!(pose.position.y >= ground - 1e-4, "{:?} below {}", pose.position, ground);
        }
    }
}
