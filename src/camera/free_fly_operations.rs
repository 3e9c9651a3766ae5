//! Free-fly camera operations - Pure DOP functions
//!
//! Direct mouse-look plus accelerated movement. No ground or collision clamp:
//! free-fly is an inspection mode and may pass through terrain.

use super::camera_data::{CameraTransform, FreeFlyState};
use super::camera_operations::{calculate_forward_vector, calculate_right_vector};
use crate::config::FreeFlyConfig;
use crate::input::IntentSnapshot;
use cgmath::{InnerSpace, Vector3, Zero};

fn axis(positive: bool, negative: bool) -> f32 {
    (positive as i32 - negative as i32) as f32
}

pub fn speed_tier(intents: &IntentSnapshot, config: &FreeFlyConfig) -> f32 {
    if intents.fast {
        config.fast_speed
    } else if intents.slow {
        config.slow_speed
    } else {
        config.base_speed
    }
}

/// Normalized camera-relative input direction times the current speed tier
pub fn desired_velocity(
    state: &FreeFlyState,
    intents: &IntentSnapshot,
    config: &FreeFlyConfig,
) -> Vector3<f32> {
    let forward = calculate_forward_vector(state.yaw, state.pitch);
    let right = calculate_right_vector(state.yaw);
    let up = Vector3::new(0.0, 1.0, 0.0);

    let direction = forward * axis(intents.forward, intents.backward)
        + right * axis(intents.right, intents.left)
        + up * axis(intents.up, intents.down);

    if direction.magnitude2() > f32::EPSILON {
        direction.normalize() * speed_tier(intents, config)
    } else {
        Vector3::zero()
    }
}

/// Move `current` toward `target` by at most `max_step`, never past it
pub fn approach(current: Vector3<f32>, target: Vector3<f32>, max_step: f32) -> Vector3<f32> {
    let gap = target - current;
    let distance = gap.magnitude();
    if distance <= max_step || distance <= f32::EPSILON {
        target
    } else {
        current + gap * (max_step / distance)
    }
}

pub fn apply_look(state: &mut FreeFlyState, delta: cgmath::Vector2<f32>, config: &FreeFlyConfig) {
    state.yaw -= delta.x * config.look_sensitivity;
    state.pitch = (state.pitch - delta.y * config.look_sensitivity)
        .clamp(-config.pitch_limit, config.pitch_limit);
}

/// Advance the free-fly camera one frame
pub fn update_free_fly(
    state: &mut FreeFlyState,
    intents: &IntentSnapshot,
    may_look: bool,
    delta_time: f32,
    config: &FreeFlyConfig,
) -> CameraTransform {
    if may_look {
        apply_look(state, intents.rotate_delta, config);
    }

    let desired = desired_velocity(state, intents, config);
    let rate = if desired.magnitude2() > 0.0 {
        config.acceleration
    } else {
        config.deceleration
    };
    state.velocity = approach(state.velocity, desired, rate * delta_time);
    state.position += state.velocity * delta_time;

    // Orientation straight from yaw then pitch
    let forward = calculate_forward_vector(state.yaw, state.pitch);
    CameraTransform {
        position: state.position,
        look_at: state.position + forward,
    }
}
