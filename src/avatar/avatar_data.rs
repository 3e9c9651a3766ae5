//! Avatar data structures - Pure DOP
//!
//! NO METHODS. Just data.
//! All transformations happen in avatar_operations.rs

use cgmath::Point3;

/// Locomotion state owned by the avatar stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvatarData {
    pub position: Point3<f32>,

    /// Heading (radians). 0 faces -Z, positive turns left.
    pub yaw: f32,

    pub is_flying: bool,

    pub is_walking: bool,

    /// Vertical speed (m/s), positive up
    pub vertical_velocity: f32,

    /// Fly toggle level seen on the previous frame
    pub toggle_fly_was_held: bool,
}

/// Published pose read by the camera rig and the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvatarPose {
    pub position: Point3<f32>,
    pub yaw: f32,
    pub is_flying: bool,
    pub is_walking: bool,
}

impl Default for AvatarData {
    fn default() -> Self {
        Self {
            position: Point3::new(0.0, crate::constants::AVATAR_HALF_HEIGHT, 0.0),
            yaw: 0.0,
            is_flying: false,
            is_walking: false,
            vertical_velocity: 0.0,
            toggle_fly_was_held: false,
        }
    }
}
