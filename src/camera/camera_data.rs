//! Camera data structures - Pure DOP
//!
//! NO METHODS. Just data.
//! All transformations happen in camera_operations.rs, orbit_operations.rs
//! and free_fly_operations.rs

use cgmath::{Matrix4, Point3, Vector3};
use static_assertions::const_assert_eq;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMode {
    /// Follow the avatar at a spherical offset
    #[default]
    Orbit,
    /// Detached camera with its own velocity
    FreeFly,
}

/// Orbit-follow state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitState {
    pub distance: f32,
    /// Radians around +Y, wrapped to [0, 2π)
    pub azimuth: f32,
    /// Radians above the horizon
    pub pitch: f32,

    pub pan_offset: Vector3<f32>,
    pub smoothed_avatar: Point3<f32>,
    pub position: Point3<f32>,
    pub look_at: Point3<f32>,
    /// False until the first frame snaps everything into place
    pub initialized: bool,
}

/// Free-fly state. Only exists while in FreeFly mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreeFlyState {
    pub position: Point3<f32>,
    pub velocity: Vector3<f32>,
    pub yaw: f32,
    pub pitch: f32,
    pub focus: Point3<f32>,
}

/// Perspective parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub fov_radians: f32,
    pub aspect_ratio: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTransform {
    pub position: Point3<f32>,
    pub look_at: Point3<f32>,
}

/// Everything the camera stage owns
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRigData {
    pub mode: CameraMode,
    pub orbit: OrbitState,
    pub free_fly: Option<FreeFlyState>,
    pub transform: CameraTransform,
    pub projection: Projection,

    /// Pointer travel (px) since the last press, for camera drag claiming
    pub drag_travel: f32,
}

/// View/projection block for the renderer. Matrices are column-major;
/// vec3 fields are padded to vec4.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_matrix: [[f32; 4]; 4],
    pub projection_matrix: [[f32; 4]; 4],
    pub view_projection_matrix: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    pub camera_forward: [f32; 4],
    /// near, far, fov, aspect
    pub planes: [f32; 4],
}

const_assert_eq!(std::mem::size_of::<CameraUniform>() % 16, 0);

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_matrix: Matrix4::from_scale(1.0).into(),
            projection_matrix: Matrix4::from_scale(1.0).into(),
            view_projection_matrix: Matrix4::from_scale(1.0).into(),
            camera_position: [0.0, 0.0, 0.0, 1.0],
            camera_forward: [0.0, 0.0, -1.0, 0.0],
            planes: [0.1, 5000.0, 60.0_f32.to_radians(), 16.0 / 9.0],
        }
    }
}
