/// Camera Module - Data-Oriented Programming (DOP) style
///
/// - camera_data.rs: rig state, projection, GPU uniform (NO methods)
/// - camera_operations.rs: basis math, matrices, picking, mode transitions
/// - orbit_operations.rs: avatar-follow camera
/// - free_fly_operations.rs: detached inspection camera

pub mod camera_data;
pub mod camera_operations;
pub mod free_fly_operations;
pub mod orbit_operations;

// Re-export data structures
pub use camera_data::{
    CameraMode, CameraRigData, CameraTransform, CameraUniform, FreeFlyState, OrbitState,
    Projection,
};

// Re-export operations
pub use camera_operations::{
    // Initialization
    create_camera_rig,
    create_projection,

    // View/projection
    build_camera_uniform,
    build_projection_matrix,
    build_view_matrix,
    update_viewport,

    // Utilities
    calculate_forward_vector,
    calculate_right_vector,
    calculate_up_vector,
    camera_forward,
    yaw_pitch_from_direction,

    // Picking
    pick_focus_point,
    screen_ray,
    world_to_screen,

    // Modes and update
    enter_free_fly,
    exit_free_fly,
    track_camera_drag,
    update_camera_rig,
};

pub use free_fly_operations::update_free_fly;
pub use orbit_operations::{orbit_camera_position, spherical_offset, update_orbit};
