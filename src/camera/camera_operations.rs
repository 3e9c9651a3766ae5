//! Camera operations - Pure DOP functions
//!
//! Shared math (basis vectors, matrices, picking rays), mode transitions and
//! the per-frame rig update that dispatches to the orbit or free-fly stage.

use super::camera_data::{
    CameraMode, CameraRigData, CameraTransform, CameraUniform, FreeFlyState, OrbitState,
    Projection,
};
use super::free_fly_operations::update_free_fly;
use super::orbit_operations::{orbit_camera_position, update_orbit};
use crate::avatar::AvatarPose;
use crate::config::{EngineConfig, ViewportConfig};
use crate::context::{
    claim_exclusive_input, input_owner, is_held_by, release_exclusive_input, FrameContext,
    InputOwner,
};
use crate::input::IntentSnapshot;
use crate::physics::{GroundQuery, Ray};
use crate::registry::raycast_scene;
use cgmath::{
    InnerSpace, Matrix4, Point3, Rad, SquareMatrix, Vector2, Vector3, Vector4, Zero,
};
use std::time::Duration;

// ============================================================================
// INITIALIZATION
// ============================================================================

pub fn create_projection(viewport: &ViewportConfig) -> Projection {
    Projection {
        fov_radians: viewport.fov_degrees.to_radians(),
        aspect_ratio: viewport.width as f32 / viewport.height.max(1) as f32,
        near_plane: viewport.near_plane,
        far_plane: viewport.far_plane,
        viewport_width: viewport.width,
        viewport_height: viewport.height,
    }
}

/// Orbit rig looking at `avatar_position`
pub fn create_camera_rig(avatar_position: Point3<f32>, config: &EngineConfig) -> CameraRigData {
    let orbit = OrbitState {
        distance: config.orbit.initial_distance,
        azimuth: 0.0,
        pitch: config.orbit.initial_pitch,
        pan_offset: Vector3::zero(),
        smoothed_avatar: avatar_position,
        position: avatar_position,
        look_at: avatar_position,
        initialized: false,
    };
    let position = orbit_camera_position(&orbit, &config.orbit);
    CameraRigData {
        mode: CameraMode::Orbit,
        orbit,
        free_fly: None,
        transform: CameraTransform {
            position,
            look_at: avatar_position + Vector3::new(0.0, config.orbit.head_height, 0.0),
        },
        projection: create_projection(&config.viewport),
        drag_travel: 0.0,
    }
}

// ============================================================================
// BASIS VECTORS
// ============================================================================

/// Forward vector from yaw and pitch. Yaw 0 faces -Z, positive yaw turns left.
pub fn calculate_forward_vector(yaw: f32, pitch: f32) -> Vector3<f32> {
    Vector3::new(
        -yaw.sin() * pitch.cos(),
        pitch.sin(),
        -yaw.cos() * pitch.cos(),
    )
    .normalize()
}

/// Horizontal right vector from yaw
pub fn calculate_right_vector(yaw: f32) -> Vector3<f32> {
    Vector3::new(yaw.cos(), 0.0, -yaw.sin())
}

pub fn calculate_up_vector(yaw: f32, pitch: f32) -> Vector3<f32> {
    let forward = calculate_forward_vector(yaw, pitch);
    let right = calculate_right_vector(yaw);
    right.cross(forward).normalize()
}

/// Inverse of `calculate_forward_vector` for a non-zero direction
pub fn yaw_pitch_from_direction(direction: Vector3<f32>) -> (f32, f32) {
    let dir = direction.normalize();
    let yaw = (-dir.x).atan2(-dir.z);
    let pitch = dir.y.clamp(-1.0, 1.0).asin();
    (yaw, pitch)
}

pub fn camera_forward(transform: &CameraTransform) -> Vector3<f32> {
    let dir = transform.look_at - transform.position;
    if dir.magnitude2() > f32::EPSILON {
        dir.normalize()
    } else {
        Vector3::new(0.0, 0.0, -1.0)
    }
}

// ============================================================================
// VIEW/PROJECTION MATRICES
// ============================================================================

pub fn build_view_matrix(transform: &CameraTransform) -> Matrix4<f32> {
    let forward = camera_forward(transform);
    // Looking straight up or down needs another up reference
    let up = if forward.y.abs() > 0.999 {
        Vector3::new(0.0, 0.0, -1.0)
    } else {
        Vector3::new(0.0, 1.0, 0.0)
    };
    Matrix4::look_at_rh(transform.position, transform.position + forward, up)
}

pub fn build_projection_matrix(projection: &Projection) -> Matrix4<f32> {
    cgmath::perspective(
        Rad(projection.fov_radians),
        projection.aspect_ratio,
        projection.near_plane,
        projection.far_plane,
    )
}

/// Build camera uniform for GPU
pub fn build_camera_uniform(rig: &CameraRigData) -> CameraUniform {
    let view_matrix = build_view_matrix(&rig.transform);
    let projection_matrix = build_projection_matrix(&rig.projection);
    let view_projection = projection_matrix * view_matrix;
    let position = rig.transform.position;
    let forward = camera_forward(&rig.transform);

    CameraUniform {
        view_matrix: view_matrix.into(),
        projection_matrix: projection_matrix.into(),
        view_projection_matrix: view_projection.into(),
        camera_position: [position.x, position.y, position.z, 1.0],
        camera_forward: [forward.x, forward.y, forward.z, 0.0],
        planes: [
            rig.projection.near_plane,
            rig.projection.far_plane,
            rig.projection.fov_radians,
            rig.projection.aspect_ratio,
        ],
    }
}

/// Update aspect ratio and viewport (e.g., on window resize)
pub fn update_viewport(projection: &Projection, width: u32, height: u32) -> Projection {
    let mut new_projection = *projection;
    if width == 0 || height == 0 {
        return new_projection;
    }
    new_projection.viewport_width = width;
    new_projection.viewport_height = height;
    new_projection.aspect_ratio = width as f32 / height as f32;
    new_projection
}

// ============================================================================
// PICKING
// ============================================================================

/// World ray through a pointer position (pixels, origin top-left)
pub fn screen_ray(
    transform: &CameraTransform,
    projection: &Projection,
    pointer: Vector2<f32>,
) -> Option<Ray> {
    let width = projection.viewport_width.max(1) as f32;
    let height = projection.viewport_height.max(1) as f32;
    let ndc_x = 2.0 * pointer.x / width - 1.0;
    let ndc_y = 1.0 - 2.0 * pointer.y / height;

    let view_projection = build_projection_matrix(projection) * build_view_matrix(transform);
    let inverse = view_projection.invert()?;

    let unproject = |z: f32| {
        let p = inverse * Vector4::new(ndc_x, ndc_y, z, 1.0);
        (p.w.abs() > f32::EPSILON).then(|| Point3::new(p.x / p.w, p.y / p.w, p.z / p.w))
    };
    let near = unproject(-1.0)?;
    let far = unproject(1.0)?;
    let direction = far - near;
    if direction.magnitude2() <= f32::EPSILON {
        return None;
    }
    Some(Ray::new(transform.position, direction))
}

/// Pixel position of a world point, `None` when it is behind the camera
pub fn world_to_screen(
    transform: &CameraTransform,
    projection: &Projection,
    point: Point3<f32>,
) -> Option<Vector2<f32>> {
    let view_projection = build_projection_matrix(projection) * build_view_matrix(transform);
    let clip = view_projection * point.to_homogeneous();
    if clip.w <= f32::EPSILON {
        return None;
    }
    let width = projection.viewport_width.max(1) as f32;
    let height = projection.viewport_height.max(1) as f32;
    Some(Vector2::new(
        (clip.x / clip.w + 1.0) * 0.5 * width,
        (1.0 - clip.y / clip.w) * 0.5 * height,
    ))
}

// ============================================================================
// CAMERA DRAG OWNERSHIP
// ============================================================================

/// Track the rotate/pan gesture and its claim on exclusive input.
///
/// Returns false when another owner (the gizmo) holds input; the caller must
/// then skip rotate/pan recognition for this frame.
pub fn track_camera_drag(
    rig: &mut CameraRigData,
    ctx: &mut FrameContext,
    intents: &IntentSnapshot,
    claim_travel_px: f32,
    grace: Duration,
) -> bool {
    if matches!(input_owner(ctx), Some(owner) if owner != InputOwner::CameraDrag) {
        rig.drag_travel = 0.0;
        return false;
    }

    if intents.pointer_pressed.is_some() {
        rig.drag_travel = 0.0;
    }
    let motion = intents.rotate_delta.magnitude() + intents.pan_delta.magnitude();
    rig.drag_travel += motion;

    if motion > 0.0
        && rig.drag_travel > claim_travel_px
        && !is_held_by(ctx, InputOwner::CameraDrag)
        && claim_exclusive_input(ctx, InputOwner::CameraDrag)
    {
        log::debug!("[Camera] Drag claimed input");
    }

    if is_held_by(ctx, InputOwner::CameraDrag) && !intents.any_button_held {
        release_exclusive_input(ctx, InputOwner::CameraDrag, grace);
        rig.drag_travel = 0.0;
        log::debug!("[Camera] Drag released input");
    }
    true
}

// ============================================================================
// MODE TRANSITIONS
// ============================================================================

/// Orbit -> FreeFly. The camera keeps its position and turns toward `focus`.
pub fn enter_free_fly(rig: &mut CameraRigData, focus: Point3<f32>) {
    if rig.mode == CameraMode::FreeFly {
        return;
    }
    let position = rig.transform.position;
    let to_focus = focus - position;
    let (yaw, pitch) = if to_focus.magnitude2() > f32::EPSILON {
        yaw_pitch_from_direction(to_focus)
    } else {
        yaw_pitch_from_direction(camera_forward(&rig.transform))
    };

    rig.free_fly = Some(FreeFlyState {
        position,
        velocity: Vector3::zero(),
        yaw,
        pitch,
        focus,
    });
    rig.orbit.pan_offset = Vector3::zero();
    rig.mode = CameraMode::FreeFly;

    log::debug!(
        "[Camera] FreeFly at ({:.1}, {:.1}, {:.1}), focus ({:.1}, {:.1}, {:.1})",
        position.x,
        position.y,
        position.z,
        focus.x,
        focus.y,
        focus.z
    );
}

/// FreeFly -> Orbit. The orbit camera glides back from where free-fly left it.
pub fn exit_free_fly(rig: &mut CameraRigData) {
    if rig.mode == CameraMode::Orbit {
        return;
    }
    if let Some(free_fly) = rig.free_fly.take() {
        rig.orbit.position = free_fly.position;
    }
    rig.orbit.pan_offset = Vector3::zero();
    rig.mode = CameraMode::Orbit;
    log::debug!("[Camera] Back to Orbit");
}

/// Point the free-fly camera should face when entered through `pointer`
pub fn pick_focus_point(
    rig: &CameraRigData,
    registry: &crate::registry::SceneRegistryData,
    pointer: Vector2<f32>,
    fallback_distance: f32,
) -> Point3<f32> {
    let forward_fallback =
        rig.transform.position + camera_forward(&rig.transform) * fallback_distance;
    let Some(ray) = screen_ray(&rig.transform, &rig.projection, pointer) else {
        return forward_fallback;
    };
    raycast_scene(registry, &ray)
        .map(|hit| hit.point)
        .unwrap_or(forward_fallback)
}

// ============================================================================
// UPDATE
// ============================================================================

/// Per-frame camera stage: mode transitions, then orbit or free-fly.
pub fn update_camera_rig(
    rig: &mut CameraRigData,
    ctx: &mut FrameContext,
    intents: &IntentSnapshot,
    avatar: &AvatarPose,
    ground: &mut GroundQuery<'_>,
    config: &EngineConfig,
) -> CameraTransform {
    match rig.mode {
        CameraMode::Orbit => {
            if let Some(pointer) = intents.mode_click {
                let focus = pick_focus_point(
                    rig,
                    ground.registry,
                    pointer,
                    config.free_fly.focus_fallback_distance,
                );
                enter_free_fly(rig, focus);
            }
        }
        CameraMode::FreeFly => {
            if intents.cancel {
                exit_free_fly(rig);
            }
        }
    }
    ctx.camera_mode = rig.mode;

    let grace = Duration::from_millis(config.gizmo.release_grace_ms);
    let may_drag = track_camera_drag(rig, ctx, intents, config.gizmo.click_max_travel_px, grace);
    let dt = ctx.delta_time;

    rig.transform = match (rig.mode, rig.free_fly.as_mut()) {
        (CameraMode::FreeFly, Some(free_fly)) => {
            update_free_fly(free_fly, intents, may_drag, dt, &config.free_fly)
        }
        _ => update_orbit(
            &mut rig.orbit,
            intents,
            may_drag,
            avatar,
            ground,
            dt,
            &config.orbit,
        ),
    };

    log::trace!(
        "[Camera] {:?} pos=({:.2}, {:.2}, {:.2})",
        rig.mode,
        rig.transform.position.x,
        rig.transform.position.y,
        rig.transform.position.z
    );
    rig.transform
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::OwnershipState;
    use crate::input::idle_snapshot;
    use std::time::Instant;

    fn rig_at(position: Point3<f32>, look_at: Point3<f32>) -> CameraRigData {
        let mut rig = create_camera_rig(Point3::new(0.0, 0.0, 0.0), &EngineConfig::default());
        rig.transform = CameraTransform { position, look_at };
        rig
    }

    #[test]
    fn test_basis_at_zero_yaw() {
        let forward = calculate_forward_vector(0.0, 0.0);
        assert!((forward - Vector3::new(0.0, 0.0, -1.0)).magnitude() < 1e-6);
        let up = calculate_up_vector(0.0, 0.0);
        assert!((up - Vector3::new(0.0, 1.0, 0.0)).magnitude() < 1e-6);
    }

    #[test]
    fn test_yaw_pitch_round_trip() {
        let (yaw, pitch) = yaw_pitch_from_direction(calculate_forward_vector(1.2, -0.4));
        assert!((yaw - 1.2).abs() < 1e-5);
        assert!((pitch + 0.4).abs() < 1e-5);
    }

    #[test]
    fn test_center_ray_points_forward() {
        let rig = rig_at(Point3::new(0.0, 5.0, 10.0), Point3::new(0.0, 5.0, 0.0));
        let center = Vector2::new(
            rig.projection.viewport_width as f32 / 2.0,
            rig.projection.viewport_height as f32 / 2.0,
        );
        let ray = screen_ray(&rig.transform, &rig.projection, center).expect("invertible");
        assert!((ray.direction - Vector3::new(0.0, 0.0, -1.0)).magnitude() < 1e-3);
    }

    #[test]
    fn test_world_to_screen_inverts_screen_ray() {
        let rig = rig_at(Point3::new(3.0, 8.0, 12.0), Point3::new(0.0, 0.0, 0.0));
        let target = Point3::new(1.0, 0.5, -2.0);
        let pixel = world_to_screen(&rig.transform, &rig.projection, target).expect("in front");
        let ray = screen_ray(&rig.transform, &rig.projection, pixel).expect("invertible");
        let to_target = (target - rig.transform.position).normalize();
        assert!((ray.direction - to_target).magnitude() < 1e-3);

        let behind = Point3::new(3.0, 8.0, 30.0);
        assert!(world_to_screen(&rig.transform, &rig.projection, behind).is_none());
    }

    #[test]
    fn test_left_of_center_ray_points_left() {
        let rig = rig_at(Point3::new(0.0, 5.0, 10.0), Point3::new(0.0, 5.0, 0.0));
        let pointer = Vector2::new(0.0, rig.projection.viewport_height as f32 / 2.0);
        let ray = screen_ray(&rig.transform, &rig.projection, pointer).expect("invertible");
        assert!(ray.direction.x < -0.1);
    }

    #[test]
    fn test_free_fly_round_trip_resets_pan() {
        let mut rig = rig_at(Point3::new(0.0, 5.0, 10.0), Point3::new(0.0, 5.0, 0.0));
        rig.orbit.pan_offset = Vector3::new(3.0, 0.0, 0.0);

        enter_free_fly(&mut rig, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(rig.mode, CameraMode::FreeFly);
        assert_eq!(rig.orbit.pan_offset, Vector3::zero());
        let free_fly = rig.free_fly.expect("free-fly state");
        assert_eq!(free_fly.velocity, Vector3::zero());
        assert!(free_fly.pitch < 0.0);

        exit_free_fly(&mut rig);
        assert_eq!(rig.mode, CameraMode::Orbit);
        assert!(rig.free_fly.is_none());
        assert_eq!(rig.orbit.position, Point3::new(0.0, 5.0, 10.0));
    }

    #[test]
    fn test_camera_drag_claims_after_travel_threshold() {
        let mut rig = rig_at(Point3::new(0.0, 5.0, 10.0), Point3::new(0.0, 5.0, 0.0));
        let mut ctx = FrameContext::new(Instant::now());
        let grace = Duration::from_millis(100);
        let small = IntentSnapshot {
            rotate_delta: Vector2::new(2.0, 0.0),
            primary_held: true,
            any_button_held: true,
            ..idle_snapshot()
        };

        assert!(track_camera_drag(&mut rig, &mut ctx, &small, 4.0, grace));
        assert_eq!(ctx.ownership, OwnershipState::Free);
        assert!(track_camera_drag(&mut rig, &mut ctx, &small, 4.0, grace));
        assert!(track_camera_drag(&mut rig, &mut ctx, &small, 4.0, grace));
        assert!(is_held_by(&ctx, InputOwner::CameraDrag));

        track_camera_drag(&mut rig, &mut ctx, &idle_snapshot(), 4.0, grace);
        assert!(matches!(ctx.ownership, OwnershipState::Releasing { .. }));
    }

    #[test]
    fn test_gizmo_ownership_blocks_camera_drag() {
        let mut rig = rig_at(Point3::new(0.0, 5.0, 10.0), Point3::new(0.0, 5.0, 0.0));
        let mut ctx = FrameContext::new(Instant::now());
        claim_exclusive_input(&mut ctx, InputOwner::Gizmo);
        let drag = IntentSnapshot {
            rotate_delta: Vector2::new(50.0, 0.0),
            any_button_held: true,
            ..idle_snapshot()
        };
        assert!(!track_camera_drag(&mut rig, &mut ctx, &drag, 4.0, Duration::ZERO));
        assert!(is_held_by(&ctx, InputOwner::Gizmo));
    }
}
