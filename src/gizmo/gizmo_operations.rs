//! Gizmo operations - Pure DOP functions
//!
//! Modal per-axis drag sessions. Starting a drag claims exclusive pointer
//! input; ending it releases the claim after a short grace window so the
//! click-to-deselect handler does not fire on the same gesture.

use super::gizmo_data::{GizmoAxis, GizmoData, GizmoDelta, GizmoDragOutput, GizmoMode, GizmoSession};
use crate::camera::{screen_ray, CameraRigData};
use crate::config::GizmoConfig;
use crate::context::{claim_exclusive_input, input_owner, release_exclusive_input, FrameContext, InputOwner};
use crate::error::{EngineError, EngineResult, OptionExt};
use crate::input::{IntentSnapshot, PointerButton};
use crate::persistence::PrimTransform;
use crate::registry::{object_transform, pick_handle, set_object_transform, GizmoHandle, SceneRegistryData};
use cgmath::{InnerSpace, Point3, Vector2, Vector3};
use std::time::Duration;

pub fn create_gizmo() -> GizmoData {
    GizmoData::default()
}

pub fn axis_unit(axis: GizmoAxis) -> Vector3<f32> {
    match axis {
        GizmoAxis::X => Vector3::new(1.0, 0.0, 0.0),
        GizmoAxis::Y => Vector3::new(0.0, 1.0, 0.0),
        GizmoAxis::Z => Vector3::new(0.0, 0.0, 1.0),
    }
}

// ============================================================================
// PURE DRAG MATH
// ============================================================================

/// Screen motion along the axis: horizontal for X, inverted vertical for Y/Z
pub fn screen_component(axis: GizmoAxis, pixel_delta: Vector2<f32>) -> f32 {
    match axis {
        GizmoAxis::X => pixel_delta.x,
        GizmoAxis::Y | GizmoAxis::Z => -pixel_delta.y,
    }
}

/// Delta for a pointer move. Pure in (mode, axis, pixels, distance, config).
///
/// Sensitivity grows with camera distance so a drag feels the same at any zoom.
pub fn drag_delta(
    mode: GizmoMode,
    axis: GizmoAxis,
    pixel_delta: Vector2<f32>,
    camera_distance: f32,
    config: &GizmoConfig,
) -> GizmoDelta {
    let base = screen_component(axis, pixel_delta) * camera_distance * config.drag_sensitivity;
    let amount = match mode {
        GizmoMode::Translate => base,
        GizmoMode::Rotate => base * config.rotate_sensitivity,
        GizmoMode::Scale => base * config.scale_sensitivity,
    };
    GizmoDelta { mode, axis, amount }
}

/// Apply a delta; scale never drops below `min_scale` on any axis
pub fn apply_delta_to_transform(
    transform: &PrimTransform,
    delta: &GizmoDelta,
    min_scale: f32,
) -> PrimTransform {
    let mut result = *transform;
    let unit = axis_unit(delta.axis);
    match delta.mode {
        GizmoMode::Translate => result.position += unit * delta.amount,
        GizmoMode::Rotate => result.rotation += unit * delta.amount,
        GizmoMode::Scale => {
            let factor = 1.0 + delta.amount;
            let scaled = match delta.axis {
                GizmoAxis::X => &mut result.scale.x,
                GizmoAxis::Y => &mut result.scale.y,
                GizmoAxis::Z => &mut result.scale.z,
            };
            let next = *scaled * factor;
            *scaled = if next.is_finite() { next.max(min_scale) } else { min_scale };
        }
    }
    result
}

// ============================================================================
// SESSIONS
// ============================================================================

/// Start a drag on `handle`. Fails if a session exists or input is owned elsewhere.
pub fn begin_drag(
    gizmo: &mut GizmoData,
    ctx: &mut FrameContext,
    handle: &GizmoHandle,
    pointer: Vector2<f32>,
    registry: &SceneRegistryData,
) -> EngineResult<()> {
    if let Some(session) = &gizmo.session {
        return Err(EngineError::SessionActive {
            target: session.target,
        });
    }
    let start_transform = object_transform(registry, handle.target).ok_or_engine(|| EngineError::NotFound {
        kind: "prim",
        id: handle.target,
    })?;
    if !claim_exclusive_input(ctx, InputOwner::Gizmo) {
        let owner = input_owner(ctx).map(|o| format!("{:?}", o)).unwrap_or_default();
        return Err(EngineError::InputOwned { owner });
    }

    gizmo.session = Some(GizmoSession {
        handle: handle.id,
        target: handle.target,
        axis: handle.axis,
        mode: handle.mode,
        pointer_origin: pointer,
        last_pointer: pointer,
        start_transform,
    });
    gizmo.selected = Some(handle.target);

    log::debug!(
        "[Gizmo] Drag begin: prim {} {:?} on {:?}",
        handle.target,
        handle.mode,
        handle.axis
    );
    Ok(())
}

/// Apply a pointer move to the dragged object. `None` without a session.
pub fn update_drag(
    gizmo: &mut GizmoData,
    registry: &mut SceneRegistryData,
    pointer: Vector2<f32>,
    camera_position: Point3<f32>,
    config: &GizmoConfig,
) -> Option<GizmoDragOutput> {
    let session = gizmo.session.as_mut()?;
    let pixel_delta = pointer - session.last_pointer;
    if !(pixel_delta.x.is_finite() && pixel_delta.y.is_finite()) {
        return None;
    }
    session.last_pointer = pointer;

    let before = object_transform(registry, session.target)?;
    let distance = (before.position - camera_position).magnitude();
    let delta = drag_delta(session.mode, session.axis, pixel_delta, distance, config);
    let after = apply_delta_to_transform(&before, &delta, config.min_scale);
    set_object_transform(registry, session.target, after);

    log::trace!("[Gizmo] {:?} {:?} += {:.4}", delta.mode, delta.axis, delta.amount);
    Some(GizmoDragOutput {
        target: session.target,
        delta,
        before,
        after,
    })
}

/// End the session. Input stays owned for `grace`.
pub fn end_drag(gizmo: &mut GizmoData, ctx: &mut FrameContext, grace: Duration) -> Option<GizmoSession> {
    let session = gizmo.session.take()?;
    release_exclusive_input(ctx, InputOwner::Gizmo, grace);
    log::debug!(
        "[Gizmo] Drag end: prim {} moved {:.1}px",
        session.target,
        (session.last_pointer - session.pointer_origin).magnitude()
    );
    Some(session)
}

// ============================================================================
// FRAME STAGES
// ============================================================================

/// Start a drag when the primary press lands on a handle. Runs before the
/// camera stage so the camera sees the claim in the same frame.
pub fn route_press(
    gizmo: &mut GizmoData,
    ctx: &mut FrameContext,
    intents: &IntentSnapshot,
    rig: &CameraRigData,
    registry: &SceneRegistryData,
) -> bool {
    let Some(press) = intents.pointer_pressed else {
        return false;
    };
    if press.button != PointerButton::Primary || gizmo.session.is_some() {
        return false;
    }
    let Some(ray) = screen_ray(&rig.transform, &rig.projection, press.position) else {
        return false;
    };
    let Some((handle, _)) = pick_handle(registry, &ray) else {
        return false;
    };

    match begin_drag(gizmo, ctx, &handle, press.position, registry) {
        Ok(()) => true,
        Err(e) => {
            log::debug!("[Gizmo] Press on handle {} ignored: {}", handle.id, e);
            false
        }
    }
}

/// Per-frame drag stage, after the camera moved
pub fn update_gizmo(
    gizmo: &mut GizmoData,
    ctx: &mut FrameContext,
    intents: &IntentSnapshot,
    camera_position: Point3<f32>,
    registry: &mut SceneRegistryData,
    config: &GizmoConfig,
) -> Option<GizmoDragOutput> {
    let session = gizmo.session?;
    let output = if intents.pointer_position != session.last_pointer {
        update_drag(gizmo, registry, intents.pointer_position, camera_position, config)
    } else {
        None
    };

    if intents.pointer_released.is_some() || !intents.primary_held {
        end_drag(gizmo, ctx, Duration::from_millis(config.release_grace_ms));
    }
    output
}
