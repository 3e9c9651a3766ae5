//! Click selection - Pure DOP functions
//!
//! A primary click (press and release within a few pixels) selects the
//! nearest manipulable object under the pointer or clears the selection.
//! Clicks that land while any gesture owns input, including its release grace
//! window, are ignored.

use super::gizmo_data::{GizmoData, GizmoMode, SelectionChange};
use crate::camera::{screen_ray, CameraRigData};
use crate::config::GizmoConfig;
use crate::context::{is_input_exclusive, FrameContext};
use crate::input::{IntentSnapshot, PointerButton};
use crate::persistence::PrimId;
use crate::registry::{
    attach_axis_handles, detach_handles, object_bounds, pick_object, SceneRegistryData,
};

/// Handles sit just outside the object's bounds
fn handle_reach(registry: &SceneRegistryData, id: PrimId) -> f32 {
    registry
        .objects
        .get(&id)
        .map(|object| {
            let bounds = object_bounds(object);
            let half = (bounds.max - bounds.min) * 0.5;
            half.x.max(half.y).max(half.z) + 1.0
        })
        .unwrap_or(1.0)
}

pub fn select_object(gizmo: &mut GizmoData, registry: &mut SceneRegistryData, id: PrimId) -> bool {
    if !registry.objects.contains_key(&id) {
        return false;
    }
    if let Some(previous) = gizmo.selected.take() {
        detach_handles(registry, previous);
    }
    let reach = handle_reach(registry, id);
    attach_axis_handles(registry, id, gizmo.mode, reach);
    gizmo.selected = Some(id);
    log::debug!("[Selection] Selected prim {}", id);
    true
}

pub fn clear_selection(gizmo: &mut GizmoData, registry: &mut SceneRegistryData) -> bool {
    match gizmo.selected.take() {
        Some(previous) => {
            detach_handles(registry, previous);
            log::debug!("[Selection] Cleared (was prim {})", previous);
            true
        }
        None => false,
    }
}

/// Switch the handle mode and re-attach handles on the current selection
pub fn set_gizmo_mode(gizmo: &mut GizmoData, registry: &mut SceneRegistryData, mode: GizmoMode) {
    gizmo.mode = mode;
    if let Some(id) = gizmo.selected {
        detach_handles(registry, id);
        let reach = handle_reach(registry, id);
        attach_axis_handles(registry, id, mode, reach);
    }
}

/// Per-frame selection stage, after the gizmo stage
pub fn handle_click(
    gizmo: &mut GizmoData,
    ctx: &FrameContext,
    intents: &IntentSnapshot,
    rig: &CameraRigData,
    registry: &mut SceneRegistryData,
    config: &GizmoConfig,
) -> Option<SelectionChange> {
    let release = intents.pointer_released?;
    if release.button != PointerButton::Primary
        || release.mode_click
        || release.travel > config.click_max_travel_px
        || is_input_exclusive(ctx)
        || gizmo.session.is_some()
    {
        return None;
    }

    let hit = screen_ray(&rig.transform, &rig.projection, release.position)
        .and_then(|ray| pick_object(registry, &ray));
    match hit {
        Some((id, _)) if gizmo.selected == Some(id) => None,
        Some((id, _)) => select_object(gizmo, registry, id).then_some(SelectionChange::Selected(id)),
        None => clear_selection(gizmo, registry).then_some(SelectionChange::Cleared),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{create_camera_rig, CameraTransform};
    use crate::config::EngineConfig;
    use crate::context::{claim_exclusive_input, release_exclusive_input, InputOwner};
    use crate::gizmo::create_gizmo;
    use crate::input::{idle_snapshot, PointerRelease};
    use crate::persistence::PrimTransform;
    use crate::registry::{create_registry, register_object, tag_count, SceneTag};
    use cgmath::{Point3, Vector2, Vector3};
    use std::time::{Duration, Instant};

    fn setup() -> (SceneRegistryData, CameraRigData) {
        let mut registry = create_registry();
        register_object(&mut registry, 5, PrimTransform::default(), Vector3::new(1.0, 1.0, 1.0));
        let mut rig = create_camera_rig(Point3::new(0.0, 0.0, 0.0), &EngineConfig::default());
        rig.transform = CameraTransform {
            position: Point3::new(0.0, 0.0, 10.0),
            look_at: Point3::new(0.0, 0.0, 0.0),
        };
        (registry, rig)
    }

    fn click_at(x: f32, y: f32, travel: f32) -> IntentSnapshot {
        IntentSnapshot {
            pointer_released: Some(PointerRelease {
                button: PointerButton::Primary,
                position: Vector2::new(x, y),
                travel,
                mode_click: false,
            }),
            ..idle_snapshot()
        }
    }

    fn center(rig: &CameraRigData) -> (f32, f32) {
        (
            rig.projection.viewport_width as f32 / 2.0,
            rig.projection.viewport_height as f32 / 2.0,
        )
    }

    #[test]
    fn test_click_selects_then_empty_click_clears() {
        let (mut registry, rig) = setup();
        let config = GizmoConfig::default();
        let ctx = FrameContext::new(Instant::now());
        let mut gizmo = create_gizmo();
        let (cx, cy) = center(&rig);

        let change = handle_click(&mut gizmo, &ctx, &click_at(cx, cy, 0.0), &rig, &mut registry, &config);
        assert_eq!(change, Some(SelectionChange::Selected(5)));
        assert_eq!(tag_count(&registry, SceneTag::GizmoHandle), 3);

        let change = handle_click(&mut gizmo, &ctx, &click_at(5.0, 5.0, 0.0), &rig, &mut registry, &config);
        assert_eq!(change, Some(SelectionChange::Cleared));
        assert_eq!(tag_count(&registry, SceneTag::GizmoHandle), 0);
    }

    #[test]
    fn test_mode_click_release_keeps_selection() {
        let (mut registry, rig) = setup();
        let config = GizmoConfig::default();
        let ctx = FrameContext::new(Instant::now());
        let mut gizmo = create_gizmo();
        select_object(&mut gizmo, &mut registry, 5);

        let mut release = click_at(5.0, 5.0, 0.0);
        if let Some(r) = release.pointer_released.as_mut() {
            r.mode_click = true;
        }
        let change = handle_click(&mut gizmo, &ctx, &release, &rig, &mut registry, &config);
        assert_eq!(change, None);
        assert_eq!(gizmo.selected, Some(5));
    }

    #[test]
    fn test_drag_travel_is_not_a_click() {
        let (mut registry, rig) = setup();
        let ctx = FrameContext::new(Instant::now());
        let mut gizmo = create_gizmo();
        let (cx, cy) = center(&rig);
        let change = handle_click(
            &mut gizmo,
            &ctx,
            &click_at(cx, cy, 30.0),
            &rig,
            &mut registry,
            &GizmoConfig::default(),
        );
        assert_eq!(change, None);
    }

    #[test]
    fn test_release_grace_suppresses_deselect() {
        let (mut registry, rig) = setup();
        let config = GizmoConfig::default();
        let start = Instant::now();
        let mut ctx = FrameContext::new(start);
        let mut gizmo = create_gizmo();
        select_object(&mut gizmo, &mut registry, 5);

        claim_exclusive_input(&mut ctx, InputOwner::Gizmo);
        release_exclusive_input(&mut ctx, InputOwner::Gizmo, Duration::from_millis(100));
        let change = handle_click(&mut gizmo, &ctx, &click_at(5.0, 5.0, 0.0), &rig, &mut registry, &config);
        assert_eq!(change, None);
        assert_eq!(gizmo.selected, Some(5));
    }

    #[test]
    fn test_mode_switch_reattaches_handles() {
        let (mut registry, _rig) = setup();
        let mut gizmo = create_gizmo();
        select_object(&mut gizmo, &mut registry, 5);
        set_gizmo_mode(&mut gizmo, &mut registry, GizmoMode::Scale);
        assert_eq!(tag_count(&registry, SceneTag::GizmoHandle), 3);
        assert!(registry.handles.values().all(|h| h.mode == GizmoMode::Scale));
    }
}
