//! Scene registry operations - Pure DOP functions
//!
//! Registration, lookup and ray picking over the tagged scene objects.

use super::registry_data::{
    GizmoHandle, HandleId, ManipulableObject, SceneRegistryData, SceneTag, SurfaceGeometry,
    SurfaceId, TerrainSurface,
};
use crate::gizmo::{axis_unit, GizmoAxis, GizmoMode};
use crate::persistence::{PrimId, PrimTransform};
use crate::physics::aabb::{aabb_from_center_half_extents, ray_aabb_intersection, AABB};
use crate::physics::ray::{
    ray_horizontal_rect_intersection, ray_point_at, ray_triangle_intersection, Ray, RayHit,
};
use cgmath::{Point3, Vector3};

pub fn create_registry() -> SceneRegistryData {
    SceneRegistryData::default()
}

// ============================================================================
// TERRAIN
// ============================================================================

pub fn register_terrain(registry: &mut SceneRegistryData, geometry: SurfaceGeometry) -> SurfaceId {
    let id = registry.next_surface_id;
    registry.next_surface_id += 1;
    registry.terrain.insert(id, TerrainSurface { id, geometry });
    registry.terrain_generation += 1;
    id
}

pub fn unregister_terrain(registry: &mut SceneRegistryData, id: SurfaceId) -> bool {
    let removed = registry.terrain.remove(&id).is_some();
    if removed {
        registry.terrain_generation += 1;
    }
    removed
}

// ============================================================================
// MANIPULABLE OBJECTS
// ============================================================================

pub fn register_object(
    registry: &mut SceneRegistryData,
    id: PrimId,
    transform: PrimTransform,
    half_extents: Vector3<f32>,
) {
    registry.objects.insert(
        id,
        ManipulableObject {
            id,
            transform,
            half_extents,
        },
    );
}

/// Removes the object and every handle attached to it
pub fn unregister_object(registry: &mut SceneRegistryData, id: PrimId) -> bool {
    registry.handles.retain(|_, handle| handle.target != id);
    registry.objects.remove(&id).is_some()
}

pub fn object_transform(registry: &SceneRegistryData, id: PrimId) -> Option<PrimTransform> {
    registry.objects.get(&id).map(|object| object.transform)
}

pub fn set_object_transform(
    registry: &mut SceneRegistryData,
    id: PrimId,
    transform: PrimTransform,
) -> bool {
    match registry.objects.get_mut(&id) {
        Some(object) => {
            object.transform = transform;
            true
        }
        None => false,
    }
}

/// World bounds of an object at its current position and scale
pub fn object_bounds(object: &ManipulableObject) -> AABB {
    let s = object.transform.scale;
    let half = Vector3::new(
        object.half_extents.x * s.x.abs(),
        object.half_extents.y * s.y.abs(),
        object.half_extents.z * s.z.abs(),
    );
    aabb_from_center_half_extents(object.transform.position, half)
}

// ============================================================================
// GIZMO HANDLES
// ============================================================================

pub fn register_handle(
    registry: &mut SceneRegistryData,
    target: PrimId,
    axis: GizmoAxis,
    mode: GizmoMode,
    offset: Vector3<f32>,
    half_extents: Vector3<f32>,
) -> HandleId {
    let id = registry.next_handle_id;
    registry.next_handle_id += 1;
    registry.handles.insert(
        id,
        GizmoHandle {
            id,
            target,
            axis,
            mode,
            offset,
            half_extents,
        },
    );
    id
}

/// Attach one handle per axis, `reach` meters out from the object center
pub fn attach_axis_handles(
    registry: &mut SceneRegistryData,
    target: PrimId,
    mode: GizmoMode,
    reach: f32,
) -> [HandleId; 3] {
    let thickness = (reach * 0.1).max(0.05);
    let knob = Vector3::new(thickness, thickness, thickness);
    [GizmoAxis::X, GizmoAxis::Y, GizmoAxis::Z].map(|axis| {
        let offset = axis_unit(axis) * reach;
        register_handle(registry, target, axis, mode, offset, knob)
    })
}

pub fn detach_handles(registry: &mut SceneRegistryData, target: PrimId) {
    registry.handles.retain(|_, handle| handle.target != target);
}

pub fn handle_bounds(registry: &SceneRegistryData, handle: &GizmoHandle) -> Option<AABB> {
    let target = registry.objects.get(&handle.target)?;
    Some(aabb_from_center_half_extents(
        target.transform.position + handle.offset,
        handle.half_extents,
    ))
}

// ============================================================================
// PICKING
// ============================================================================

/// Nearest gizmo handle along the ray
pub fn pick_handle(registry: &SceneRegistryData, ray: &Ray) -> Option<(GizmoHandle, f32)> {
    registry
        .handles
        .values()
        .filter_map(|handle| {
            let bounds = handle_bounds(registry, handle)?;
            ray_aabb_intersection(ray, &bounds).map(|t| (*handle, t))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Nearest manipulable object along the ray
pub fn pick_object(registry: &SceneRegistryData, ray: &Ray) -> Option<(PrimId, f32)> {
    registry
        .objects
        .values()
        .filter_map(|object| ray_aabb_intersection(ray, &object_bounds(object)).map(|t| (object.id, t)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Nearest hit along the ray for a single terrain surface
pub fn surface_hit_distance(geometry: &SurfaceGeometry, ray: &Ray) -> Option<f32> {
    match geometry {
        SurfaceGeometry::HorizontalRect {
            height,
            min_xz,
            max_xz,
        } => ray_horizontal_rect_intersection(ray, *height, *min_xz, *max_xz),
        SurfaceGeometry::Triangles(triangles) => triangles
            .iter()
            .filter_map(|tri| ray_triangle_intersection(ray, tri))
            .min_by(|a, b| a.total_cmp(b)),
    }
}

/// Nearest hit against terrain and manipulable objects
pub fn raycast_scene(registry: &SceneRegistryData, ray: &Ray) -> Option<RayHit> {
    let terrain = registry
        .terrain
        .values()
        .filter_map(|surface| surface_hit_distance(&surface.geometry, ray));
    let objects = registry
        .objects
        .values()
        .filter_map(|object| ray_aabb_intersection(ray, &object_bounds(object)));

    terrain
        .chain(objects)
        .min_by(|a, b| a.total_cmp(b))
        .map(|distance| RayHit {
            point: ray_point_at(ray, distance),
            distance,
        })
}

pub fn tag_count(registry: &SceneRegistryData, tag: SceneTag) -> usize {
    match tag {
        SceneTag::CollidableTerrain => registry.terrain.len(),
        SceneTag::GizmoHandle => registry.handles.len(),
        SceneTag::Manipulable => registry.objects.len(),
    }
}

pub fn object_center(registry: &SceneRegistryData, id: PrimId) -> Option<Point3<f32>> {
    registry
        .objects
        .get(&id)
        .map(|object| object.transform.position)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn box_at(x: f32, y: f32, z: f32) -> PrimTransform {
        PrimTransform {
            position: Point3::new(x, y, z),
            ..PrimTransform::default()
        }
    }

    #[test]
    fn test_terrain_generation_bumps() {
        let mut registry = create_registry();
        let id = register_terrain(
            &mut registry,
            SurfaceGeometry::HorizontalRect {
                height: 0.0,
                min_xz: [-10.0, -10.0],
                max_xz: [10.0, 10.0],
            },
        );
        assert_eq!(registry.terrain_generation, 1);
        assert!(unregister_terrain(&mut registry, id));
        assert_eq!(registry.terrain_generation, 2);
        assert!(!unregister_terrain(&mut registry, id));
    }

    #[test]
    fn test_pick_nearest_object() {
        let mut registry = create_registry();
        let half = Vector3::new(0.5, 0.5, 0.5);
        register_object(&mut registry, 1, box_at(0.0, 0.0, -10.0), half);
        register_object(&mut registry, 2, box_at(0.0, 0.0, -5.0), half);

        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, -1.0));
        let (id, t) = pick_object(&registry, &ray).expect("should pick");
        assert_eq!(id, 2);
        assert!((t - 4.5).abs() < 1e-5);
    }

    #[test]
    fn test_handles_follow_their_object() {
        let mut registry = create_registry();
        register_object(&mut registry, 9, box_at(0.0, 0.0, 0.0), Vector3::new(0.5, 0.5, 0.5));
        let [x_handle, _, _] = attach_axis_handles(&mut registry, 9, GizmoMode::Translate, 2.0);

        set_object_transform(&mut registry, 9, box_at(10.0, 0.0, 0.0));
        let ray = Ray::new(Point3::new(12.0, 0.0, 10.0), Vector3::new(0.0, 0.0, -1.0));
        let (handle, _) = pick_handle(&registry, &ray).expect("handle moved with object");
        assert_eq!(handle.id, x_handle);
        assert_eq!(handle.axis, GizmoAxis::X);
    }

    #[test]
    fn test_unregister_object_drops_handles() {
        let mut registry = create_registry();
        register_object(&mut registry, 3, box_at(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0));
        attach_axis_handles(&mut registry, 3, GizmoMode::Scale, 1.5);
        assert_eq!(tag_count(&registry, SceneTag::GizmoHandle), 3);
        assert!(unregister_object(&mut registry, 3));
        assert_eq!(tag_count(&registry, SceneTag::GizmoHandle), 0);
    }

    #[test]
    fn test_raycast_scene_prefers_nearest() {
        let mut registry = create_registry();
        register_terrain(
            &mut registry,
            SurfaceGeometry::HorizontalRect {
                height: 0.0,
                min_xz: [-50.0, -50.0],
                max_xz: [50.0, 50.0],
            },
        );
        register_object(&mut registry, 4, box_at(0.0, 2.0, 0.0), Vector3::new(1.0, 1.0, 1.0));

        let ray = Ray::downward(Point3::new(0.0, 10.0, 0.0));
        let hit = raycast_scene(&registry, &ray).expect("should hit box");
        assert!((hit.point.y - 3.0).abs() < 1e-5);
    }
}
