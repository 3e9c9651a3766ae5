/// Scene Registry - Data-Oriented Programming (DOP) style
///
/// Objects register under an explicit role (collidable terrain, gizmo handle,
/// manipulable object). The ground probe, gizmo controller and click
/// selection query this registry directly.

pub mod registry_data;
pub mod registry_operations;

pub use registry_data::{
    GizmoHandle, HandleId, ManipulableObject, SceneRegistryData, SceneTag, SurfaceGeometry,
    SurfaceId, TerrainSurface,
};

pub use registry_operations::{
    attach_axis_handles, create_registry, detach_handles, handle_bounds, object_bounds,
    object_center, object_transform, pick_handle, pick_object, raycast_scene, register_handle,
    register_object, register_terrain, set_object_transform, surface_hit_distance, tag_count,
    unregister_object, unregister_terrain,
};
