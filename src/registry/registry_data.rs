//! Scene registry data - Pure DOP
//!
//! NO METHODS. Just data.
//! Every object is registered under an explicit role.

use crate::gizmo::{GizmoAxis, GizmoMode};
use crate::persistence::{PrimId, PrimTransform};
use cgmath::{Point3, Vector3};
use rustc_hash::FxHashMap;

pub type SurfaceId = u32;
pub type HandleId = u32;

/// Role an object plays for the navigation engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneTag {
    CollidableTerrain,
    GizmoHandle,
    Manipulable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceGeometry {
    /// Flat rectangle at `height` covering [min_xz, max_xz]
    HorizontalRect {
        height: f32,
        min_xz: [f32; 2],
        max_xz: [f32; 2],
    },
    /// World-space triangles
    Triangles(Vec<[Point3<f32>; 3]>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TerrainSurface {
    pub id: SurfaceId,
    pub geometry: SurfaceGeometry,
}

/// One draggable per-axis handle, positioned relative to its target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GizmoHandle {
    pub id: HandleId,
    pub target: PrimId,
    pub axis: GizmoAxis,
    pub mode: GizmoMode,
    pub offset: Vector3<f32>,
    pub half_extents: Vector3<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManipulableObject {
    pub id: PrimId,
    pub transform: PrimTransform,
    /// Half extents at unit scale
    pub half_extents: Vector3<f32>,
}

#[derive(Debug, Clone, Default)]
pub struct SceneRegistryData {
    pub terrain: FxHashMap<SurfaceId, TerrainSurface>,
    pub handles: FxHashMap<HandleId, GizmoHandle>,
    pub objects: FxHashMap<PrimId, ManipulableObject>,
    /// Bumped on every terrain add/remove
    pub terrain_generation: u64,
    pub next_surface_id: SurfaceId,
    pub next_handle_id: HandleId,
}
