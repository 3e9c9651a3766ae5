//! Gizmo data structures - Pure DOP
//!
//! NO METHODS. Just data.

use crate::persistence::{PrimId, PrimTransform};
use crate::registry::HandleId;
use cgmath::Vector2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GizmoAxis {
    X,
    Y,
    Z,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GizmoMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

/// One active drag. At most one exists system-wide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GizmoSession {
    pub handle: HandleId,
    pub target: PrimId,
    pub axis: GizmoAxis,
    pub mode: GizmoMode,
    pub pointer_origin: Vector2<f32>,
    pub last_pointer: Vector2<f32>,
    /// Target transform when the drag began
    pub start_transform: PrimTransform,
}

/// Per-move increment. Units depend on mode: meters, radians, or a scale
/// factor increment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GizmoDelta {
    pub mode: GizmoMode,
    pub axis: GizmoAxis,
    pub amount: f32,
}

/// Result of applying one pointer move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GizmoDragOutput {
    pub target: PrimId,
    pub delta: GizmoDelta,
    pub before: PrimTransform,
    pub after: PrimTransform,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GizmoData {
    pub session: Option<GizmoSession>,
    pub selected: Option<PrimId>,
    /// Mode used for handles attached on selection
    pub mode: GizmoMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Selected(PrimId),
    Cleared,
}
