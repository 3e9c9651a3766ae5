/// Gizmo Module - Data-Oriented Programming (DOP) style
///
/// - gizmo_data.rs: axes, modes, the drag session (NO methods)
/// - gizmo_operations.rs: drag math and session lifecycle
/// - selection_operations.rs: click select / deselect and handle attachment

pub mod gizmo_data;
pub mod gizmo_operations;
pub mod selection_operations;

pub use gizmo_data::{
    GizmoAxis, GizmoData, GizmoDelta, GizmoDragOutput, GizmoMode, GizmoSession, SelectionChange,
};

pub use gizmo_operations::{
    apply_delta_to_transform, axis_unit, begin_drag, create_gizmo, drag_delta, end_drag,
    route_press, screen_component, update_drag, update_gizmo,
};

pub use selection_operations::{clear_selection, handle_click, select_object, set_gizmo_mode};
