//! Input data structures - Pure DOP
//!
//! NO METHODS. Just data.
//! All transformations happen in input_operations.rs

use cgmath::Vector2;
use std::collections::HashSet;

/// Physical keys the engine binds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    KeyW,
    KeyA,
    KeyS,
    KeyD,
    KeyQ,
    KeyE,
    KeyF,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Space,
    ShiftLeft,
    ShiftRight,
    ControlLeft,
    ControlRight,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Raw platform event, already in window pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(KeyCode),
    KeyUp(KeyCode),
    PointerDown {
        button: PointerButton,
        position: Vector2<f32>,
    },
    PointerMove {
        position: Vector2<f32>,
    },
    PointerUp {
        button: PointerButton,
        position: Vector2<f32>,
    },
    Wheel {
        delta: f32,
    },
    ModifiersChanged(Modifiers),
    /// Window lost focus; everything held is released
    FocusLost,
}

/// A pointer press seen this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPress {
    pub button: PointerButton,
    pub position: Vector2<f32>,
    pub modifiers: Modifiers,
}

/// A pointer release seen this frame, with the distance travelled since press
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerRelease {
    pub button: PointerButton,
    pub position: Vector2<f32>,
    pub travel: f32,
    /// The press was an Alt+primary mode switch, consumed by the camera
    pub mode_click: bool,
}

/// Persistent input state, plus per-frame accumulators cleared each snapshot
#[derive(Debug, Clone)]
pub struct InputBuffers {
    pub keys_down: HashSet<KeyCode>,
    pub buttons_down: HashSet<PointerButton>,
    pub modifiers: Modifiers,
    pub pointer_position: Vector2<f32>,
    /// Where the current primary/secondary press started
    pub press_origin: Option<Vector2<f32>>,
    pub press_is_mode_click: bool,

    // Per-frame accumulators
    pub primary_drag: Vector2<f32>,
    pub secondary_drag: Vector2<f32>,
    pub wheel: f32,
    pub presses: Vec<PointerPress>,
    pub releases: Vec<PointerRelease>,
    pub keys_pressed: HashSet<KeyCode>,
    pub discarded_events: u64,
}

/// Semantic intents for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntentSnapshot {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Level of the fly toggle key; edges are detected by the consumer
    pub toggle_fly: bool,
    pub fast: bool,
    pub slow: bool,
    pub cancel: bool,

    /// Pointer motion while the primary button is held (rotate / look)
    pub rotate_delta: Vector2<f32>,
    /// Pointer motion while the secondary or middle button is held (pan)
    pub pan_delta: Vector2<f32>,
    pub scroll: f32,

    pub pointer_position: Vector2<f32>,
    pub pointer_pressed: Option<PointerPress>,
    pub pointer_released: Option<PointerRelease>,
    pub primary_held: bool,
    pub any_button_held: bool,
    /// Alt + primary press this frame: request free-fly
    pub mode_click: Option<Vector2<f32>>,
}
