/// Input Module - Data-Oriented Programming (DOP) style
///
/// - input_data.rs: raw events, persistent buffers, per-frame intents
/// - input_operations.rs: event folding and snapshotting
/// - winit_adapter.rs: platform event translation

pub mod input_data;
pub mod input_operations;
pub mod winit_adapter;

pub use input_data::{
    InputBuffers, InputEvent, IntentSnapshot, KeyCode, Modifiers, PointerButton, PointerPress,
    PointerRelease,
};

pub use input_operations::{
    aggregate_frame, apply_event, buttons_held, create_input_buffers, idle_snapshot, take_snapshot,
};

pub use winit_adapter::translate_window_event;
