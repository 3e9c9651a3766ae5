//! Input operations - Pure DOP functions
//!
//! Raw events are folded into `InputBuffers` as they arrive; once per frame
//! `take_snapshot` turns the buffers into an `IntentSnapshot` and clears the
//! per-frame accumulators.

use super::input_data::{
    InputBuffers, InputEvent, IntentSnapshot, KeyCode, Modifiers, PointerButton, PointerPress,
    PointerRelease,
};
use cgmath::{InnerSpace, Vector2, Zero};
use std::collections::HashSet;

// ============================================================================
// INITIALIZATION
// ============================================================================

pub fn create_input_buffers() -> InputBuffers {
    InputBuffers {
        keys_down: HashSet::new(),
        buttons_down: HashSet::new(),
        modifiers: Modifiers::default(),
        pointer_position: Vector2::zero(),
        press_origin: None,
        press_is_mode_click: false,
        primary_drag: Vector2::zero(),
        secondary_drag: Vector2::zero(),
        wheel: 0.0,
        presses: Vec::new(),
        releases: Vec::new(),
        keys_pressed: HashSet::new(),
        discarded_events: 0,
    }
}

// ============================================================================
// EVENT FOLDING
// ============================================================================

fn is_finite2(v: Vector2<f32>) -> bool {
    v.x.is_finite() && v.y.is_finite()
}

fn discard(buffers: &mut InputBuffers, event: &InputEvent) {
    buffers.discarded_events += 1;
    log::warn!("[Input] Discarding non-finite event {:?}", event);
}

/// Fold one platform event into the buffers
pub fn apply_event(buffers: &mut InputBuffers, event: InputEvent) {
    match event {
        InputEvent::KeyDown(key) => {
            if buffers.keys_down.insert(key) {
                buffers.keys_pressed.insert(key);
            }
            sync_modifier_key(buffers, key, true);
        }
        InputEvent::KeyUp(key) => {
            buffers.keys_down.remove(&key);
            sync_modifier_key(buffers, key, false);
        }
        InputEvent::PointerDown { button, position } => {
            if !is_finite2(position) {
                discard(buffers, &event);
                return;
            }
            buffers.pointer_position = position;
            buffers.buttons_down.insert(button);
            if buffers.press_origin.is_none() {
                buffers.press_origin = Some(position);
                buffers.press_is_mode_click =
                    button == PointerButton::Primary && buffers.modifiers.alt;
            }
            buffers.presses.push(PointerPress {
                button,
                position,
                modifiers: buffers.modifiers,
            });
        }
        InputEvent::PointerMove { position } => {
            if !is_finite2(position) {
                discard(buffers, &event);
                return;
            }
            let delta = position - buffers.pointer_position;
            buffers.pointer_position = position;
            if buttons_held(buffers, PointerButton::Primary) {
                buffers.primary_drag += delta;
            }
            if buttons_held(buffers, PointerButton::Secondary)
                || buttons_held(buffers, PointerButton::Middle)
            {
                buffers.secondary_drag += delta;
            }
        }
        InputEvent::PointerUp { button, position } => {
            if !is_finite2(position) {
                discard(buffers, &event);
                return;
            }
            buffers.pointer_position = position;
            buffers.buttons_down.remove(&button);
            let travel = buffers
                .press_origin
                .map(|origin| (position - origin).magnitude())
                .unwrap_or(0.0);
            buffers.releases.push(PointerRelease {
                button,
                position,
                travel,
                mode_click: buffers.press_is_mode_click,
            });
            if buffers.buttons_down.is_empty() {
                buffers.press_origin = None;
                buffers.press_is_mode_click = false;
            }
        }
        InputEvent::Wheel { delta } => {
            if !delta.is_finite() {
                discard(buffers, &event);
                return;
            }
            buffers.wheel += delta;
        }
        InputEvent::ModifiersChanged(modifiers) => {
            buffers.modifiers = modifiers;
        }
        InputEvent::FocusLost => {
            buffers.keys_down.clear();
            buffers.buttons_down.clear();
            buffers.press_origin = None;
            buffers.press_is_mode_click = false;
            buffers.modifiers = Modifiers::default();
        }
    }
}

fn sync_modifier_key(buffers: &mut InputBuffers, key: KeyCode, down: bool) {
    match key {
        KeyCode::ShiftLeft | KeyCode::ShiftRight => buffers.modifiers.shift = down,
        KeyCode::ControlLeft | KeyCode::ControlRight => buffers.modifiers.control = down,
        _ => {}
    }
}

pub fn buttons_held(buffers: &InputBuffers, button: PointerButton) -> bool {
    buffers.buttons_down.contains(&button)
}

fn any_down(buffers: &InputBuffers, keys: &[KeyCode]) -> bool {
    keys.iter().any(|k| buffers.keys_down.contains(k))
}

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Build this frame's intents and reset the per-frame accumulators
pub fn take_snapshot(buffers: &mut InputBuffers) -> IntentSnapshot {
    let mode_click = buffers
        .presses
        .iter()
        .find(|p| p.button == PointerButton::Primary && p.modifiers.alt)
        .map(|p| p.position);
    let pointer_pressed = buffers
        .presses
        .iter()
        .find(|p| !(p.button == PointerButton::Primary && p.modifiers.alt))
        .copied();

    let snapshot = IntentSnapshot {
        forward: any_down(buffers, &[KeyCode::KeyW, KeyCode::ArrowUp]),
        backward: any_down(buffers, &[KeyCode::KeyS, KeyCode::ArrowDown]),
        left: any_down(buffers, &[KeyCode::KeyA, KeyCode::ArrowLeft]),
        right: any_down(buffers, &[KeyCode::KeyD, KeyCode::ArrowRight]),
        up: any_down(buffers, &[KeyCode::KeyE, KeyCode::Space]),
        down: any_down(buffers, &[KeyCode::KeyQ]),
        toggle_fly: any_down(buffers, &[KeyCode::KeyF]),
        fast: buffers.modifiers.shift,
        slow: buffers.modifiers.control,
        cancel: buffers.keys_pressed.contains(&KeyCode::Escape),
        rotate_delta: buffers.primary_drag,
        pan_delta: buffers.secondary_drag,
        scroll: buffers.wheel,
        pointer_position: buffers.pointer_position,
        pointer_pressed,
        pointer_released: buffers.releases.first().copied(),
        primary_held: buttons_held(buffers, PointerButton::Primary),
        any_button_held: !buffers.buttons_down.is_empty(),
        mode_click,
    };

    buffers.primary_drag = Vector2::zero();
    buffers.secondary_drag = Vector2::zero();
    buffers.wheel = 0.0;
    buffers.presses.clear();
    buffers.releases.clear();
    buffers.keys_pressed.clear();

    snapshot
}

/// Convenience for callers holding a batch of events
pub fn aggregate_frame(buffers: &mut InputBuffers, events: &[InputEvent]) -> IntentSnapshot {
    for event in events {
        apply_event(buffers, *event);
    }
    take_snapshot(buffers)
}

/// Snapshot with no input at all
pub fn idle_snapshot() -> IntentSnapshot {
    take_snapshot(&mut create_input_buffers())
}
