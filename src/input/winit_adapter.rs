//! Translation from winit window events to engine input events

use super::input_data::{InputEvent, KeyCode, Modifiers, PointerButton};
use cgmath::Vector2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, ModifiersState, PhysicalKey};

/// Pixels of trackpad scroll that count as one wheel line
const PIXELS_PER_LINE: f32 = 20.0;

pub fn map_key_code(code: WinitKeyCode) -> Option<KeyCode> {
    let key = match code {
        WinitKeyCode::KeyW => KeyCode::KeyW,
        WinitKeyCode::KeyA => KeyCode::KeyA,
        WinitKeyCode::KeyS => KeyCode::KeyS,
        WinitKeyCode::KeyD => KeyCode::KeyD,
        WinitKeyCode::KeyQ => KeyCode::KeyQ,
        WinitKeyCode::KeyE => KeyCode::KeyE,
        WinitKeyCode::KeyF => KeyCode::KeyF,
        WinitKeyCode::ArrowUp => KeyCode::ArrowUp,
        WinitKeyCode::ArrowDown => KeyCode::ArrowDown,
        WinitKeyCode::ArrowLeft => KeyCode::ArrowLeft,
        WinitKeyCode::ArrowRight => KeyCode::ArrowRight,
        WinitKeyCode::Space => KeyCode::Space,
        WinitKeyCode::ShiftLeft => KeyCode::ShiftLeft,
        WinitKeyCode::ShiftRight => KeyCode::ShiftRight,
        WinitKeyCode::ControlLeft => KeyCode::ControlLeft,
        WinitKeyCode::ControlRight => KeyCode::ControlRight,
        WinitKeyCode::Escape => KeyCode::Escape,
        _ => return None,
    };
    Some(key)
}

pub fn map_mouse_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Right => Some(PointerButton::Secondary),
        MouseButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

pub fn map_modifiers(state: ModifiersState) -> Modifiers {
    Modifiers {
        shift: state.shift_key(),
        control: state.control_key(),
        alt: state.alt_key(),
        meta: state.super_key(),
    }
}

pub fn map_scroll(delta: MouseScrollDelta) -> f32 {
    // Wheel up zooms in, which shrinks the orbit distance
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y,
        MouseScrollDelta::PixelDelta(pos) => -(pos.y as f32) / PIXELS_PER_LINE,
    }
}

/// Convert a window event. `cursor` is the last known cursor position, used
/// for button events which carry no position of their own.
pub fn translate_window_event(event: &WindowEvent, cursor: Vector2<f32>) -> Option<InputEvent> {
    match event {
        WindowEvent::KeyboardInput { event, .. } => {
            let PhysicalKey::Code(code) = event.physical_key else {
                return None;
            };
            let key = map_key_code(code)?;
            Some(match event.state {
                ElementState::Pressed => InputEvent::KeyDown(key),
                ElementState::Released => InputEvent::KeyUp(key),
            })
        }
        WindowEvent::ModifiersChanged(modifiers) => {
            Some(InputEvent::ModifiersChanged(map_modifiers(modifiers.state())))
        }
        WindowEvent::CursorMoved { position, .. } => Some(InputEvent::PointerMove {
            position: Vector2::new(position.x as f32, position.y as f32),
        }),
        WindowEvent::MouseInput { state, button, .. } => {
            let button = map_mouse_button(*button)?;
            Some(match state {
                ElementState::Pressed => InputEvent::PointerDown {
                    button,
                    position: cursor,
                },
                ElementState::Released => InputEvent::PointerUp {
                    button,
                    position: cursor,
                },
            })
        }
        WindowEvent::MouseWheel { delta, .. } => Some(InputEvent::Wheel {
            delta: map_scroll(*delta),
        }),
        WindowEvent::Focused(false) => Some(InputEvent::FocusLost),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn test_movement_keys_map() {
        assert_eq!(map_key_code(WinitKeyCode::KeyW), Some(KeyCode::KeyW));
        assert_eq!(map_key_code(WinitKeyCode::Escape), Some(KeyCode::Escape));
        assert_eq!(map_key_code(WinitKeyCode::KeyZ), None);
    }

    #[test]
    fn test_mouse_buttons_map() {
        assert_eq!(map_mouse_button(MouseButton::Left), Some(PointerButton::Primary));
        assert_eq!(map_mouse_button(MouseButton::Right), Some(PointerButton::Secondary));
        assert_eq!(map_mouse_button(MouseButton::Other(7)), None);
    }

    #[test]
    fn test_scroll_direction() {
        assert_eq!(map_scroll(MouseScrollDelta::LineDelta(0.0, 1.0)), -1.0);
        let pixels = map_scroll(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -40.0)));
        assert!((pixels - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_modifiers_map() {
        let mods = map_modifiers(ModifiersState::SHIFT | ModifiersState::ALT);
        assert!(mods.shift && mods.alt);
        assert!(!mods.control);
    }

    #[test]
    fn test_focus_loss_translates() {
        let event = translate_window_event(&WindowEvent::Focused(false), Vector2::new(0.0, 0.0));
        assert_eq!(event, Some(InputEvent::FocusLost));
    }
}
