// Boundary input events and their conversion from winit

use super::joystick::{JoystickAxis, JoystickInfo};
use super::rebind::RebindOutcome;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// One discrete device event delivered to the input system
///
/// Keyboard and mouse events come from the window; joystick events come
/// from whatever enumerates and polls the pads.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown { key: KeyCode, repeat: bool },
    KeyUp { key: KeyCode },
    MouseDown(MouseButton),
    MouseUp(MouseButton),
    /// Vertical wheel delta, positive away from the user
    MouseWheel(f32),
    JoystickConnected { id: usize, info: JoystickInfo },
    JoystickDisconnected { id: usize },
    JoystickButtonDown { id: usize, button: u8 },
    JoystickButtonUp { id: usize, button: u8 },
    /// Raw axis position in `-AXIS_RANGE..=AXIS_RANGE`
    JoystickMoved {
        id: usize,
        axis: JoystickAxis,
        position: f32,
    },
    /// The window lost focus; held inputs are forgotten
    FocusLost,
}

impl InputEvent {
    /// Convert a winit window event, `None` for events input does not use
    pub fn from_window_event(event: &WindowEvent) -> Option<Self> {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                // Only physical keys carry a stable code
                let PhysicalKey::Code(key) = event.physical_key else {
                    return None;
                };
                Some(match event.state {
                    ElementState::Pressed => Self::KeyDown {
                        key,
                        repeat: event.repeat,
                    },
                    ElementState::Released => Self::KeyUp { key },
                })
            }
            WindowEvent::MouseInput { state, button, .. } => Some(match state {
                ElementState::Pressed => Self::MouseDown(*button),
                ElementState::Released => Self::MouseUp(*button),
            }),
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32,
                };
                (dy != 0.0).then_some(Self::MouseWheel(dy))
            }
            WindowEvent::Focused(false) => Some(Self::FocusLost),
            _ => None,
        }
    }

    /// Events that lift an input
    ///
    /// These always reach device state, even while a rebind is waiting, so
    /// nothing stays stuck down after the capture ends.
    pub fn is_release(&self) -> bool {
        matches!(
            self,
            Self::KeyUp { .. } | Self::MouseUp(_) | Self::JoystickButtonUp { .. }
        )
    }
}

/// What happened to an event handed to the input manager
#[derive(Debug, Clone, PartialEq)]
pub enum EventFlow {
    /// Applied to device state as usual
    Passed,
    /// Swallowed by a waiting rebind without committing anything
    Consumed,
    /// Swallowed by a waiting rebind that finished
    Rebound(RebindOutcome),
}

impl EventFlow {
    /// Whether gameplay state saw the event
    pub fn reached_devices(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;
    use winit::event::{DeviceId, TouchPhase};

    fn device() -> DeviceId {
        unsafe { DeviceId::dummy() }
    }

    #[test]
    fn test_mouse_input_conversion() {
        let event = WindowEvent::MouseInput {
            device_id: device(),
            state: ElementState::Pressed,
            button: MouseButton::Right,
        };
        assert_eq!(
            InputEvent::from_window_event(&event),
            Some(InputEvent::MouseDown(MouseButton::Right))
        );
    }

    #[test]
    fn test_wheel_conversion() {
        let lines = WindowEvent::MouseWheel {
            device_id: device(),
            delta: MouseScrollDelta::LineDelta(0.0, -1.0),
            phase: TouchPhase::Moved,
        };
        assert_eq!(
            InputEvent::from_window_event(&lines),
            Some(InputEvent::MouseWheel(-1.0))
        );

        let pixels = WindowEvent::MouseWheel {
            device_id: device(),
            delta: MouseScrollDelta::PixelDelta(PhysicalPosition::new(3.0, 0.0)),
            phase: TouchPhase::Moved,
        };
        assert_eq!(InputEvent::from_window_event(&pixels), None);
    }

    #[test]
    fn test_focus_conversion() {
        assert_eq!(
            InputEvent::from_window_event(&WindowEvent::Focused(false)),
            Some(InputEvent::FocusLost)
        );
        assert_eq!(InputEvent::from_window_event(&WindowEvent::Focused(true)), None);
    }

    #[test]
    fn test_release_events() {
        assert!(InputEvent::KeyUp { key: KeyCode::KeyA }.is_release());
        assert!(InputEvent::MouseUp(MouseButton::Left).is_release());
        assert!(!InputEvent::KeyDown {
            key: KeyCode::KeyA,
            repeat: false
        }
        .is_release());
        assert!(!InputEvent::MouseWheel(1.0).is_release());
    }
}
