// Physical input shapes that can be bound to an action

use super::combo::{Combo, ModifierKey, ModifierSet};
use super::joystick::{AxisDirection, JoystickAxis, BUTTON_COUNT};
use super::keys;
use super::status::Status;
use super::InputError;
use std::fmt;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

/// One physical input bound to an action slot
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BindInput {
    KeyCombo(Combo),
    MouseButton(MouseButton),
    JoystickButton(u8),
    JoystickAxis(JoystickAxis, AxisDirection),
}

/// Kind tag of a `BindInput`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindKind {
    Key,
    MouseButton,
    JoystickButton,
    JoystickAxis,
}

bitflags::bitflags! {
    /// Set of bind kinds a rebind accepts
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct BindKinds: u8 {
        const KEY = 1 << 0;
        const MOUSE_BUTTON = 1 << 1;
        const JOYSTICK_BUTTON = 1 << 2;
        const JOYSTICK_AXIS = 1 << 3;
        const KEYBOARD_MOUSE = Self::KEY.bits() | Self::MOUSE_BUTTON.bits();
        const JOYSTICK = Self::JOYSTICK_BUTTON.bits() | Self::JOYSTICK_AXIS.bits();
    }
}

impl BindKind {
    pub fn flag(self) -> BindKinds {
        match self {
            Self::Key => BindKinds::KEY,
            Self::MouseButton => BindKinds::MOUSE_BUTTON,
            Self::JoystickButton => BindKinds::JOYSTICK_BUTTON,
            Self::JoystickAxis => BindKinds::JOYSTICK_AXIS,
        }
    }

    /// Whether binds of this kind live in the joystick group of an action
    pub fn is_joystick(self) -> bool {
        matches!(self, Self::JoystickButton | Self::JoystickAxis)
    }

    /// Record `Type` attribute
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Key => "Keyboard",
            Self::MouseButton => "Mouse",
            Self::JoystickButton => "JoystickButton",
            Self::JoystickAxis => "JoystickAxis",
        }
    }

    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "Keyboard" => Some(Self::Key),
            "Mouse" => Some(Self::MouseButton),
            "JoystickButton" => Some(Self::JoystickButton),
            "JoystickAxis" => Some(Self::JoystickAxis),
            _ => None,
        }
    }
}

/// Frame query asked of a bind or an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    Pressed,
    Down,
    Released,
    Up,
}

impl Query {
    /// Whether a single input status answers this query
    pub fn holds(self, status: Status) -> bool {
        match self {
            Query::Pressed => status == Status::Pressed,
            Query::Down => status == Status::Down,
            Query::Released => status == Status::Released,
            Query::Up => status == Status::Up,
        }
    }
}

/// Read-only view of device state a bind is evaluated against
pub trait BindSource {
    fn key_status(&self, key: KeyCode) -> Status;
    fn mouse_status(&self, button: MouseButton) -> Status;
    /// Modifiers currently held, in canonical order
    fn live_modifiers(&self) -> &ModifierSet;
    /// Whether a default joystick is connected
    fn joystick_connected(&self) -> bool;
    /// Button of the default joystick
    fn joystick_button_status(&self, button: u8) -> Status;
    /// Axis direction of the default joystick
    fn joystick_axis_status(&self, axis: JoystickAxis, direction: AxisDirection) -> Status;
    /// Axis value of the default joystick relative to its baseline,
    /// normalized to `-1.0..=1.0` and zero inside the dead zone
    fn joystick_axis_value(&self, axis: JoystickAxis) -> f32;
}

impl BindInput {
    pub fn key(key: KeyCode) -> Self {
        Self::KeyCombo(Combo::key(key))
    }

    pub fn combo<I: IntoIterator<Item = ModifierKey>>(modifiers: I, key: KeyCode) -> Self {
        Self::KeyCombo(Combo::with_modifiers(modifiers, key))
    }

    pub fn kind(&self) -> BindKind {
        match self {
            Self::KeyCombo(_) => BindKind::Key,
            Self::MouseButton(_) => BindKind::MouseButton,
            Self::JoystickButton(_) => BindKind::JoystickButton,
            Self::JoystickAxis(..) => BindKind::JoystickAxis,
        }
    }

    pub fn is_joystick(&self) -> bool {
        self.kind().is_joystick()
    }

    /// Aggregate frame status of this bind
    pub fn status<S: BindSource + ?Sized>(&self, source: &S) -> Status {
        match self {
            Self::KeyCombo(combo) => combo_state(combo, source),
            Self::MouseButton(button) => source.mouse_status(*button),
            Self::JoystickButton(button) => source.joystick_button_status(*button),
            Self::JoystickAxis(axis, direction) => source.joystick_axis_status(*axis, *direction),
        }
    }

    /// Evaluate a frame query
    pub fn matches<S: BindSource + ?Sized>(&self, query: Query, source: &S) -> bool {
        match self {
            Self::KeyCombo(combo) => combo_matches(combo, query, source),
            Self::MouseButton(_) | Self::JoystickButton(_) | Self::JoystickAxis(..) => {
                query.holds(self.status(source))
            }
        }
    }

    /// Signed analog value for axis binds, `None` for digital binds
    pub fn axis_value<S: BindSource + ?Sized>(&self, source: &S) -> Option<f32> {
        let Self::JoystickAxis(axis, direction) = self else {
            return None;
        };
        let value = source.joystick_axis_value(*axis);
        let value = match direction {
            AxisDirection::Full => value,
            AxisDirection::Positive => value.max(0.0),
            AxisDirection::Negative => value.min(0.0),
        };
        Some(value)
    }

    /// Encode as the record `Map` attribute
    pub fn to_map(&self) -> Result<String, InputError> {
        match self {
            Self::KeyCombo(combo) => combo
                .members()
                .into_iter()
                .map(|k| {
                    keys::key_name(k).ok_or_else(|| InputError::UnmappedInput(format!("{k:?}")))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(|names| names.join("+")),
            Self::MouseButton(button) => mouse_button_name(*button)
                .map(str::to_string)
                .ok_or_else(|| InputError::UnmappedInput(format!("{button:?}"))),
            Self::JoystickButton(button) => Ok(format!("B{button}")),
            Self::JoystickAxis(axis, direction) => {
                let suffix = match direction {
                    AxisDirection::Positive => "Pos",
                    AxisDirection::Negative => "Neg",
                    AxisDirection::Full => "",
                };
                Ok(format!("{}{}", axis.name(), suffix))
            }
        }
    }

    /// Decode a record `Map` attribute of the given kind
    pub fn from_map(kind: BindKind, map: &str) -> Result<Self, InputError> {
        let malformed = || InputError::MalformedMap {
            kind: kind.type_name(),
            map: map.to_string(),
        };

        match kind {
            BindKind::Key => {
                let parts: Vec<KeyCode> = map
                    .split('+')
                    .map(|part| keys::key_from_name(part.trim()))
                    .collect::<Option<_>>()
                    .ok_or_else(malformed)?;
                let (&key, prefix) = parts.split_last().ok_or_else(malformed)?;
                let modifiers = prefix
                    .iter()
                    .map(|&k| ModifierKey::from_key(k))
                    .collect::<Option<ModifierSet>>()
                    .ok_or_else(malformed)?;
                if modifiers.len() != prefix.len() {
                    return Err(malformed());
                }
                Ok(Self::KeyCombo(Combo { modifiers, key }))
            }
            BindKind::MouseButton => mouse_button_from_name(map)
                .map(Self::MouseButton)
                .ok_or_else(malformed),
            BindKind::JoystickButton => map
                .strip_prefix('B')
                .and_then(|index| index.parse::<u8>().ok())
                .filter(|&index| (index as usize) < BUTTON_COUNT)
                .map(Self::JoystickButton)
                .ok_or_else(malformed),
            BindKind::JoystickAxis => {
                let (name, direction) = if let Some(name) = map.strip_suffix("Pos") {
                    (name, AxisDirection::Positive)
                } else if let Some(name) = map.strip_suffix("Neg") {
                    (name, AxisDirection::Negative)
                } else {
                    (map, AxisDirection::Full)
                };
                JoystickAxis::from_name(name)
                    .map(|axis| Self::JoystickAxis(axis, direction))
                    .ok_or_else(malformed)
            }
        }
    }
}

impl fmt::Display for BindInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_map() {
            Ok(map) => f.write_str(&map),
            Err(_) => write!(f, "{self:?}"),
        }
    }
}

/// Combo is pressed this frame with exactly its modifiers held
fn combo_is_pressed<S: BindSource + ?Sized>(combo: &Combo, source: &S) -> bool {
    combo.live_modifiers(source.live_modifiers()) == combo.modifiers
        && combo
            .modifiers
            .iter()
            .all(|m| source.key_status(m.key()).is_engaged())
        && source.key_status(combo.key) == Status::Pressed
}

fn combo_is_down<S: BindSource + ?Sized>(combo: &Combo, source: &S) -> bool {
    combo.live_modifiers(source.live_modifiers()) == combo.modifiers
        && combo
            .modifiers
            .iter()
            .all(|m| source.key_status(m.key()) == Status::Down)
        && source.key_status(combo.key) == Status::Down
}

/// One member lifted this frame while every other member is still held
fn combo_is_released<S: BindSource + ?Sized>(combo: &Combo, source: &S) -> bool {
    let members = combo.members();
    let released = members
        .iter()
        .filter(|&&k| source.key_status(k) == Status::Released)
        .count();
    let down = members
        .iter()
        .filter(|&&k| source.key_status(k) == Status::Down)
        .count();
    released == 1 && released + down == members.len()
}

fn combo_is_up<S: BindSource + ?Sized>(combo: &Combo, source: &S) -> bool {
    if combo.modifiers.is_empty() {
        return source.key_status(combo.key) == Status::Up;
    }
    combo
        .modifiers
        .iter()
        .all(|m| source.key_status(m.key()) == Status::Up)
}

fn combo_matches<S: BindSource + ?Sized>(combo: &Combo, query: Query, source: &S) -> bool {
    match query {
        Query::Pressed => combo_is_pressed(combo, source),
        Query::Down => combo_is_down(combo, source),
        Query::Released => combo_is_released(combo, source),
        Query::Up => combo_is_up(combo, source),
    }
}

/// Single status for a whole combo
///
/// Precedence is Up > Down > Pressed > Released so a modifier lifted on
/// the same frame another member goes down resolves deterministically.
fn combo_state<S: BindSource + ?Sized>(combo: &Combo, source: &S) -> Status {
    let mut counts = [0usize; 4];
    let members = combo.members();
    for &key in &members {
        let slot = match source.key_status(key) {
            Status::Up => 0,
            Status::Pressed => 1,
            Status::Down => 2,
            Status::Released => 3,
        };
        counts[slot] += 1;
    }
    let [up, pressed, down, released] = counts;
    let total = members.len();

    if up > 0 {
        Status::Up
    } else if down == total {
        Status::Down
    } else if down + pressed == total {
        Status::Pressed
    } else if pressed == 0 && released > 0 {
        Status::Released
    } else {
        Status::Up
    }
}

pub fn mouse_button_name(button: MouseButton) -> Option<&'static str> {
    match button {
        MouseButton::Left => Some("Left"),
        MouseButton::Right => Some("Right"),
        MouseButton::Middle => Some("Middle"),
        MouseButton::Back => Some("ExtraButton1"),
        MouseButton::Forward => Some("ExtraButton2"),
        MouseButton::Other(_) => None,
    }
}

pub fn mouse_button_from_name(name: &str) -> Option<MouseButton> {
    match name {
        "Left" => Some(MouseButton::Left),
        "Right" => Some(MouseButton::Right),
        "Middle" => Some(MouseButton::Middle),
        "ExtraButton1" => Some(MouseButton::Back),
        "ExtraButton2" => Some(MouseButton::Forward),
        _ => None,
    }
}
