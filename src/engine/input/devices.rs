// Device state fed by events and advanced once per frame

use super::bind::{BindSource, Query};
use super::combo::{ModifierKey, ModifierSet};
use super::event::InputEvent;
use super::joystick::{AxisDirection, JoystickAxis, JoystickState, AXIS_RANGE, JOYSTICK_COUNT};
use super::keys::Locale;
use super::status::{EdgeTracker, Status};
use log::{debug, info, warn};
use std::collections::HashMap;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

/// Direction the mouse wheel turned this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WheelDirection {
    #[default]
    Idle,
    Up,
    Down,
}

impl WheelDirection {
    fn from_delta(delta: f32) -> Self {
        if delta > 0.0 {
            Self::Up
        } else if delta < 0.0 {
            Self::Down
        } else {
            Self::Idle
        }
    }
}

/// Where keyboard and mouse samples come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputSystem {
    /// Window events only
    #[default]
    Events,
    /// Registered keys and buttons are also read from a poller each frame
    Scan,
}

/// Live hardware state, for hosts without a window event stream
pub trait InputPoller {
    fn is_key_down(&self, key: KeyCode) -> bool;
    fn is_mouse_down(&self, button: MouseButton) -> bool;
}

/// Every physical input the game can see
///
/// Events only record raw samples. `update` runs the edge transition for
/// every tracker so statuses change exactly once per frame.
#[derive(Debug, Clone)]
pub struct DeviceStates {
    locale: Locale,
    keys: HashMap<KeyCode, EdgeTracker>,
    mouse: HashMap<MouseButton, EdgeTracker>,
    modifiers: ModifierSet,

    /// Wheel deltas summed since the last update
    pending_wheel: f32,
    wheel: WheelDirection,

    /// Character typed since the last update
    pending_char: Option<char>,
    last_char: Option<char>,

    keyboard_hit: bool,
    mouse_hit: bool,
    joystick_hit: bool,

    joysticks: [JoystickState; JOYSTICK_COUNT],
    default_joystick: Option<usize>,

    input_system: InputSystem,
    scanned_keys: Vec<KeyCode>,
    scanned_mouse: Vec<MouseButton>,
}

impl DeviceStates {
    /// Nothing held, no joystick connected
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            keys: HashMap::new(),
            mouse: HashMap::new(),
            modifiers: ModifierSet::new(),
            pending_wheel: 0.0,
            wheel: WheelDirection::Idle,
            pending_char: None,
            last_char: None,
            keyboard_hit: false,
            mouse_hit: false,
            joystick_hit: false,
            joysticks: std::array::from_fn(JoystickState::new),
            default_joystick: None,
            input_system: InputSystem::default(),
            scanned_keys: Vec::new(),
            scanned_mouse: Vec::new(),
        }
    }

    /// Apply dead zone and threshold to every joystick slot
    pub fn with_tuning(mut self, dead_zone: f32, threshold: f32) -> Self {
        for joystick in &mut self.joysticks {
            joystick.set_dead_zone(dead_zone);
            joystick.set_threshold(threshold);
        }
        self
    }

    /// Layout used to turn keys into typed characters
    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Takes effect from the next key press
    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
    }

    /// Where keyboard and mouse samples come from
    pub fn input_system(&self) -> InputSystem {
        self.input_system
    }

    pub fn set_input_system(&mut self, system: InputSystem) {
        if system != self.input_system {
            debug!("Input system set to {:?}", system);
        }
        self.input_system = system;
    }

    /// Register a key read from the poller in `Scan` mode
    pub fn add_key_to_scan(&mut self, key: KeyCode) {
        if !self.scanned_keys.contains(&key) {
            self.scanned_keys.push(key);
        }
    }

    /// Register a mouse button read from the poller in `Scan` mode
    pub fn add_mouse_to_scan(&mut self, button: MouseButton) {
        if !self.scanned_mouse.contains(&button) {
            self.scanned_mouse.push(button);
        }
    }

    /// Overwrite the raw samples of every registered input with the
    /// poller's view. Does nothing in `Events` mode.
    ///
    /// Scanned keys never produce typed characters.
    pub fn scan(&mut self, poller: &impl InputPoller) {
        if self.input_system == InputSystem::Events {
            return;
        }

        for &key in &self.scanned_keys {
            let down = poller.is_key_down(key);
            if down {
                self.keys.entry(key).or_default().set_raw(true);
            } else if let Some(tracker) = self.keys.get_mut(&key) {
                tracker.set_raw(false);
            }

            if let Some(modifier) = ModifierKey::from_key(key) {
                if down {
                    self.modifiers.insert(modifier);
                } else {
                    self.modifiers.remove(modifier);
                }
            }
        }

        for &button in &self.scanned_mouse {
            let down = poller.is_mouse_down(button);
            if down {
                self.mouse.entry(button).or_default().set_raw(true);
            } else if let Some(tracker) = self.mouse.get_mut(&button) {
                tracker.set_raw(false);
            }
        }
    }

    /// Record the raw sample carried by an event
    pub fn apply(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown { key, repeat } => self.key_down(*key, *repeat),
            InputEvent::KeyUp { key } => self.key_up(*key),
            InputEvent::MouseDown(button) => self.mouse.entry(*button).or_default().set_raw(true),
            InputEvent::MouseUp(button) => {
                if let Some(tracker) = self.mouse.get_mut(button) {
                    tracker.set_raw(false);
                }
            }
            InputEvent::MouseWheel(delta) => self.pending_wheel += *delta,
            InputEvent::JoystickConnected { id, info } => {
                if let Some(joystick) = self.joysticks.get_mut(*id) {
                    joystick.connect(info.clone());
                    if self.default_joystick.is_none() {
                        self.elect_default_joystick();
                    }
                } else {
                    warn!("Ignoring joystick with out of range ID : {}", id);
                }
            }
            InputEvent::JoystickDisconnected { id } => {
                if let Some(joystick) = self.joysticks.get_mut(*id) {
                    joystick.disconnect();
                    if self.default_joystick == Some(*id) {
                        self.elect_default_joystick();
                    }
                }
            }
            InputEvent::JoystickButtonDown { id, button } => {
                if let Some(joystick) = self.joysticks.get_mut(*id) {
                    joystick.set_button(*button as usize, true);
                }
            }
            InputEvent::JoystickButtonUp { id, button } => {
                if let Some(joystick) = self.joysticks.get_mut(*id) {
                    joystick.set_button(*button as usize, false);
                }
            }
            InputEvent::JoystickMoved { id, axis, position } => {
                if let Some(joystick) = self.joysticks.get_mut(*id) {
                    joystick.set_axis(*axis, *position);
                }
            }
            InputEvent::FocusLost => self.reset_devices(),
        }
    }

    fn key_down(&mut self, key: KeyCode, repeat: bool) {
        self.keys.entry(key).or_default().set_raw(true);

        if let Some(modifier) = ModifierKey::from_key(key) {
            self.modifiers.insert(modifier);
        } else if !repeat {
            if let Some(c) = self.locale.char_for(key, self.modifiers.has_shift()) {
                self.pending_char = Some(c);
            }
        }
    }

    fn key_up(&mut self, key: KeyCode) {
        if let Some(tracker) = self.keys.get_mut(&key) {
            tracker.set_raw(false);
        }
        if let Some(modifier) = ModifierKey::from_key(key) {
            self.modifiers.remove(modifier);
        }
    }

    /// Run one frame of edge detection on every device
    pub fn update(&mut self) {
        self.keyboard_hit = false;
        for tracker in self.keys.values_mut() {
            if tracker.advance() == Status::Pressed {
                self.keyboard_hit = true;
            }
        }
        self.keys.retain(|_, tracker| !tracker.is_idle());

        self.mouse_hit = false;
        for tracker in self.mouse.values_mut() {
            if tracker.advance() == Status::Pressed {
                self.mouse_hit = true;
            }
        }
        self.mouse.retain(|_, tracker| !tracker.is_idle());

        self.wheel = WheelDirection::from_delta(self.pending_wheel);
        self.pending_wheel = 0.0;

        self.last_char = self.pending_char.take();

        self.joystick_hit = false;
        for joystick in &mut self.joysticks {
            joystick.update();
            if joystick.is_connected() && joystick.any_button_pressed() {
                self.joystick_hit = true;
            }
        }
    }

    /// Forget everything held, returning every tracker to `Up`
    pub fn reset_devices(&mut self) {
        debug!("Resetting input devices");
        self.keys.clear();
        self.mouse.clear();
        self.modifiers.clear();
        self.pending_wheel = 0.0;
        self.wheel = WheelDirection::Idle;
        self.pending_char = None;
        self.last_char = None;
        self.keyboard_hit = false;
        self.mouse_hit = false;
        self.joystick_hit = false;
        for joystick in &mut self.joysticks {
            joystick.reset_trackers();
        }
    }

    fn elect_default_joystick(&mut self) {
        let elected = self.joysticks.iter().position(JoystickState::is_connected);
        if elected != self.default_joystick {
            match elected {
                Some(id) => info!(
                    "Default joystick - {} (ID : {})",
                    self.joysticks[id].name(),
                    id
                ),
                None => info!("No joystick connected"),
            }
        }
        self.default_joystick = elected;
    }

    // Keyboard

    /// Whether a key is in the queried state this frame
    pub fn key_matches(&self, key: KeyCode, query: Query) -> bool {
        query.holds(self.key_status(key))
    }

    /// Modifiers held right now, in canonical order
    pub fn modifiers(&self) -> &ModifierSet {
        &self.modifiers
    }

    /// Whether any key was pressed this frame
    pub fn keyboard_hit(&self) -> bool {
        self.keyboard_hit
    }

    /// Character typed this frame on the current layout
    pub fn last_char(&self) -> Option<char> {
        self.last_char
    }

    // Mouse

    /// Whether a mouse button is in the queried state this frame
    pub fn mouse_matches(&self, button: MouseButton, query: Query) -> bool {
        query.holds(self.mouse_status(button))
    }

    /// Whether any mouse button was pressed this frame
    pub fn mouse_hit(&self) -> bool {
        self.mouse_hit
    }

    /// Net wheel direction over the last frame
    pub fn wheel_direction(&self) -> WheelDirection {
        self.wheel
    }

    /// Whether the wheel turned during the last frame
    pub fn wheel_moved(&self) -> bool {
        self.wheel != WheelDirection::Idle
    }

    // Joysticks

    /// Joystick slot, connected or not. `None` when out of range
    pub fn joystick(&self, id: usize) -> Option<&JoystickState> {
        self.joysticks.get(id)
    }

    /// Mutable joystick slot, for tuning
    pub fn joystick_mut(&mut self, id: usize) -> Option<&mut JoystickState> {
        self.joysticks.get_mut(id)
    }

    /// Connected joystick with the same id, `None` otherwise
    pub fn connected_joystick(&self, id: usize) -> Option<&JoystickState> {
        self.joysticks.get(id).filter(|j| j.is_connected())
    }

    /// Lowest connected joystick id
    pub fn default_joystick_id(&self) -> Option<usize> {
        self.default_joystick
    }

    /// Joystick action binds are evaluated against
    pub fn default_joystick(&self) -> Option<&JoystickState> {
        self.default_joystick
            .and_then(|id| self.connected_joystick(id))
    }

    /// Whether a button of a connected joystick is in the queried state
    pub fn joystick_button_matches(&self, id: usize, button: usize, query: Query) -> bool {
        self.connected_joystick(id)
            .is_some_and(|j| query.holds(j.button_status(button)))
    }

    /// Whether a button was pressed on any connected joystick this frame
    pub fn joystick_hit(&self) -> bool {
        self.joystick_hit
    }

    /// Whether any connected joystick has an axis outside its dead zone
    pub fn joystick_moved(&self) -> bool {
        self.joysticks
            .iter()
            .any(|j| j.is_connected() && j.any_axis_moved())
    }

    /// Set the calibration baseline of an axis if it has none yet
    pub fn calibrate(&mut self, id: usize, axis: JoystickAxis, raw: f32) {
        if let Some(joystick) = self.joysticks.get_mut(id) {
            joystick.calibrate(axis, raw);
        }
    }
}

impl Default for DeviceStates {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}

impl BindSource for DeviceStates {
    fn key_status(&self, key: KeyCode) -> Status {
        self.keys
            .get(&key)
            .map(EdgeTracker::status)
            .unwrap_or(Status::Up)
    }

    fn mouse_status(&self, button: MouseButton) -> Status {
        self.mouse
            .get(&button)
            .map(EdgeTracker::status)
            .unwrap_or(Status::Up)
    }

    fn live_modifiers(&self) -> &ModifierSet {
        &self.modifiers
    }

    fn joystick_connected(&self) -> bool {
        self.default_joystick().is_some()
    }

    fn joystick_button_status(&self, button: u8) -> Status {
        self.default_joystick()
            .map(|j| j.button_status(button as usize))
            .unwrap_or(Status::Up)
    }

    fn joystick_axis_status(&self, axis: JoystickAxis, direction: AxisDirection) -> Status {
        self.default_joystick()
            .map(|j| j.axis_status(axis, direction))
            .unwrap_or(Status::Up)
    }

    fn joystick_axis_value(&self, axis: JoystickAxis) -> f32 {
        self.default_joystick()
            .map(|j| (j.live_axis(axis) / AXIS_RANGE).clamp(-1.0, 1.0))
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::input::joystick::JoystickInfo;
    use approx::assert_relative_eq;

    fn pad(name: &str) -> JoystickInfo {
        JoystickInfo {
            name: name.to_string(),
            vendor_id: 1,
            product_id: 2,
            button_count: 10,
            axis_count: 4,
        }
    }

    fn press(devices: &mut DeviceStates, key: KeyCode) {
        devices.apply(&InputEvent::KeyDown { key, repeat: false });
    }

    fn release(devices: &mut DeviceStates, key: KeyCode) {
        devices.apply(&InputEvent::KeyUp { key });
    }

    #[test]
    fn test_key_edges_follow_frames() {
        let mut devices = DeviceStates::default();
        press(&mut devices, KeyCode::KeyW);
        assert_eq!(devices.key_status(KeyCode::KeyW), Status::Up);

        devices.update();
        assert!(devices.key_matches(KeyCode::KeyW, Query::Pressed));
        assert!(devices.keyboard_hit());

        devices.update();
        assert!(devices.key_matches(KeyCode::KeyW, Query::Down));
        assert!(!devices.keyboard_hit());

        release(&mut devices, KeyCode::KeyW);
        devices.update();
        assert!(devices.key_matches(KeyCode::KeyW, Query::Released));

        devices.update();
        assert!(devices.key_matches(KeyCode::KeyW, Query::Up));
    }

    #[test]
    fn test_modifier_set_follows_events() {
        let mut devices = DeviceStates::default();
        press(&mut devices, KeyCode::ShiftLeft);
        press(&mut devices, KeyCode::ControlLeft);
        assert_eq!(
            devices.modifiers().iter().collect::<Vec<_>>(),
            vec![ModifierKey::LCtrl, ModifierKey::LShift]
        );
        release(&mut devices, KeyCode::ShiftLeft);
        assert!(!devices.modifiers().has_shift());
    }

    #[test]
    fn test_typed_char_uses_shift_and_locale() {
        let mut devices = DeviceStates::new(Locale::English);
        press(&mut devices, KeyCode::ShiftLeft);
        press(&mut devices, KeyCode::KeyQ);
        devices.update();
        assert_eq!(devices.last_char(), Some('Q'));

        devices.update();
        assert_eq!(devices.last_char(), None);

        let mut french = DeviceStates::new(Locale::French);
        press(&mut french, KeyCode::KeyQ);
        french.update();
        assert_eq!(french.last_char(), Some('a'));
    }

    #[test]
    fn test_wheel_lasts_one_frame() {
        let mut devices = DeviceStates::default();
        devices.apply(&InputEvent::MouseWheel(-2.0));
        devices.update();
        assert_eq!(devices.wheel_direction(), WheelDirection::Down);
        assert!(devices.wheel_moved());

        devices.update();
        assert_eq!(devices.wheel_direction(), WheelDirection::Idle);
    }

    #[test]
    fn test_mouse_hit() {
        let mut devices = DeviceStates::default();
        devices.apply(&InputEvent::MouseDown(MouseButton::Left));
        devices.update();
        assert!(devices.mouse_hit());
        assert!(devices.mouse_matches(MouseButton::Left, Query::Pressed));
    }

    #[test]
    fn test_default_joystick_reelected() {
        let mut devices = DeviceStates::default();
        assert!(!devices.joystick_connected());

        devices.apply(&InputEvent::JoystickConnected {
            id: 2,
            info: pad("Second"),
        });
        devices.apply(&InputEvent::JoystickConnected {
            id: 5,
            info: pad("Fifth"),
        });
        assert_eq!(devices.default_joystick_id(), Some(2));

        devices.apply(&InputEvent::JoystickDisconnected { id: 2 });
        assert_eq!(devices.default_joystick_id(), Some(5));

        devices.apply(&InputEvent::JoystickDisconnected { id: 5 });
        assert_eq!(devices.default_joystick_id(), None);
        assert!(!devices.joystick_connected());
    }

    #[test]
    fn test_joystick_out_of_range_ignored() {
        let mut devices = DeviceStates::default();
        devices.apply(&InputEvent::JoystickConnected {
            id: JOYSTICK_COUNT,
            info: pad("Ghost"),
        });
        assert_eq!(devices.default_joystick_id(), None);
    }

    #[test]
    fn test_axis_value_normalized() {
        let mut devices = DeviceStates::default();
        devices.apply(&InputEvent::JoystickConnected { id: 0, info: pad("Pad") });
        devices.apply(&InputEvent::JoystickMoved {
            id: 0,
            axis: JoystickAxis::X,
            position: 0.0,
        });
        devices.apply(&InputEvent::JoystickMoved {
            id: 0,
            axis: JoystickAxis::X,
            position: -75.0,
        });
        devices.update();

        assert_relative_eq!(devices.joystick_axis_value(JoystickAxis::X), -0.75);
        assert_eq!(
            devices.joystick_axis_status(JoystickAxis::X, AxisDirection::Negative),
            Status::Pressed
        );
        assert!(devices.joystick_moved());
    }

    #[test]
    fn test_joystick_button_hit() {
        let mut devices = DeviceStates::default();
        devices.apply(&InputEvent::JoystickConnected { id: 0, info: pad("Pad") });
        devices.apply(&InputEvent::JoystickButtonDown { id: 0, button: 4 });
        devices.update();
        assert!(devices.joystick_hit());
        assert!(devices.joystick_button_matches(0, 4, Query::Pressed));
        assert_eq!(devices.joystick_button_status(4), Status::Pressed);
    }

    #[test]
    fn test_focus_lost_resets() {
        let mut devices = DeviceStates::default();
        press(&mut devices, KeyCode::ControlLeft);
        devices.update();
        devices.apply(&InputEvent::FocusLost);
        assert_eq!(devices.key_status(KeyCode::ControlLeft), Status::Up);
        assert!(devices.modifiers().is_empty());
    }

    #[test]
    fn test_idle_trackers_pruned() {
        let mut devices = DeviceStates::default();
        press(&mut devices, KeyCode::KeyE);
        devices.update();
        release(&mut devices, KeyCode::KeyE);
        devices.update();
        devices.update();
        assert!(devices.keys.is_empty());
    }

    #[test]
    fn test_wheel_deltas_accumulate() {
        let mut devices = DeviceStates::default();
        devices.apply(&InputEvent::MouseWheel(1.0));
        devices.apply(&InputEvent::MouseWheel(-3.0));
        devices.update();
        assert_eq!(devices.wheel_direction(), WheelDirection::Down);

        // Opposite ticks in one frame cancel out
        devices.apply(&InputEvent::MouseWheel(2.0));
        devices.apply(&InputEvent::MouseWheel(-2.0));
        devices.update();
        assert!(!devices.wheel_moved());
    }

    #[derive(Default)]
    struct FakePoller {
        keys: Vec<KeyCode>,
        buttons: Vec<MouseButton>,
    }

    impl InputPoller for FakePoller {
        fn is_key_down(&self, key: KeyCode) -> bool {
            self.keys.contains(&key)
        }

        fn is_mouse_down(&self, button: MouseButton) -> bool {
            self.buttons.contains(&button)
        }
    }

    #[test]
    fn test_scan_reads_registered_inputs() {
        let mut devices = DeviceStates::default();
        devices.set_input_system(InputSystem::Scan);
        devices.add_key_to_scan(KeyCode::KeyW);
        devices.add_key_to_scan(KeyCode::ShiftLeft);
        devices.add_mouse_to_scan(MouseButton::Right);

        let mut poller = FakePoller {
            keys: vec![KeyCode::KeyW, KeyCode::ShiftLeft, KeyCode::KeyA],
            buttons: vec![MouseButton::Right],
        };
        devices.scan(&poller);
        devices.update();
        assert!(devices.key_matches(KeyCode::KeyW, Query::Pressed));
        assert!(devices.mouse_matches(MouseButton::Right, Query::Pressed));
        assert!(devices.modifiers().has_shift());
        // Not registered
        assert_eq!(devices.key_status(KeyCode::KeyA), Status::Up);
        // Scanning never types
        assert_eq!(devices.last_char(), None);

        poller.keys.clear();
        devices.scan(&poller);
        devices.update();
        assert!(devices.key_matches(KeyCode::KeyW, Query::Released));
        assert!(!devices.modifiers().has_shift());
        assert!(devices.mouse_matches(MouseButton::Right, Query::Down));
    }

    #[test]
    fn test_scan_ignored_in_event_mode() {
        let mut devices = DeviceStates::default();
        devices.add_key_to_scan(KeyCode::KeyW);
        devices.add_key_to_scan(KeyCode::KeyW);
        assert_eq!(devices.scanned_keys.len(), 1);

        let poller = FakePoller {
            keys: vec![KeyCode::KeyW],
            ..Default::default()
        };
        devices.scan(&poller);
        devices.update();
        assert_eq!(devices.key_status(KeyCode::KeyW), Status::Up);
        assert_eq!(devices.input_system(), InputSystem::Events);
    }
}
