// Input manager - Main coordination system for all input

use super::action::ActionKey;
use super::bind::{BindInput, BindKind, BindKinds, Query};
use super::config::{self, InputSettings};
use super::devices::{DeviceStates, InputPoller, InputSystem, WheelDirection};
use super::event::{EventFlow, InputEvent};
use super::joystick::{JoystickAxis, JoystickInfo};
use super::keys::Locale;
use super::rebind::RebindCoordinator;
use super::status::Status;
use super::table::ActionTable;
use super::InputError;
use log::info;
use winit::event::{MouseButton, WindowEvent};
use winit::keyboard::KeyCode;

/// Owns device state, the action table and the rebind flow
///
/// Feed every event through `handle_event`, call `update` once per frame,
/// then query actions.
pub struct InputManager {
    settings: InputSettings,

    /// Raw device state and edge trackers
    devices: DeviceStates,

    /// Table shipped with the game, used for resets
    defaults: ActionTable,

    /// Live table queried by gameplay
    actions: ActionTable,

    rebind: RebindCoordinator,
}

impl InputManager {
    /// Create an input manager, loading the default and user profiles
    pub fn new(settings: InputSettings) -> Self {
        let defaults = config::load_defaults(&settings);
        let actions = config::load_profile(&settings, &defaults);
        info!("Input ready with {} actions", actions.len());
        Self::from_tables(settings, defaults, actions)
    }

    /// Create an input manager around tables already in memory
    pub fn from_tables(settings: InputSettings, defaults: ActionTable, actions: ActionTable) -> Self {
        let devices =
            DeviceStates::new(settings.locale).with_tuning(settings.dead_zone, settings.axis_threshold);
        Self {
            settings,
            devices,
            defaults,
            actions,
            rebind: RebindCoordinator::new(),
        }
    }

    /// Process one input event
    ///
    /// Releases always reach device state. Everything else is offered to a
    /// waiting rebind first and only applied when the rebind passes on it.
    pub fn handle_event(&mut self, event: &InputEvent) -> EventFlow {
        if event.is_release() {
            self.devices.apply(event);
            self.rebind.intercept(event, &mut self.actions, &self.devices);
            return EventFlow::Passed;
        }

        if self.rebind.is_waiting() {
            if let InputEvent::JoystickMoved { id, axis, position } = event {
                self.devices.calibrate(*id, *axis, *position);
            }
            let flow = self.rebind.intercept(event, &mut self.actions, &self.devices);
            if !flow.reached_devices() {
                return flow;
            }
        }

        self.devices.apply(event);
        EventFlow::Passed
    }

    /// Process a winit window event, `None` when input ignores it
    pub fn process_window_event(&mut self, event: &WindowEvent) -> Option<EventFlow> {
        InputEvent::from_window_event(event).map(|event| self.handle_event(&event))
    }

    /// Advance every input state for a new frame
    /// Call this once per frame after processing all events
    pub fn update(&mut self) {
        self.devices.update();
    }

    /// Read registered inputs from `poller`, then advance the frame
    ///
    /// Stands in for `update` when the input system is `Scan`.
    pub fn update_scanned(&mut self, poller: &impl InputPoller) {
        self.devices.scan(poller);
        self.devices.update();
    }

    /// Where keyboard and mouse samples come from
    pub fn input_system(&self) -> InputSystem {
        self.devices.input_system()
    }

    /// Switch between event-fed and scanned keyboard and mouse
    pub fn set_input_system(&mut self, system: InputSystem) {
        self.devices.set_input_system(system);
    }

    /// Read `key` from the poller while scanning
    pub fn add_key_to_scan(&mut self, key: KeyCode) {
        self.devices.add_key_to_scan(key);
    }

    /// Read `button` from the poller while scanning
    pub fn add_mouse_to_scan(&mut self, button: MouseButton) {
        self.devices.add_mouse_to_scan(button);
    }

    /// Forget every held input
    pub fn reset_devices(&mut self) {
        self.devices.reset_devices();
    }

    /// Settings the manager was built with, locale kept current
    pub fn settings(&self) -> &InputSettings {
        &self.settings
    }

    /// Read-only device state, for queries the manager does not wrap
    pub fn devices(&self) -> &DeviceStates {
        &self.devices
    }

    /// Keyboard layout used for typed characters and key labels
    pub fn locale(&self) -> Locale {
        self.devices.locale()
    }

    /// Switch layout, saved with the settings
    pub fn set_locale(&mut self, locale: Locale) {
        self.settings.locale = locale;
        self.devices.set_locale(locale);
    }

    // Actions

    /// Whether any bind of `name` started this frame
    pub fn is_action_pressed(&self, name: &str) -> bool {
        self.actions.matches(name, Query::Pressed, &self.devices)
    }

    /// Whether `name` is held past its first frame
    pub fn is_action_down(&self, name: &str) -> bool {
        self.actions.matches(name, Query::Down, &self.devices)
    }

    /// Whether `name` stopped this frame
    pub fn is_action_released(&self, name: &str) -> bool {
        self.actions.matches(name, Query::Released, &self.devices)
    }

    /// Whether no bind of `name` is engaged
    pub fn is_action_up(&self, name: &str) -> bool {
        self.actions.matches(name, Query::Up, &self.devices)
    }

    /// Merged status of every bind of `name`, `Up` when unknown
    pub fn action_state(&self, name: &str) -> Status {
        self.actions.state(name, &self.devices)
    }

    /// Analog value of an action in `-1.0..=1.0`
    pub fn action_value(&self, name: &str) -> f32 {
        self.actions.value(name, &self.devices)
    }

    /// Live action table
    pub fn actions(&self) -> &ActionTable {
        &self.actions
    }

    /// Live action by name
    pub fn action(&self, name: &str) -> Option<&ActionKey> {
        self.actions.get(name)
    }

    /// Text of the `index`-th bind of an action in the current locale
    pub fn action_bind_string(&self, name: &str, index: usize) -> Option<String> {
        self.actions.bind_string(name, index, self.devices.locale())
    }

    /// Restore the live table to the shipped defaults
    pub fn reset_action_keys(&mut self) {
        self.rebind.cancel();
        self.actions = self.defaults.clone();
        info!("Action keys reset to defaults");
    }

    /// Write the live table to the user profile
    pub fn save(&self) -> Result<(), InputError> {
        config::save_actions(&self.settings.user_path, &self.actions)?;
        info!("Input profile saved to {}", self.settings.user_path.display());
        Ok(())
    }

    // Rebinding

    /// Wait for the next matching input and bind it to a slot of an action
    pub fn begin_rebind(
        &mut self,
        name: &str,
        slot: usize,
        kinds: BindKinds,
        same_category_only: bool,
    ) -> Result<(), InputError> {
        self.rebind
            .begin(&self.actions, name, slot, kinds, same_category_only)
    }

    /// Drop a waiting rebind, if any
    pub fn cancel_rebind(&mut self) {
        self.rebind.cancel();
    }

    /// Whether a rebind is waiting for input
    pub fn is_waiting_for_bind(&self) -> bool {
        self.rebind.is_waiting()
    }

    /// Whether the waiting rebind accepts `kind`
    pub fn is_waiting_for(&self, kind: BindKind) -> bool {
        self.rebind.is_waiting_for(kind)
    }

    // Keyboard

    /// Whether `key` went down this frame
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.devices.key_matches(key, Query::Pressed)
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.devices.key_matches(key, Query::Down)
    }

    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.devices.key_matches(key, Query::Released)
    }

    pub fn is_key_up(&self, key: KeyCode) -> bool {
        self.devices.key_matches(key, Query::Up)
    }

    /// Whether any key was pressed this frame
    pub fn keyboard_hit(&self) -> bool {
        self.devices.keyboard_hit()
    }

    /// Character typed this frame
    pub fn last_char(&self) -> Option<char> {
        self.devices.last_char()
    }

    // Mouse

    /// Whether `button` went down this frame
    pub fn is_mouse_pressed(&self, button: MouseButton) -> bool {
        self.devices.mouse_matches(button, Query::Pressed)
    }

    pub fn is_mouse_down(&self, button: MouseButton) -> bool {
        self.devices.mouse_matches(button, Query::Down)
    }

    pub fn is_mouse_released(&self, button: MouseButton) -> bool {
        self.devices.mouse_matches(button, Query::Released)
    }

    pub fn is_mouse_up(&self, button: MouseButton) -> bool {
        self.devices.mouse_matches(button, Query::Up)
    }

    /// Whether any mouse button was pressed this frame
    pub fn mouse_hit(&self) -> bool {
        self.devices.mouse_hit()
    }

    /// Net wheel direction over the last frame
    pub fn wheel_direction(&self) -> WheelDirection {
        self.devices.wheel_direction()
    }

    pub fn wheel_moved(&self) -> bool {
        self.devices.wheel_moved()
    }

    // Joysticks

    /// Whether a joystick sits in slot `id`
    pub fn is_joystick_connected(&self, id: usize) -> bool {
        self.devices.connected_joystick(id).is_some()
    }

    /// Joystick action binds read from
    pub fn default_joystick_id(&self) -> Option<usize> {
        self.devices.default_joystick_id()
    }

    /// Identification of a connected joystick
    pub fn joystick_info(&self, id: usize) -> Option<&JoystickInfo> {
        self.devices.connected_joystick(id).and_then(|j| j.info())
    }

    /// Whether a joystick button went down this frame
    pub fn is_joystick_button_pressed(&self, id: usize, button: usize) -> bool {
        self.devices.joystick_button_matches(id, button, Query::Pressed)
    }

    pub fn is_joystick_button_down(&self, id: usize, button: usize) -> bool {
        self.devices.joystick_button_matches(id, button, Query::Down)
    }

    pub fn is_joystick_button_released(&self, id: usize, button: usize) -> bool {
        self.devices.joystick_button_matches(id, button, Query::Released)
    }

    pub fn is_joystick_button_up(&self, id: usize, button: usize) -> bool {
        self.devices.joystick_button_matches(id, button, Query::Up)
    }

    /// Whether any joystick button was pressed this frame
    pub fn joystick_hit(&self) -> bool {
        self.devices.joystick_hit()
    }

    /// Whether any joystick axis is outside its dead zone
    pub fn joystick_moved(&self) -> bool {
        self.devices.joystick_moved()
    }

    /// Dead zone of a joystick slot
    pub fn dead_zone(&self, id: usize) -> Option<f32> {
        self.devices.joystick(id).map(|j| j.dead_zone())
    }

    /// Change the dead zone of one joystick slot
    pub fn set_dead_zone(&mut self, id: usize, dead_zone: f32) {
        if let Some(joystick) = self.devices.joystick_mut(id) {
            joystick.set_dead_zone(dead_zone);
        }
    }

    /// Calibrated idle value of an axis
    pub fn axis_baseline(&self, id: usize, axis: JoystickAxis) -> Option<f32> {
        self.devices.connected_joystick(id).and_then(|j| j.baseline(axis))
    }

    /// Latest raw axis sample, 0 when disconnected
    pub fn raw_axis(&self, id: usize, axis: JoystickAxis) -> f32 {
        self.devices
            .connected_joystick(id)
            .map(|j| j.raw_axis(axis))
            .unwrap_or(0.0)
    }

    /// Axis position relative to its baseline, zero inside the dead zone
    pub fn axis_position(&self, id: usize, axis: JoystickAxis) -> f32 {
        self.devices
            .connected_joystick(id)
            .map(|j| j.live_axis(axis))
            .unwrap_or(0.0)
    }

    /// Whether an axis sits inside its dead zone, true when disconnected
    pub fn axis_stopped(&self, id: usize, axis: JoystickAxis) -> bool {
        self.devices
            .connected_joystick(id)
            .map_or(true, |j| j.axis_stopped(axis))
    }

    fn action_axes<'a>(&'a self, name: &str) -> impl Iterator<Item = JoystickAxis> + 'a {
        self.actions
            .get(name)
            .into_iter()
            .flat_map(|action| action.joystick_binds.iter())
            .filter_map(|bind| match bind {
                BindInput::JoystickAxis(axis, _) => Some(*axis),
                _ => None,
            })
    }

    /// Position of the first axis bound to `name` that is outside the dead zone
    pub fn action_axis_position(&self, id: usize, name: &str) -> f32 {
        let Some(joystick) = self.devices.connected_joystick(id) else {
            return 0.0;
        };
        self.action_axes(name)
            .map(|axis| joystick.live_axis(axis))
            .find(|position| *position != 0.0)
            .unwrap_or(0.0)
    }

    /// Whether every axis bound to `name` sits inside the dead zone
    pub fn action_axis_stopped(&self, id: usize, name: &str) -> bool {
        let Some(joystick) = self.devices.connected_joystick(id) else {
            return true;
        };
        self.action_axes(name).all(|axis| joystick.axis_stopped(axis))
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new(InputSettings::default())
    }
}
