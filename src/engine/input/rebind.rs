// Interactive rebind capture
//
// While a request is waiting, every event goes through `intercept` before
// device state sees it. Matching events are swallowed and committed to the
// action table; everything else passes through untouched.

use super::bind::{mouse_button_name, BindInput, BindKind, BindKinds};
use super::combo::{Combo, ModifierKey, ModifierSet};
use super::devices::DeviceStates;
use super::event::{EventFlow, InputEvent};
use super::joystick::{AxisDirection, JoystickAxis, JoystickState, BUTTON_COUNT};
use super::keys;
use super::table::ActionTable;
use super::InputError;
use log::{debug, info, warn};
use winit::keyboard::KeyCode;

/// A rebind waiting for its input
#[derive(Debug, Clone, PartialEq)]
pub struct RebindRequest {
    pub action: String,
    /// Slot inside the bind group the captured input belongs to
    pub slot: usize,
    pub kinds: BindKinds,
    /// Only evict the bind from actions of the same category
    pub same_category_only: bool,
}

/// Result of a finished rebind
#[derive(Debug, Clone, PartialEq)]
pub struct RebindOutcome {
    pub action: String,
    pub bind: BindInput,
    /// Actions that lost the bind to make it unique
    pub evicted: Vec<String>,
    /// False when the action already owned the bind
    pub changed: bool,
}

/// Whether a button index fits the bind range and the joystick reporting it
fn button_in_range(button: u8, joystick: Option<&JoystickState>) -> bool {
    if button as usize >= BUTTON_COUNT {
        return false;
    }
    match joystick.map(JoystickState::button_count) {
        Some(count) if count > 0 => button < count,
        _ => true,
    }
}

/// Idle / waiting state machine for rebinding
#[derive(Debug, Default)]
pub struct RebindCoordinator {
    request: Option<RebindRequest>,
    /// Modifiers held since the request started
    pending: ModifierSet,
}

impl RebindCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start waiting for an input to put in `slot` of `action`
    ///
    /// The slot may be at most one past the end of a bind group the mask
    /// covers. A request already waiting is replaced.
    pub fn begin(
        &mut self,
        table: &ActionTable,
        action: &str,
        slot: usize,
        kinds: BindKinds,
        same_category_only: bool,
    ) -> Result<(), InputError> {
        if kinds.is_empty() {
            return Err(InputError::EmptyBindKinds);
        }

        let target = table
            .get(action)
            .ok_or_else(|| InputError::UnknownAction(action.to_string()))?;

        let mut len = 0;
        if kinds.intersects(BindKinds::KEYBOARD_MOUSE) {
            len = len.max(target.keyboard_binds.len());
        }
        if kinds.intersects(BindKinds::JOYSTICK) {
            len = len.max(target.joystick_binds.len());
        }
        if slot > len {
            return Err(InputError::SlotOutOfRange {
                action: action.to_string(),
                slot,
                len,
            });
        }

        if let Some(previous) = &self.request {
            debug!("Rebind of {} replaced", previous.action);
        }
        info!("Waiting for input to bind to {} (slot {})", action, slot);

        self.pending.clear();
        self.request = Some(RebindRequest {
            action: action.to_string(),
            slot,
            kinds,
            same_category_only,
        });
        Ok(())
    }

    /// Drop the waiting request, if any
    pub fn cancel(&mut self) {
        if let Some(request) = self.request.take() {
            info!("Rebind of {} cancelled", request.action);
        }
        self.pending.clear();
    }

    /// Whether a request is waiting for input
    pub fn is_waiting(&self) -> bool {
        self.request.is_some()
    }

    /// Whether the waiting request accepts `kind`
    pub fn is_waiting_for(&self, kind: BindKind) -> bool {
        self.request
            .as_ref()
            .is_some_and(|r| r.kinds.contains(kind.flag()))
    }

    pub fn request(&self) -> Option<&RebindRequest> {
        self.request.as_ref()
    }

    /// Offer an event to the waiting request
    ///
    /// Axis events must already be calibrated in `devices`.
    pub fn intercept(
        &mut self,
        event: &InputEvent,
        table: &mut ActionTable,
        devices: &DeviceStates,
    ) -> EventFlow {
        let Some(request) = &self.request else {
            return EventFlow::Passed;
        };
        let kinds = request.kinds;

        match event {
            InputEvent::KeyDown { key, repeat } if kinds.contains(BindKinds::KEY) => {
                if let Some(modifier) = ModifierKey::from_key(*key) {
                    // Devices still need the press so the combo stays live
                    self.pending.insert(modifier);
                    return EventFlow::Passed;
                }
                if *repeat {
                    return EventFlow::Passed;
                }
                self.capture_key(*key, table)
            }
            InputEvent::KeyUp { key } => {
                if let Some(modifier) = ModifierKey::from_key(*key) {
                    self.pending.remove(modifier);
                }
                EventFlow::Passed
            }
            InputEvent::MouseDown(button) if kinds.contains(BindKinds::MOUSE_BUTTON) => {
                if mouse_button_name(*button).is_none() {
                    debug!("Mouse button {:?} cannot be bound", button);
                    return EventFlow::Passed;
                }
                self.commit(BindInput::MouseButton(*button), table)
            }
            InputEvent::JoystickButtonDown { id, button }
                if kinds.contains(BindKinds::JOYSTICK_BUTTON)
                    && devices.default_joystick_id() == Some(*id) =>
            {
                if !button_in_range(*button, devices.connected_joystick(*id)) {
                    debug!("Joystick button {} cannot be bound", button);
                    return EventFlow::Passed;
                }
                self.commit(BindInput::JoystickButton(*button), table)
            }
            InputEvent::JoystickMoved { id, axis, position }
                if kinds.contains(BindKinds::JOYSTICK_AXIS)
                    && devices.default_joystick_id() == Some(*id) =>
            {
                self.capture_axis(*id, *axis, *position, table, devices)
            }
            _ => EventFlow::Passed,
        }
    }

    fn capture_key(&mut self, key: KeyCode, table: &mut ActionTable) -> EventFlow {
        if keys::key_name(key).is_none() {
            debug!("Key {:?} cannot be bound", key);
            return EventFlow::Passed;
        }
        let combo = Combo {
            modifiers: self.pending.clone(),
            key,
        };
        self.commit(BindInput::KeyCombo(combo), table)
    }

    fn capture_axis(
        &mut self,
        id: usize,
        axis: JoystickAxis,
        position: f32,
        table: &mut ActionTable,
        devices: &DeviceStates,
    ) -> EventFlow {
        let Some(joystick) = devices.connected_joystick(id) else {
            return EventFlow::Passed;
        };
        let effective = joystick.effective_for(axis, position);
        if effective.abs() < joystick.threshold() {
            return EventFlow::Passed;
        }

        let full_axis = self
            .request
            .as_ref()
            .and_then(|r| table.get(&r.action))
            .is_some_and(|a| a.full_axis);
        let direction = if full_axis {
            AxisDirection::Full
        } else {
            AxisDirection::of(effective)
        };
        self.commit(BindInput::JoystickAxis(axis, direction), table)
    }

    /// Write the captured bind and leave the waiting state
    fn commit(&mut self, bind: BindInput, table: &mut ActionTable) -> EventFlow {
        let Some(request) = self.request.take() else {
            return EventFlow::Passed;
        };
        self.pending.clear();

        let Some(action) = table.get_mut(&request.action) else {
            warn!("Action {} vanished during rebind", request.action);
            return EventFlow::Consumed;
        };

        if action.contains(&bind) {
            info!("{} already bound to {}", bind, request.action);
            return EventFlow::Rebound(RebindOutcome {
                action: request.action,
                bind,
                evicted: Vec::new(),
                changed: false,
            });
        }

        action.set_bind(request.slot, bind.clone());
        let category = request.same_category_only.then_some(action.category);
        let evicted = table.evict(&bind, &request.action, category);

        info!("{} bound to {} (slot {})", bind, request.action, request.slot);
        EventFlow::Rebound(RebindOutcome {
            action: request.action,
            bind,
            evicted,
            changed: true,
        })
    }
}
