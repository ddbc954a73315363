// Named actions and their bind lists

use super::bind::{BindInput, BindKind, BindSource, Query};
use super::combo::ModifierKey;
use super::joystick::{AxisDirection, JoystickAxis};
use super::status::Status;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

/// A named logical input satisfiable by several physical binds
///
/// Keyboard and mouse binds live in `keyboard_binds`, joystick buttons and
/// axes in `joystick_binds`. Each list is duplicate free.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionKey {
    pub name: String,
    /// Scope for conflict eviction during rebinds
    pub category: i32,
    pub keyboard_binds: Vec<BindInput>,
    pub joystick_binds: Vec<BindInput>,
    /// Report signed values across the whole axis instead of a half axis
    pub full_axis: bool,
}

impl ActionKey {
    pub fn new(name: impl Into<String>, category: i32) -> Self {
        Self {
            name: name.into(),
            category,
            keyboard_binds: Vec::new(),
            joystick_binds: Vec::new(),
            full_axis: true,
        }
    }

    /// Builder form of `add_bind`
    pub fn with_bind(mut self, bind: BindInput) -> Self {
        self.add_bind(bind);
        self
    }

    pub fn with_full_axis(mut self, full_axis: bool) -> Self {
        self.full_axis = full_axis;
        self
    }

    /// Bind list a kind belongs to
    pub fn binds(&self, kind: BindKind) -> &Vec<BindInput> {
        if kind.is_joystick() {
            &self.joystick_binds
        } else {
            &self.keyboard_binds
        }
    }

    pub fn binds_mut(&mut self, kind: BindKind) -> &mut Vec<BindInput> {
        if kind.is_joystick() {
            &mut self.joystick_binds
        } else {
            &mut self.keyboard_binds
        }
    }

    /// Append a bind; adding one already present is a no-op
    pub fn add_bind(&mut self, bind: BindInput) -> bool {
        if self.contains(&bind) {
            return false;
        }
        self.binds_mut(bind.kind()).push(bind);
        true
    }

    pub fn contains(&self, bind: &BindInput) -> bool {
        self.binds(bind.kind()).contains(bind)
    }

    /// Write a bind into a slot of its group, appending past the end
    pub fn set_bind(&mut self, slot: usize, bind: BindInput) {
        let binds = self.binds_mut(bind.kind());
        match binds.get_mut(slot) {
            Some(existing) => *existing = bind,
            None => binds.push(bind),
        }
    }

    pub fn remove_bind(&mut self, bind: &BindInput) -> bool {
        let binds = self.binds_mut(bind.kind());
        match binds.iter().position(|b| b == bind) {
            Some(pos) => {
                binds.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Every bind, keyboard group first
    pub fn all_binds(&self) -> impl Iterator<Item = &BindInput> {
        self.keyboard_binds.iter().chain(self.joystick_binds.iter())
    }

    /// Bind by index across both groups, keyboard group first
    pub fn bind_at(&self, index: usize) -> Option<&BindInput> {
        self.all_binds().nth(index)
    }

    /// Equality ignoring bind order inside each group
    pub fn same_as(&self, other: &ActionKey) -> bool {
        fn same_set(a: &[BindInput], b: &[BindInput]) -> bool {
            a.len() == b.len() && a.iter().all(|bind| b.contains(bind))
        }

        self.name == other.name
            && self.category == other.category
            && self.full_axis == other.full_axis
            && same_set(&self.keyboard_binds, &other.keyboard_binds)
            && same_set(&self.joystick_binds, &other.joystick_binds)
    }

    fn joystick_group<S: BindSource + ?Sized>(&self, source: &S) -> &[BindInput] {
        if source.joystick_connected() {
            &self.joystick_binds
        } else {
            &[]
        }
    }

    /// Evaluate a frame query over every bind
    ///
    /// Pressed, Down and Released hold when any bind satisfies them. Up
    /// holds only when no bind is engaged. Joystick binds count only while
    /// a default joystick is connected.
    pub fn matches<S: BindSource + ?Sized>(&self, query: Query, source: &S) -> bool {
        let mut binds = self
            .keyboard_binds
            .iter()
            .chain(self.joystick_group(source));
        match query {
            Query::Up => binds.all(|bind| bind.matches(Query::Up, source)),
            _ => binds.any(|bind| bind.matches(query, source)),
        }
    }

    /// First non-idle bind status, keyboard group first
    pub fn state<S: BindSource + ?Sized>(&self, source: &S) -> Status {
        self.keyboard_binds
            .iter()
            .chain(self.joystick_group(source))
            .map(|bind| bind.status(source))
            .find(|&status| status != Status::Up)
            .unwrap_or(Status::Up)
    }

    /// Analog value of the action
    ///
    /// Axis binds report their normalized deflection; without one the value
    /// falls back to 1.0 while the action is pressed or down.
    pub fn value<S: BindSource + ?Sized>(&self, source: &S) -> f32 {
        let analog = self
            .joystick_group(source)
            .iter()
            .filter_map(|bind| bind.axis_value(source))
            .find(|&value| value != 0.0);

        if let Some(value) = analog {
            return if self.full_axis { value } else { value.abs() };
        }

        if self.matches(Query::Pressed, source) || self.matches(Query::Down, source) {
            1.0
        } else {
            0.0
        }
    }
}

/// Built-in profile used when no defaults file ships with the game
pub fn default_actions() -> Vec<ActionKey> {
    vec![
        ActionKey::new("MoveLeft", 0)
            .with_bind(BindInput::key(KeyCode::KeyA))
            .with_bind(BindInput::key(KeyCode::ArrowLeft))
            .with_bind(BindInput::JoystickAxis(JoystickAxis::X, AxisDirection::Negative))
            .with_full_axis(false),
        ActionKey::new("MoveRight", 0)
            .with_bind(BindInput::key(KeyCode::KeyD))
            .with_bind(BindInput::key(KeyCode::ArrowRight))
            .with_bind(BindInput::JoystickAxis(JoystickAxis::X, AxisDirection::Positive))
            .with_full_axis(false),
        ActionKey::new("Jump", 0)
            .with_bind(BindInput::key(KeyCode::Space))
            .with_bind(BindInput::JoystickButton(0)),
        ActionKey::new("Fire", 0)
            .with_bind(BindInput::MouseButton(MouseButton::Left))
            .with_bind(BindInput::JoystickButton(2)),
        ActionKey::new("QuickSave", 1)
            .with_bind(BindInput::combo([ModifierKey::LCtrl], KeyCode::KeyS)),
        ActionKey::new("Menu", 1)
            .with_bind(BindInput::key(KeyCode::Escape))
            .with_bind(BindInput::JoystickButton(7)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_bind_is_idempotent() {
        let mut action = ActionKey::new("Jump", 0);
        assert!(action.add_bind(BindInput::key(KeyCode::Space)));
        assert!(!action.add_bind(BindInput::key(KeyCode::Space)));
        assert_eq!(action.keyboard_binds.len(), 1);
    }

    #[test]
    fn test_binds_routed_by_kind() {
        let action = ActionKey::new("Fire", 0)
            .with_bind(BindInput::MouseButton(MouseButton::Left))
            .with_bind(BindInput::JoystickButton(2));
        assert_eq!(action.keyboard_binds.len(), 1);
        assert_eq!(action.joystick_binds.len(), 1);
    }

    #[test]
    fn test_set_bind_replaces_or_appends() {
        let mut action = ActionKey::new("Jump", 0).with_bind(BindInput::key(KeyCode::Space));
        action.set_bind(0, BindInput::key(KeyCode::KeyW));
        assert_eq!(action.keyboard_binds, vec![BindInput::key(KeyCode::KeyW)]);

        action.set_bind(5, BindInput::key(KeyCode::ArrowUp));
        assert_eq!(action.keyboard_binds.len(), 2);
        assert_eq!(action.keyboard_binds[1], BindInput::key(KeyCode::ArrowUp));
    }

    #[test]
    fn test_remove_bind() {
        let mut action = ActionKey::new("Jump", 0).with_bind(BindInput::key(KeyCode::Space));
        assert!(action.remove_bind(&BindInput::key(KeyCode::Space)));
        assert!(!action.remove_bind(&BindInput::key(KeyCode::Space)));
        assert!(action.keyboard_binds.is_empty());
    }

    #[test]
    fn test_bind_at_spans_groups() {
        let action = ActionKey::new("Jump", 0)
            .with_bind(BindInput::JoystickButton(0))
            .with_bind(BindInput::key(KeyCode::Space));
        assert_eq!(action.bind_at(0), Some(&BindInput::key(KeyCode::Space)));
        assert_eq!(action.bind_at(1), Some(&BindInput::JoystickButton(0)));
        assert_eq!(action.bind_at(2), None);
    }

    #[test]
    fn test_same_as_ignores_order() {
        let a = ActionKey::new("Move", 0)
            .with_bind(BindInput::key(KeyCode::KeyA))
            .with_bind(BindInput::key(KeyCode::ArrowLeft));
        let b = ActionKey::new("Move", 0)
            .with_bind(BindInput::key(KeyCode::ArrowLeft))
            .with_bind(BindInput::key(KeyCode::KeyA));
        assert!(a.same_as(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_default_actions_have_unique_names() {
        let actions = default_actions();
        let mut seen = std::collections::HashSet::new();
        for action in &actions {
            assert!(seen.insert(action.name.as_str()));
        }
    }
}
