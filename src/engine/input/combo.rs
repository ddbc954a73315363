// Modifier keys and multi-key combos

use super::keys;
use std::collections::BTreeSet;
use std::fmt;
use winit::keyboard::KeyCode;

/// Keys that can prefix a combo
///
/// Declaration order is the canonical priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModifierKey {
    LCtrl,
    LAlt,
    LShift,
    RCtrl,
    RAlt,
    RShift,
}

impl ModifierKey {
    pub const ALL: [ModifierKey; 6] = [
        ModifierKey::LCtrl,
        ModifierKey::LAlt,
        ModifierKey::LShift,
        ModifierKey::RCtrl,
        ModifierKey::RAlt,
        ModifierKey::RShift,
    ];

    pub fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::ControlLeft => Some(Self::LCtrl),
            KeyCode::AltLeft => Some(Self::LAlt),
            KeyCode::ShiftLeft => Some(Self::LShift),
            KeyCode::ControlRight => Some(Self::RCtrl),
            KeyCode::AltRight => Some(Self::RAlt),
            KeyCode::ShiftRight => Some(Self::RShift),
            _ => None,
        }
    }

    pub fn key(self) -> KeyCode {
        match self {
            Self::LCtrl => KeyCode::ControlLeft,
            Self::LAlt => KeyCode::AltLeft,
            Self::LShift => KeyCode::ShiftLeft,
            Self::RCtrl => KeyCode::ControlRight,
            Self::RAlt => KeyCode::AltRight,
            Self::RShift => KeyCode::ShiftRight,
        }
    }

    pub fn is_shift(self) -> bool {
        matches!(self, Self::LShift | Self::RShift)
    }
}

/// Sort rank of any key: modifiers by priority, every other key after them
pub fn priority(key: KeyCode) -> usize {
    ModifierKey::from_key(key)
        .map(|m| m as usize)
        .unwrap_or(ModifierKey::ALL.len())
}

/// Put a list of keys into canonical order (stable for non-modifiers)
pub fn sort_canonical(keys: &mut [KeyCode]) {
    keys.sort_by_key(|&k| priority(k));
}

/// Ordered, duplicate-free set of held modifiers
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ModifierSet(BTreeSet<ModifierKey>);

impl ModifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, modifier: ModifierKey) -> bool {
        self.0.insert(modifier)
    }

    pub fn remove(&mut self, modifier: ModifierKey) -> bool {
        self.0.remove(&modifier)
    }

    pub fn contains(&self, modifier: ModifierKey) -> bool {
        self.0.contains(&modifier)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_shift(&self) -> bool {
        self.0.iter().any(|m| m.is_shift())
    }

    /// Modifiers in canonical order
    pub fn iter(&self) -> impl Iterator<Item = ModifierKey> + '_ {
        self.0.iter().copied()
    }

    /// Same set without one modifier
    pub fn without(&self, modifier: ModifierKey) -> Self {
        let mut set = self.clone();
        set.remove(modifier);
        set
    }
}

impl FromIterator<ModifierKey> for ModifierSet {
    fn from_iter<I: IntoIterator<Item = ModifierKey>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Main key plus the modifiers that must be held with it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Combo {
    pub modifiers: ModifierSet,
    pub key: KeyCode,
}

impl Combo {
    /// Single key, no modifiers
    pub fn key(key: KeyCode) -> Self {
        Self {
            modifiers: ModifierSet::new(),
            key,
        }
    }

    pub fn with_modifiers<I: IntoIterator<Item = ModifierKey>>(modifiers: I, key: KeyCode) -> Self {
        Self {
            modifiers: modifiers.into_iter().collect(),
            key,
        }
    }

    /// Build a combo from keys in the order they were pressed
    ///
    /// The last non-modifier is the main key. A list made only of modifiers
    /// binds its last modifier as a plain key.
    pub fn from_pressed(keys: &[KeyCode]) -> Option<Self> {
        let main = keys
            .iter()
            .rev()
            .copied()
            .find(|&k| ModifierKey::from_key(k).is_none())
            .or_else(|| keys.last().copied())?;

        let modifiers = keys
            .iter()
            .filter(|&&k| k != main)
            .filter_map(|&k| ModifierKey::from_key(k))
            .collect();

        Some(Self {
            modifiers,
            key: main,
        })
    }

    /// Every key of the combo in canonical order, main key last
    pub fn members(&self) -> Vec<KeyCode> {
        let mut members: Vec<KeyCode> = self.modifiers.iter().map(ModifierKey::key).collect();
        members.push(self.key);
        members
    }

    /// Live modifiers as seen by this combo, compared against `modifiers`
    ///
    /// A combo whose main key is itself a modifier does not count that key.
    pub fn live_modifiers(&self, live: &ModifierSet) -> ModifierSet {
        match ModifierKey::from_key(self.key) {
            Some(own) => live.without(own),
            None => live.clone(),
        }
    }
}

impl fmt::Display for Combo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self
            .members()
            .into_iter()
            .map(|k| keys::key_name(k).unwrap_or("?"))
            .collect();
        write!(f, "{}", names.join("+"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_order_does_not_matter() {
        let a = Combo::from_pressed(&[KeyCode::ShiftLeft, KeyCode::ControlLeft, KeyCode::KeyS]);
        let b = Combo::from_pressed(&[KeyCode::ControlLeft, KeyCode::ShiftLeft, KeyCode::KeyS]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_canonical_member_order() {
        let combo = Combo::with_modifiers(
            [ModifierKey::RShift, ModifierKey::LShift, ModifierKey::LCtrl],
            KeyCode::KeyK,
        );
        assert_eq!(
            combo.members(),
            vec![
                KeyCode::ControlLeft,
                KeyCode::ShiftLeft,
                KeyCode::ShiftRight,
                KeyCode::KeyK
            ]
        );
    }

    #[test]
    fn test_different_main_key_not_equal() {
        let a = Combo::with_modifiers([ModifierKey::LCtrl], KeyCode::KeyS);
        let b = Combo::with_modifiers([ModifierKey::LCtrl], KeyCode::KeyD);
        assert_ne!(a, b);
    }

    #[test]
    fn test_modifier_set_deduplicates() {
        let mut set = ModifierSet::new();
        assert!(set.insert(ModifierKey::LAlt));
        assert!(!set.insert(ModifierKey::LAlt));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_sort_canonical() {
        let mut keys = [
            KeyCode::KeyA,
            KeyCode::ShiftRight,
            KeyCode::AltLeft,
            KeyCode::ControlLeft,
        ];
        sort_canonical(&mut keys);
        assert_eq!(
            keys,
            [
                KeyCode::ControlLeft,
                KeyCode::AltLeft,
                KeyCode::ShiftRight,
                KeyCode::KeyA
            ]
        );
    }

    #[test]
    fn test_modifier_only_combo() {
        let combo = Combo::from_pressed(&[KeyCode::ControlLeft, KeyCode::ShiftLeft]).unwrap();
        assert_eq!(combo.key, KeyCode::ShiftLeft);
        assert!(combo.modifiers.contains(ModifierKey::LCtrl));
        assert!(Combo::from_pressed(&[]).is_none());
    }

    #[test]
    fn test_display() {
        let combo = Combo::with_modifiers([ModifierKey::LShift, ModifierKey::LCtrl], KeyCode::KeyS);
        assert_eq!(combo.to_string(), "LCtrl+LShift+S");
    }

    #[test]
    fn test_live_modifiers_excludes_own_key() {
        let live: ModifierSet = [ModifierKey::LShift].into_iter().collect();
        let sprint = Combo::key(KeyCode::ShiftLeft);
        assert!(sprint.live_modifiers(&live).is_empty());
    }
}
