// Key symbolic names and per-locale keyboard tables
//
// Symbolic names are layout independent and are what profiles store.
// Locale tables only drive display labels and typed characters.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;
use winit::keyboard::KeyCode;

/// Keyboard layout used for labels and typed characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    English,
    French,
}

/// Stable symbolic names written into profiles
const KEY_NAMES: &[(KeyCode, &str)] = &[
    (KeyCode::KeyA, "A"),
    (KeyCode::KeyB, "B"),
    (KeyCode::KeyC, "C"),
    (KeyCode::KeyD, "D"),
    (KeyCode::KeyE, "E"),
    (KeyCode::KeyF, "F"),
    (KeyCode::KeyG, "G"),
    (KeyCode::KeyH, "H"),
    (KeyCode::KeyI, "I"),
    (KeyCode::KeyJ, "J"),
    (KeyCode::KeyK, "K"),
    (KeyCode::KeyL, "L"),
    (KeyCode::KeyM, "M"),
    (KeyCode::KeyN, "N"),
    (KeyCode::KeyO, "O"),
    (KeyCode::KeyP, "P"),
    (KeyCode::KeyQ, "Q"),
    (KeyCode::KeyR, "R"),
    (KeyCode::KeyS, "S"),
    (KeyCode::KeyT, "T"),
    (KeyCode::KeyU, "U"),
    (KeyCode::KeyV, "V"),
    (KeyCode::KeyW, "W"),
    (KeyCode::KeyX, "X"),
    (KeyCode::KeyY, "Y"),
    (KeyCode::KeyZ, "Z"),
    (KeyCode::Digit0, "0"),
    (KeyCode::Digit1, "1"),
    (KeyCode::Digit2, "2"),
    (KeyCode::Digit3, "3"),
    (KeyCode::Digit4, "4"),
    (KeyCode::Digit5, "5"),
    (KeyCode::Digit6, "6"),
    (KeyCode::Digit7, "7"),
    (KeyCode::Digit8, "8"),
    (KeyCode::Digit9, "9"),
    (KeyCode::BracketLeft, "LBracket"),
    (KeyCode::BracketRight, "RBracket"),
    (KeyCode::Semicolon, "SemiColon"),
    (KeyCode::Comma, "Comma"),
    (KeyCode::Period, "Period"),
    (KeyCode::Quote, "Quote"),
    (KeyCode::Slash, "Slash"),
    (KeyCode::Backslash, "BackSlash"),
    (KeyCode::Backquote, "Tilde"),
    (KeyCode::Equal, "Equal"),
    (KeyCode::Minus, "Dash"),
    (KeyCode::IntlBackslash, "IntlBackSlash"),
    (KeyCode::Space, "Space"),
    (KeyCode::Enter, "Return"),
    (KeyCode::Backspace, "BackSpace"),
    (KeyCode::Tab, "Tab"),
    (KeyCode::CapsLock, "CapsLock"),
    (KeyCode::PageUp, "PageUp"),
    (KeyCode::PageDown, "PageDown"),
    (KeyCode::End, "End"),
    (KeyCode::Home, "Home"),
    (KeyCode::Insert, "Insert"),
    (KeyCode::Delete, "Delete"),
    (KeyCode::NumpadAdd, "Add"),
    (KeyCode::NumpadSubtract, "Subtract"),
    (KeyCode::NumpadMultiply, "Multiply"),
    (KeyCode::NumpadDivide, "Divide"),
    (KeyCode::NumpadDecimal, "Decimal"),
    (KeyCode::NumpadEnter, "NumpadEnter"),
    (KeyCode::Numpad0, "Numpad0"),
    (KeyCode::Numpad1, "Numpad1"),
    (KeyCode::Numpad2, "Numpad2"),
    (KeyCode::Numpad3, "Numpad3"),
    (KeyCode::Numpad4, "Numpad4"),
    (KeyCode::Numpad5, "Numpad5"),
    (KeyCode::Numpad6, "Numpad6"),
    (KeyCode::Numpad7, "Numpad7"),
    (KeyCode::Numpad8, "Numpad8"),
    (KeyCode::Numpad9, "Numpad9"),
    (KeyCode::ArrowLeft, "Left"),
    (KeyCode::ArrowRight, "Right"),
    (KeyCode::ArrowUp, "Up"),
    (KeyCode::ArrowDown, "Down"),
    (KeyCode::F1, "F1"),
    (KeyCode::F2, "F2"),
    (KeyCode::F3, "F3"),
    (KeyCode::F4, "F4"),
    (KeyCode::F5, "F5"),
    (KeyCode::F6, "F6"),
    (KeyCode::F7, "F7"),
    (KeyCode::F8, "F8"),
    (KeyCode::F9, "F9"),
    (KeyCode::F10, "F10"),
    (KeyCode::F11, "F11"),
    (KeyCode::F12, "F12"),
    (KeyCode::F13, "F13"),
    (KeyCode::F14, "F14"),
    (KeyCode::F15, "F15"),
    (KeyCode::Escape, "Escape"),
    (KeyCode::Pause, "Pause"),
    (KeyCode::ContextMenu, "Menu"),
    (KeyCode::ControlLeft, "LCtrl"),
    (KeyCode::AltLeft, "LAlt"),
    (KeyCode::ShiftLeft, "LShift"),
    (KeyCode::SuperLeft, "LSystem"),
    (KeyCode::ControlRight, "RCtrl"),
    (KeyCode::AltRight, "RAlt"),
    (KeyCode::ShiftRight, "RShift"),
    (KeyCode::SuperRight, "RSystem"),
];

/// Keys whose character is the same on both layouts
const SHARED_CHARS: &[(KeyCode, char, char)] = &[
    (KeyCode::KeyB, 'b', 'B'),
    (KeyCode::KeyC, 'c', 'C'),
    (KeyCode::KeyD, 'd', 'D'),
    (KeyCode::KeyE, 'e', 'E'),
    (KeyCode::KeyF, 'f', 'F'),
    (KeyCode::KeyG, 'g', 'G'),
    (KeyCode::KeyH, 'h', 'H'),
    (KeyCode::KeyI, 'i', 'I'),
    (KeyCode::KeyJ, 'j', 'J'),
    (KeyCode::KeyK, 'k', 'K'),
    (KeyCode::KeyL, 'l', 'L'),
    (KeyCode::KeyN, 'n', 'N'),
    (KeyCode::KeyO, 'o', 'O'),
    (KeyCode::KeyP, 'p', 'P'),
    (KeyCode::KeyR, 'r', 'R'),
    (KeyCode::KeyS, 's', 'S'),
    (KeyCode::KeyT, 't', 'T'),
    (KeyCode::KeyU, 'u', 'U'),
    (KeyCode::KeyV, 'v', 'V'),
    (KeyCode::KeyX, 'x', 'X'),
    (KeyCode::KeyY, 'y', 'Y'),
    (KeyCode::Space, ' ', ' '),
    (KeyCode::Enter, '\n', '\n'),
    (KeyCode::Tab, '\t', '\t'),
    (KeyCode::Numpad0, '0', '0'),
    (KeyCode::Numpad1, '1', '1'),
    (KeyCode::Numpad2, '2', '2'),
    (KeyCode::Numpad3, '3', '3'),
    (KeyCode::Numpad4, '4', '4'),
    (KeyCode::Numpad5, '5', '5'),
    (KeyCode::Numpad6, '6', '6'),
    (KeyCode::Numpad7, '7', '7'),
    (KeyCode::Numpad8, '8', '8'),
    (KeyCode::Numpad9, '9', '9'),
    (KeyCode::NumpadAdd, '+', '+'),
    (KeyCode::NumpadSubtract, '-', '-'),
    (KeyCode::NumpadMultiply, '*', '*'),
    (KeyCode::NumpadDivide, '/', '/'),
    (KeyCode::NumpadDecimal, '.', '.'),
];

/// QWERTY characters (lower, upper)
const ENGLISH_CHARS: &[(KeyCode, char, char)] = &[
    (KeyCode::KeyA, 'a', 'A'),
    (KeyCode::KeyM, 'm', 'M'),
    (KeyCode::KeyQ, 'q', 'Q'),
    (KeyCode::KeyW, 'w', 'W'),
    (KeyCode::KeyZ, 'z', 'Z'),
    (KeyCode::Digit1, '1', '!'),
    (KeyCode::Digit2, '2', '@'),
    (KeyCode::Digit3, '3', '#'),
    (KeyCode::Digit4, '4', '$'),
    (KeyCode::Digit5, '5', '%'),
    (KeyCode::Digit6, '6', '^'),
    (KeyCode::Digit7, '7', '&'),
    (KeyCode::Digit8, '8', '*'),
    (KeyCode::Digit9, '9', '('),
    (KeyCode::Digit0, '0', ')'),
    (KeyCode::Minus, '-', '_'),
    (KeyCode::Equal, '=', '+'),
    (KeyCode::BracketLeft, '[', '{'),
    (KeyCode::BracketRight, ']', '}'),
    (KeyCode::Backslash, '\\', '|'),
    (KeyCode::Semicolon, ';', ':'),
    (KeyCode::Quote, '\'', '"'),
    (KeyCode::Comma, ',', '<'),
    (KeyCode::Period, '.', '>'),
    (KeyCode::Slash, '/', '?'),
    (KeyCode::Backquote, '`', '~'),
];

/// AZERTY characters (lower, upper) by physical position
const FRENCH_CHARS: &[(KeyCode, char, char)] = &[
    (KeyCode::KeyQ, 'a', 'A'),
    (KeyCode::KeyW, 'z', 'Z'),
    (KeyCode::KeyA, 'q', 'Q'),
    (KeyCode::KeyZ, 'w', 'W'),
    (KeyCode::Semicolon, 'm', 'M'),
    (KeyCode::KeyM, ',', '?'),
    (KeyCode::Digit1, '&', '1'),
    (KeyCode::Digit2, 'é', '2'),
    (KeyCode::Digit3, '"', '3'),
    (KeyCode::Digit4, '\'', '4'),
    (KeyCode::Digit5, '(', '5'),
    (KeyCode::Digit6, '-', '6'),
    (KeyCode::Digit7, 'è', '7'),
    (KeyCode::Digit8, '_', '8'),
    (KeyCode::Digit9, 'ç', '9'),
    (KeyCode::Digit0, 'à', '0'),
    (KeyCode::Minus, ')', '°'),
    (KeyCode::Equal, '=', '+'),
    (KeyCode::BracketLeft, '^', '¨'),
    (KeyCode::BracketRight, '$', '£'),
    (KeyCode::Backslash, '*', 'µ'),
    (KeyCode::Quote, 'ù', '%'),
    (KeyCode::Comma, ';', '.'),
    (KeyCode::Period, ':', '/'),
    (KeyCode::Slash, '!', '§'),
    (KeyCode::Backquote, '²', '²'),
    (KeyCode::IntlBackslash, '<', '>'),
];

struct KeyNameTable {
    by_code: HashMap<KeyCode, &'static str>,
    by_name: HashMap<&'static str, KeyCode>,
}

#[derive(Debug, Clone)]
struct LocaleKey {
    label: String,
    lower: char,
    upper: char,
}

fn name_table() -> &'static KeyNameTable {
    static TABLE: OnceLock<KeyNameTable> = OnceLock::new();
    TABLE.get_or_init(|| KeyNameTable {
        by_code: KEY_NAMES.iter().copied().collect(),
        by_name: KEY_NAMES.iter().map(|&(code, name)| (name, code)).collect(),
    })
}

fn locale_table(locale: Locale) -> &'static HashMap<KeyCode, LocaleKey> {
    static TABLES: OnceLock<HashMap<Locale, HashMap<KeyCode, LocaleKey>>> = OnceLock::new();
    let tables = TABLES.get_or_init(|| {
        [
            (Locale::English, ENGLISH_CHARS),
            (Locale::French, FRENCH_CHARS),
        ]
        .into_iter()
        .map(|(locale, chars)| (locale, build_locale(chars)))
        .collect()
    });
    &tables[&locale]
}

fn build_locale(chars: &[(KeyCode, char, char)]) -> HashMap<KeyCode, LocaleKey> {
    SHARED_CHARS
        .iter()
        .chain(chars.iter())
        .map(|&(code, lower, upper)| {
            let label = match lower {
                ' ' | '\n' | '\t' => key_name(code).unwrap_or_default().to_string(),
                c if c.is_alphabetic() => upper.to_string(),
                c => c.to_string(),
            };
            (code, LocaleKey { label, lower, upper })
        })
        .collect()
}

/// Symbolic name of a key, `None` for keys profiles cannot store
pub fn key_name(key: KeyCode) -> Option<&'static str> {
    name_table().by_code.get(&key).copied()
}

/// Key for a symbolic name
pub fn key_from_name(name: &str) -> Option<KeyCode> {
    name_table().by_name.get(name).copied()
}

impl Locale {
    /// Label shown to the player for a key on this layout
    pub fn label(self, key: KeyCode) -> Option<&'static str> {
        locale_table(self)
            .get(&key)
            .map(|entry| entry.label.as_str())
            .or_else(|| key_name(key))
    }

    /// Character produced by a key on this layout
    pub fn char_for(self, key: KeyCode, shift: bool) -> Option<char> {
        locale_table(self)
            .get(&key)
            .map(|entry| if shift { entry.upper } else { entry.lower })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip_for_every_entry() {
        for &(code, name) in KEY_NAMES {
            assert_eq!(key_name(code), Some(name));
            assert_eq!(key_from_name(name), Some(code));
        }
    }

    #[test]
    fn test_unknown_name() {
        assert_eq!(key_from_name("NotAKey"), None);
        assert_eq!(key_from_name(""), None);
    }

    #[test]
    fn test_no_duplicate_names() {
        let mut seen = std::collections::HashSet::new();
        for &(_, name) in KEY_NAMES {
            assert!(seen.insert(name), "Duplicate key name {name}");
        }
    }

    #[test]
    fn test_english_chars() {
        assert_eq!(Locale::English.char_for(KeyCode::KeyA, false), Some('a'));
        assert_eq!(Locale::English.char_for(KeyCode::KeyA, true), Some('A'));
        assert_eq!(Locale::English.char_for(KeyCode::Digit1, true), Some('!'));
        assert_eq!(Locale::English.char_for(KeyCode::Escape, false), None);
    }

    #[test]
    fn test_french_layout_swaps_letters() {
        assert_eq!(Locale::French.char_for(KeyCode::KeyQ, false), Some('a'));
        assert_eq!(Locale::French.char_for(KeyCode::KeyW, true), Some('Z'));
        assert_eq!(Locale::French.char_for(KeyCode::Digit2, false), Some('é'));
        assert_eq!(Locale::French.char_for(KeyCode::Digit2, true), Some('2'));
    }

    #[test]
    fn test_labels() {
        assert_eq!(Locale::English.label(KeyCode::KeyQ), Some("Q"));
        assert_eq!(Locale::French.label(KeyCode::KeyQ), Some("A"));
        assert_eq!(Locale::French.label(KeyCode::Space), Some("Space"));
        // Falls back to the symbolic name
        assert_eq!(Locale::French.label(KeyCode::F5), Some("F5"));
    }
}
