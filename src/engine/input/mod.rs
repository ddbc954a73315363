// Input handling system
//
// Turns raw device events into per-frame edge states and evaluates named
// actions bound to keys, key combos, mouse buttons and joystick inputs.
// Also drives interactive rebinding and the on-disk action profiles.
//
// ## Architecture
//
// - `status`: Per-input edge detection (Up, Pressed, Down, Released)
// - `keys`: Key symbolic names and per-locale labels/characters
// - `combo`: Modifier canon and multi-key combos
// - `joystick`: Joystick slots, calibration and axis directions
// - `bind`: Physical input shapes and their evaluation
// - `action`: Named actions and their bind lists
// - `table`: The live action table, merge and eviction
// - `devices`: Device state fed by events and advanced each frame
// - `event`: Boundary events and winit conversion
// - `rebind`: Interactive rebind capture
// - `config`: Settings and TOML action profiles
// - `manager`: Main input manager coordinating everything
//
// ## Usage Example
//
// ```rust
// use engine::input::{InputManager, InputSettings};
//
// let mut input = InputManager::new(InputSettings::default());
//
// // In your event loop, feed window events
// input.process_window_event(&window_event);
//
// // Once per frame, advance every tracker
// input.update();
//
// if input.is_action_pressed("Jump") {
//     // Jump started this frame
// }
// ```

pub mod action;
pub mod bind;
pub mod combo;
pub mod config;
pub mod devices;
pub mod event;
pub mod joystick;
pub mod keys;
pub mod manager;
pub mod rebind;
pub mod status;
pub mod table;

// Re-export commonly used types
pub use action::ActionKey;
pub use bind::{BindInput, BindKind, BindKinds, BindSource, Query};
pub use combo::{Combo, ModifierKey, ModifierSet};
pub use config::InputSettings;
pub use devices::{DeviceStates, InputPoller, InputSystem, WheelDirection};
pub use event::{EventFlow, InputEvent};
pub use joystick::{AxisDirection, JoystickAxis, JoystickInfo, JoystickState};
pub use keys::Locale;
pub use manager::InputManager;
pub use rebind::{RebindCoordinator, RebindOutcome, RebindRequest};
pub use status::{EdgeTracker, Status};
pub use table::ActionTable;

/// Input system errors
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse profile: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize profile: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Rebind requested with no accepted input kind")]
    EmptyBindKinds,

    #[error("Slot {slot} out of range for action {action} ({len} binds)")]
    SlotOutOfRange {
        action: String,
        slot: usize,
        len: usize,
    },

    #[error("Malformed {kind} map: {map}")]
    MalformedMap { kind: &'static str, map: String },

    #[error("Input has no symbolic name: {0}")]
    UnmappedInput(String),

    #[error("Unknown input type: {0}")]
    UnknownInputType(String),
}
