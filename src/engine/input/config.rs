// Input settings and TOML action profiles
//
// A profile mirrors the record tree:
//
// ```toml
// [[Actions.Action]]
// Name = "Jump"
// Category = 0
// FullAxis = true
//
// [[Actions.Action.Input]]
// Type = "Keyboard"
// Map = "Space"
// ```

use super::action::{default_actions, ActionKey};
use super::bind::{BindInput, BindKind};
use super::joystick::{DEFAULT_AXIS_THRESHOLD, DEFAULT_DEAD_ZONE};
use super::keys::Locale;
use super::table::ActionTable;
use super::InputError;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Tunables of the input system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// Profile shipped with the game
    pub defaults_path: PathBuf,
    /// Profile holding the player's binds
    pub user_path: PathBuf,
    pub locale: Locale,
    /// Axis magnitude treated as noise
    pub dead_zone: f32,
    /// Axis magnitude treated as a deliberate push
    pub axis_threshold: f32,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            defaults_path: PathBuf::from("config/default_actions.toml"),
            user_path: PathBuf::from("config/actions.toml"),
            locale: Locale::default(),
            dead_zone: DEFAULT_DEAD_ZONE,
            axis_threshold: DEFAULT_AXIS_THRESHOLD,
        }
    }
}

impl InputSettings {
    /// Load settings from a file path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, InputError> {
        let content = fs::read_to_string(path)?;
        let settings: InputSettings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file is unusable
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Using default input settings ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ProfileDocument {
    #[serde(default)]
    actions: ActionsNode,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ActionsNode {
    #[serde(default)]
    action: Vec<ActionRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ActionRecord {
    name: String,
    #[serde(default)]
    category: i32,
    #[serde(default = "full_axis_default")]
    full_axis: bool,
    #[serde(default)]
    input: Vec<InputRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InputRecord {
    #[serde(rename = "Type")]
    kind: String,
    map: String,
}

fn full_axis_default() -> bool {
    true
}

impl InputRecord {
    fn to_bind(&self) -> Result<BindInput, InputError> {
        let kind = BindKind::from_type_name(&self.kind)
            .ok_or_else(|| InputError::UnknownInputType(self.kind.clone()))?;
        BindInput::from_map(kind, &self.map)
    }
}

impl ActionRecord {
    fn into_action(self) -> ActionKey {
        let mut action = ActionKey::new(self.name, self.category).with_full_axis(self.full_axis);
        for input in &self.input {
            match input.to_bind() {
                Ok(bind) => {
                    action.add_bind(bind);
                }
                Err(e) => warn!("Skipping input of action {}: {}", action.name, e),
            }
        }
        action
    }

    fn from_action(action: &ActionKey) -> Self {
        let input = action
            .all_binds()
            .filter_map(|bind| match bind.to_map() {
                Ok(map) => Some(InputRecord {
                    kind: bind.kind().type_name().to_string(),
                    map,
                }),
                Err(e) => {
                    warn!("Not saving input of action {}: {}", action.name, e);
                    None
                }
            })
            .collect();

        Self {
            name: action.name.clone(),
            category: action.category,
            full_axis: action.full_axis,
            input,
        }
    }
}

/// Parse an action table from profile text
///
/// Inputs that cannot be decoded are skipped; the rest of the action loads.
pub fn parse_actions(content: &str) -> Result<ActionTable, InputError> {
    let document: ProfileDocument = toml::from_str(content)?;
    let mut table = ActionTable::new();
    for record in document.actions.action {
        if table.contains(&record.name) {
            warn!("Duplicate action {} in profile, keeping the first", record.name);
            continue;
        }
        table.insert(record.into_action());
    }
    Ok(table)
}

/// Render an action table as profile text
pub fn render_actions(table: &ActionTable) -> Result<String, InputError> {
    let document = ProfileDocument {
        actions: ActionsNode {
            action: table.iter().map(ActionRecord::from_action).collect(),
        },
    };
    Ok(toml::to_string_pretty(&document)?)
}

/// Load an action table from a profile file
pub fn load_actions<P: AsRef<Path>>(path: P) -> Result<ActionTable, InputError> {
    let content = fs::read_to_string(path)?;
    parse_actions(&content)
}

/// Save an action table to a profile file, creating parent directories
pub fn save_actions<P: AsRef<Path>>(path: P, table: &ActionTable) -> Result<(), InputError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, render_actions(table)?)?;
    Ok(())
}

/// Shipped defaults, or the built-in table when the defaults file is unusable
pub fn load_defaults(settings: &InputSettings) -> ActionTable {
    match load_actions(&settings.defaults_path) {
        Ok(table) => table,
        Err(e) => {
            warn!(
                "Default actions unavailable ({}): {}, using built-in table",
                settings.defaults_path.display(),
                e
            );
            ActionTable::from(default_actions())
        }
    }
}

/// Build the live table from the defaults and the user profile
///
/// A missing or corrupt user profile is replaced by the defaults, which are
/// written back right away.
pub fn load_profile(settings: &InputSettings, defaults: &ActionTable) -> ActionTable {
    match load_actions(&settings.user_path) {
        Ok(user) => {
            info!("Loaded input profile {}", settings.user_path.display());
            ActionTable::merge(defaults, user)
        }
        Err(e) => {
            warn!(
                "Input profile unusable ({}): {}, restoring defaults",
                settings.user_path.display(),
                e
            );
            let live = defaults.clone();
            if let Err(e) = save_actions(&settings.user_path, &live) {
                error!("Failed to write input profile: {}", e);
            }
            live
        }
    }
}
