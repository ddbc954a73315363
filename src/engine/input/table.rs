// The live action table

use super::action::ActionKey;
use super::bind::{BindInput, BindSource, Query};
use super::keys::Locale;
use super::status::Status;
use log::info;

/// Ordered set of actions keyed by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionTable {
    actions: Vec<ActionKey>,
}

impl ActionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionKey> {
        self.actions.iter()
    }

    pub fn get(&self, name: &str) -> Option<&ActionKey> {
        self.actions.iter().find(|a| a.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ActionKey> {
        self.actions.iter_mut().find(|a| a.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Add an action, replacing any action with the same name in place
    pub fn insert(&mut self, action: ActionKey) {
        match self.get_mut(&action.name) {
            Some(existing) => *existing = action,
            None => self.actions.push(action),
        }
    }

    // Queries. Unknown names answer with neutral values.

    pub fn matches<S: BindSource + ?Sized>(&self, name: &str, query: Query, source: &S) -> bool {
        self.get(name)
            .is_some_and(|action| action.matches(query, source))
    }

    pub fn state<S: BindSource + ?Sized>(&self, name: &str, source: &S) -> Status {
        self.get(name)
            .map(|action| action.state(source))
            .unwrap_or(Status::Up)
    }

    pub fn value<S: BindSource + ?Sized>(&self, name: &str, source: &S) -> f32 {
        self.get(name)
            .map(|action| action.value(source))
            .unwrap_or(0.0)
    }

    /// Remove a bind from every action but `owner`
    ///
    /// With `category` set, only actions of that category are touched.
    /// Returns the names of the actions that lost the bind.
    pub fn evict(&mut self, bind: &BindInput, owner: &str, category: Option<i32>) -> Vec<String> {
        let mut evicted = Vec::new();
        for action in &mut self.actions {
            if action.name == owner {
                continue;
            }
            if category.is_some_and(|c| c != action.category) {
                continue;
            }
            if action.remove_bind(bind) {
                info!("Bind {} removed from action {}", bind, action.name);
                evicted.push(action.name.clone());
            }
        }
        evicted
    }

    /// Combine the shipped defaults with a user table
    ///
    /// The result follows the defaults order. Actions missing from the user
    /// table are inherited from the defaults; user actions the defaults no
    /// longer know are dropped.
    pub fn merge(defaults: &ActionTable, user: ActionTable) -> ActionTable {
        let mut user = user.actions;
        let mut merged = Vec::with_capacity(defaults.len());

        for default in &defaults.actions {
            match user.iter().position(|a| a.name == default.name) {
                Some(pos) => merged.push(user.swap_remove(pos)),
                None => {
                    info!("Action {} missing from user profile, using defaults", default.name);
                    merged.push(default.clone());
                }
            }
        }

        for stale in &user {
            info!("Dropping stale action {} from user profile", stale.name);
        }

        ActionTable { actions: merged }
    }

    /// Equality ignoring bind order inside each action
    pub fn same_as(&self, other: &ActionTable) -> bool {
        self.len() == other.len()
            && self
                .actions
                .iter()
                .all(|a| other.get(&a.name).is_some_and(|b| a.same_as(b)))
    }

    /// Text for a bind of an action, as shown in menus
    ///
    /// Keys use the layout's labels; other inputs use their map string.
    pub fn bind_string(&self, name: &str, index: usize, locale: Locale) -> Option<String> {
        let bind = self.get(name)?.bind_at(index)?;
        match bind {
            BindInput::KeyCombo(combo) => {
                let labels: Vec<&str> = combo
                    .members()
                    .into_iter()
                    .map(|k| locale.label(k))
                    .collect::<Option<_>>()?;
                Some(labels.join("+"))
            }
            other => other.to_map().ok(),
        }
    }
}

impl From<Vec<ActionKey>> for ActionTable {
    fn from(actions: Vec<ActionKey>) -> Self {
        let mut table = ActionTable::new();
        for action in actions {
            table.insert(action);
        }
        table
    }
}
