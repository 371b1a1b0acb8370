//! Keyboard shortcut bindings manager

use super::{Action, DefaultShortcuts, Key, Shortcut};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Key binding manager
#[derive(Debug, Clone)]
pub struct KeyBindings {
    shortcuts: Vec<Shortcut>,
}

/// Serializable key bindings for save/load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindingsData {
    pub shortcuts: Vec<Shortcut>,
}

impl KeyBindings {
    /// Create a new key bindings manager with default shortcuts
    pub fn new() -> Self {
        Self {
            shortcuts: DefaultShortcuts::all(),
        }
    }

    /// Create an empty key bindings manager
    pub fn empty() -> Self {
        Self {
            shortcuts: Vec::new(),
        }
    }

    /// Find action for a key press; the first enabled match wins
    pub fn find_action(&self, key: Key) -> Option<Action> {
        self.shortcuts
            .iter()
            .find(|s| s.enabled && s.key == key)
            .map(|s| s.action)
    }

    /// Add a new shortcut
    pub fn add_shortcut(&mut self, shortcut: Shortcut) {
        self.shortcuts.push(shortcut);
    }

    /// Remove a shortcut by index
    pub fn remove_shortcut(&mut self, index: usize) -> Option<Shortcut> {
        if index < self.shortcuts.len() {
            Some(self.shortcuts.remove(index))
        } else {
            None
        }
    }

    /// Move every shortcut for `action` to `key`; returns how many changed
    pub fn rebind(&mut self, action: Action, key: Key) -> usize {
        let mut changed = 0;
        for shortcut in self.shortcuts.iter_mut().filter(|s| s.action == action) {
            shortcut.key = key;
            changed += 1;
        }
        changed
    }

    /// Get all shortcuts
    pub fn get_shortcuts(&self) -> &[Shortcut] {
        &self.shortcuts
    }

    /// Find shortcuts for a specific action
    pub fn find_shortcuts_for_action(&self, action: &Action) -> Vec<&Shortcut> {
        self.shortcuts
            .iter()
            .filter(|s| &s.action == action)
            .collect()
    }

    /// Check if a key is already bound
    pub fn is_key_bound(&self, key: Key) -> bool {
        self.shortcuts.iter().any(|s| s.enabled && s.key == key)
    }

    /// Reset to default shortcuts
    pub fn reset_to_defaults(&mut self) {
        self.shortcuts = DefaultShortcuts::all();
        info!("Key bindings reset to defaults");
    }

    /// Load from JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let data: KeyBindingsData = serde_json::from_str(&json)?;

        info!("Loaded {} shortcuts", data.shortcuts.len());

        Ok(Self {
            shortcuts: data.shortcuts,
        })
    }

    /// Save to JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let data = KeyBindingsData {
            shortcuts: self.shortcuts.clone(),
        };

        let json = serde_json::to_string_pretty(&data)?;
        std::fs::write(path, json)?;

        info!("Saved {} shortcuts", self.shortcuts.len());

        Ok(())
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}
