//! Keyboard shortcuts

mod bindings;

pub use bindings::*;

use serde::{Deserialize, Serialize};
use shodou_core::{AnimationSink, BlobSequencingEngine, NoteSink, ScanMode};
use tracing::info;

/// Operator actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Reset and start a sequencer
    PlaySequencer(usize),
    /// Reset and stop a sequencer
    StopSequencer(usize),
    /// Reset and flip a sequencer
    ToggleSequencer(usize),
    /// Drop the most recently added blob
    RemoveLastBlob,
    /// Drop all blobs
    ClearBlobs,
    /// Switch to a scan mode
    SetScanMode(ScanMode),
    /// Switch between auto and manual scanning
    ToggleScanMode,
    /// Leave the frame loop
    Quit,
}

impl Action {
    /// Apply to the engine and the current scan mode.
    ///
    /// Returns `false` for [`Action::Quit`], which the caller handles.
    pub fn apply<N: NoteSink, A: AnimationSink>(
        &self,
        engine: &mut BlobSequencingEngine<N, A>,
        scan_mode: &mut ScanMode,
    ) -> bool {
        match *self {
            Action::PlaySequencer(i) => engine.play(i),
            Action::StopSequencer(i) => engine.stop(i),
            Action::ToggleSequencer(i) => engine.toggle_play(i),
            Action::RemoveLastBlob => {
                engine.remove_last_blob();
            }
            Action::ClearBlobs => engine.clear_blobs(),
            Action::SetScanMode(mode) => {
                *scan_mode = mode;
                info!("Scan mode: {:?}", mode);
            }
            Action::ToggleScanMode => {
                *scan_mode = scan_mode.toggled();
                info!("Scan mode: {:?}", scan_mode);
            }
            Action::Quit => return false,
        }
        true
    }
}

/// Keys the bindings understand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// A printable character, matched case-sensitively
    Char(char),
    Backspace,
    Delete,
    Escape,
    Space,
}

impl Key {
    /// Parse a key name as typed on the console (`q`, `backspace`, `del`, `esc`)
    pub fn parse(name: &str) -> Option<Key> {
        let name = name.trim();
        match name.to_ascii_lowercase().as_str() {
            "backspace" | "bs" => return Some(Key::Backspace),
            "delete" | "del" => return Some(Key::Delete),
            "escape" | "esc" => return Some(Key::Escape),
            "space" => return Some(Key::Space),
            _ => {}
        }
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(Key::Char(c)),
            _ => None,
        }
    }
}

/// One key bound to one action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shortcut {
    pub key: Key,
    pub action: Action,
    pub description: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Shortcut {
    pub fn new(key: Key, action: Action, description: impl Into<String>) -> Self {
        Self {
            key,
            action,
            description: description.into(),
            enabled: true,
        }
    }
}

/// The installation's default keyboard layout
pub struct DefaultShortcuts;

impl DefaultShortcuts {
    /// Sequencer toggles on `q w e r a s d f`, blob editing and mode keys
    pub fn all() -> Vec<Shortcut> {
        let mut shortcuts: Vec<Shortcut> = ['q', 'w', 'e', 'r', 'a', 's', 'd', 'f']
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                Shortcut::new(
                    Key::Char(c),
                    Action::ToggleSequencer(i),
                    format!("Toggle sequencer {}", i),
                )
            })
            .collect();

        shortcuts.extend([
            Shortcut::new(Key::Backspace, Action::RemoveLastBlob, "Remove last blob"),
            Shortcut::new(Key::Delete, Action::RemoveLastBlob, "Remove last blob"),
            Shortcut::new(Key::Char('c'), Action::ClearBlobs, "Clear blobs"),
            Shortcut::new(Key::Char('m'), Action::ToggleScanMode, "Toggle scan mode"),
            Shortcut::new(Key::Escape, Action::Quit, "Quit"),
        ]);
        shortcuts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shodou_core::{OrdinalSequencer, Rgba, Sequence};

    #[test]
    fn test_key_parse() {
        assert_eq!(Key::parse("q"), Some(Key::Char('q')));
        assert_eq!(Key::parse(" Q "), Some(Key::Char('Q')));
        assert_eq!(Key::parse("BackSpace"), Some(Key::Backspace));
        assert_eq!(Key::parse("del"), Some(Key::Delete));
        assert_eq!(Key::parse("qq"), None);
        assert_eq!(Key::parse(""), None);
    }

    #[test]
    fn test_apply_routes_to_engine() {
        let mut engine = BlobSequencingEngine::default();
        engine.add_sequencer(OrdinalSequencer::new(1.0, true, 1, Rgba::WHITE));
        engine.add_blob(&Default::default(), 10.0, 10.0, 0.0);
        let mut mode = ScanMode::Auto;

        assert!(Action::ToggleSequencer(0).apply(&mut engine, &mut mode));
        assert!(engine.sequencers()[0].is_playing());
        Action::StopSequencer(0).apply(&mut engine, &mut mode);
        assert!(!engine.sequencers()[0].is_playing());
        Action::PlaySequencer(7).apply(&mut engine, &mut mode);

        Action::RemoveLastBlob.apply(&mut engine, &mut mode);
        assert!(engine.blobs().is_empty());
        Action::RemoveLastBlob.apply(&mut engine, &mut mode);

        Action::ToggleScanMode.apply(&mut engine, &mut mode);
        assert_eq!(mode, ScanMode::Manual);
        Action::SetScanMode(ScanMode::Auto).apply(&mut engine, &mut mode);
        assert_eq!(mode, ScanMode::Auto);

        assert!(!Action::Quit.apply(&mut engine, &mut mode));
    }
}
