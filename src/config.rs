// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Run configuration.
//!
//! Settings come from an optional YAML file and are then overridden by
//! command line flags. Every field has a default, so an empty file (or no
//! file) is a valid configuration once a frame source is known.

use crate::models::session::Action;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A key identified by the character it produces.
///
/// In config files a key is a one-character string, or `space`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyCode(pub char);

impl TryFrom<String> for KeyCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.eq_ignore_ascii_case("space") {
            return Ok(KeyCode(' '));
        }
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(KeyCode(c)),
            _ => Err(format!(
                "invalid key {:?}: expected a single character or \"space\"",
                value
            )),
        }
    }
}

impl From<KeyCode> for String {
    fn from(key: KeyCode) -> Self {
        key.to_string()
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            ' ' => write!(f, "space"),
            c => write!(f, "{}", c),
        }
    }
}

/// Key-to-action mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeyBindings {
    pub quit: KeyCode,
    pub toggle_pause: KeyCode,
    pub finalize: KeyCode,
    pub undo: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: KeyCode('q'),
            toggle_pause: KeyCode(' '),
            finalize: KeyCode('n'),
            undo: KeyCode('u'),
        }
    }
}

impl KeyBindings {
    /// The action bound to `key`, if any.
    pub fn action_for(&self, key: KeyCode) -> Option<Action> {
        self.pairs()
            .into_iter()
            .find(|(bound, _)| *bound == key)
            .map(|(_, action)| action)
    }

    fn pairs(&self) -> [(KeyCode, Action); 4] {
        [
            (self.quit, Action::Quit),
            (self.toggle_pause, Action::TogglePause),
            (self.finalize, Action::Finalize),
            (self.undo, Action::Undo),
        ]
    }

    /// One-line key help for status displays.
    pub fn help(&self) -> String {
        format!(
            "{}: pause/resume  {}: close zone  {}: undo point  {}: quit",
            self.toggle_pause, self.finalize, self.undo, self.quit
        )
    }
}

/// Size every frame is resized to before drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DisplaySize {
    pub width: u32,
    pub height: u32,
}

impl Default for DisplaySize {
    fn default() -> Self {
        Self {
            width: 1443,
            height: 945,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Frame directory or video file.
    pub source: Option<PathBuf>,
    pub display: DisplaySize,
    /// Where finished zones are written.
    pub output: PathBuf,
    /// Delay between frames during playback.
    pub frame_delay_ms: u64,
    pub keys: KeyBindings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: None,
            display: DisplaySize::default(),
            output: PathBuf::from("zones.json"),
            frame_delay_ms: 80,
            keys: KeyBindings::default(),
        }
    }
}

impl Config {
    /// Load a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml(&yaml).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as a map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.display.width == 0 || self.display.height == 0 {
            bail!(
                "Display size must be positive, got {}x{}",
                self.display.width,
                self.display.height
            );
        }
        let pairs = self.keys.pairs();
        for (i, (key, action)) in pairs.iter().enumerate() {
            if let Some((_, other)) = pairs[i + 1..].iter().find(|(k, _)| k == key) {
                bail!("Key '{}' is bound to both {:?} and {:?}", key, action, other);
            }
        }
        Ok(())
    }
}
