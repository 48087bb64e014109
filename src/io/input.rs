// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Operator input events.
//!
//! The run loop polls an [`InputSource`] once per iteration. The window
//! front end and replay scripts both feed a [`QueuedInput`].

use crate::config::KeyCode;
use crate::models::annotation::Point;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;

/// A discrete operator event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputEvent {
    /// Pointer click at a frame position.
    Click(Point),
    Key(KeyCode),
}

/// Result of polling an input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    Event(InputEvent),
    /// Nothing pending right now.
    Idle,
    /// No more input will ever arrive.
    Closed,
}

pub trait InputSource {
    /// Fetch the next event. `blocking` asks the source to wait for one;
    /// sources that cannot wait return [`Poll::Idle`] instead.
    fn poll(&mut self, blocking: bool) -> Poll;
}

/// A FIFO of pending events.
#[derive(Debug, Default)]
pub struct QueuedInput {
    events: VecDeque<InputEvent>,
    /// Set when nothing more will be pushed.
    finished: bool,
}

impl QueuedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// A queue holding a fixed list of events and nothing after them.
    pub fn scripted(events: Vec<InputEvent>) -> Self {
        Self {
            events: events.into(),
            finished: true,
        }
    }

    /// Load a replay script: a YAML (or JSON) list of events such as
    /// `- click: [10, 20]` and `- key: space`.
    pub fn load_script(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read replay script {}", path.display()))?;
        let events: Vec<InputEvent> = serde_yaml::from_str(&text)
            .with_context(|| format!("Invalid replay script {}", path.display()))?;
        log::info!("Loaded {} events from {}", events.len(), path.display());
        Ok(Self::scripted(events))
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl InputSource for QueuedInput {
    fn poll(&mut self, blocking: bool) -> Poll {
        match self.events.pop_front() {
            Some(event) => Poll::Event(event),
            // Waiting on a drained script would never return.
            None if blocking && self.finished => Poll::Closed,
            None => Poll::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_parses_clicks_and_keys() {
        let yaml = "- key: space\n- click: [10, 20]\n- key: n\n";
        let events: Vec<InputEvent> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            events,
            vec![
                InputEvent::Key(KeyCode(' ')),
                InputEvent::Click(Point::new(10, 20)),
                InputEvent::Key(KeyCode('n')),
            ]
        );
    }

    #[test]
    fn test_queue_is_fifo() {
        let mut input = QueuedInput::new();
        input.push(InputEvent::Key(KeyCode('a')));
        input.push(InputEvent::Key(KeyCode('b')));
        assert_eq!(input.poll(false), Poll::Event(InputEvent::Key(KeyCode('a'))));
        assert_eq!(input.poll(true), Poll::Event(InputEvent::Key(KeyCode('b'))));
        assert_eq!(input.poll(true), Poll::Idle);
    }

    #[test]
    fn test_drained_script_closes_only_when_blocking() {
        let mut input = QueuedInput::scripted(vec![]);
        assert_eq!(input.poll(false), Poll::Idle);
        assert_eq!(input.poll(true), Poll::Closed);
    }

    #[test]
    fn test_load_script_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.yaml");
        std::fs::write(&path, "[{\"key\": \"q\"}]").unwrap();

        let mut input = QueuedInput::load_script(&path).unwrap();
        assert_eq!(input.poll(false), Poll::Event(InputEvent::Key(KeyCode('q'))));
        assert_eq!(input.poll(true), Poll::Closed);
    }
}
