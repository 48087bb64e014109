// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation session state machine.
//!
//! A [`Session`] combines the playback state, the polygon currently being
//! drawn and the finished zones. Every operator action is a transition on
//! this one value; nothing here knows about frames, windows or files.

use super::annotation::{Point, Polygon, PolygonCollection, MIN_POLYGON_POINTS};
use std::fmt;

/// Whether frames are advancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Playing,
    Paused,
}

impl PlaybackState {
    pub fn toggled(self) -> Self {
        match self {
            PlaybackState::Playing => PlaybackState::Paused,
            PlaybackState::Paused => PlaybackState::Playing,
        }
    }
}

/// An operator action bound to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    TogglePause,
    Finalize,
    Undo,
}

/// Why an operator action was refused. The session is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Finalize with fewer than [`MIN_POLYGON_POINTS`] points.
    TooFewPoints { points: usize },
    /// Undo with no points in the current polygon.
    NothingToUndo,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::TooFewPoints { points } => write!(
                f,
                "a zone needs at least {} points, current polygon has {}",
                MIN_POLYGON_POINTS, points
            ),
            Rejection::NothingToUndo => write!(f, "no points to undo"),
        }
    }
}

/// Result of feeding one input to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// State changed.
    Applied,
    /// Input not meaningful in the current state and dropped.
    Ignored,
    Rejected(Rejection),
    /// Operator asked to stop.
    Quit,
}

/// The state of one annotation run.
#[derive(Debug, Default)]
pub struct Session {
    playback: PlaybackState,
    current: Polygon,
    zones: PolygonCollection,
}

impl Session {
    /// Create an empty session, playing.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn playback(&self) -> PlaybackState {
        self.playback
    }

    pub fn is_paused(&self) -> bool {
        self.playback == PlaybackState::Paused
    }

    /// The polygon being drawn.
    pub fn current(&self) -> &Polygon {
        &self.current
    }

    /// Finished zones in completion order.
    pub fn zones(&self) -> &PolygonCollection {
        &self.zones
    }

    /// Handle a pointer click at `point`.
    ///
    /// Clicks only land while paused, so the point always refers to the frame
    /// on screen. Clicks during playback are dropped.
    pub fn click(&mut self, point: Point) -> Outcome {
        if !self.is_paused() {
            log::debug!("Ignoring click at {} during playback", point);
            return Outcome::Ignored;
        }
        self.current.push(point);
        log::info!("Point added: {} ({} in polygon)", point, self.current.len());
        Outcome::Applied
    }

    /// Handle a bound key action.
    pub fn perform(&mut self, action: Action) -> Outcome {
        match action {
            Action::Quit => Outcome::Quit,
            Action::TogglePause => {
                self.playback = self.playback.toggled();
                match self.playback {
                    PlaybackState::Paused => log::info!("Paused"),
                    PlaybackState::Playing => log::info!("Resuming playback"),
                }
                Outcome::Applied
            }
            Action::Finalize | Action::Undo if !self.is_paused() => {
                log::debug!("Ignoring {:?} during playback", action);
                Outcome::Ignored
            }
            Action::Finalize => self.finalize(),
            Action::Undo => self.undo(),
        }
    }

    fn finalize(&mut self) -> Outcome {
        if !self.current.can_close() {
            return Outcome::Rejected(Rejection::TooFewPoints {
                points: self.current.len(),
            });
        }
        let polygon = std::mem::take(&mut self.current);
        log::info!("Zone {} closed with {} points", self.zones.len() + 1, polygon.len());
        self.zones.append(polygon);
        Outcome::Applied
    }

    fn undo(&mut self) -> Outcome {
        match self.current.pop() {
            Some(point) => {
                log::info!("Point removed: {}", point);
                Outcome::Applied
            }
            None => Outcome::Rejected(Rejection::NothingToUndo),
        }
    }

    /// End the session, keeping only finished zones.
    pub fn into_zones(self) -> PolygonCollection {
        if !self.current.is_empty() {
            log::warn!(
                "Discarding unfinished polygon with {} points",
                self.current.len()
            );
        }
        self.zones
    }
}
