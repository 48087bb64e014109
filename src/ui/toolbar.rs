// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Status toolbar.
//!
//! Shows playback state, progress of the current polygon, the number of
//! finished zones and the key bindings.

use crate::config::KeyBindings;
use crate::models::annotation::MIN_POLYGON_POINTS;
use crate::models::session::{PlaybackState, Session};

/// Display the status line for the session.
pub fn show(ui: &mut egui::Ui, session: &Session, keys: &KeyBindings) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        let (label, color) = match session.playback() {
            PlaybackState::Playing => ("▶ Playing", egui::Color32::LIGHT_GREEN),
            PlaybackState::Paused => ("⏸ Paused", egui::Color32::LIGHT_YELLOW),
        };
        ui.label(egui::RichText::new(label).strong().color(color));

        ui.separator();

        let points = session.current().len();
        ui.label(format!("Points: {}/{}", points, MIN_POLYGON_POINTS));

        ui.separator();

        ui.label(format!("Zones: {}", session.zones().len()));

        ui.separator();

        let hint = match session.playback() {
            PlaybackState::Playing => format!("Pause to place points  {}", keys.help()),
            PlaybackState::Paused => format!("Click to add points  {}", keys.help()),
        };
        ui.label(egui::RichText::new(hint).italics().weak());
    });
}
