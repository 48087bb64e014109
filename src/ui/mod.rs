// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Display sinks: the egui canvas and a headless logger.

pub mod canvas;
pub mod toolbar;

use crate::io::media::Frame;
use crate::models::overlay::OverlayShape;

/// Something that shows a frame with the overlay drawn on top.
pub trait DisplaySink {
    fn render(&mut self, frame: &Frame, overlay: &[OverlayShape]);
}

/// Display sink for replay runs without a window.
#[derive(Debug, Default)]
pub struct LogDisplay {
    rendered: usize,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of renders so far.
    pub fn rendered(&self) -> usize {
        self.rendered
    }
}

impl DisplaySink for LogDisplay {
    fn render(&mut self, frame: &Frame, overlay: &[OverlayShape]) {
        self.rendered += 1;
        log::trace!(
            "Render {}: {}x{} frame, {} overlay shapes",
            self.rendered,
            frame.width(),
            frame.height(),
            overlay.len()
        );
    }
}
