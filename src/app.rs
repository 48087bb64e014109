// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation window and egui App implementation.
//!
//! egui calls `update` whenever it repaints. Each call gathers keyboard and
//! canvas clicks into a queue and drives the annotation loop: one iteration
//! per frame delay while playing, and one per queued event while paused.
//! While paused with nothing queued no repaint is scheduled, so the window
//! sleeps until the operator does something.

use crate::config::{KeyBindings, KeyCode};
use crate::io::input::{InputEvent, QueuedInput};
use crate::io::media::FrameSource;
use crate::models::annotation::PolygonCollection;
use crate::run_loop::{Annotator, Flow, StopReason};
use crate::ui::canvas::{self, EguiDisplay};
use crate::ui::toolbar;
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

/// What the window hands back to `main` when it closes.
pub struct RunResult {
    pub reason: StopReason,
    pub zones: PolygonCollection,
}

/// Main application state.
pub struct ZoneApp {
    /// `None` once the run is over.
    annotator: Option<Annotator>,
    frames: Box<dyn FrameSource>,
    display: EguiDisplay,
    input: QueuedInput,
    frame_delay: Duration,
    last_advance: Option<Instant>,
    result: Sender<RunResult>,
}

impl ZoneApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        frames: Box<dyn FrameSource>,
        keys: KeyBindings,
        frame_delay: Duration,
        result: Sender<RunResult>,
    ) -> Self {
        Self {
            annotator: Some(Annotator::new(keys)),
            frames,
            display: EguiDisplay::new(cc.egui_ctx.clone()),
            input: QueuedInput::new(),
            frame_delay,
            last_advance: None,
            result,
        }
    }

    /// Queue typed characters as key events.
    fn collect_keys(&mut self, ctx: &egui::Context) {
        let typed: Vec<char> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Text(text) => Some(text.chars()),
                    _ => None,
                })
                .flatten()
                .collect()
        });
        for c in typed {
            self.input.push(InputEvent::Key(KeyCode(c)));
        }
    }

    /// Drive the loop for this repaint. Returns the stop reason if it ended.
    fn drive(&mut self, ctx: &egui::Context) -> Option<StopReason> {
        let annotator = self.annotator.as_mut()?;

        if annotator.session().is_paused() {
            let mut ticked = false;
            while !self.input.is_empty() && annotator.session().is_paused() {
                ticked = true;
                if let Flow::Stop(reason) =
                    annotator.tick(&mut self.frames, &mut self.display, &mut self.input)
                {
                    return Some(reason);
                }
            }
            if ticked {
                ctx.request_repaint();
            }
            return None;
        }

        let due = self
            .last_advance
            .map_or(true, |t| t.elapsed() >= self.frame_delay);
        if due {
            self.last_advance = Some(Instant::now());
            if let Flow::Stop(reason) =
                annotator.tick(&mut self.frames, &mut self.display, &mut self.input)
            {
                return Some(reason);
            }
            // Redraw straight away so the new frame and overlay show up.
            ctx.request_repaint();
        }
        if !annotator.session().is_paused() {
            ctx.request_repaint_after(self.frame_delay);
        }
        None
    }

    /// Send the finished zones to `main`. Only the first call has an effect.
    fn hand_back(&mut self, reason: StopReason) {
        if let Some(annotator) = self.annotator.take() {
            let zones = annotator.finish();
            log::info!("Annotation ended ({:?}) with {} zones", reason, zones.len());
            let _ = self.result.send(RunResult { reason, zones });
        }
    }
}

impl eframe::App for ZoneApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.viewport().close_requested()) {
            self.hand_back(StopReason::InputClosed);
            return;
        }

        self.collect_keys(ctx);

        if let Some(annotator) = &self.annotator {
            let session = annotator.session();
            let keys = *annotator.keys();
            egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
                toolbar::show(ui, session, &keys);
            });
        }

        let canvas_action = egui::CentralPanel::default()
            .show(ctx, |ui| canvas::show(ui, &self.display))
            .inner;

        if let canvas::CanvasAction::Click(point) = canvas_action {
            self.input.push(InputEvent::Click(point));
        }

        if let Some(reason) = self.drive(ctx) {
            self.hand_back(reason);
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }
}

impl Drop for ZoneApp {
    fn drop(&mut self) {
        self.hand_back(StopReason::InputClosed);
    }
}
