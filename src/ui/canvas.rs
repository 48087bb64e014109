// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for frame display and zone annotation.
//!
//! The canvas shows the most recently rendered frame scaled to fit the
//! panel, draws the overlay on top and reports clicks in frame coordinates.

use super::DisplaySink;
use crate::io::media::Frame;
use crate::models::annotation::Point;
use crate::models::overlay::{OverlayShape, ShapeStyle};
use crate::util::geometry;

/// Result of canvas interaction.
pub enum CanvasAction {
    None,
    Click(Point),
}

/// Display sink that keeps the last render as an egui texture.
pub struct EguiDisplay {
    ctx: egui::Context,
    texture: Option<egui::TextureHandle>,
    frame_size: [u32; 2],
    overlay: Vec<OverlayShape>,
}

impl EguiDisplay {
    pub fn new(ctx: egui::Context) -> Self {
        Self {
            ctx,
            texture: None,
            frame_size: [0, 0],
            overlay: Vec::new(),
        }
    }
}

impl DisplaySink for EguiDisplay {
    fn render(&mut self, frame: &Frame, overlay: &[OverlayShape]) {
        let size = [frame.width() as usize, frame.height() as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, frame.as_raw());
        match &mut self.texture {
            Some(texture) => texture.set(color_image, egui::TextureOptions::LINEAR),
            None => {
                self.texture = Some(self.ctx.load_texture(
                    "frame",
                    color_image,
                    egui::TextureOptions::LINEAR,
                ));
            }
        }
        self.frame_size = [frame.width(), frame.height()];
        self.overlay = overlay.to_vec();
    }
}

/// Display the canvas and handle clicks.
pub fn show(ui: &mut egui::Ui, display: &EguiDisplay) -> CanvasAction {
    let mut action = CanvasAction::None;
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let available_size = ui.available_size();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available_size);

        let Some(texture) = &display.texture else {
            ui.centered_and_justified(|ui| {
                ui.label(egui::RichText::new("Waiting for first frame...").color(egui::Color32::WHITE));
            });
            return;
        };

        let image_rect = geometry::fit_rect(ui.max_rect(), display.frame_size);

        ui.painter().image(
            texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        let response = ui.allocate_rect(image_rect, egui::Sense::click());
        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                if let Some(point) = geometry::screen_to_frame(pos, image_rect, display.frame_size) {
                    action = CanvasAction::Click(point);
                }
            }
        }

        let painter = ui.painter();
        for shape in &display.overlay {
            draw_shape(painter, shape, image_rect, display.frame_size);
        }
    });

    action
}

fn stroke_color(style: ShapeStyle) -> egui::Color32 {
    match style {
        ShapeStyle::Finalized => egui::Color32::YELLOW,
        ShapeStyle::InProgress => egui::Color32::GREEN,
    }
}

/// Draw one overlay shape on the canvas.
fn draw_shape(
    painter: &egui::Painter,
    shape: &OverlayShape,
    image_rect: egui::Rect,
    frame_size: [u32; 2],
) {
    let to_screen = |p: &Point| geometry::frame_to_screen(*p, image_rect, frame_size);

    match shape {
        OverlayShape::Outline {
            points,
            closed,
            style,
        } => {
            let screen_points: Vec<egui::Pos2> = points.iter().map(to_screen).collect();
            let stroke = egui::Stroke::new(2.0, stroke_color(*style));
            if *closed {
                painter.add(egui::Shape::closed_line(screen_points, stroke));
            } else {
                painter.add(egui::Shape::line(screen_points, stroke));
            }
        }
        OverlayShape::Marker { at, style } => {
            let center = to_screen(at);
            let fill = match style {
                ShapeStyle::InProgress => egui::Color32::WHITE,
                ShapeStyle::Finalized => stroke_color(*style),
            };
            painter.circle_filled(center, 4.0, fill);
            painter.circle_stroke(center, 4.0, egui::Stroke::new(1.0, egui::Color32::BLACK));
        }
    }
}
