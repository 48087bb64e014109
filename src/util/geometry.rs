// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module converts between screen positions in the canvas and pixel
//! coordinates of the displayed frame.

use crate::models::annotation::Point;
use egui::{Pos2, Rect, Vec2};

/// Largest rect with the frame's aspect ratio that fits in `available`,
/// centered.
pub fn fit_rect(available: Rect, frame_size: [u32; 2]) -> Rect {
    let img_aspect = frame_size[0] as f32 / frame_size[1] as f32;
    let available_aspect = available.width() / available.height();

    let size = if img_aspect > available_aspect {
        // Image is wider - fit to width
        Vec2::new(available.width(), available.width() / img_aspect)
    } else {
        // Image is taller - fit to height
        Vec2::new(available.height() * img_aspect, available.height())
    };
    Rect::from_center_size(available.center(), size)
}

/// Convert a screen position to frame pixel coordinates.
///
/// Returns `None` when `pos` lies outside `rect`.
pub fn screen_to_frame(pos: Pos2, rect: Rect, frame_size: [u32; 2]) -> Option<Point> {
    if !rect.contains(pos) || rect.width() <= 0.0 || rect.height() <= 0.0 {
        return None;
    }
    let axis = |offset: f32, extent: f32, pixels: u32| -> i32 {
        let px = (offset / extent * pixels as f32).floor() as i32;
        px.clamp(0, pixels.saturating_sub(1) as i32)
    };
    Some(Point::new(
        axis(pos.x - rect.min.x, rect.width(), frame_size[0]),
        axis(pos.y - rect.min.y, rect.height(), frame_size[1]),
    ))
}

/// Convert frame pixel coordinates to a screen position inside `rect`.
pub fn frame_to_screen(point: Point, rect: Rect, frame_size: [u32; 2]) -> Pos2 {
    Pos2::new(
        rect.min.x + point.x as f32 / frame_size[0] as f32 * rect.width(),
        rect.min.y + point.y as f32 / frame_size[1] as f32 * rect.height(),
    )
}
