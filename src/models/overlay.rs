// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Overlay shapes drawn on top of the current frame.

use super::annotation::Point;
use super::session::Session;

/// Visual style of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeStyle {
    Finalized,
    InProgress,
}

/// A shape for the display sink, in frame coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayShape {
    Outline {
        points: Vec<Point>,
        closed: bool,
        style: ShapeStyle,
    },
    Marker {
        at: Point,
        style: ShapeStyle,
    },
}

/// Build the overlay for the current session state.
///
/// Finished zones are closed outlines. The polygon in progress is an open
/// line (from two points on) plus a marker per point.
pub fn build(session: &Session) -> Vec<OverlayShape> {
    let mut shapes: Vec<OverlayShape> = session
        .zones()
        .iter()
        .map(|zone| OverlayShape::Outline {
            points: zone.points().to_vec(),
            closed: true,
            style: ShapeStyle::Finalized,
        })
        .collect();

    let current = session.current().points();
    if current.len() > 1 {
        shapes.push(OverlayShape::Outline {
            points: current.to_vec(),
            closed: false,
            style: ShapeStyle::InProgress,
        });
    }
    shapes.extend(current.iter().map(|&at| OverlayShape::Marker {
        at,
        style: ShapeStyle::InProgress,
    }));

    shapes
}
