// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Zone data structures.
//!
//! This module defines points, polygons and the append-only collection of
//! finished polygons. Coordinates are integer pixels in the space of the
//! resized display frame.

use serde::{Deserialize, Serialize};

/// Fewest points a polygon needs before it can be finalized.
pub const MIN_POLYGON_POINTS: usize = 3;

/// A 2D point in display-frame pixel coordinates.
///
/// Serialized as a two-element `[x, y]` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for (i32, i32) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An ordered sequence of points. Insertion order defines edge order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    /// Append a point at the end.
    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Remove and return the most recently added point.
    pub fn pop(&mut self) -> Option<Point> {
        self.points.pop()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the polygon has enough points to be closed.
    pub fn can_close(&self) -> bool {
        self.points.len() >= MIN_POLYGON_POINTS
    }
}

/// Finalized polygons in completion order.
///
/// Append-only: there is no way to remove or reorder an entry. Reading one
/// back from a file checks that every polygon has enough points.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Polygon>", into = "Vec<Polygon>")]
pub struct PolygonCollection {
    polygons: Vec<Polygon>,
}

impl PolygonCollection {
    /// Append a finalized polygon. Callers guarantee it can be closed.
    pub(crate) fn append(&mut self, polygon: Polygon) {
        debug_assert!(polygon.can_close());
        self.polygons.push(polygon);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Polygon> {
        self.polygons.iter()
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }
}

impl TryFrom<Vec<Polygon>> for PolygonCollection {
    type Error = String;

    fn try_from(polygons: Vec<Polygon>) -> Result<Self, Self::Error> {
        if let Some(i) = polygons.iter().position(|p| !p.can_close()) {
            return Err(format!(
                "zone {} has {} points, at least {} are needed",
                i + 1,
                polygons[i].len(),
                MIN_POLYGON_POINTS
            ));
        }
        Ok(Self { polygons })
    }
}

impl From<PolygonCollection> for Vec<Polygon> {
    fn from(collection: PolygonCollection) -> Self {
        collection.polygons
    }
}
