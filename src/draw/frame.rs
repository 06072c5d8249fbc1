//! Frame container for the committed annotation set.

use super::shape::{Shape, ShapeId};
use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// Ordered set of committed shapes.
///
/// Insertion order is z-order: the first shape is the bottom layer and is
/// painted first, the last shape is the topmost one for selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Frame {
    /// Shapes in draw order (first = bottom layer, last = top layer)
    pub shapes: Vec<Shape>,
}

impl Frame {
    /// Creates a new empty frame with no shapes.
    pub fn new() -> Self {
        Self { shapes: Vec::new() }
    }

    pub fn from_shapes(shapes: Vec<Shape>) -> Self {
        Self { shapes }
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Removes all shapes from the frame.
    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    /// Adds a shape on top of existing shapes.
    pub fn add(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|shape| shape.id == id)
    }

    /// Replaces the shape with the same id in place, keeping its z-order.
    ///
    /// Returns `false` when no shape with that id exists.
    pub fn replace(&mut self, shape: Shape) -> bool {
        match self.shapes.iter_mut().find(|s| s.id == shape.id) {
            Some(slot) => {
                *slot = shape;
                true
            }
            None => false,
        }
    }

    /// Topmost shape within `threshold` of `point`.
    pub fn topmost_at(&self, point: Point, threshold: f64) -> Option<&Shape> {
        self.shapes
            .iter()
            .rev()
            .find(|shape| shape.hit_test(point, threshold))
    }

    /// Removes every shape within `radius` of `point`.
    ///
    /// Returns how many shapes were removed.
    pub fn erase_at(&mut self, point: Point, radius: f64) -> usize {
        let before = self.shapes.len();
        self.shapes.retain(|shape| !shape.hit_test(point, radius));
        before - self.shapes.len()
    }

    /// Largest id in the set, or 0 for an empty frame.
    pub fn max_id(&self) -> ShapeId {
        self.shapes.iter().map(|s| s.id).max().unwrap_or(0)
    }
}
