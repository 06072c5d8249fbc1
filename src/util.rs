//! Utility functions for color names and marker geometry.
//!
//! This module provides:
//! - Name-to-color mapping for config files and CSS-style strings
//! - Arrowhead and line-tick geometry used by the renderer

use crate::draw::{Color, color::*};
use crate::geometry::Point;

// ============================================================================
// Marker Geometry
// ============================================================================

/// Calculates the two arrowhead barb points for an arrow whose head sits at
/// `tip` and whose shaft comes from `tail`.
///
/// # Arguments
/// * `tip` - Arrowhead tip (the arrow's end point)
/// * `tail` - Arrow tail (the arrow's start point)
/// * `length` - Barb length in pixels
/// * `angle_degrees` - Angle between each barb and the shaft
///
/// # Returns
/// `[left, right]` barb end points. If the shaft is shorter than one pixel
/// both points equal `tip`.
pub fn calculate_arrowhead(tip: Point, tail: Point, length: f64, angle_degrees: f64) -> [Point; 2] {
    let dx = tip.x - tail.x;
    let dy = tip.y - tail.y;
    if dx.hypot(dy) < 1.0 {
        return [tip, tip];
    }

    let heading = dy.atan2(dx);
    let spread = angle_degrees.to_radians();
    let barb = |angle: f64| {
        Point::new(
            tip.x - length * angle.cos(),
            tip.y - length * angle.sin(),
        )
    };

    [barb(heading - spread), barb(heading + spread)]
}

/// End points of a tick of `length` pixels centered on `at`, perpendicular
/// to the segment `from`-`to`.
///
/// Returns `None` for a zero-length segment.
pub fn perpendicular_tick(from: Point, to: Point, at: Point, length: f64) -> Option<(Point, Point)> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let len = dx.hypot(dy);
    if len == 0.0 {
        return None;
    }

    let half = length / 2.0;
    let (nx, ny) = (-dy / len * half, dx / len * half);
    Some((at.translated(nx, ny), at.translated(-nx, -ny)))
}

// ============================================================================
// Color Mapping
// ============================================================================

/// Maps color name strings to Color values.
///
/// Used by the configuration system and by [`Color`]'s parser.
///
/// # Supported Names (case-insensitive)
/// - "red", "green", "blue", "yellow", "cyan", "white", "black"
pub fn name_to_color(name: &str) -> Option<Color> {
    match name.to_lowercase().as_str() {
        "red" => Some(RED),
        "green" => Some(GREEN),
        "blue" => Some(BLUE),
        "yellow" => Some(YELLOW),
        "cyan" => Some(CYAN),
        "white" => Some(WHITE),
        "black" => Some(BLACK),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::distance;

    #[test]
    fn arrowhead_barbs_sit_behind_the_tip() {
        let tip = Point::new(100.0, 0.0);
        let [left, right] = calculate_arrowhead(tip, Point::new(0.0, 0.0), 20.0, 30.0);

        assert!((distance(tip, left) - 20.0).abs() < 1e-9);
        assert!((distance(tip, right) - 20.0).abs() < 1e-9);
        assert!(left.x < tip.x && right.x < tip.x);
        assert!((left.y + right.y).abs() < 1e-9);
        assert!((left.y.abs() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn arrowhead_handles_degenerate_lines() {
        let p = Point::new(5.0, 5.0);
        assert_eq!(calculate_arrowhead(p, p, 15.0, 45.0), [p, p]);
    }

    #[test]
    fn tick_is_perpendicular_and_centered() {
        let (a, b) = perpendicular_tick(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 0.0),
            10.0,
        )
        .unwrap();
        assert_eq!(a.midpoint(b), Point::new(10.0, 0.0));
        assert!((a.x - 10.0).abs() < 1e-9 && (b.x - 10.0).abs() < 1e-9);
        assert!((distance(a, b) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn name_mapping_is_case_insensitive() {
        assert_eq!(name_to_color("Cyan").unwrap(), CYAN);
        assert_eq!(name_to_color("white").unwrap(), WHITE);
        assert!(name_to_color("chartreuse").is_none());
    }
}
