//! Screen-to-surface coordinate mapping and zoom.

use crate::calibration::Resolution;
use crate::geometry::Point;

/// Default zoom bounds.
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 5.0;

/// Zoom factor per wheel notch.
const ZOOM_IN_STEP: f64 = 1.1;
const ZOOM_OUT_STEP: f64 = 0.9;

/// Maps host pointer positions onto the fixed-size annotation surface.
///
/// The surface (backing store) has the configured camera resolution; the
/// host displays it in a rectangle of arbitrary size and applies a separate
/// zoom factor on top.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// Top-left corner of the displayed surface in host coordinates
    pub origin: Point,
    /// Displayed size in host units
    pub display_width: f64,
    pub display_height: f64,
    /// Backing-store size in surface pixels
    pub surface: Resolution,
    zoom: f64,
    min_zoom: f64,
    max_zoom: f64,
}

impl Viewport {
    /// Identity mapping for a surface displayed at its native size.
    pub fn new(surface: Resolution) -> Self {
        Self {
            origin: Point::default(),
            display_width: surface.width as f64,
            display_height: surface.height as f64,
            surface,
            zoom: 1.0,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Sets the zoom bounds and clamps the current zoom into them.
    pub fn set_zoom_limits(&mut self, min_zoom: f64, max_zoom: f64) {
        self.min_zoom = min_zoom.min(max_zoom);
        self.max_zoom = max_zoom.max(min_zoom);
        self.zoom = self.zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Updates where and how large the host displays the surface.
    pub fn set_layout(&mut self, origin: Point, display_width: f64, display_height: f64) {
        self.origin = origin;
        self.display_width = display_width;
        self.display_height = display_height;
    }

    /// Changes the backing-store resolution, keeping layout and zoom.
    pub fn set_surface(&mut self, surface: Resolution) {
        self.surface = surface;
    }

    /// Host position to surface pixel position:
    /// `((screen - origin) * backing / display) / zoom`.
    pub fn to_surface(&self, screen: Point) -> Point {
        let scale_x = if self.display_width > 0.0 {
            self.surface.width as f64 / self.display_width
        } else {
            1.0
        };
        let scale_y = if self.display_height > 0.0 {
            self.surface.height as f64 / self.display_height
        } else {
            1.0
        };
        Point::new(
            (screen.x - self.origin.x) * scale_x / self.zoom,
            (screen.y - self.origin.y) * scale_y / self.zoom,
        )
    }

    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        }
        self.zoom
    }

    /// Applies one wheel notch: scrolling up (negative delta) zooms in.
    pub fn zoom_by_wheel(&mut self, delta_y: f64) -> f64 {
        if delta_y < 0.0 {
            self.set_zoom(self.zoom * ZOOM_IN_STEP)
        } else if delta_y > 0.0 {
            self.set_zoom(self.zoom * ZOOM_OUT_STEP)
        } else {
            self.zoom
        }
    }

    pub fn reset_zoom(&mut self) {
        self.zoom = 1.0_f64.clamp(self.min_zoom, self.max_zoom);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn res(width: u32, height: u32) -> Resolution {
        Resolution { width, height }
    }

    #[test]
    fn identity_at_native_size() {
        let viewport = Viewport::new(res(1920, 1080));
        assert_eq!(
            viewport.to_surface(Point::new(10.0, 20.0)),
            Point::new(10.0, 20.0)
        );
    }

    #[test]
    fn scales_from_display_to_backing_store() {
        let mut viewport = Viewport::new(res(1920, 1080));
        viewport.set_layout(Point::new(100.0, 50.0), 960.0, 540.0);
        assert_eq!(
            viewport.to_surface(Point::new(110.0, 60.0)),
            Point::new(20.0, 20.0)
        );

        viewport.set_zoom(2.0);
        assert_eq!(
            viewport.to_surface(Point::new(110.0, 60.0)),
            Point::new(10.0, 10.0)
        );
    }

    #[test]
    fn wheel_zoom_is_clamped() {
        let mut viewport = Viewport::new(res(100, 100));
        for _ in 0..100 {
            viewport.zoom_by_wheel(-1.0);
        }
        assert_eq!(viewport.zoom(), MAX_ZOOM);
        for _ in 0..200 {
            viewport.zoom_by_wheel(1.0);
        }
        assert_eq!(viewport.zoom(), MIN_ZOOM);
        viewport.reset_zoom();
        assert_eq!(viewport.zoom(), 1.0);
    }
}
