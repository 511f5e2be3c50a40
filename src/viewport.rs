//! Viewport: zoom scale, screen→canvas mapping, and canvas orientation.
//!
//! The canvas has fixed logical bounds that depend on orientation. Screen
//! points arrive in CSS pixels relative to the page; the host reports the
//! bounding-box origin of the scaled content element so pointer positions can
//! be mapped into canvas logical units.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_SCALE, MAX_SCALE, MIN_SCALE, PORTRAIT_BREAKPOINT_PX, WHEEL_ZOOM_FACTOR};

/// A point in either screen or canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Logical canvas dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

/// Canvas size used for wide viewports.
pub const LANDSCAPE: CanvasSize = CanvasSize { width: 1920.0, height: 1080.0 };

/// Canvas size used for narrow viewports.
pub const PORTRAIT: CanvasSize = CanvasSize { width: 1080.0, height: 1920.0 };

/// Canvas orientation, selected from the viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Landscape,
    Portrait,
}

impl Orientation {
    /// Orientation for a viewport `width` in CSS pixels.
    #[must_use]
    pub fn for_viewport_width(width: f64) -> Self {
        if width < PORTRAIT_BREAKPOINT_PX { Self::Portrait } else { Self::Landscape }
    }

    /// Logical canvas size for this orientation.
    #[must_use]
    pub fn canvas_size(self) -> CanvasSize {
        match self {
            Self::Landscape => LANDSCAPE,
            Self::Portrait => PORTRAIT,
        }
    }
}

/// Rotate a note center by 90° into the canvas of orientation `to`.
///
/// Landscape→portrait maps `(cx, cy)` to `(PORTRAIT.width - cy, cx)`;
/// portrait→landscape maps it to `(cy, LANDSCAPE.height - cx)`. The two
/// are inverses of each other.
#[must_use]
pub fn reorient_center(center: Point, to: Orientation) -> Point {
    match to {
        Orientation::Portrait => Point::new(PORTRAIT.width - center.y, center.x),
        Orientation::Landscape => Point::new(center.y, LANDSCAPE.height - center.x),
    }
}

/// Top-left corner of the scaled content element, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentRect {
    pub left: f64,
    pub top: f64,
}

/// Scroll offsets of the container wrapping the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollOffset {
    pub x: f64,
    pub y: f64,
}

/// Zoom, orientation and mounting state of the canvas.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    /// Zoom factor, always within `[MIN_SCALE, MAX_SCALE]`.
    pub scale: f64,
    pub orientation: Orientation,
    /// Bounding box of the content element; `None` while unmounted.
    pub content: Option<ContentRect>,
    /// Last known scroll offsets of the container.
    pub scroll: ScrollOffset,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            orientation: Orientation::default(),
            content: None,
            scroll: ScrollOffset::default(),
        }
    }
}

impl Viewport {
    /// Viewport whose orientation matches a viewport `width` in CSS pixels.
    #[must_use]
    pub fn for_width(width: f64) -> Self {
        Self { orientation: Orientation::for_viewport_width(width), ..Self::default() }
    }

    /// Add `delta` to the scale and clamp. Returns the new scale.
    pub fn zoom(&mut self, delta: f64) -> f64 {
        self.scale = (self.scale + delta).clamp(MIN_SCALE, MAX_SCALE);
        self.scale
    }

    /// Handle a wheel event. Only ctrl/cmd + wheel zooms; returns whether
    /// the event was consumed (and native scrolling should be prevented).
    pub fn on_wheel(&mut self, delta_y: f64, zoom_modifier: bool) -> bool {
        if !zoom_modifier {
            return false;
        }
        self.zoom(-delta_y * WHEEL_ZOOM_FACTOR);
        true
    }

    /// Map a screen point into canvas logical units. Returns the origin if
    /// the content element is not mounted.
    #[must_use]
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        let Some(rect) = self.content else {
            return Point::default();
        };
        Point {
            x: (screen.x - rect.left) / self.scale,
            y: (screen.y - rect.top) / self.scale,
        }
    }

    /// Convert a screen-space distance (pixels) to canvas units.
    #[must_use]
    pub fn screen_dist_to_canvas(&self, screen_dist: f64) -> f64 {
        screen_dist / self.scale
    }

    /// Logical size of the canvas for the current orientation.
    #[must_use]
    pub fn canvas_size(&self) -> CanvasSize {
        self.orientation.canvas_size()
    }

    /// Center of the canvas in logical units.
    #[must_use]
    pub fn canvas_center(&self) -> Point {
        let size = self.canvas_size();
        Point::new(size.width / 2.0, size.height / 2.0)
    }

    /// Whether `pt` lies within `[0, width] × [0, height]`.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        let size = self.canvas_size();
        pt.x >= 0.0 && pt.y >= 0.0 && pt.x <= size.width && pt.y <= size.height
    }

    /// Recompute orientation from a new viewport width. Returns the new
    /// orientation when it changed.
    pub fn resize(&mut self, viewport_width: f64) -> Option<Orientation> {
        let next = Orientation::for_viewport_width(viewport_width);
        if next == self.orientation {
            return None;
        }
        self.orientation = next;
        Some(next)
    }
}
