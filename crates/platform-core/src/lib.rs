//! Deskcast platform core contracts.
//!
//! This crate contains display geometry and capture data structures used by
//! the capture and tracking crates without coupling to a concrete OS
//! backend.

use serde::{Deserialize, Serialize};

pub mod uv;
pub use uv::UvRect;

/// A rectangle in OS desktop coordinates (pixels).
///
/// Follows the Win32 convention: `left`/`top` inclusive, `right`/`bottom`
/// exclusive, with y growing downward. Monitors left of or above the
/// primary have negative coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ScreenRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ScreenRect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Width in pixels. Negative for inverted rectangles.
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    /// Height in pixels. Negative for inverted rectangles.
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Whether the rectangle encloses no pixels.
    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Whether a desktop-coordinate point lies inside the rectangle.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    /// The center point of the rectangle.
    pub fn center(&self) -> (i32, i32) {
        (
            self.left + self.width() / 2,
            self.top + self.height() / 2,
        )
    }
}

/// Cursor position and visibility on a monitor, in desktop coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CursorState {
    pub x: i32,
    pub y: i32,
    pub visible: bool,
}

/// A pixel block that scrolled from `source` to `destination` between two
/// captured frames. Consumers that ignore the scroll optimization may treat
/// the destination as a dirty region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRegion {
    pub source: ScreenRect,
    pub destination: ScreenRect,
}

/// OS-level description of one physical display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MonitorDescriptor {
    /// Device name as reported by the OS (e.g. `\\.\DISPLAY1`).
    pub name: String,

    /// Bounds in desktop coordinates.
    pub rect: ScreenRect,

    /// Whether this is the primary monitor.
    pub primary: bool,
}

/// Normalize a monitor device name for cross-referencing between the
/// capture backend's names and the OS enumeration's names.
///
/// Lowercases and strips every character outside `[a-z0-9 -]`, so
/// `\\.\DISPLAY1` and `display1` compare equal.
pub fn normalize_monitor_name(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ' || *c == '-')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_dimensions() {
        let rect = ScreenRect::new(-1920, 0, 0, 1080);
        assert_eq!(rect.width(), 1920);
        assert_eq!(rect.height(), 1080);
        assert!(!rect.is_empty());
        assert!(rect.contains(-1, 0));
        assert!(!rect.contains(0, 0));
    }

    #[test]
    fn empty_rect() {
        assert!(ScreenRect::default().is_empty());
        assert!(ScreenRect::new(10, 10, 10, 600).is_empty());
        assert!(ScreenRect::new(10, 10, 0, 0).is_empty());
    }

    #[test]
    fn device_names_normalize_to_comparable_form() {
        assert_eq!(normalize_monitor_name(r"\\.\DISPLAY1"), "display1");
        assert_eq!(normalize_monitor_name("DISPLAY1"), "display1");
        assert_eq!(
            normalize_monitor_name("Dell U2720Q (HDMI-1)"),
            "dell u2720q hdmi-1"
        );
        assert_eq!(normalize_monitor_name(""), "");
    }
}
