//! Normalized UV rectangles for texture cropping.
//!
//! Coordinates are monitor-relative: `(0.0, 0.0)` is the monitor's
//! top-left, `(1.0, 1.0)` its bottom-right, with y growing downward.
//! Consumers that need a bottom-up convention flip on their side.

use serde::{Deserialize, Serialize};

use crate::ScreenRect;

/// A rectangle in monitor-relative UV space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UvRect {
    /// Left edge (normalized).
    pub x: f32,
    /// Top edge (normalized).
    pub y: f32,
    /// Width (normalized).
    pub width: f32,
    /// Height (normalized).
    pub height: f32,
}

impl UvRect {
    /// The whole monitor.
    pub const FULL: UvRect = UvRect {
        x: 0.0,
        y: 0.0,
        width: 1.0,
        height: 1.0,
    };

    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Map a window's desktop-coordinate rectangle into UV space relative
    /// to the monitor that hosts it.
    ///
    /// A window hanging off the monitor's edge produces coordinates
    /// outside `[0, 1]`; callers decide whether to clamp. Degenerate
    /// monitor bounds yield the full rectangle.
    pub fn from_window(window: ScreenRect, monitor: ScreenRect) -> Self {
        if monitor.is_empty() {
            return Self::FULL;
        }

        let monitor_width = monitor.width() as f32;
        let monitor_height = monitor.height() as f32;

        let x_min = (window.left - monitor.left) as f32 / monitor_width;
        let x_max = (window.right - monitor.left) as f32 / monitor_width;
        let y_min = (window.top - monitor.top) as f32 / monitor_height;
        let y_max = (window.bottom - monitor.top) as f32 / monitor_height;

        Self {
            x: x_min,
            y: y_min,
            width: x_max - x_min,
            height: y_max - y_min,
        }
    }

    /// Texture offset as applied to a material, `(x, y)`.
    pub fn offset(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    /// Texture scale as applied to a material, `(width, height)`.
    pub fn scale(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Right edge (normalized).
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge (normalized).
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Clamp all edges into the unit square.
    pub fn clamped(&self) -> Self {
        let x = self.x.clamp(0.0, 1.0);
        let y = self.y.clamp(0.0, 1.0);
        Self {
            x,
            y,
            width: (self.right().clamp(0.0, 1.0) - x).max(0.0),
            height: (self.bottom().clamp(0.0, 1.0) - y).max(0.0),
        }
    }
}

impl Default for UvRect {
    fn default() -> Self {
        Self::FULL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn centered_window_maps_to_quarter_rect() {
        let monitor = ScreenRect::new(0, 0, 1920, 1080);
        let window = ScreenRect::new(480, 270, 1440, 810);

        let uv = UvRect::from_window(window, monitor);
        assert!((uv.x - 0.25).abs() < EPSILON);
        assert!((uv.y - 0.25).abs() < EPSILON);
        assert!((uv.width - 0.5).abs() < EPSILON);
        assert!((uv.height - 0.5).abs() < EPSILON);
    }

    #[test]
    fn monitor_maps_to_full_rect() {
        let monitor = ScreenRect::new(-1920, 240, 0, 1320);
        assert_eq!(UvRect::from_window(monitor, monitor), UvRect::FULL);
    }

    #[test]
    fn secondary_monitor_offset_is_relative() {
        // Window on a monitor positioned left of the primary.
        let monitor = ScreenRect::new(-1920, 0, 0, 1080);
        let window = ScreenRect::new(-1920, 0, -960, 540);

        let uv = UvRect::from_window(window, monitor);
        assert!((uv.x - 0.0).abs() < EPSILON);
        assert!((uv.width - 0.5).abs() < EPSILON);
    }

    #[test]
    fn overhanging_window_exceeds_unit_range_until_clamped() {
        let monitor = ScreenRect::new(0, 0, 1000, 1000);
        let window = ScreenRect::new(-100, 500, 500, 1200);

        let uv = UvRect::from_window(window, monitor);
        assert!(uv.x < 0.0);
        assert!(uv.bottom() > 1.0);

        let clamped = uv.clamped();
        assert!(clamped.x >= 0.0);
        assert!(clamped.right() <= 1.0 + EPSILON);
        assert!(clamped.bottom() <= 1.0 + EPSILON);
    }

    #[test]
    fn degenerate_monitor_bounds_fall_back_to_full() {
        let window = ScreenRect::new(10, 10, 20, 20);
        assert_eq!(
            UvRect::from_window(window, ScreenRect::default()),
            UvRect::FULL
        );
    }

    proptest! {
        #[test]
        fn window_inside_monitor_stays_in_unit_square(
            monitor_left in -5000i32..5000,
            monitor_top in -5000i32..5000,
            monitor_width in 1i32..8192,
            monitor_height in 1i32..8192,
            fx0 in 0.0f64..1.0,
            fy0 in 0.0f64..1.0,
            fx1 in 0.0f64..1.0,
            fy1 in 0.0f64..1.0,
        ) {
            let monitor = ScreenRect::new(
                monitor_left,
                monitor_top,
                monitor_left + monitor_width,
                monitor_top + monitor_height,
            );
            let (lo_x, hi_x) = if fx0 <= fx1 { (fx0, fx1) } else { (fx1, fx0) };
            let (lo_y, hi_y) = if fy0 <= fy1 { (fy0, fy1) } else { (fy1, fy0) };
            let window = ScreenRect::new(
                monitor_left + (lo_x * monitor_width as f64) as i32,
                monitor_top + (lo_y * monitor_height as f64) as i32,
                monitor_left + (hi_x * monitor_width as f64) as i32,
                monitor_top + (hi_y * monitor_height as f64) as i32,
            );

            let uv = UvRect::from_window(window, monitor);
            prop_assert!(uv.x >= -EPSILON);
            prop_assert!(uv.y >= -EPSILON);
            prop_assert!(uv.width >= -EPSILON);
            prop_assert!(uv.height >= -EPSILON);
            prop_assert!(uv.right() <= 1.0 + EPSILON);
            prop_assert!(uv.bottom() <= 1.0 + EPSILON);
        }
    }
}
