//! The OS window/monitor query boundary.
//!
//! Window lookup and monitor enumeration come from the host platform
//! (Win32, X11, or a compositor protocol); the tracker only needs the
//! small read-only surface captured by [`DesktopWindows`]. A deterministic
//! in-memory implementation ships for tests and examples.

use deskcast_platform_core::{MonitorDescriptor, ScreenRect};

/// Opaque handle to a top-level window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub u64);

/// Read-only desktop queries consumed by the tracker.
pub trait DesktopWindows {
    /// Locate a top-level window by its exact title.
    fn find_window(&self, title: &str) -> Option<WindowHandle>;

    /// The window's rectangle in desktop coordinates.
    fn window_rect(&self, window: WindowHandle) -> Option<ScreenRect>;

    /// The monitor nearest to or containing the window.
    fn monitor_from_window(&self, window: WindowHandle) -> Option<MonitorDescriptor>;

    /// Enumerate all connected monitors.
    fn monitors(&self) -> Vec<MonitorDescriptor>;
}

#[derive(Debug, Clone)]
struct FakeWindow {
    handle: WindowHandle,
    title: String,
    rect: ScreenRect,
}

/// In-memory desktop for tests: a fixed monitor layout plus movable,
/// removable windows.
#[derive(Debug, Clone, Default)]
pub struct FakeDesktop {
    monitors: Vec<MonitorDescriptor>,
    windows: Vec<FakeWindow>,
    next_handle: u64,
}

impl FakeDesktop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_monitor(mut self, monitor: MonitorDescriptor) -> Self {
        self.monitors.push(monitor);
        self
    }

    /// Add a window; returns its handle for later moves/removal.
    pub fn add_window(&mut self, title: impl Into<String>, rect: ScreenRect) -> WindowHandle {
        self.next_handle += 1;
        let handle = WindowHandle(self.next_handle);
        self.windows.push(FakeWindow {
            handle,
            title: title.into(),
            rect,
        });
        handle
    }

    pub fn move_window(&mut self, handle: WindowHandle, rect: ScreenRect) {
        if let Some(window) = self.windows.iter_mut().find(|w| w.handle == handle) {
            window.rect = rect;
        }
    }

    pub fn remove_window(&mut self, handle: WindowHandle) {
        self.windows.retain(|w| w.handle != handle);
    }
}

impl DesktopWindows for FakeDesktop {
    fn find_window(&self, title: &str) -> Option<WindowHandle> {
        self.windows
            .iter()
            .find(|w| w.title == title)
            .map(|w| w.handle)
    }

    fn window_rect(&self, window: WindowHandle) -> Option<ScreenRect> {
        self.windows
            .iter()
            .find(|w| w.handle == window)
            .map(|w| w.rect)
    }

    fn monitor_from_window(&self, window: WindowHandle) -> Option<MonitorDescriptor> {
        let rect = self.window_rect(window)?;
        let (cx, cy) = rect.center();
        self.monitors
            .iter()
            .find(|m| m.rect.contains(cx, cy))
            .or_else(|| self.monitors.first())
            .cloned()
    }

    fn monitors(&self) -> Vec<MonitorDescriptor> {
        self.monitors.clone()
    }
}
