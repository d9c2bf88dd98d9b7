//! The per-monitor capture model.

use tracing::{debug, warn};

use deskcast_platform_core::{
    normalize_monitor_name, CursorState, MonitorDescriptor, MoveRegion, ScreenRect,
};

use crate::backend::{CaptureBackend, FrameError, TextureBuffer};

/// Identifies one monitor slot. Equal to the monitor's index in the
/// manager's ordered collection and stable for the process lifetime.
pub type MonitorId = usize;

/// Capture state of one monitor.
///
/// The manager only inspects [`AccessLost`](MonitorState::AccessLost) and
/// [`AccessDenied`](MonitorState::AccessDenied); the remaining states are
/// informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorState {
    /// Created but not yet bound to backend resources.
    Uninitialized,
    /// Capturing normally.
    Active,
    /// The duplication interface lost access to this display.
    AccessLost,
    /// Capture access denied by the OS.
    AccessDenied,
    /// The display cannot be duplicated at all.
    Unsupported,
    /// Capture temporarily unavailable; retried on the next capture step.
    NotAvailable,
}

impl MonitorState {
    /// Whether this state should trigger backend reinitialization.
    pub fn has_lost_access(self) -> bool {
        matches!(self, MonitorState::AccessLost | MonitorState::AccessDenied)
    }
}

/// One physical display plus its captured frame data.
///
/// A monitor's id never changes; its geometry and texture are replaced in
/// place as the display changes mode or the backend reinitializes. On a
/// capture failure the previous texture and geometry are kept, so consumers
/// always see the last good frame (stale but valid) during recovery.
pub struct Monitor {
    id: MonitorId,
    descriptor: MonitorDescriptor,
    state: MonitorState,
    texture: Option<TextureBuffer>,
    cursor: CursorState,
    move_regions: Vec<MoveRegion>,
    dirty_regions: Vec<ScreenRect>,
    should_be_updated: bool,
}

impl Monitor {
    pub(crate) fn new(id: MonitorId) -> Self {
        Self {
            id,
            descriptor: MonitorDescriptor::default(),
            state: MonitorState::Uninitialized,
            texture: None,
            cursor: CursorState::default(),
            move_regions: Vec::new(),
            dirty_regions: Vec::new(),
            should_be_updated: false,
        }
    }

    pub fn id(&self) -> MonitorId {
        self.id
    }

    /// Device name as reported by the backend.
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Device name normalized for comparison against OS monitor names.
    pub fn normalized_name(&self) -> String {
        normalize_monitor_name(&self.descriptor.name)
    }

    /// Bounds in desktop coordinates.
    pub fn rect(&self) -> ScreenRect {
        self.descriptor.rect
    }

    pub fn width(&self) -> i32 {
        self.descriptor.rect.width()
    }

    pub fn height(&self) -> i32 {
        self.descriptor.rect.height()
    }

    pub fn is_primary(&self) -> bool {
        self.descriptor.primary
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// The most recent captured pixels, if any frame has arrived yet.
    pub fn texture(&self) -> Option<&TextureBuffer> {
        self.texture.as_ref()
    }

    pub fn cursor(&self) -> CursorState {
        self.cursor
    }

    /// Pixel blocks that scrolled in the most recent frame.
    pub fn move_regions(&self) -> &[MoveRegion] {
        &self.move_regions
    }

    /// Rectangles changed in the most recent frame. Empty means the
    /// desktop did not change, not that capture failed.
    pub fn dirty_regions(&self) -> &[ScreenRect] {
        &self.dirty_regions
    }

    /// Whether some consumer wants a fresh frame this tick.
    pub fn should_be_updated(&self) -> bool {
        self.should_be_updated
    }

    /// Flag this monitor for capture during the next render phase.
    pub fn request_update(&mut self) {
        self.should_be_updated = true;
    }

    pub(crate) fn clear_update_request(&mut self) {
        self.should_be_updated = false;
    }

    /// Perform one capture step. At most once per frame per monitor.
    pub(crate) fn render(&mut self, backend: &mut dyn CaptureBackend) {
        match backend.capture_frame(self.id) {
            Ok(frame) => {
                if !frame.geometry.is_empty() && frame.geometry != self.descriptor.rect {
                    debug!(
                        id = self.id,
                        geometry = ?frame.geometry,
                        "monitor geometry changed"
                    );
                    self.descriptor.rect = frame.geometry;
                }
                if let Some(pixels) = frame.pixels {
                    self.texture = Some(pixels);
                }
                self.cursor = frame.cursor;
                self.move_regions = frame.move_regions;
                self.dirty_regions = frame.dirty_regions;
                self.state = MonitorState::Active;
            }
            Err(error) => {
                // Previous texture and geometry stay in place; consumers
                // keep rendering the last good frame during recovery.
                let state = match error {
                    FrameError::AccessDenied => MonitorState::AccessDenied,
                    // A persistently timing-out duplication is
                    // indistinguishable from a lost device at this boundary.
                    FrameError::AccessLost | FrameError::Timeout => MonitorState::AccessLost,
                    FrameError::Other(_) => MonitorState::NotAvailable,
                };
                if state != self.state {
                    warn!(id = self.id, %error, ?state, "monitor capture failed");
                }
                self.state = state;
            }
        }
    }

    /// Re-acquire backend resources for this monitor slot after a
    /// backend-level reinitialization. Never changes the monitor's id.
    pub(crate) fn reinitialize(&mut self, backend: &mut dyn CaptureBackend) {
        match backend.monitor_descriptor(self.id) {
            Ok(descriptor) => {
                debug!(id = self.id, name = %descriptor.name, "monitor reinitialized");
                self.descriptor = descriptor;
                self.state = MonitorState::Active;
            }
            Err(error) => {
                // Failure keeps the lost-access state so the manager's
                // scan schedules another reinitialization attempt.
                warn!(id = self.id, %error, "monitor reinitialization failed");
                self.state = MonitorState::AccessLost;
            }
        }
    }
}
