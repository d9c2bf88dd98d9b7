//! The capture backend boundary.
//!
//! The backend is the native subsystem that performs actual screen capture
//! (desktop duplication, portal streams, or similar). The engine treats it
//! as an opaque library: enumerate monitors, capture one frame per monitor
//! per tick, and surface asynchronous device events as messages.

use deskcast_common::DeskcastResult;
use deskcast_platform_core::{CursorState, MonitorDescriptor, MoveRegion, ScreenRect};

use crate::monitor::MonitorId;

pub mod scripted;
pub use scripted::ScriptedBackend;

/// Asynchronous event surfaced by the backend.
///
/// Messages are queued inside the backend and drained by the manager once
/// per frame; the queue must be drained until empty to bound its growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendMessage {
    /// The backend dropped and recreated its device resources; the monitor
    /// collection must be reconciled.
    Reinitialized,

    /// A monitor's capture texture changed dimensions (display mode
    /// change). Monitors pick up new geometry on their next capture.
    TextureSizeChanged,
}

/// Why a per-monitor capture call failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The duplication interface lost access to the display (mode change,
    /// fullscreen-exclusive handoff, device loss).
    #[error("capture access lost")]
    AccessLost,

    /// The OS denied capture access (secure desktop, permission revoked).
    #[error("capture access denied")]
    AccessDenied,

    /// The capture call exceeded the configured timeout.
    #[error("capture timed out")]
    Timeout,

    /// Any other backend-reported failure.
    #[error("capture failed: {0}")]
    Other(String),
}

/// Owned pixel payload standing in for the GPU texture of one monitor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextureBuffer {
    pub width: u32,
    pub height: u32,
    /// Tightly packed BGRA, `width * height * 4` bytes.
    pub data: Vec<u8>,
}

impl TextureBuffer {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }
}

/// The result of one per-monitor capture step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameCapture {
    /// Current monitor bounds; compared against the previous geometry to
    /// detect display mode changes.
    pub geometry: ScreenRect,

    /// New pixel contents, or `None` when the desktop did not change since
    /// the previous capture.
    pub pixels: Option<TextureBuffer>,

    /// Cursor position and visibility at capture time.
    pub cursor: CursorState,

    /// Pixel blocks that scrolled between frames.
    pub move_regions: Vec<MoveRegion>,

    /// Rectangles that changed since the previous frame. Empty means "no
    /// change reported", not "capture failed".
    pub dirty_regions: Vec<ScreenRect>,
}

/// Abstract interface to the native capture subsystem.
///
/// Lifecycle contract: [`initialize`](Self::initialize) must succeed
/// exactly once before any other call; it is idempotent afterward.
/// [`finalize`](Self::finalize) releases everything and is called once at
/// shutdown; using the backend afterward is a contract violation. Fallible
/// calls made while uninitialized return a hard error rather than
/// pretending to work.
pub trait CaptureBackend {
    /// Establish the capture subsystem. No-op after the first success.
    fn initialize(&mut self) -> DeskcastResult<()>;

    /// Release all backend resources.
    fn finalize(&mut self);

    /// Current number of enumerable monitors. May change across
    /// reinitialization.
    fn monitor_count(&self) -> usize;

    /// Describe one monitor (device name, bounds, primary flag).
    fn monitor_descriptor(&self, id: MonitorId) -> DeskcastResult<MonitorDescriptor>;

    /// Bound how long a per-monitor capture call may block, in
    /// milliseconds. 0 restores the backend default.
    fn set_timeout(&mut self, timeout_ms: u32);

    /// Pump backend-internal bookkeeping. Called once per frame, before
    /// messages are read or captures issued.
    fn tick(&mut self);

    /// Pop the next queued asynchronous event, if any.
    fn pop_message(&mut self) -> Option<BackendMessage>;

    /// Drop and recreate the backend's device/duplication resources. An
    /// in-flight capture during this call may fail; that failure is a
    /// transient per-monitor error, not fatal.
    fn reinitialize_all(&mut self);

    /// Acquire the next frame for one monitor.
    fn capture_frame(&mut self, id: MonitorId) -> Result<FrameCapture, FrameError>;
}
