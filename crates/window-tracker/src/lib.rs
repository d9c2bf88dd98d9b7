//! Deskcast Window Tracker
//!
//! Resolves a target application window to the monitor hosting it and
//! exposes the window's rectangle in monitor-relative UV space, so a
//! material can crop the captured monitor texture down to just that
//! window. Tracking runs once per frame from the host's update phase;
//! the tracker flags its resolved monitor for capture, and the capture
//! manager's end-of-frame render phase produces the texture.

pub mod crop;
pub mod desktop;
pub mod material;
pub mod tracker;

pub use crop::CropPresenter;
pub use desktop::{DesktopWindows, FakeDesktop, WindowHandle};
pub use material::{MaterialSink, RecordingMaterial, RecordingTarget, RenderTarget};
pub use tracker::{PipelineMode, WindowTracker};
