//! A deterministic in-memory capture backend.
//!
//! `ScriptedBackend` substitutes the native capture library in tests and
//! examples: monitor layout, per-monitor capture outcomes, and message
//! traffic are all scripted up front, and every lifecycle call is counted
//! so tests can assert on the manager's behavior.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use deskcast_common::{DeskcastError, DeskcastResult};
use deskcast_platform_core::MonitorDescriptor;

use crate::backend::{BackendMessage, CaptureBackend, FrameCapture, FrameError};
use crate::monitor::MonitorId;

#[derive(Default)]
struct Inner {
    initialized: bool,
    finalized: bool,
    monitors: Vec<MonitorDescriptor>,
    frame_scripts: HashMap<MonitorId, VecDeque<Result<FrameCapture, FrameError>>>,
    messages: VecDeque<BackendMessage>,
    timeout_ms: u32,
    tick_count: usize,
    reinitialize_calls: usize,
    capture_calls: HashMap<MonitorId, usize>,
}

/// Scripted stand-in for the native capture subsystem.
///
/// Clones share state, so a test can keep a probe handle while the manager
/// owns the backend. Unscripted captures succeed with the monitor's current
/// geometry and no pixel change, so a backend with no queued outcomes
/// behaves like an idle desktop. `reinitialize_all` enqueues a
/// [`BackendMessage::Reinitialized`] the way the real subsystem signals
/// completion.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    inner: Rc<RefCell<Inner>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the monitor layout reported by the backend.
    pub fn with_monitors(self, monitors: Vec<MonitorDescriptor>) -> Self {
        self.inner.borrow_mut().monitors = monitors;
        self
    }

    /// Replace the monitor layout mid-run, as a display topology change
    /// would. Pair with [`push_message`](Self::push_message) to signal the
    /// change.
    pub fn set_monitors(&self, monitors: Vec<MonitorDescriptor>) {
        self.inner.borrow_mut().monitors = monitors;
    }

    /// Queue a successful capture outcome for one monitor.
    pub fn push_frame(&self, id: MonitorId, frame: FrameCapture) {
        self.inner
            .borrow_mut()
            .frame_scripts
            .entry(id)
            .or_default()
            .push_back(Ok(frame));
    }

    /// Queue a failed capture outcome for one monitor.
    pub fn push_failure(&self, id: MonitorId, error: FrameError) {
        self.inner
            .borrow_mut()
            .frame_scripts
            .entry(id)
            .or_default()
            .push_back(Err(error));
    }

    /// Queue an asynchronous backend message.
    pub fn push_message(&self, message: BackendMessage) {
        self.inner.borrow_mut().messages.push_back(message);
    }

    /// How many times `reinitialize_all` has been called.
    pub fn reinitialize_calls(&self) -> usize {
        self.inner.borrow().reinitialize_calls
    }

    /// How many capture calls one monitor has received.
    pub fn captures_for(&self, id: MonitorId) -> usize {
        self.inner.borrow().capture_calls.get(&id).copied().unwrap_or(0)
    }

    /// How many frame ticks the backend has seen.
    pub fn tick_count(&self) -> usize {
        self.inner.borrow().tick_count
    }

    /// The currently configured capture timeout.
    pub fn timeout_ms(&self) -> u32 {
        self.inner.borrow().timeout_ms
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.borrow().initialized
    }

    pub fn is_finalized(&self) -> bool {
        self.inner.borrow().finalized
    }
}

impl CaptureBackend for ScriptedBackend {
    fn initialize(&mut self) -> DeskcastResult<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.finalized {
            return Err(DeskcastError::platform(
                "capture backend already finalized",
            ));
        }
        inner.initialized = true;
        Ok(())
    }

    fn finalize(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.initialized = false;
        inner.finalized = true;
    }

    fn monitor_count(&self) -> usize {
        self.inner.borrow().monitors.len()
    }

    fn monitor_descriptor(&self, id: MonitorId) -> DeskcastResult<MonitorDescriptor> {
        let inner = self.inner.borrow();
        if !inner.initialized {
            return Err(DeskcastError::platform("capture backend not initialized"));
        }
        inner
            .monitors
            .get(id)
            .cloned()
            .ok_or_else(|| DeskcastError::platform(format!("no monitor with id {id}")))
    }

    fn set_timeout(&mut self, timeout_ms: u32) {
        self.inner.borrow_mut().timeout_ms = timeout_ms;
    }

    fn tick(&mut self) {
        self.inner.borrow_mut().tick_count += 1;
    }

    fn pop_message(&mut self) -> Option<BackendMessage> {
        self.inner.borrow_mut().messages.pop_front()
    }

    fn reinitialize_all(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.reinitialize_calls += 1;
        inner.messages.push_back(BackendMessage::Reinitialized);
    }

    fn capture_frame(&mut self, id: MonitorId) -> Result<FrameCapture, FrameError> {
        let mut inner = self.inner.borrow_mut();
        *inner.capture_calls.entry(id).or_insert(0) += 1;

        if !inner.initialized {
            return Err(FrameError::Other("backend not initialized".to_string()));
        }

        if let Some(scripted) = inner
            .frame_scripts
            .get_mut(&id)
            .and_then(|queue| queue.pop_front())
        {
            return scripted;
        }

        match inner.monitors.get(id) {
            Some(descriptor) => Ok(FrameCapture {
                geometry: descriptor.rect,
                ..FrameCapture::default()
            }),
            None => Err(FrameError::Other(format!("no monitor with id {id}"))),
        }
    }
}
