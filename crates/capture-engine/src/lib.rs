//! Deskcast Capture Engine
//!
//! Owns the set of physical monitors and drives the per-frame capture
//! cycle. The manager detects capture-device loss on any monitor and
//! recovers by debounced backend reinitialization, without leaking or
//! duplicating monitor slots.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               CaptureManager                 │
//! │  update(dt)                render_due()      │
//! │  ┌─────────────────────┐   ┌──────────────┐  │
//! │  │ tick / failure scan │   │ per-monitor  │  │
//! │  │ debounce / messages │   │ capture step │  │
//! │  └──────────┬──────────┘   └──────┬───────┘  │
//! │             ▼                     ▼          │
//! │  ┌────────────────────────────────────────┐  │
//! │  │      Monitor 0..n  (ordered, stable)   │  │
//! │  │  texture  cursor  regions  state       │  │
//! │  └────────────────────────────────────────┘  │
//! └───────────────────────┬──────────────────────┘
//!                         ▼
//!               dyn CaptureBackend (host-supplied)
//! ```
//!
//! The host application calls [`CaptureManager::update`] once per frame and
//! [`CaptureManager::render_due`] at the end-of-frame boundary, after every
//! consumer has had a chance to flag monitors for capture.

pub mod backend;
pub mod manager;
pub mod monitor;

pub use backend::{
    BackendMessage, CaptureBackend, FrameCapture, FrameError, ScriptedBackend, TextureBuffer,
};
pub use manager::{CaptureManager, ManagerConfig, ReconciledObserver, SubscriptionId};
pub use monitor::{Monitor, MonitorId, MonitorState};
