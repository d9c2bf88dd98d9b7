//! Per-frame window-to-monitor tracking.

use tracing::debug;

use deskcast_capture_engine::{CaptureManager, MonitorId};
use deskcast_platform_core::{normalize_monitor_name, ScreenRect, UvRect};

use crate::desktop::DesktopWindows;
use crate::material::{MaterialSink, RenderTarget};

const LEGACY_TEXTURE_PROPERTY: &str = "_MainTex";
const MODERN_TEXTURE_PROPERTY: &str = "_BaseMap";

/// Which render pipeline's texture-property convention to write.
///
/// `Unset` is resolved once when the tracker is enabled, from the host's
/// active pipeline, and never changes afterward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PipelineMode {
    #[default]
    Unset,
    /// Built-in pipeline convention (`_MainTex`).
    Legacy,
    /// Universal-style scriptable pipeline convention (`_BaseMap`).
    Universal,
    /// High-definition scriptable pipeline convention (`_BaseMap`).
    HighDefinition,
}

/// Tracks a target window (or whole monitor) and exposes its rectangle in
/// monitor-relative UV space.
///
/// Call [`track`](Self::track) once per frame during the host's update
/// phase. The tracker flags its resolved monitor for capture each frame;
/// the manager's end-of-frame render phase then produces the texture the
/// rectangle refers to.
#[derive(Default)]
pub struct WindowTracker {
    target_window_name: String,
    requested_monitor: Option<MonitorId>,
    pipeline: PipelineMode,
    resolved: Option<MonitorId>,
    window_rect: UvRect,
}

impl WindowTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the pipeline mode from the host's active render pipeline
    /// type name. Only an `Unset` mode is resolved; an explicit mode (or
    /// an earlier resolution) is kept even if the active pipeline later
    /// changes.
    pub fn enable(&mut self, active_pipeline: Option<&str>) {
        if self.pipeline != PipelineMode::Unset {
            return;
        }
        self.pipeline = match active_pipeline {
            None => PipelineMode::Legacy,
            Some(name) if name.contains("HighDefinition") => PipelineMode::HighDefinition,
            Some(_) => PipelineMode::Universal,
        };
        debug!(pipeline = ?self.pipeline, "tracker pipeline mode resolved");
    }

    /// Track a window by exact title. Empty disables name tracking.
    pub fn set_target_window_name(&mut self, name: impl Into<String>) {
        self.target_window_name = name.into();
    }

    pub fn target_window_name(&self) -> &str {
        &self.target_window_name
    }

    /// Track a whole monitor by id. Only consulted while name tracking is
    /// disabled.
    pub fn set_requested_monitor(&mut self, id: Option<MonitorId>) {
        self.requested_monitor = id;
    }

    /// Override the pipeline mode. Setting `Unset` re-enables resolution
    /// on the next [`enable`](Self::enable).
    pub fn set_pipeline_mode(&mut self, mode: PipelineMode) {
        self.pipeline = mode;
    }

    pub fn pipeline_mode(&self) -> PipelineMode {
        self.pipeline
    }

    /// The monitor currently backing the tracked rectangle.
    pub fn resolved_monitor(&self) -> Option<MonitorId> {
        self.resolved
    }

    /// The tracked rectangle in monitor-relative UV space. The full unit
    /// rectangle while tracking a whole monitor.
    pub fn window_rect(&self) -> UvRect {
        self.window_rect
    }

    /// The material property the selected pipeline convention targets.
    pub fn texture_property_name(&self) -> &'static str {
        match self.pipeline {
            PipelineMode::Universal | PipelineMode::HighDefinition => MODERN_TEXTURE_PROPERTY,
            PipelineMode::Legacy | PipelineMode::Unset => LEGACY_TEXTURE_PROPERTY,
        }
    }

    /// Per-frame tracking step: resolve the target to a monitor, keep the
    /// resolved monitor flagged for capture, and recompute the UV
    /// rectangle.
    pub fn track(&mut self, desktop: &dyn DesktopWindows, manager: &mut CaptureManager) {
        self.keep_monitor(desktop, manager);
        self.require_update(manager);
    }

    /// Write the tracked rectangle into a material as texture offset and
    /// scale, under the selected pipeline's property name.
    pub fn apply_to(&self, material: &mut dyn MaterialSink) {
        let property = self.texture_property_name();
        let (x, y) = self.window_rect.offset();
        let (width, height) = self.window_rect.scale();
        material.set_texture_offset(property, x, y);
        material.set_texture_scale(property, width, height);
    }

    /// Copy the resolved monitor's most recent frame into a render
    /// target. No-op while unresolved or before the first frame arrives.
    pub fn blit_to(&self, target: &mut dyn RenderTarget, manager: &CaptureManager) {
        if let Some(texture) = self
            .resolved
            .and_then(|id| manager.monitor(id))
            .and_then(|monitor| monitor.texture())
        {
            target.blit(texture);
        }
    }

    fn keep_monitor(&mut self, desktop: &dyn DesktopWindows, manager: &CaptureManager) {
        let track_window = !self.target_window_name.is_empty();
        let mut window_rect: Option<ScreenRect> = None;
        let mut candidate: Option<MonitorId> = None;

        if track_window {
            // Window gone this frame: keep the previous resolution and
            // rectangle rather than flickering to "unresolved".
            let Some(handle) = desktop.find_window(&self.target_window_name) else {
                return;
            };
            let Some(rect) = desktop.window_rect(handle) else {
                return;
            };
            window_rect = Some(rect);

            if let Some(os_monitor) = desktop.monitor_from_window(handle) {
                candidate = manager
                    .find_monitor_by_normalized_name(&normalize_monitor_name(&os_monitor.name));
            }
        } else if let Some(requested) = self.requested_monitor {
            candidate = Some(requested);
        }

        if let Some(id) = candidate {
            if self.resolved != Some(id) {
                debug!(from = ?self.resolved, to = id, "tracker moved to monitor");
                self.resolved = Some(id);
            }
        }

        // Recompute the rectangle against whichever monitor is resolved
        // now; an unmatched monitor name this frame leaves the previous
        // resolution in place.
        if let Some(id) = self.resolved {
            if track_window {
                if let (Some(window), Some(monitor)) = (window_rect, manager.monitor(id)) {
                    self.window_rect = UvRect::from_window(window, monitor.rect());
                }
            } else {
                self.window_rect = UvRect::FULL;
            }
        }
    }

    fn require_update(&self, manager: &mut CaptureManager) {
        if let Some(id) = self.resolved {
            manager.request_update(id);
        }
    }
}
