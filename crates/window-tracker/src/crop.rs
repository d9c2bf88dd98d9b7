//! Consumer example: crop a monitor texture to the tracked window.

use deskcast_capture_engine::{CaptureManager, MonitorId};

use crate::material::MaterialSink;
use crate::tracker::WindowTracker;

/// Applies a tracker's output to a material: binds the resolved monitor's
/// texture when the resolution changes and re-applies the UV offset/scale
/// every frame.
///
/// This is the typical consumer shape; hosts with their own material
/// plumbing can read [`WindowTracker::window_rect`] directly instead.
pub struct CropPresenter<M: MaterialSink> {
    material: M,
    bound_monitor: Option<MonitorId>,
}

impl<M: MaterialSink> CropPresenter<M> {
    pub fn new(material: M) -> Self {
        Self {
            material,
            bound_monitor: None,
        }
    }

    /// Per-frame presentation step. Runs after the tracker's `track` call;
    /// a frame with no resolved monitor leaves the material untouched.
    pub fn present(&mut self, tracker: &WindowTracker, manager: &CaptureManager) {
        let Some(id) = tracker.resolved_monitor() else {
            return;
        };

        let property = tracker.texture_property_name();

        if self.bound_monitor != Some(id) {
            // Rebind once the monitor has produced a frame; until then the
            // material keeps its previous texture.
            if let Some(texture) = manager.monitor(id).and_then(|monitor| monitor.texture()) {
                self.material.set_texture(property, texture);
                self.bound_monitor = Some(id);
            }
        }

        let rect = tracker.window_rect();
        self.material.set_texture_offset(property, rect.x, rect.y);
        self.material
            .set_texture_scale(property, rect.width, rect.height);
    }

    pub fn material(&self) -> &M {
        &self.material
    }

    pub fn into_material(self) -> M {
        self.material
    }
}
