//! Material and render-target boundaries.
//!
//! The rendering system that consumes captured textures lives in the host
//! application; the tracker only writes texture bindings, offsets, and
//! scales through these traits.

use deskcast_capture_engine::TextureBuffer;

/// Write access to a material's texture properties.
pub trait MaterialSink {
    /// Bind a texture under the given property name.
    fn set_texture(&mut self, property: &str, texture: &TextureBuffer);

    /// Set the UV offset applied to the property's texture.
    fn set_texture_offset(&mut self, property: &str, x: f32, y: f32);

    /// Set the UV scale applied to the property's texture.
    fn set_texture_scale(&mut self, property: &str, width: f32, height: f32);
}

/// A texture a monitor's frame can be blitted into.
pub trait RenderTarget {
    fn blit(&mut self, texture: &TextureBuffer);
}

/// Material test double that records every write.
#[derive(Debug, Clone, Default)]
pub struct RecordingMaterial {
    /// Property names and dimensions of every texture bind, in order.
    pub texture_binds: Vec<(String, u32, u32)>,
    /// Last offset written per call, in order.
    pub offsets: Vec<(String, f32, f32)>,
    /// Last scale written per call, in order.
    pub scales: Vec<(String, f32, f32)>,
}

impl RecordingMaterial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_offset(&self) -> Option<&(String, f32, f32)> {
        self.offsets.last()
    }

    pub fn last_scale(&self) -> Option<&(String, f32, f32)> {
        self.scales.last()
    }
}

impl MaterialSink for RecordingMaterial {
    fn set_texture(&mut self, property: &str, texture: &TextureBuffer) {
        self.texture_binds
            .push((property.to_string(), texture.width, texture.height));
    }

    fn set_texture_offset(&mut self, property: &str, x: f32, y: f32) {
        self.offsets.push((property.to_string(), x, y));
    }

    fn set_texture_scale(&mut self, property: &str, width: f32, height: f32) {
        self.scales.push((property.to_string(), width, height));
    }
}

/// Render-target test double that records blitted frame dimensions.
#[derive(Debug, Clone, Default)]
pub struct RecordingTarget {
    pub blits: Vec<(u32, u32)>,
}

impl RenderTarget for RecordingTarget {
    fn blit(&mut self, texture: &TextureBuffer) {
        self.blits.push((texture.width, texture.height));
    }
}
