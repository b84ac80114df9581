//! Normalized drawing region

use bytemuck::{Pod, Zeroable};

/// Logical rectangle the waveform is laid out in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub top_left_x: f32,
    pub top_left_y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Default for Viewport {
    /// Full screen in normalized device coordinates
    fn default() -> Self {
        Self {
            top_left_x: -1.0,
            top_left_y: -1.0,
            width: 2.0,
            height: 2.0,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

impl Viewport {
    /// Shader constant block for this viewport
    pub fn constants(&self) -> ViewportConstants {
        ViewportConstants {
            width: self.width,
            height: self.height,
            _align: [0.0; 2],
        }
    }
}

/// Constant buffer layout read by the vertex shader (`cbViewPort`).
/// Padded to 16 bytes as constant buffers require.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ViewportConstants {
    pub width: f32,
    pub height: f32,
    _align: [f32; 2],
}
