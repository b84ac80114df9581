//! Vertex builder: maps the waveform onto two line strips

use crate::viewport::Viewport;
use crate::waveform::{Channel, WaveformBuffer};
use bytemuck::{Pod, Zeroable};

/// Vertices drawn per channel
pub const VERTICES_PER_CHANNEL: usize = 256;

/// Vertices in a full frame (both channels)
pub const FRAME_VERTICES: usize = 2 * VERTICES_PER_CHANNEL;

/// Vertical center of the left channel, as a fraction of viewport height
pub const LEFT_CENTER: f32 = 0.33;

/// Vertical center of the right channel, as a fraction of viewport height
pub const RIGHT_CENTER: f32 = 0.66;

/// Vertical offset per unit of amplitude, as a fraction of viewport height
pub const AMPLITUDE_SCALE: f32 = 0.15;

/// Line color for both channels
pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Vertex as uploaded to the GPU: 3-float position then 4-float color
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    pub fn x(&self) -> f32 {
        self.position[0]
    }

    pub fn y(&self) -> f32 {
        self.position[1]
    }

    pub fn z(&self) -> f32 {
        self.position[2]
    }
}

/// One frame worth of vertices: left channel first, then right
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    vertices: [Vertex; FRAME_VERTICES],
}

impl Frame {
    pub fn vertices(&self) -> &[Vertex; FRAME_VERTICES] {
        &self.vertices
    }

    pub fn left(&self) -> &[Vertex] {
        &self.vertices[..VERTICES_PER_CHANNEL]
    }

    pub fn right(&self) -> &[Vertex] {
        &self.vertices[VERTICES_PER_CHANNEL..]
    }

    /// Raw bytes for a vertex buffer upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// Build the 512 vertices for the current waveform.
///
/// Vertex `i` of a channel sits at `x = left + i/255 * width` and
/// `y = top + height * center + sample * height * 0.15`.
pub fn build_frame(waveform: &WaveformBuffer, viewport: &Viewport) -> Frame {
    let mut vertices = [Vertex::default(); FRAME_VERTICES];
    let channels = [(Channel::Left, LEFT_CENTER), (Channel::Right, RIGHT_CENTER)];

    for (half, (channel, center)) in vertices
        .chunks_exact_mut(VERTICES_PER_CHANNEL)
        .zip(channels)
    {
        let samples = waveform.channel(channel);
        for (i, vertex) in half.iter_mut().enumerate() {
            let t = i as f32 / (VERTICES_PER_CHANNEL - 1) as f32;
            vertex.position = [
                viewport.top_left_x + t * viewport.width,
                viewport.top_left_y
                    + viewport.height * center
                    + samples[i] * viewport.height * AMPLITUDE_SCALE,
                1.0,
            ];
            vertex.color = WHITE;
        }
    }

    Frame { vertices }
}
