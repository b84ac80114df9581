//! Immediate-mode drawer
//!
//! Draws each channel as a line strip with per-vertex submission and leaves
//! the host's blend state and matrix stacks as it found them.

use crate::vertex::{Frame, Vertex, WHITE};

/// Fixed-function matrix stacks touched by the drawer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixStack {
    Projection,
    ModelView,
}

/// The fixed-function calls the drawer needs from a graphics context
pub trait ImmediateMode {
    fn set_color(&mut self, color: [f32; 4]);

    fn blend_enabled(&mut self) -> bool;

    fn set_blend(&mut self, enabled: bool);

    /// Save the stack's current matrix and load identity
    fn push_identity(&mut self, stack: MatrixStack);

    /// Restore the matrix saved by `push_identity`
    fn pop(&mut self, stack: MatrixStack);

    /// Fill front and back faces
    fn fill_polygons(&mut self);

    /// Translate the model-view matrix
    fn translate(&mut self, x: f32, y: f32, z: f32);

    /// Submit one connected strip through the x/y of each vertex
    fn line_strip(&mut self, vertices: &[Vertex]);

    /// Pop the oldest pending error code, if any
    fn take_error(&mut self) -> Option<u32>;
}

/// Most error codes read per check. A lost or missing context can report an
/// error on every poll.
pub const MAX_GL_ERRORS: usize = 8;

/// Symbolic name of a GL error code
pub fn error_name(code: u32) -> &'static str {
    match code {
        0x0500 => "GL_INVALID_ENUM",
        0x0501 => "GL_INVALID_VALUE",
        0x0502 => "GL_INVALID_OPERATION",
        0x0503 => "GL_STACK_OVERFLOW",
        0x0504 => "GL_STACK_UNDERFLOW",
        0x0505 => "GL_OUT_OF_MEMORY",
        0x0506 => "GL_INVALID_FRAMEBUFFER_OPERATION",
        0x0507 => "GL_CONTEXT_LOST",
        _ => "unknown GL error",
    }
}

/// Renderer over any [`ImmediateMode`] context
pub struct ImmediateRenderer<G: ImmediateMode> {
    gl: G,
}

impl<G: ImmediateMode> ImmediateRenderer<G> {
    pub fn new(gl: G) -> Self {
        Self { gl }
    }

    pub fn context(&self) -> &G {
        &self.gl
    }

    /// Draw one frame: left strip, then right strip
    pub fn draw(&mut self, frame: &Frame) {
        let blend_was_enabled = self.gl.blend_enabled();

        self.gl.set_color(WHITE);
        self.gl.set_blend(false);
        self.gl.push_identity(MatrixStack::Projection);
        self.gl.push_identity(MatrixStack::ModelView);
        self.gl.fill_polygons();
        self.gl.translate(0.0, 0.0, -1.0);

        self.gl.line_strip(frame.left());
        self.report_errors("left channel");

        self.gl.line_strip(frame.right());

        self.gl.set_blend(blend_was_enabled);
        self.gl.pop(MatrixStack::ModelView);
        self.gl.pop(MatrixStack::Projection);
        self.report_errors("right channel");
    }

    fn report_errors(&mut self, stage: &str) {
        // GL queues one flag per error kind; drain them, bounded
        for _ in 0..MAX_GL_ERRORS {
            let Some(code) = self.gl.take_error() else {
                break;
            };
            log::warn!(
                "OpenGL error after {}: {} (0x{:04x})",
                stage,
                error_name(code),
                code
            );
        }
    }
}
