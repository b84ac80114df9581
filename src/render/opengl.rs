//! OpenGL binding for the immediate-mode drawer

use super::immediate::{ImmediateMode, ImmediateRenderer, MatrixStack};
use super::{InitError, Renderer};
use crate::host::{DeviceHandle, Host};
use crate::vertex::{Frame, Vertex};
use crate::viewport::Viewport;

#[allow(
    clippy::all,
    dead_code,
    non_camel_case_types,
    non_snake_case,
    non_upper_case_globals,
    unused_imports
)]
mod gl {
    include!(concat!(env!("OUT_DIR"), "/gl_bindings.rs"));
}

/// Entry points the drawer calls every frame
const REQUIRED_ENTRY_POINTS: &[&str] = &[
    "glBegin",
    "glEnd",
    "glVertex2f",
    "glColor4f",
    "glEnable",
    "glDisable",
    "glIsEnabled",
    "glMatrixMode",
    "glPushMatrix",
    "glPopMatrix",
    "glLoadIdentity",
    "glPolygonMode",
    "glTranslatef",
    "glGetError",
];

/// Fixed-function GL context resolved through the host
pub struct GlImmediate {
    gl: gl::Gl,
    /// Kept for the lifetime of the plugin; owned by the host
    _device: DeviceHandle,
}

impl GlImmediate {
    pub fn load(host: &dyn Host) -> Result<Self, InitError> {
        if let Some(missing) = REQUIRED_ENTRY_POINTS
            .iter()
            .find(|name| host.proc_address(name).is_null())
        {
            return Err(InitError::MissingEntryPoint(*missing));
        }

        let gl = gl::Gl::load_with(|name| host.proc_address(name));
        log::debug!("Loaded {} OpenGL entry points", REQUIRED_ENTRY_POINTS.len());

        Ok(Self {
            gl,
            _device: host.device(),
        })
    }

    fn matrix_mode(&self, stack: MatrixStack) {
        let mode = match stack {
            MatrixStack::Projection => gl::PROJECTION,
            MatrixStack::ModelView => gl::MODELVIEW,
        };
        unsafe { self.gl.MatrixMode(mode) };
    }
}

impl ImmediateMode for GlImmediate {
    fn set_color(&mut self, color: [f32; 4]) {
        unsafe { self.gl.Color4f(color[0], color[1], color[2], color[3]) };
    }

    fn blend_enabled(&mut self) -> bool {
        unsafe { self.gl.IsEnabled(gl::BLEND) != 0 }
    }

    fn set_blend(&mut self, enabled: bool) {
        unsafe {
            if enabled {
                self.gl.Enable(gl::BLEND);
            } else {
                self.gl.Disable(gl::BLEND);
            }
        }
    }

    fn push_identity(&mut self, stack: MatrixStack) {
        self.matrix_mode(stack);
        unsafe {
            self.gl.PushMatrix();
            self.gl.LoadIdentity();
        }
    }

    fn pop(&mut self, stack: MatrixStack) {
        self.matrix_mode(stack);
        unsafe { self.gl.PopMatrix() };
        // Leave model-view current, which is what the host expects
        if stack == MatrixStack::Projection {
            self.matrix_mode(MatrixStack::ModelView);
        }
    }

    fn fill_polygons(&mut self) {
        unsafe { self.gl.PolygonMode(gl::FRONT_AND_BACK, gl::FILL) };
    }

    fn translate(&mut self, x: f32, y: f32, z: f32) {
        self.matrix_mode(MatrixStack::ModelView);
        unsafe { self.gl.Translatef(x, y, z) };
    }

    fn line_strip(&mut self, vertices: &[Vertex]) {
        unsafe {
            self.gl.Begin(gl::LINE_STRIP);
            for vertex in vertices {
                self.gl.Vertex2f(vertex.x(), vertex.y());
            }
            self.gl.End();
        }
    }

    fn take_error(&mut self) -> Option<u32> {
        let code = unsafe { self.gl.GetError() };
        (code != gl::NO_ERROR).then_some(code)
    }
}

/// The `opengl` feature's renderer
pub type GlRenderer = ImmediateRenderer<GlImmediate>;

impl Renderer for ImmediateRenderer<GlImmediate> {
    const NAME: &'static str = "OpenGL";

    fn initialize(host: &dyn Host, _viewport: &Viewport) -> Result<Self, InitError> {
        Ok(ImmediateRenderer::new(GlImmediate::load(host)?))
    }

    fn render(&mut self, frame: &Frame) {
        self.draw(frame);
    }
}
