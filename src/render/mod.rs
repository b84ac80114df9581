//! Rendering backends
//!
//! Two families implement [`Renderer`]:
//! - `immediate`: fixed-function line strips submitted vertex by vertex
//! - `gpu`: shader pipeline fed from a dynamic vertex buffer
//!
//! Only the family of the enabled feature is compiled. Each family is written against a small trait so the drawing sequence can
//! be driven by a recording implementation in tests. The concrete graphics
//! API binding for the enabled feature provides [`ActiveRenderer`].

#[cfg(any(test, feature = "d3d11"))]
pub mod gpu;

#[cfg(any(test, feature = "opengl"))]
pub mod immediate;

#[cfg(feature = "opengl")]
pub mod opengl;

#[cfg(all(feature = "d3d11", windows))]
pub mod d3d11;

use crate::host::Host;
use crate::vertex::Frame;
use crate::viewport::Viewport;
use thiserror::Error;

/// Renderer chosen at build time
#[cfg(feature = "opengl")]
pub type ActiveRenderer = opengl::GlRenderer;

/// Renderer chosen at build time
#[cfg(all(feature = "d3d11", windows))]
pub type ActiveRenderer = d3d11::D3d11Renderer;

/// Initialization errors. Every variant is permanent: the host unloads the
/// plugin and nothing is retried.
#[derive(Error, Debug)]
pub enum InitError {
    #[error("Host provided no graphics device")]
    NoDevice,

    #[error("Graphics entry point not available: {0}")]
    MissingEntryPoint(&'static str),

    #[error("Failed to create vertex shader: {0}")]
    VertexShader(String),

    #[error("Failed to create input layout: {0}")]
    InputLayout(String),

    #[error("Failed to create pixel shader: {0}")]
    PixelShader(String),

    #[error("Failed to create vertex buffer: {0}")]
    VertexBuffer(String),

    #[error("Failed to create constant buffer: {0}")]
    ConstantBuffer(String),
}

/// A drawing backend. Built once in `initialize`, used once per frame,
/// torn down on drop.
pub trait Renderer: Sized {
    /// Backend name for logs
    const NAME: &'static str;

    /// Acquire the host device and create every resource the backend owns.
    /// Any failed step aborts the whole initialization.
    fn initialize(host: &dyn Host, viewport: &Viewport) -> Result<Self, InitError>;

    /// Draw both channels. Graphics errors are logged, never returned.
    fn render(&mut self, frame: &Frame);
}
