//! Waveform Visualization Library
//!
//! Audio-reactive visualization plugin for a media-center host. The host
//! streams interleaved stereo samples in through [`Visualization::audio_data`]
//! and calls [`Visualization::render`] once per displayed frame; the plugin
//! draws the left and right channel as two oscilloscope line strips.
//!
//! Exactly one rendering backend is compiled in, chosen by Cargo feature:
//! `opengl` (immediate-mode GL, the default) or `d3d11` (Direct3D 11 with
//! shaders and a dynamic vertex buffer, Windows only).

#[cfg(all(feature = "opengl", feature = "d3d11"))]
compile_error!("features `opengl` and `d3d11` are mutually exclusive");

#[cfg(not(any(feature = "opengl", feature = "d3d11")))]
compile_error!("enable exactly one rendering backend feature: `opengl` or `d3d11`");

#[cfg(all(feature = "d3d11", not(windows)))]
compile_error!("the `d3d11` backend is only available on Windows");

pub mod host;
pub mod render;
pub mod vertex;
pub mod viewport;
pub mod visualization;
pub mod waveform;

pub use host::{DeviceHandle, Host, Status};
pub use render::{ActiveRenderer, InitError, Renderer};
pub use vertex::{build_frame, Frame, Vertex};
pub use viewport::Viewport;
pub use visualization::Visualization;
pub use waveform::{Channel, SharedWaveform, WaveformBuffer};

/// Install the process-wide logger.
///
/// Defaults to `info`, overridable through `RUST_LOG`. Safe to call more
/// than once: the host may create several plugin instances per process.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
