//! Lifecycle controller: the three host-invoked operations

use crate::host::{Host, Status};
use crate::render::{ActiveRenderer, Renderer};
use crate::vertex::build_frame;
use crate::viewport::Viewport;
use crate::waveform::SharedWaveform;
use std::sync::Arc;

/// One plugin instance
pub struct Visualization<R: Renderer = ActiveRenderer> {
    viewport: Viewport,
    waveform: Arc<SharedWaveform>,
    renderer: Option<R>,
}

impl<R: Renderer> Default for Visualization<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Renderer> Visualization<R> {
    pub fn new() -> Self {
        Self {
            viewport: Viewport::default(),
            waveform: Arc::new(SharedWaveform::new()),
            renderer: None,
        }
    }

    /// Acquire the graphics device and create all backend resources.
    ///
    /// Any failure is permanent; the instance then ignores `render`.
    pub fn initialize(&mut self, host: &dyn Host) -> Status {
        crate::init_logging();

        if self.renderer.take().is_some() {
            log::warn!("{} renderer initialized twice, rebuilding", R::NAME);
        }

        match R::initialize(host, &self.viewport) {
            Ok(renderer) => {
                log::info!("{} waveform renderer ready", R::NAME);
                self.renderer = Some(renderer);
                Status::Ok
            }
            Err(e) => {
                log::error!("{} waveform renderer failed to initialize: {}", R::NAME, e);
                Status::PermanentFailure
            }
        }
    }

    /// New interleaved stereo samples from the host. Never fails.
    pub fn audio_data(&self, samples: &[f32], freq_data: &[f32]) {
        self.waveform.audio_data(samples, freq_data);
    }

    /// Handle for feeding audio from another thread
    pub fn waveform(&self) -> Arc<SharedWaveform> {
        self.waveform.clone()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn is_ready(&self) -> bool {
        self.renderer.is_some()
    }

    /// Draw the current waveform. Does nothing before a successful
    /// `initialize`.
    pub fn render(&mut self) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        let frame = build_frame(&self.waveform.snapshot(), &self.viewport);
        renderer.render(&frame);
    }
}
