//! Per-channel sample buffer fed by the host's audio callback

use parking_lot::Mutex;

/// Samples kept per channel
pub const WAVEFORM_LEN: usize = 512;

/// One of the two stereo streams
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Left,
    Right,
}

impl Channel {
    fn index(self) -> usize {
        match self {
            Channel::Left => 0,
            Channel::Right => 1,
        }
    }
}

/// The most recent 512 samples of each stereo channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveformBuffer {
    samples: [[f32; WAVEFORM_LEN]; 2],
}

impl Default for WaveformBuffer {
    fn default() -> Self {
        Self {
            samples: [[0.0; WAVEFORM_LEN]; 2],
        }
    }
}

impl WaveformBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split interleaved `L R L R ...` samples into the two channels.
    ///
    /// Writing starts at index 0 and stops after 512 pairs; further input is
    /// dropped. A trailing unpaired value is ignored. Slots past the last
    /// written pair keep whatever the previous delivery left there.
    ///
    /// Returns the number of pairs written.
    pub fn deinterleave(&mut self, samples: &[f32]) -> usize {
        let mut written = 0;
        for (pos, pair) in samples.chunks_exact(2).take(WAVEFORM_LEN).enumerate() {
            self.samples[Channel::Left.index()][pos] = pair[0];
            self.samples[Channel::Right.index()][pos] = pair[1];
            written += 1;
        }
        written
    }

    pub fn left(&self) -> &[f32; WAVEFORM_LEN] {
        self.channel(Channel::Left)
    }

    pub fn right(&self) -> &[f32; WAVEFORM_LEN] {
        self.channel(Channel::Right)
    }

    pub fn channel(&self, channel: Channel) -> &[f32; WAVEFORM_LEN] {
        &self.samples[channel.index()]
    }
}

/// Waveform shared between the audio thread and the render thread.
///
/// Double buffered: the writer deinterleaves into a private back buffer and
/// then publishes a copy to the front buffer, so a reader always sees one
/// complete delivery. The back buffer persists between calls, which keeps
/// the stale-tail behavior of short deliveries.
#[derive(Debug, Default)]
pub struct SharedWaveform {
    back: Mutex<WaveformBuffer>,
    front: Mutex<WaveformBuffer>,
}

impl SharedWaveform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept one audio delivery. Frequency data is not used.
    pub fn audio_data(&self, samples: &[f32], freq_data: &[f32]) {
        let mut back = self.back.lock();
        let written = back.deinterleave(samples);
        *self.front.lock() = *back;

        log::trace!(
            "Audio delivery: {} values, {} pairs kept, {} frequency bins ignored",
            samples.len(),
            written,
            freq_data.len()
        );
    }

    /// Copy of the latest published waveform
    pub fn snapshot(&self) -> WaveformBuffer {
        *self.front.lock()
    }
}
