//! Decoded audio buffer.

use std::time::Duration;

/// Errors raised when constructing a [`DecodedAudio`] from raw parts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AudioBufferError {
    #[error("Audio buffer must have at least one channel")]
    NoChannels,

    #[error("Audio buffer sample rate must be positive")]
    ZeroSampleRate,

    #[error("{samples} samples do not divide evenly into {channels} channels")]
    RaggedFrames { samples: usize, channels: u16 },
}

/// A time-addressable block of PCM audio.
///
/// Samples are interleaved f32 in `[-1.0, 1.0]`. Frame count and duration are
/// always derived from the samples, so a buffer can never disagree with
/// itself about how long it is.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    samples: Vec<f32>,
    channels: u16,
    sample_rate: u32,
}

impl DecodedAudio {
    /// Build a buffer from interleaved samples.
    pub fn new(samples: Vec<f32>, channels: u16, sample_rate: u32) -> Result<Self, AudioBufferError> {
        if channels == 0 {
            return Err(AudioBufferError::NoChannels);
        }
        if sample_rate == 0 {
            return Err(AudioBufferError::ZeroSampleRate);
        }
        if samples.len() % usize::from(channels) != 0 {
            return Err(AudioBufferError::RaggedFrames {
                samples: samples.len(),
                channels,
            });
        }
        Ok(Self {
            samples,
            channels,
            sample_rate,
        })
    }

    /// Build a mono buffer.
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Result<Self, AudioBufferError> {
        Self::new(samples, 1, sample_rate)
    }

    /// Interleaved samples.
    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    #[must_use]
    pub const fn channels(&self) -> u16 {
        self.channels
    }

    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of frames (one sample per channel).
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.samples.len() / usize::from(self.channels)
    }

    /// Duration in seconds, `frame_count / sample_rate`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_secs(&self) -> f64 {
        self.frame_count() as f64 / f64::from(self.sample_rate)
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_secs())
    }

    /// Whether the buffer holds no frames at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
