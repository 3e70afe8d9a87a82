//! PCM decoding for synthesis payloads.
//!
//! The speech service returns base64-encoded little-endian signed 16-bit mono
//! PCM. The container carries no sample-rate metadata, so the rate is fixed
//! here rather than inferred from the payload.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tutor_core::{AudioBufferError, DecodedAudio};

/// Sample rate of synthesized speech.
pub const SAMPLE_RATE: u32 = 24_000;

/// Scale factor from i16 to `[-1.0, 1.0)`.
const I16_SCALE: f32 = 32_768.0;

/// Errors produced while decoding a PCM payload.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Audio payload is empty")]
    Empty,

    #[error("Audio payload has an odd byte length ({0}); expected 16-bit samples")]
    OddLength(usize),

    #[error("Audio payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error(transparent)]
    Buffer(#[from] AudioBufferError),
}

/// Decode a synthesis payload at [`SAMPLE_RATE`].
pub fn decode(payload: &str) -> Result<DecodedAudio, DecodeError> {
    decode_with_rate(payload, SAMPLE_RATE)
}

/// Decode a base64 payload whose sample rate is known out of band.
pub fn decode_with_rate(payload: &str, sample_rate: u32) -> Result<DecodedAudio, DecodeError> {
    let bytes = STANDARD.decode(payload.trim())?;
    decode_bytes(&bytes, sample_rate)
}

/// Decode raw little-endian i16 bytes into a mono buffer.
///
/// Each sample maps to `value / 32768`, so every output lies in
/// `[-1.0, 1.0)`. A trailing odd byte is rejected rather than dropped.
pub fn decode_bytes(bytes: &[u8], sample_rate: u32) -> Result<DecodedAudio, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    if bytes.len() % 2 != 0 {
        return Err(DecodeError::OddLength(bytes.len()));
    }

    let samples = bytes
        .chunks_exact(2)
        .map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / I16_SCALE)
        .collect();

    let audio = DecodedAudio::mono(samples, sample_rate)?;
    tracing::debug!(
        frames = audio.frame_count(),
        duration_secs = audio.duration_secs(),
        "Decoded PCM payload"
    );
    Ok(audio)
}
