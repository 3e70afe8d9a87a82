//! WAV export.
//!
//! Produces a canonical 44-byte-header RIFF/WAVE file with 16-bit integer
//! PCM. The encoder is pure: same buffer in, same bytes out.
//!
//! Mono and stereo go through `hound`. For more than two channels hound
//! switches to `WAVE_FORMAT_EXTENSIBLE`, so those buffers get the plain PCM
//! header written by hand instead.

use std::io::Cursor;
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use tutor_core::{DecodedAudio, MessageId};

/// Length of the canonical PCM header.
pub const HEADER_LEN: usize = 44;

const BITS_PER_SAMPLE: u16 = 16;
const FORMAT_PCM: u16 = 1;
const FMT_CHUNK_LEN: u32 = 16;

/// Encode a decoded buffer as a complete WAV file.
///
/// Samples are clamped to `[-1.0, 1.0]` and scaled by 32767, so the decoder
/// and encoder are asymmetric by at most one quantization step. Sizes beyond
/// the 4 GiB RIFF limit saturate.
#[must_use]
pub fn encode(audio: &DecodedAudio) -> Vec<u8> {
    if audio.channels() > 2 {
        return encode_canonical(audio);
    }
    match encode_with_hound(audio) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "hound could not encode buffer, writing header directly");
            encode_canonical(audio)
        }
    }
}

fn encode_with_hound(audio: &DecodedAudio) -> Result<Vec<u8>, hound::Error> {
    let spec = WavSpec {
        channels: audio.channels(),
        sample_rate: audio.sample_rate(),
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    };
    let data_len = audio.samples().len() * usize::from(BITS_PER_SAMPLE / 8);
    let mut cursor = Cursor::new(Vec::with_capacity(HEADER_LEN + data_len));
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for &sample in audio.samples() {
            writer.write_sample(quantize(sample))?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

fn encode_canonical(audio: &DecodedAudio) -> Vec<u8> {
    let channels = audio.channels();
    let sample_rate = audio.sample_rate();
    let block_align = channels * (BITS_PER_SAMPLE / 8);
    let byte_rate = sample_rate.saturating_mul(u32::from(block_align));

    let data_len = audio.samples().len() * usize::from(BITS_PER_SAMPLE / 8);
    let data_len_u32 = u32::try_from(data_len).unwrap_or(u32::MAX);
    let riff_len = data_len_u32.saturating_add(36);

    let mut out = Vec::with_capacity(HEADER_LEN + data_len);

    // RIFF descriptor
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&riff_len.to_le_bytes());
    out.extend_from_slice(b"WAVE");

    // fmt chunk
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&FMT_CHUNK_LEN.to_le_bytes());
    out.extend_from_slice(&FORMAT_PCM.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data chunk, frame-interleaved
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len_u32.to_le_bytes());
    for &sample in audio.samples() {
        out.extend_from_slice(&quantize(sample).to_le_bytes());
    }

    out
}

fn quantize(sample: f32) -> i16 {
    let clamped = sample.clamp(-1.0, 1.0);
    #[allow(clippy::cast_possible_truncation)]
    let value = (clamped * 32_767.0) as i16;
    value
}

/// Download name for a message's audio.
#[must_use]
pub fn export_file_name(message_id: &MessageId) -> String {
    format!("study-tutor-{message_id}.wav")
}

/// Encode and write `audio` to `path`.
pub fn write_wav(path: &Path, audio: &DecodedAudio) -> std::io::Result<()> {
    let bytes = encode(audio);
    std::fs::write(path, &bytes)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "Wrote WAV file");
    Ok(())
}
