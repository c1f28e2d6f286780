//! Whole-signal encoding helpers.
//!
//! MP3 frames are self-delimiting, so the output of consecutive `encode`
//! calls over contiguous blocks can simply be concatenated.

use crate::{CodecEngine, Encoder, EncoderError, EncoderOptions, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Encode a complete signal in memory.
///
/// The signal is fed in blocks of the negotiated `samples` size, the
/// engine is flushed and the session closed. `right` is required for stereo
/// sessions and must match `left` in length.
pub fn encode_memory<E: CodecEngine>(
    engine: E,
    options: EncoderOptions,
    left: &[f32],
    right: Option<&[f32]>,
) -> Result<Vec<u8>> {
    if let Some(right) = right {
        if right.len() != left.len() {
            return Err(EncoderError::ChannelLengthMismatch {
                left: left.len(),
                right: right.len(),
            }
            .into());
        }
    }

    let mut encoder = Encoder::new(engine, options)?;
    let block = encoder
        .input_samples()
        .and_then(|n| usize::try_from(n).ok())
        .filter(|&n| n > 0)
        .unwrap_or(options.samples.max(1) as usize);

    let mut out = Vec::new();
    for (index, left_block) in left.chunks(block).enumerate() {
        let right_block = right.map(|r| &r[index * block..index * block + left_block.len()]);
        out.extend(encoder.encode(Some(left_block), right_block)?);
    }
    out.extend(encoder.flush()?);
    encoder.close()?;

    tracing::debug!(
        "Encoded {} samples into {} bytes",
        left.len(),
        out.len()
    );
    Ok(out)
}

/// Encode a complete signal and write it to `path`.
pub fn encode_file<E: CodecEngine>(
    path: impl AsRef<Path>,
    engine: E,
    options: EncoderOptions,
    left: &[f32],
    right: Option<&[f32]>,
) -> Result<()> {
    let data = encode_memory(engine, options, left, right)?;

    let mut file = File::create(path.as_ref())?;
    file.write_all(&data)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EncoderError, ReferenceEngine, FRAME_SAMPLES};

    #[test]
    fn test_encode_memory_mono() {
        let options = EncoderOptions::mono(44100).with_samples(1000);
        let signal = vec![0.25; 2500];
        let data = encode_memory(ReferenceEngine::new(), options, &signal, None).unwrap();
        // 2500 samples -> two full frames plus one flushed partial frame.
        assert_eq!(data.len(), 3 * (4 + 16));
    }

    #[test]
    fn test_encode_memory_stereo() {
        let options = EncoderOptions::stereo(44100).with_samples(FRAME_SAMPLES as u32);
        let left = vec![0.5; FRAME_SAMPLES];
        let right = vec![0.0; FRAME_SAMPLES];
        let data = encode_memory(ReferenceEngine::new(), options, &left, Some(&right)).unwrap();
        assert_eq!(data.len(), 4 + 32);
    }

    #[test]
    fn test_encode_memory_rejects_mismatched_channels() {
        let options = EncoderOptions::stereo(44100);
        let mut engine = ReferenceEngine::new();
        let err = encode_memory(&mut engine, options, &[0.0; 8], Some(&[0.0; 7])).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Encoder(EncoderError::ChannelLengthMismatch { left: 8, right: 7 })
        ));
        assert_eq!(engine.live_handles(), 0);
    }

    #[test]
    fn test_encode_memory_empty_signal() {
        let mut engine = ReferenceEngine::new();
        let data = encode_memory(&mut engine, EncoderOptions::default(), &[], None).unwrap();
        assert!(data.is_empty());
        assert_eq!(engine.live_handles(), 0);
    }
}
