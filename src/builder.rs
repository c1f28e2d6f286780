//! Builder for configuring and constructing an `Encoder`.

use crate::{CodecEngine, Encoder, EncoderMode, EncoderOptions, Result};

/// Fluent alternative to filling in [`EncoderOptions`] by hand.
///
/// Unset values keep the [`EncoderOptions`] defaults (44100 Hz, mono,
/// quality 9, 2048 samples per call, constant bit-rate).
///
/// # Example
///
/// ```
/// use etercast::prelude::*;
///
/// let mut encoder = EncoderBuilder::new()
///     .sample_rate(48000)
///     .stereo()
///     .quality(5)
///     .variable_bit_rate()
///     .build(ReferenceEngine::new())?;
///
/// assert_eq!(encoder.input_channels(), Some(2));
/// encoder.close()?;
/// # Ok::<(), etercast::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct EncoderBuilder {
    options: EncoderOptions,
}

impl EncoderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing options.
    pub fn from_options(options: EncoderOptions) -> Self {
        Self { options }
    }

    /// Default: 44100
    pub fn sample_rate(mut self, hz: u32) -> Self {
        self.options.sample_rate = hz;
        self
    }

    /// Default: 1
    pub fn channels(mut self, count: u32) -> Self {
        self.options.num_channels = count;
        self
    }

    pub fn mono(self) -> Self {
        self.channels(1)
    }

    pub fn stereo(self) -> Self {
        self.channels(2)
    }

    /// 0-9, default 9.
    pub fn quality(mut self, quality: u32) -> Self {
        self.options.quality = quality;
        self
    }

    /// Samples consumed per `encode` call. Default: 2048
    pub fn samples(mut self, samples: u32) -> Self {
        self.options.samples = samples;
        self
    }

    pub fn mode(mut self, mode: EncoderMode) -> Self {
        self.options.mode = mode;
        self
    }

    pub fn constant_bit_rate(self) -> Self {
        self.mode(EncoderMode::ConstantBitRate)
    }

    pub fn variable_bit_rate(self) -> Self {
        self.mode(EncoderMode::VariableBitRate)
    }

    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    /// Allocate and initialize a session on `engine`.
    pub fn build<E: CodecEngine>(self, engine: E) -> Result<Encoder<E>> {
        Ok(Encoder::new(engine, self.options)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReferenceEngine;

    #[test]
    fn test_builder_defaults_match_options() {
        assert_eq!(EncoderBuilder::new().options(), &EncoderOptions::default());
    }

    #[test]
    fn test_builder_sets_every_option() {
        let builder = EncoderBuilder::new()
            .sample_rate(22050)
            .stereo()
            .quality(2)
            .samples(1152)
            .variable_bit_rate();
        let options = builder.options();
        assert_eq!(options.sample_rate, 22050);
        assert_eq!(options.num_channels, 2);
        assert_eq!(options.quality, 2);
        assert_eq!(options.samples, 1152);
        assert_eq!(options.mode, EncoderMode::VariableBitRate);
    }

    #[test]
    fn test_build_surfaces_engine_rejection() {
        let result = EncoderBuilder::new().quality(12).build(ReferenceEngine::new());
        assert!(matches!(result, Err(crate::Error::Encoder(_))));
    }
}
