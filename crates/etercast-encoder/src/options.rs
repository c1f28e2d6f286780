//! Encoder options.

use crate::error::{EncoderError, Result};
use etercast_engine::{MODE_CBR, MODE_VBR};
use serde::{Deserialize, Serialize};

/// Bit-rate mode. Serialized as its engine integer (0 or 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum EncoderMode {
    #[default]
    ConstantBitRate,
    VariableBitRate,
}

impl EncoderMode {
    /// Engine argument value.
    pub fn code(&self) -> i32 {
        match self {
            EncoderMode::ConstantBitRate => MODE_CBR,
            EncoderMode::VariableBitRate => MODE_VBR,
        }
    }
}

impl TryFrom<u8> for EncoderMode {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(EncoderMode::ConstantBitRate),
            1 => Ok(EncoderMode::VariableBitRate),
            other => Err(format!("invalid encoder mode {} (expected 0 or 1)", other)),
        }
    }
}

impl From<EncoderMode> for u8 {
    fn from(mode: EncoderMode) -> Self {
        match mode {
            EncoderMode::ConstantBitRate => 0,
            EncoderMode::VariableBitRate => 1,
        }
    }
}

/// Encoder session options.
///
/// Omitted fields fall back to the defaults and unknown fields are ignored
/// when deserializing. Values are range-checked by the engine, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EncoderOptions {
    /// Input and output sample rate in Hz.
    pub sample_rate: u32,
    /// 1 (mono) or 2 (stereo).
    pub num_channels: u32,
    /// 0 (lowest) to 9 (highest). In CBR, 0 is 32 kbps and 9 is 320 kbps;
    /// in VBR it selects the average bit-rate target.
    pub quality: u32,
    /// Samples consumed per `encode` call. Fixes the input buffer capacity
    /// for the whole session.
    pub samples: u32,
    pub mode: EncoderMode,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            num_channels: 1,
            quality: 9,
            samples: 2048,
            mode: EncoderMode::ConstantBitRate,
        }
    }
}

impl EncoderOptions {
    /// Mono options at the given sample rate.
    pub fn mono(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            num_channels: 1,
            ..Default::default()
        }
    }

    /// Stereo options at the given sample rate.
    pub fn stereo(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            num_channels: 2,
            ..Default::default()
        }
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_channels(mut self, num_channels: u32) -> Self {
        self.num_channels = num_channels;
        self
    }

    pub fn with_quality(mut self, quality: u32) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_mode(mut self, mode: EncoderMode) -> Self {
        self.mode = mode;
        self
    }

    /// Engine arguments in call order: sample rate, channels, quality,
    /// samples, mode.
    pub(crate) fn engine_args(&self) -> Result<[i32; 5]> {
        let arg = |name: &str, value: u32| {
            i32::try_from(value).map_err(|_| {
                EncoderError::InvalidOptions(format!("{} {} exceeds i32 range", name, value))
            })
        };
        Ok([
            arg("sampleRate", self.sample_rate)?,
            arg("numChannels", self.num_channels)?,
            arg("quality", self.quality)?,
            arg("samples", self.samples)?,
            self.mode.code(),
        ])
    }
}
