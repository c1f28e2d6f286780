//! Register block layout shared by every engine.
//!
//! The register block sits at the handle address and is followed (in real
//! engines) by private encoder state the host never reads.

use crate::memory::{read_i32, read_u32};
use crate::Result;

/// Number of 32-bit slots in the register block.
pub const REGISTER_COUNT: usize = 10;

/// Size of the register block in bytes.
pub const REGISTER_BLOCK_BYTES: usize = REGISTER_COUNT * 4;

/// Output sample rate used by every engine regardless of input rate.
pub const DEFAULT_OUTPUT_SAMPLE_RATE: i32 = 44100;

pub const MODE_CBR: i32 = 0;
pub const MODE_VBR: i32 = 1;

/// Register slots, in memory order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    /// Bytes written by the last encode step.
    OutputBufferSize = 0,
    OutputBufferMaxSize = 1,
    OutputSampleRate = 2,
    /// kbps in CBR mode, VBR quality otherwise.
    OutputQuality = 3,
    InputSamples = 4,
    InputSampleRate = 5,
    InputChannels = 6,
    InputBufferLeft = 7,
    InputBufferRight = 8,
    OutputBuffer = 9,
}

impl Register {
    pub const ALL: [Register; REGISTER_COUNT] = [
        Register::OutputBufferSize,
        Register::OutputBufferMaxSize,
        Register::OutputSampleRate,
        Register::OutputQuality,
        Register::InputSamples,
        Register::InputSampleRate,
        Register::InputChannels,
        Register::InputBufferLeft,
        Register::InputBufferRight,
        Register::OutputBuffer,
    ];

    /// Byte offset from the block base.
    pub fn offset(self) -> u32 {
        (self as u32) * 4
    }
}

/// Decoded snapshot of a register block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegisterBlock {
    pub output_buffer_size: i32,
    pub output_buffer_max_size: i32,
    pub output_sample_rate: i32,
    pub output_quality: i32,
    pub input_samples: i32,
    pub input_sample_rate: i32,
    pub input_channels: i32,
    pub input_buffer_left: u32,
    pub input_buffer_right: u32,
    pub output_buffer: u32,
}

impl RegisterBlock {
    /// Read the block located at `base`.
    pub fn read(memory: &[u8], base: u32) -> Result<Self> {
        let slot = |r: Register| read_i32(memory, base.wrapping_add(r.offset()));
        let addr = |r: Register| read_u32(memory, base.wrapping_add(r.offset()));
        Ok(Self {
            output_buffer_size: slot(Register::OutputBufferSize)?,
            output_buffer_max_size: slot(Register::OutputBufferMaxSize)?,
            output_sample_rate: slot(Register::OutputSampleRate)?,
            output_quality: slot(Register::OutputQuality)?,
            input_samples: slot(Register::InputSamples)?,
            input_sample_rate: slot(Register::InputSampleRate)?,
            input_channels: slot(Register::InputChannels)?,
            input_buffer_left: addr(Register::InputBufferLeft)?,
            input_buffer_right: addr(Register::InputBufferRight)?,
            output_buffer: addr(Register::OutputBuffer)?,
        })
    }
}

/// Output buffer capacity an engine reserves for a given block length.
///
/// Worst case for one MP3 encode call is `1.25 * samples + 7200` bytes.
pub fn output_buffer_capacity(samples: i32) -> i32 {
    samples.saturating_add(samples / 4).saturating_add(7200)
}

/// Nominal CBR bitrate in kbps for a 0-9 quality level.
pub fn cbr_bitrate_kbps(quality: i32) -> i32 {
    match quality {
        0 => 32,
        1 => 48,
        2 => 64,
        3 => 96,
        4 => 128,
        5 => 160,
        6 => 192,
        7 => 224,
        8 => 256,
        _ => 320,
    }
}

/// Value of the output-quality register for a mode/quality pair.
pub fn output_quality(mode: i32, quality: i32) -> i32 {
    if mode == MODE_VBR {
        quality
    } else {
        cbr_bitrate_kbps(quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::write_i32;

    #[test]
    fn test_register_offsets() {
        for (i, r) in Register::ALL.iter().enumerate() {
            assert_eq!(r.offset() as usize, i * 4);
        }
        assert_eq!(REGISTER_BLOCK_BYTES, 40);
    }

    #[test]
    fn test_read_block() {
        let mut memory = vec![0u8; 64];
        for (i, r) in Register::ALL.iter().enumerate() {
            write_i32(&mut memory, 8 + r.offset(), (i as i32 + 1) * 10).unwrap();
        }
        let block = RegisterBlock::read(&memory, 8).unwrap();
        assert_eq!(block.output_buffer_size, 10);
        assert_eq!(block.input_channels, 70);
        assert_eq!(block.output_buffer, 100);
        assert_eq!(block.output_buffer_max_size, 20);
        assert_eq!(block.input_samples, 50);
        assert_eq!(block.input_buffer_left, 80);
    }

    #[test]
    fn test_read_block_out_of_bounds() {
        let memory = vec![0u8; 32];
        assert!(RegisterBlock::read(&memory, 0).is_err());
    }

    #[test]
    fn test_output_buffer_capacity() {
        assert_eq!(output_buffer_capacity(2048), 2560 + 7200);
        assert_eq!(output_buffer_capacity(4), 7205);
    }

    #[test]
    fn test_output_quality_by_mode() {
        assert_eq!(output_quality(MODE_CBR, 0), 32);
        assert_eq!(output_quality(MODE_CBR, 9), 320);
        assert_eq!(output_quality(MODE_CBR, 42), 320);
        assert_eq!(output_quality(MODE_VBR, 4), 4);
    }
}
