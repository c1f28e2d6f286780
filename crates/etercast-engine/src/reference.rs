//! Deterministic in-process engine.
//!
//! Implements the full engine protocol (register block, input and output
//! buffers in linear memory, status codes) without a real MP3 encoder. Frames
//! are a compact amplitude digest of the input, so identical input always
//! produces identical output. Used for tests, benchmarks and hosts that have
//! no wasm image at hand.

use std::collections::HashMap;

use crate::layout::{
    output_buffer_capacity, output_quality, Register, DEFAULT_OUTPUT_SAMPLE_RATE, MODE_CBR,
    MODE_VBR, REGISTER_BLOCK_BYTES,
};
use crate::memory::{bytes_mut, read_f32s, write_i32};
use crate::{CodecEngine, EngineHandle, Result};

/// Samples per emitted frame.
pub const FRAME_SAMPLES: usize = 1152;

const BAND_SAMPLES: usize = 72;
const FRAME_MAGIC: u8 = 0xE7;
const ALIGN: usize = 8;
/// Default linear memory ceiling.
pub const DEFAULT_MEMORY_LIMIT: usize = 256 << 20;

// Status codes produced by this engine.
const ERR_SAMPLE_RATE: i32 = -1;
const ERR_NUM_CHANNELS: i32 = -2;
const ERR_QUALITY: i32 = -3;
const ERR_INIT: i32 = -4;
const ERR_INIT_PARAMS: i32 = -5;
const ERR_REALLOC: i32 = -6;
const ERR_TOO_MANY_SAMPLES: i32 = -7;
const ERR_NUM_SAMPLES: i32 = -10;
const ERR_CONFIG_SAMPLES: i32 = -11;
const ERR_BUFFER_TOO_SMALL: i32 = -101;
const ERR_NOT_INITIALIZED: i32 = -103;

struct Stream {
    channels: usize,
    input_samples: usize,
    left: u32,
    right: u32,
    output: u32,
    output_capacity: usize,
    pending_left: Vec<f32>,
    pending_right: Vec<f32>,
    frame_index: u16,
}

/// Reference engine over a growable `Vec<u8>` linear memory.
///
/// Memory is bump-allocated and never reclaimed, so every handle and buffer
/// address is unique for the lifetime of the engine. `destroy` releases the
/// stream but not its memory: an engine hosting many sessions keeps growing
/// until it reaches its memory limit ([`DEFAULT_MEMORY_LIMIT`] unless set
/// with [`with_memory_limit`](Self::with_memory_limit)). From then on
/// `initialize` fails with -6 and `allocate` returns a null handle, so every
/// new session fails. Use a fresh engine per batch of sessions.
pub struct ReferenceEngine {
    memory: Vec<u8>,
    /// `None` = allocated but not yet initialized.
    streams: HashMap<u32, Option<Stream>>,
    allocations: usize,
    handle_limit: Option<usize>,
    memory_limit: usize,
}

impl Default for ReferenceEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceEngine {
    pub fn new() -> Self {
        Self {
            // Address 0 is the null handle and is never handed out.
            memory: vec![0; ALIGN],
            streams: HashMap::new(),
            allocations: 0,
            handle_limit: None,
            memory_limit: DEFAULT_MEMORY_LIMIT,
        }
    }

    /// Make `allocate` return a null handle after `limit` allocations.
    pub fn with_handle_limit(mut self, limit: usize) -> Self {
        self.handle_limit = Some(limit);
        self
    }

    /// Cap linear memory at `bytes`.
    pub fn with_memory_limit(mut self, bytes: usize) -> Self {
        self.memory_limit = bytes;
        self
    }

    /// Current linear memory size in bytes.
    pub fn memory_len(&self) -> usize {
        self.memory.len()
    }

    /// Number of allocated handles not yet destroyed.
    pub fn live_handles(&self) -> usize {
        self.streams.len()
    }

    fn reserve(&mut self, len: usize) -> Option<u32> {
        let base = self.memory.len().next_multiple_of(ALIGN);
        let address = u32::try_from(base).ok()?;
        let end = base.checked_add(len).filter(|&end| end <= self.memory_limit)?;
        self.memory.resize(end, 0);
        Some(address)
    }

    fn flush(&mut self, address: u32) -> Result<i32> {
        let Some(Some(stream)) = self.streams.get_mut(&address) else {
            return Ok(ERR_NOT_INITIALIZED);
        };

        let mut out = Vec::new();
        if !stream.pending_left.is_empty() {
            stream.pending_left.resize(FRAME_SAMPLES, 0.0);
            if stream.channels == 2 {
                stream.pending_right.resize(FRAME_SAMPLES, 0.0);
            }
            emit_frames(stream, &mut out);
        }
        publish(&mut self.memory, address, stream, &out)
    }
}

impl CodecEngine for ReferenceEngine {
    fn allocate(&mut self) -> Result<Option<EngineHandle>> {
        if self.handle_limit.is_some_and(|limit| self.allocations >= limit) {
            tracing::debug!("Handle limit reached after {} allocations", self.allocations);
            return Ok(None);
        }
        let Some(address) = self.reserve(REGISTER_BLOCK_BYTES) else {
            return Ok(None);
        };
        self.allocations += 1;
        self.streams.insert(address, None);
        Ok(EngineHandle::new(address))
    }

    fn initialize(
        &mut self,
        handle: EngineHandle,
        sample_rate: i32,
        num_channels: i32,
        quality: i32,
        samples: i32,
        mode: i32,
    ) -> Result<i32> {
        let address = handle.address();
        match self.streams.get(&address) {
            None => return Ok(ERR_INIT),
            Some(Some(_)) => return Ok(ERR_INIT_PARAMS),
            Some(None) => {}
        }

        if sample_rate <= 0 {
            return Ok(ERR_SAMPLE_RATE);
        }
        if !(1..=2).contains(&num_channels) {
            return Ok(ERR_NUM_CHANNELS);
        }
        if !(0..=9).contains(&quality) {
            return Ok(ERR_QUALITY);
        }
        if samples <= 0 {
            return Ok(ERR_CONFIG_SAMPLES);
        }
        if mode != MODE_CBR && mode != MODE_VBR {
            return Ok(ERR_INIT_PARAMS);
        }

        let input_samples = samples as usize;
        let capacity = output_buffer_capacity(samples);
        let Some(input_bytes) = input_samples.checked_mul(4) else {
            return Ok(ERR_REALLOC);
        };
        let (Some(left), Some(right), Some(output)) = (
            self.reserve(input_bytes),
            self.reserve(input_bytes),
            self.reserve(capacity as usize),
        ) else {
            return Ok(ERR_REALLOC);
        };

        let registers = [
            (Register::OutputBufferSize, 0),
            (Register::OutputBufferMaxSize, capacity),
            (Register::OutputSampleRate, DEFAULT_OUTPUT_SAMPLE_RATE),
            (Register::OutputQuality, output_quality(mode, quality)),
            (Register::InputSamples, samples),
            (Register::InputSampleRate, sample_rate),
            (Register::InputChannels, num_channels),
            (Register::InputBufferLeft, left as i32),
            (Register::InputBufferRight, right as i32),
            (Register::OutputBuffer, output as i32),
        ];
        for (register, value) in registers {
            write_i32(&mut self.memory, address + register.offset(), value)?;
        }

        self.streams.insert(
            address,
            Some(Stream {
                channels: num_channels as usize,
                input_samples,
                left,
                right,
                output,
                output_capacity: capacity as usize,
                pending_left: Vec::with_capacity(FRAME_SAMPLES),
                pending_right: Vec::with_capacity(FRAME_SAMPLES),
                frame_index: 0,
            }),
        );
        Ok(0)
    }

    fn encode_frame(&mut self, handle: EngineHandle, sample_count: i32) -> Result<i32> {
        let address = handle.address();
        match self.streams.get(&address) {
            None => return Ok(ERR_INIT),
            Some(None) => return Ok(ERR_NOT_INITIALIZED),
            Some(Some(_)) => {}
        }

        if sample_count == 0 {
            return self.flush(address);
        }
        if sample_count < 0 {
            return Ok(ERR_NUM_SAMPLES);
        }

        let Some(Some(stream)) = self.streams.get_mut(&address) else {
            return Ok(ERR_NOT_INITIALIZED);
        };
        let count = sample_count as usize;
        if count > stream.input_samples {
            return Ok(ERR_TOO_MANY_SAMPLES);
        }

        stream
            .pending_left
            .extend(read_f32s(&self.memory, stream.left, count)?);
        if stream.channels == 2 {
            stream
                .pending_right
                .extend(read_f32s(&self.memory, stream.right, count)?);
        }

        let mut out = Vec::new();
        emit_frames(stream, &mut out);
        publish(&mut self.memory, address, stream, &out)
    }

    fn destroy(&mut self, handle: EngineHandle) -> Result<i32> {
        match self.streams.remove(&handle.address()) {
            Some(_) => Ok(0),
            None => Ok(ERR_INIT),
        }
    }

    fn memory(&self) -> &[u8] {
        &self.memory
    }

    fn memory_mut(&mut self) -> &mut [u8] {
        &mut self.memory
    }
}

/// Drain every complete frame from the stream's accumulators into `out`.
fn emit_frames(stream: &mut Stream, out: &mut Vec<u8>) {
    while stream.pending_left.len() >= FRAME_SAMPLES {
        let left: Vec<f32> = stream.pending_left.drain(..FRAME_SAMPLES).collect();
        let right: Vec<f32> = if stream.channels == 2 {
            stream.pending_right.drain(..FRAME_SAMPLES).collect()
        } else {
            Vec::new()
        };

        let index = stream.frame_index.to_le_bytes();
        out.extend_from_slice(&[FRAME_MAGIC, stream.channels as u8, index[0], index[1]]);
        digest(&left, out);
        if stream.channels == 2 {
            digest(&right, out);
        }
        stream.frame_index = stream.frame_index.wrapping_add(1);
    }
}

/// Mean absolute amplitude per band, quantized to a byte.
fn digest(channel: &[f32], out: &mut Vec<u8>) {
    for band in channel.chunks(BAND_SAMPLES) {
        let mean = band.iter().map(|s| s.abs()).sum::<f32>() / band.len() as f32;
        out.push((mean.clamp(0.0, 1.0) * 255.0).round() as u8);
    }
}

/// Copy frame bytes to the output buffer and update the size register.
fn publish(memory: &mut [u8], address: u32, stream: &Stream, out: &[u8]) -> Result<i32> {
    if out.len() > stream.output_capacity {
        return Ok(ERR_BUFFER_TOO_SMALL);
    }
    bytes_mut(memory, stream.output, out.len())?.copy_from_slice(out);
    write_i32(
        memory,
        address + Register::OutputBufferSize.offset(),
        out.len() as i32,
    )?;
    Ok(0)
}
