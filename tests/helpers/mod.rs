//! Test helpers and fixtures for etercast integration tests
//!
//! - Signal generators (sine, silence, seeded noise)
//! - [`CountingEngine`]: wraps any engine and counts calls per operation
//! - [`FaultyEngine`]: reference engine with injectable status codes

#![allow(dead_code)]

use etercast::engine::Result as EngineResult;
use etercast::prelude::*;
use etercast::{EngineError, EngineHandle};

pub const TEST_SAMPLE_RATE: u32 = 44100;

/// Generate a sine wave at `frequency` Hz.
pub fn generate_sine(frequency: f32, sample_rate: u32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (std::f32::consts::TAU * frequency * t).sin()
        })
        .collect()
}

pub fn generate_silence(num_samples: usize) -> Vec<f32> {
    vec![0.0; num_samples]
}

/// Reproducible noise in -1..1.
pub fn generate_noise(num_samples: usize, seed: u64) -> Vec<f32> {
    // Simple LCG for reproducible "random" noise
    let mut rng = seed;
    (0..num_samples)
        .map(|_| {
            rng = rng.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((rng >> 33) as f32 / (1u64 << 31) as f32) * 2.0 - 1.0
        })
        .collect()
}

/// Per-operation call counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallCounts {
    pub allocate: usize,
    pub initialize: usize,
    pub encode_frame: usize,
    pub destroy: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.allocate + self.initialize + self.encode_frame + self.destroy
    }
}

/// Engine wrapper that records every call.
pub struct CountingEngine<E> {
    pub inner: E,
    pub calls: CallCounts,
}

impl<E: CodecEngine> CountingEngine<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            calls: CallCounts::default(),
        }
    }
}

impl<E: CodecEngine> CodecEngine for CountingEngine<E> {
    fn allocate(&mut self) -> EngineResult<Option<EngineHandle>> {
        self.calls.allocate += 1;
        self.inner.allocate()
    }

    fn initialize(
        &mut self,
        handle: EngineHandle,
        sample_rate: i32,
        num_channels: i32,
        quality: i32,
        samples: i32,
        mode: i32,
    ) -> EngineResult<i32> {
        self.calls.initialize += 1;
        self.inner
            .initialize(handle, sample_rate, num_channels, quality, samples, mode)
    }

    fn encode_frame(&mut self, handle: EngineHandle, sample_count: i32) -> EngineResult<i32> {
        self.calls.encode_frame += 1;
        self.inner.encode_frame(handle, sample_count)
    }

    fn destroy(&mut self, handle: EngineHandle) -> EngineResult<i32> {
        self.calls.destroy += 1;
        self.inner.destroy(handle)
    }

    fn memory(&self) -> &[u8] {
        self.inner.memory()
    }

    fn memory_mut(&mut self) -> &mut [u8] {
        self.inner.memory_mut()
    }
}

/// Reference engine whose operations can be forced to fail.
#[derive(Default)]
pub struct FaultyEngine {
    pub inner: ReferenceEngine,
    pub null_handle: bool,
    pub init_code: Option<i32>,
    pub encode_code: Option<i32>,
    pub destroy_code: Option<i32>,
    pub trap_on_encode: bool,
}

impl CodecEngine for FaultyEngine {
    fn allocate(&mut self) -> EngineResult<Option<EngineHandle>> {
        if self.null_handle {
            return Ok(None);
        }
        self.inner.allocate()
    }

    fn initialize(
        &mut self,
        handle: EngineHandle,
        sample_rate: i32,
        num_channels: i32,
        quality: i32,
        samples: i32,
        mode: i32,
    ) -> EngineResult<i32> {
        match self.init_code {
            Some(code) => Ok(code),
            None => self
                .inner
                .initialize(handle, sample_rate, num_channels, quality, samples, mode),
        }
    }

    fn encode_frame(&mut self, handle: EngineHandle, sample_count: i32) -> EngineResult<i32> {
        if self.trap_on_encode {
            return Err(EngineError::Wasm("unreachable executed".into()));
        }
        match self.encode_code {
            Some(code) => Ok(code),
            None => self.inner.encode_frame(handle, sample_count),
        }
    }

    fn destroy(&mut self, handle: EngineHandle) -> EngineResult<i32> {
        match self.destroy_code {
            Some(code) => Ok(code),
            None => self.inner.destroy(handle),
        }
    }

    fn memory(&self) -> &[u8] {
        self.inner.memory()
    }

    fn memory_mut(&mut self) -> &mut [u8] {
        self.inner.memory_mut()
    }
}

/// Options used by the reference scenarios: mono, 4 samples per call.
pub fn scenario_options() -> EncoderOptions {
    EncoderOptions {
        sample_rate: 44100,
        num_channels: 1,
        quality: 9,
        samples: 4,
        mode: EncoderMode::ConstantBitRate,
    }
}
