//! # Etercast Engine
//!
//! The codec engine boundary for the etercast MP3 encoder.
//!
//! An engine exposes four operations (`allocate`, `initialize`,
//! `encode_frame`, `destroy`) and one contiguous byte-addressable memory
//! region shared with the caller. Everything the encoder session knows about
//! an engine-side encoder is read out of that region by address:
//!
//! - **Register block**: ten little-endian 32-bit slots at the handle address
//! - **Input buffers**: two `f32` channel buffers sized to the block length
//! - **Output buffer**: a byte buffer the engine fills with encoded frames
//!
//! ## Engines
//!
//! - [`ReferenceEngine`] - deterministic in-process engine (always available)
//! - `WasmEngine` - hosts a compiled `mp3.wasm` image (requires `wasm` feature)
//!
//! ## Feature Flags
//!
//! - `wasm`: wasmtime-backed engine

pub mod error;
pub mod layout;
pub mod memory;
mod reference;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{EngineError, Result};
pub use layout::{
    cbr_bitrate_kbps, output_buffer_capacity, output_quality, Register, RegisterBlock,
    DEFAULT_OUTPUT_SAMPLE_RATE, MODE_CBR, MODE_VBR, REGISTER_BLOCK_BYTES, REGISTER_COUNT,
};
pub use reference::{ReferenceEngine, DEFAULT_MEMORY_LIMIT, FRAME_SAMPLES};

#[cfg(feature = "wasm")]
pub use wasm::WasmEngine;

use std::num::NonZeroU32;

/// Opaque address of an engine-side encoder structure.
///
/// Handles are never null: an engine that fails to allocate reports `None`
/// from [`CodecEngine::allocate`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineHandle(NonZeroU32);

impl EngineHandle {
    /// Wrap a raw engine address. Returns `None` for the null address.
    pub fn new(address: u32) -> Option<Self> {
        NonZeroU32::new(address).map(Self)
    }

    /// Raw engine address of the register block.
    pub fn address(&self) -> u32 {
        self.0.get()
    }
}

impl std::fmt::Display for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0.get())
    }
}

/// A native streaming encoder engine.
///
/// Status codes follow the engine convention: zero or positive is success,
/// negative is a failure code. The `Result` layer carries only host-side
/// failures (traps, bad memory access) that never produced a status code.
///
/// Engines perform no internal locking. Callers serialize access; the
/// `&mut self` receivers enforce that statically.
pub trait CodecEngine {
    /// Allocate an uninitialized encoder structure.
    fn allocate(&mut self) -> Result<Option<EngineHandle>>;

    /// Configure the encoder structure and reserve its buffers.
    fn initialize(
        &mut self,
        handle: EngineHandle,
        sample_rate: i32,
        num_channels: i32,
        quality: i32,
        samples: i32,
        mode: i32,
    ) -> Result<i32>;

    /// Consume `sample_count` samples from the input buffers and write encoded
    /// bytes to the output buffer. A count of zero flushes pending frames.
    fn encode_frame(&mut self, handle: EngineHandle, sample_count: i32) -> Result<i32>;

    /// Release all engine-side state for `handle`.
    fn destroy(&mut self, handle: EngineHandle) -> Result<i32>;

    /// The shared linear memory region.
    fn memory(&self) -> &[u8];

    /// Mutable access to the shared linear memory region.
    fn memory_mut(&mut self) -> &mut [u8];
}

impl<E: CodecEngine + ?Sized> CodecEngine for &mut E {
    fn allocate(&mut self) -> Result<Option<EngineHandle>> {
        (**self).allocate()
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
        (**self).initialize(handle, sample_rate, num_channels, quality, samples, mode)
    }

    fn encode_frame(&mut self, handle: EngineHandle, sample_count: i32) -> Result<i32> {
        (**self).encode_frame(handle, sample_count)
    }

    fn destroy(&mut self, handle: EngineHandle) -> Result<i32> {
        (**self).destroy(handle)
    }

    fn memory(&self) -> &[u8] {
        (**self).memory()
    }

    fn memory_mut(&mut self) -> &mut [u8] {
        (**self).memory_mut()
    }
}

impl<E: CodecEngine + ?Sized> CodecEngine for Box<E> {
    fn allocate(&mut self) -> Result<Option<EngineHandle>> {
        (**self).allocate()
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
        (**self).initialize(handle, sample_rate, num_channels, quality, samples, mode)
    }

    fn encode_frame(&mut self, handle: EngineHandle, sample_count: i32) -> Result<i32> {
        (**self).encode_frame(handle, sample_count)
    }

    fn destroy(&mut self, handle: EngineHandle) -> Result<i32> {
        (**self).destroy(handle)
    }

    fn memory(&self) -> &[u8] {
        (**self).memory()
    }

    fn memory_mut(&mut self) -> &mut [u8] {
        (**self).memory_mut()
    }
}
