//! # Etercast - Streaming MP3 Encoder Sessions
//!
//! Encoder sessions over a native MP3 codec engine, with zero-copy views onto
//! the engine's buffers and a structured error taxonomy.
//!
//! ## Architecture
//!
//! Etercast is an umbrella crate that coordinates:
//! - **etercast-engine** - Codec engine boundary (trait, linear memory,
//!   register layout, reference engine, wasm host)
//! - **etercast-encoder** - Encoder session (state machine, buffer views,
//!   status-code classification)
//!
//! ## Quick Start
//!
//! ```
//! use etercast::prelude::*;
//!
//! let mut encoder = EncoderBuilder::new()
//!     .sample_rate(44100)
//!     .samples(1152)
//!     .build(ReferenceEngine::new())?;
//!
//! let mut mp3 = Vec::new();
//! for block in vec![0.0f32; 4608].chunks(1152) {
//!     mp3.extend(encoder.encode_mono(block)?);
//! }
//! mp3.extend(encoder.flush()?);
//! encoder.close()?;
//! # Ok::<(), etercast::Error>(())
//! ```
//!
//! Sessions are single-owner and not thread-safe; distinct sessions are
//! independent. A session must be closed explicitly: dropping it leaks the
//! engine-side encoder.
//!
//! ## Feature Flags
//!
//! - `default` - Session core and the in-process reference engine
//! - `wasm` - wasmtime host for a compiled `mp3.wasm` image

/// Re-export of etercast-engine for direct access
pub use etercast_engine as engine;

/// Re-export of etercast-encoder for direct access
pub use etercast_encoder as encoder;

// Engine boundary
pub use etercast_engine::{
    CodecEngine, EngineError, EngineHandle, ReferenceEngine, Register, RegisterBlock,
    FRAME_SAMPLES,
};

#[cfg(feature = "wasm")]
pub use etercast_engine::WasmEngine;

// Session
pub use etercast_encoder::{
    classify, EncodeBufferFailure, Encoder, EncoderError, EncoderMode, EncoderOptions,
    EncoderState, ErrorKind,
};

mod builder;
mod error;
mod export;

pub use builder::EncoderBuilder;
pub use error::{Error, Result};
pub use export::{encode_file, encode_memory};

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{
        CodecEngine, Encoder, EncoderBuilder, EncoderError, EncoderMode, EncoderOptions,
        EncoderState, ErrorKind, ReferenceEngine,
    };

    #[cfg(feature = "wasm")]
    pub use crate::WasmEngine;
}
