//! # Etercast Encoder
//!
//! MP3 encoder session over a [`CodecEngine`](etercast_engine::CodecEngine).
//!
//! - **Session**: [`Encoder`] drives allocate → initialize → encode* → close
//!   and enforces the `Running` / `Closed` / `Errored` state machine
//! - **Views**: zero-copy, bounds-limited access to the engine's register
//!   block and channel buffers
//! - **Errors**: engine status codes classified into [`ErrorKind`]
//!
//! ```
//! use etercast_encoder::{Encoder, EncoderOptions};
//! use etercast_engine::ReferenceEngine;
//!
//! let mut encoder = Encoder::new(ReferenceEngine::new(), EncoderOptions::stereo(44100))?;
//! let left = vec![0.0f32; 2048];
//! let right = vec![0.0f32; 2048];
//! let frames = encoder.encode_stereo(&left, &right)?;
//! assert!(frames.len() as i32 <= encoder.output_buffer_max_size().unwrap());
//! encoder.close()?;
//! # Ok::<(), etercast_encoder::EncoderError>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `wasm`: enables `etercast_engine::WasmEngine`

pub mod encoder;
pub mod error;
mod options;
pub mod views;

pub use encoder::{Encoder, EncoderState};
pub use error::{classify, EncodeBufferFailure, EncoderError, ErrorKind, Result};
pub use options::{EncoderMode, EncoderOptions};
