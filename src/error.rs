//! Centralized error type for the etercast umbrella crate.
//!
//! Wraps subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Encoder(#[from] etercast_encoder::EncoderError),

    #[error("Engine: {0}")]
    Engine(#[from] etercast_engine::EngineError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
