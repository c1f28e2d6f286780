//! Error taxonomy for engine status codes and encoder session failures.
//!
//! Engine status codes are not contiguous and do not encode severity, so
//! [`classify`] is an exact-value table rather than a range test. Failures of
//! the inner buffer-encode call are reported by the engine as
//! `lame_status - 100` and land in [`EncodeBufferFailure`].

use etercast_engine::EngineError;
use std::fmt;
use thiserror::Error;

/// Failure reported by the engine's inner buffer-encode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodeBufferFailure {
    BufferTooSmall,
    Malloc,
    ParamsNotInitialized,
    Psychoacoustic,
    NoMemory,
    BadBitrate,
    BadSampleFrequency,
    Internal,
}

impl EncodeBufferFailure {
    fn detail(self) -> &'static str {
        match self {
            EncodeBufferFailure::BufferTooSmall => "Buffer was too small",
            EncodeBufferFailure::Malloc => "malloc() problem",
            EncodeBufferFailure::ParamsNotInitialized => "lame_init_params not called",
            EncodeBufferFailure::Psychoacoustic => "Psycho acoustic problems",
            EncodeBufferFailure::NoMemory => "No memory",
            EncodeBufferFailure::BadBitrate => "Bad bitrate",
            EncodeBufferFailure::BadSampleFrequency => "Bad samplefreq",
            EncodeBufferFailure::Internal => "Internal error",
        }
    }
}

/// Classification of an engine status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidSampleRate,
    InvalidChannelConfiguration,
    InvalidQuality,
    EngineInitFailed,
    EngineParamsFailed,
    BufferReallocationFailed,
    TooManyInputSamples,
    EncodeBufferCallFailed,
    FlushFailed,
    InvalidSampleCount,
    InvalidSamples,
    /// The engine's "Ok" sentinel (-100). Listed for completeness; the
    /// session still treats it as a failure because it is negative.
    Ok,
    EncodeBuffer(EncodeBufferFailure),
    Unknown(i32),
}

/// Map an engine status code to its taxonomy entry. Total; never fails.
pub fn classify(code: i32) -> ErrorKind {
    use EncodeBufferFailure as B;
    match code {
        -1 => ErrorKind::InvalidSampleRate,
        -2 => ErrorKind::InvalidChannelConfiguration,
        -3 => ErrorKind::InvalidQuality,
        -4 => ErrorKind::EngineInitFailed,
        -5 => ErrorKind::EngineParamsFailed,
        -6 => ErrorKind::BufferReallocationFailed,
        -7 => ErrorKind::TooManyInputSamples,
        -8 => ErrorKind::EncodeBufferCallFailed,
        -9 => ErrorKind::FlushFailed,
        -10 => ErrorKind::InvalidSampleCount,
        -11 => ErrorKind::InvalidSamples,
        -100 => ErrorKind::Ok,
        -101 => ErrorKind::EncodeBuffer(B::BufferTooSmall),
        -102 => ErrorKind::EncodeBuffer(B::Malloc),
        -103 => ErrorKind::EncodeBuffer(B::ParamsNotInitialized),
        -104 => ErrorKind::EncodeBuffer(B::Psychoacoustic),
        -110 => ErrorKind::EncodeBuffer(B::NoMemory),
        -111 => ErrorKind::EncodeBuffer(B::BadBitrate),
        -112 => ErrorKind::EncodeBuffer(B::BadSampleFrequency),
        -113 => ErrorKind::EncodeBuffer(B::Internal),
        other => ErrorKind::Unknown(other),
    }
}

impl ErrorKind {
    /// Engine status code for this kind. Inverse of [`classify`].
    pub fn code(&self) -> i32 {
        use EncodeBufferFailure as B;
        match self {
            ErrorKind::InvalidSampleRate => -1,
            ErrorKind::InvalidChannelConfiguration => -2,
            ErrorKind::InvalidQuality => -3,
            ErrorKind::EngineInitFailed => -4,
            ErrorKind::EngineParamsFailed => -5,
            ErrorKind::BufferReallocationFailed => -6,
            ErrorKind::TooManyInputSamples => -7,
            ErrorKind::EncodeBufferCallFailed => -8,
            ErrorKind::FlushFailed => -9,
            ErrorKind::InvalidSampleCount => -10,
            ErrorKind::InvalidSamples => -11,
            ErrorKind::Ok => -100,
            ErrorKind::EncodeBuffer(B::BufferTooSmall) => -101,
            ErrorKind::EncodeBuffer(B::Malloc) => -102,
            ErrorKind::EncodeBuffer(B::ParamsNotInitialized) => -103,
            ErrorKind::EncodeBuffer(B::Psychoacoustic) => -104,
            ErrorKind::EncodeBuffer(B::NoMemory) => -110,
            ErrorKind::EncodeBuffer(B::BadBitrate) => -111,
            ErrorKind::EncodeBuffer(B::BadSampleFrequency) => -112,
            ErrorKind::EncodeBuffer(B::Internal) => -113,
            ErrorKind::Unknown(code) => *code,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidSampleRate => write!(f, "Invalid input sample rate"),
            ErrorKind::InvalidChannelConfiguration => {
                write!(f, "Invalid input channels (mono and stereo only)")
            }
            ErrorKind::InvalidQuality => write!(f, "Invalid quality"),
            ErrorKind::EngineInitFailed => write!(f, "Error calling lame_init"),
            ErrorKind::EngineParamsFailed => write!(f, "Error calling lame_init_params"),
            ErrorKind::BufferReallocationFailed => write!(f, "Error reallocating buffers"),
            ErrorKind::TooManyInputSamples => write!(f, "Too much input samples"),
            ErrorKind::EncodeBufferCallFailed => {
                write!(f, "Error calling lame_encode_buffer_ieee_float")
            }
            ErrorKind::FlushFailed => write!(f, "Error calling lame_encode_flush"),
            ErrorKind::InvalidSampleCount => write!(f, "Invalid number of samples passed"),
            ErrorKind::InvalidSamples => write!(f, "Invalid input samples"),
            ErrorKind::Ok => write!(f, "Ok"),
            ErrorKind::EncodeBuffer(failure) => write!(
                f,
                "Error calling lame_encode_buffer_ieee_float: {}",
                failure.detail()
            ),
            ErrorKind::Unknown(code) => write!(f, "Unknown error: {}", code),
        }
    }
}

/// Encoder session error.
///
/// Every variant is terminal for the session that produced it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncoderError {
    /// The engine returned a null handle.
    #[error("Cannot create mp3 encoder")]
    AllocationFailed,

    /// The engine returned a negative status code.
    #[error("{kind} (code {code})")]
    Engine { kind: ErrorKind, code: i32 },

    /// Operation on a session that is not running.
    #[error("Encoder already closed")]
    AlreadyClosed,

    #[error("Encoder channels have different lengths: left={left}, right={right}")]
    ChannelLengthMismatch { left: usize, right: usize },

    /// An option does not fit the engine's signed 32-bit arguments.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// Host-side engine failure (trap, bad memory access).
    #[error("Engine host error: {0}")]
    Host(#[from] EngineError),
}

impl EncoderError {
    /// Error for a negative engine status code.
    pub fn from_code(code: i32) -> Self {
        EncoderError::Engine {
            kind: classify(code),
            code,
        }
    }

    /// Taxonomy kind, for failures that originate in the engine.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            EncoderError::AllocationFailed => Some(ErrorKind::EngineInitFailed),
            EncoderError::Engine { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Caller misuse detected before any engine call.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            EncoderError::AlreadyClosed
                | EncoderError::ChannelLengthMismatch { .. }
                | EncoderError::InvalidOptions(_)
        )
    }
}

/// Result type for encoder operations
pub type Result<T> = std::result::Result<T, EncoderError>;
