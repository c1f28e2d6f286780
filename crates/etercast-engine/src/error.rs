//! Error types for etercast-engine

use crate::layout::Register;
use thiserror::Error;

/// Host-side engine failure.
///
/// These never carry an engine status code: they describe calls that could
/// not complete at all (bad memory access, wasm trap, missing export).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Memory access outside the engine's linear memory
    #[error("Memory access out of bounds: {len} bytes at {address:#x} (memory is {memory_len} bytes)")]
    OutOfBounds {
        address: u32,
        len: usize,
        memory_len: usize,
    },

    /// Register holds a value that cannot describe a buffer
    #[error("Invalid value {value} in register {register:?}")]
    InvalidRegister { register: Register, value: i32 },

    /// WebAssembly compile, link or trap error
    #[error("WebAssembly error: {0}")]
    Wasm(String),

    /// Required export not present in the engine image
    #[error("Missing engine export: {0}")]
    MissingExport(String),

    /// I/O error while reading an engine image
    #[error("I/O error: {0}")]
    Io(String),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

// External errors are flattened to strings so EngineError stays Clone.

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::Io(e.to_string())
    }
}

#[cfg(feature = "wasm")]
impl From<wasmtime::Error> for EngineError {
    fn from(e: wasmtime::Error) -> Self {
        EngineError::Wasm(format!("{:#}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_display() {
        let err = EngineError::OutOfBounds {
            address: 0x100,
            len: 40,
            memory_len: 128,
        };
        let msg = err.to_string();
        assert!(msg.contains("0x100"));
        assert!(msg.contains("40 bytes"));
        assert!(msg.contains("128 bytes"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "mp3.wasm");
        let err: EngineError = io.into();
        assert!(matches!(err, EngineError::Io(ref m) if m.contains("mp3.wasm")));
    }

    #[test]
    fn test_missing_export_display() {
        let err = EngineError::MissingExport("mp3_create".into());
        assert_eq!(err.to_string(), "Missing engine export: mp3_create");
    }
}
