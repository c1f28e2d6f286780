//! Bounds-checked little-endian access to engine linear memory.
//!
//! Engine memory is a plain byte region with no alignment guarantees on the
//! host side, so every typed access goes through explicit LE encoding.

use crate::error::{EngineError, Result};
use std::ops::Range;

/// Resolve `len` bytes at `address` to a byte range within `memory_len`.
pub fn checked_range(address: u32, len: usize, memory_len: usize) -> Result<Range<usize>> {
    let start = address as usize;
    start
        .checked_add(len)
        .filter(|&end| end <= memory_len)
        .map(|end| start..end)
        .ok_or(EngineError::OutOfBounds {
            address,
            len,
            memory_len,
        })
}

/// Borrow `len` bytes at `address`.
pub fn bytes(memory: &[u8], address: u32, len: usize) -> Result<&[u8]> {
    let range = checked_range(address, len, memory.len())?;
    Ok(&memory[range])
}

/// Mutably borrow `len` bytes at `address`.
pub fn bytes_mut(memory: &mut [u8], address: u32, len: usize) -> Result<&mut [u8]> {
    let range = checked_range(address, len, memory.len())?;
    Ok(&mut memory[range])
}

pub fn read_i32(memory: &[u8], address: u32) -> Result<i32> {
    let raw = bytes(memory, address, 4)?;
    Ok(i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}

/// Pointers in engine memory are unsigned 32-bit addresses.
pub fn read_u32(memory: &[u8], address: u32) -> Result<u32> {
    read_i32(memory, address).map(|v| v as u32)
}

pub fn write_i32(memory: &mut [u8], address: u32, value: i32) -> Result<()> {
    bytes_mut(memory, address, 4)?.copy_from_slice(&value.to_le_bytes());
    Ok(())
}

/// Read `count` consecutive `f32` values starting at `address`.
pub fn read_f32s(memory: &[u8], address: u32, count: usize) -> Result<Vec<f32>> {
    let len = count.checked_mul(4).ok_or(EngineError::OutOfBounds {
        address,
        len: usize::MAX,
        memory_len: memory.len(),
    })?;
    Ok(bytes(memory, address, len)?
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Write `samples` as consecutive `f32` values starting at `address`.
pub fn write_f32s(memory: &mut [u8], address: u32, samples: &[f32]) -> Result<()> {
    let target = bytes_mut(memory, address, samples.len() * 4)?;
    for (dst, sample) in target.chunks_exact_mut(4).zip(samples) {
        dst.copy_from_slice(&sample.to_le_bytes());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_i32_roundtrip_little_endian() {
        let mut memory = vec![0u8; 16];
        write_i32(&mut memory, 4, -7).unwrap();
        assert_eq!(&memory[4..8], &(-7i32).to_le_bytes());
        assert_eq!(read_i32(&memory, 4).unwrap(), -7);
    }

    #[test]
    fn test_unaligned_f32_access() {
        let mut memory = vec![0u8; 16];
        write_f32s(&mut memory, 3, &[0.5, -0.25]).unwrap();
        assert_eq!(read_f32s(&memory, 3, 2).unwrap(), vec![0.5, -0.25]);
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let memory = vec![0u8; 8];
        assert!(matches!(
            read_i32(&memory, 6),
            Err(EngineError::OutOfBounds {
                address: 6,
                len: 4,
                memory_len: 8
            })
        ));
        assert!(bytes(&memory, u32::MAX, 4).is_err());
    }

    #[test]
    fn test_empty_range_at_end() {
        let memory = vec![0u8; 8];
        assert!(bytes(&memory, 8, 0).unwrap().is_empty());
    }

    proptest::proptest! {
        #[test]
        fn prop_range_check_matches_bounds(
            address in proptest::prelude::any::<u32>(),
            len in 0usize..1024,
            memory_len in 0usize..4096,
        ) {
            let in_bounds = address as usize + len <= memory_len;
            proptest::prop_assert_eq!(checked_range(address, len, memory_len).is_ok(), in_bounds);
        }
    }
}
