//! Typed, bounds-limited views into engine memory.
//!
//! A view is an address and a fixed capacity; it holds no reference to the
//! memory itself. Every access resolves the view against the engine's current
//! memory slice, so a view survives memory growth and can never outlive the
//! borrow it reads through. Views are derived once per session, right after
//! initialization, and never resized.

use etercast_engine::memory::{bytes, checked_range, read_i32, write_f32s};
use etercast_engine::{EngineError, EngineHandle, Register, RegisterBlock, Result};

/// Live view of the ten-slot register block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterView {
    base: u32,
}

impl RegisterView {
    pub fn new(handle: EngineHandle) -> Self {
        Self {
            base: handle.address(),
        }
    }

    pub fn get(&self, memory: &[u8], register: Register) -> Result<i32> {
        read_i32(memory, self.base.wrapping_add(register.offset()))
    }

    pub fn snapshot(&self, memory: &[u8]) -> Result<RegisterBlock> {
        RegisterBlock::read(memory, self.base)
    }
}

/// `f32` channel input view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleView {
    address: u32,
    capacity: usize,
}

impl SampleView {
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Copy `samples` to the front of the view, truncated to capacity.
    /// Returns the number of samples written.
    pub fn write(&self, memory: &mut [u8], samples: &[f32]) -> Result<usize> {
        let count = samples.len().min(self.capacity);
        write_f32s(memory, self.address, &samples[..count])?;
        Ok(count)
    }
}

/// Encoded-output byte view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteView {
    address: u32,
    capacity: usize,
}

impl ByteView {
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Borrow the first `len` bytes. `len` beyond capacity is an engine
    /// defect and reported as out of bounds.
    pub fn prefix<'m>(&self, memory: &'m [u8], len: usize) -> Result<&'m [u8]> {
        if len > self.capacity {
            return Err(EngineError::OutOfBounds {
                address: self.address,
                len,
                memory_len: self.capacity,
            });
        }
        bytes(memory, self.address, len)
    }
}

/// The register block plus the three data buffers of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferViews {
    pub registers: RegisterView,
    pub left: SampleView,
    pub right: SampleView,
    pub output: ByteView,
}

impl BufferViews {
    /// Derive all views from the register block of an initialized handle.
    ///
    /// Every view is checked against the current memory size so that later
    /// accesses only fail if the engine misbehaves.
    pub fn derive(memory: &[u8], handle: EngineHandle) -> Result<Self> {
        let registers = RegisterView::new(handle);
        let block = registers.snapshot(memory)?;

        let input_samples = length(Register::InputSamples, block.input_samples)?;
        let output_max = length(Register::OutputBufferMaxSize, block.output_buffer_max_size)?;

        let input_bytes = input_samples
            .checked_mul(4)
            .ok_or(EngineError::InvalidRegister {
                register: Register::InputSamples,
                value: block.input_samples,
            })?;
        checked_range(block.input_buffer_left, input_bytes, memory.len())?;
        checked_range(block.input_buffer_right, input_bytes, memory.len())?;
        checked_range(block.output_buffer, output_max, memory.len())?;

        Ok(Self {
            registers,
            left: SampleView {
                address: block.input_buffer_left,
                capacity: input_samples,
            },
            right: SampleView {
                address: block.input_buffer_right,
                capacity: input_samples,
            },
            output: ByteView {
                address: block.output_buffer,
                capacity: output_max,
            },
        })
    }
}

fn length(register: Register, value: i32) -> Result<usize> {
    usize::try_from(value).map_err(|_| EngineError::InvalidRegister { register, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use etercast_engine::memory::{read_f32s, write_i32};
    use etercast_engine::{CodecEngine, ReferenceEngine};

    fn contents(memory: &[u8], view: &SampleView) -> Vec<f32> {
        read_f32s(memory, view.address, view.capacity).unwrap()
    }

    fn session(samples: i32) -> (ReferenceEngine, EngineHandle) {
        let mut engine = ReferenceEngine::new();
        let handle = engine.allocate().unwrap().unwrap();
        assert_eq!(engine.initialize(handle, 44100, 2, 9, samples, 0).unwrap(), 0);
        (engine, handle)
    }

    #[test]
    fn test_derive_sizes_from_registers() {
        let (engine, handle) = session(8);
        let views = BufferViews::derive(engine.memory(), handle).unwrap();
        assert_eq!(views.left.capacity(), 8);
        assert_eq!(views.right.capacity(), 8);
        assert_eq!(views.output.capacity(), 7210);
        assert_eq!(
            views.registers.get(engine.memory(), Register::InputChannels).unwrap(),
            2
        );
    }

    #[test]
    fn test_views_do_not_alias() {
        let (mut engine, handle) = session(4);
        let views = BufferViews::derive(engine.memory(), handle).unwrap();
        views.left.write(engine.memory_mut(), &[1.0; 4]).unwrap();
        views.right.write(engine.memory_mut(), &[-1.0; 4]).unwrap();
        assert_eq!(contents(engine.memory(), &views.left), vec![1.0; 4]);
        assert_eq!(contents(engine.memory(), &views.right), vec![-1.0; 4]);
    }

    #[test]
    fn test_write_truncates_to_capacity() {
        let (mut engine, handle) = session(4);
        let views = BufferViews::derive(engine.memory(), handle).unwrap();
        let written = views
            .left
            .write(engine.memory_mut(), &[0.5, 0.5, 0.5, 0.5, 0.5, 0.5])
            .unwrap();
        assert_eq!(written, 4);
    }

    #[test]
    fn test_partial_write_keeps_tail() {
        let (mut engine, handle) = session(4);
        let views = BufferViews::derive(engine.memory(), handle).unwrap();
        views.left.write(engine.memory_mut(), &[0.25; 4]).unwrap();
        views.left.write(engine.memory_mut(), &[1.0, 1.0]).unwrap();
        assert_eq!(
            contents(engine.memory(), &views.left),
            vec![1.0, 1.0, 0.25, 0.25]
        );
    }

    #[test]
    fn test_output_prefix_bounded_by_capacity() {
        let (engine, handle) = session(4);
        let views = BufferViews::derive(engine.memory(), handle).unwrap();
        assert!(views.output.prefix(engine.memory(), 0).unwrap().is_empty());
        assert_eq!(views.output.prefix(engine.memory(), 7205).unwrap().len(), 7205);
        assert!(views.output.prefix(engine.memory(), 7206).is_err());
    }

    #[test]
    fn test_negative_length_register_rejected() {
        let (mut engine, handle) = session(4);
        write_i32(
            engine.memory_mut(),
            handle.address() + Register::InputSamples.offset(),
            -1,
        )
        .unwrap();
        assert!(matches!(
            BufferViews::derive(engine.memory(), handle),
            Err(EngineError::InvalidRegister {
                register: Register::InputSamples,
                value: -1
            })
        ));
    }
}
