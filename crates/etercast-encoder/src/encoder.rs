//! Encoder session: lifecycle, state machine and per-call protocol.

use crate::error::{EncoderError, Result};
use crate::options::EncoderOptions;
use crate::views::BufferViews;
use etercast_engine::{CodecEngine, EngineHandle, Register, RegisterBlock};

/// Session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderState {
    /// Capable of encoding frames.
    Running,
    /// Closed by a successful `close`.
    Closed,
    /// A failure occurred. Terminal.
    Errored,
}

/// One engine-side encoder and the views onto its buffers.
///
/// The session is single-owner and not internally synchronized. Every
/// failure moves it to [`EncoderState::Errored`] permanently; construct a new
/// session to continue.
///
/// Dropping a running session does **not** tear down the engine-side
/// encoder. Call [`Encoder::close`] to release it.
///
/// # Example
/// ```
/// use etercast_encoder::{Encoder, EncoderOptions};
/// use etercast_engine::ReferenceEngine;
///
/// let options = EncoderOptions::mono(44100).with_samples(1152);
/// let mut encoder = Encoder::new(ReferenceEngine::new(), options)?;
///
/// let mut mp3 = encoder.encode_mono(&[0.0; 1152])?;
/// mp3.extend(encoder.flush()?);
/// encoder.close()?;
/// # Ok::<(), etercast_encoder::EncoderError>(())
/// ```
pub struct Encoder<E: CodecEngine> {
    engine: E,
    state: EncoderState,
    last_error: Option<EncoderError>,
    handle: Option<EngineHandle>,
    views: Option<BufferViews>,
}

impl<E: CodecEngine> Encoder<E> {
    /// Allocate and initialize an engine-side encoder.
    ///
    /// Fails without returning a session if the engine cannot allocate or
    /// rejects the options. A handle whose initialization failed is abandoned:
    /// the engine cannot tear down a partially initialized structure.
    pub fn new(mut engine: E, options: EncoderOptions) -> Result<Self> {
        let [sample_rate, num_channels, quality, samples, mode] = options.engine_args()?;

        let handle = engine
            .allocate()?
            .ok_or(EncoderError::AllocationFailed)?;

        let code = engine.initialize(handle, sample_rate, num_channels, quality, samples, mode)?;
        if code < 0 {
            let err = EncoderError::from_code(code);
            tracing::warn!("Encoder initialization failed for {}: {}", handle, err);
            return Err(err);
        }

        let views = BufferViews::derive(engine.memory(), handle)?;
        tracing::debug!(
            "Encoder {} running: {} Hz, {} ch, {} samples/call, {} byte output",
            handle,
            sample_rate,
            num_channels,
            views.left.capacity(),
            views.output.capacity()
        );

        Ok(Self {
            engine,
            state: EncoderState::Running,
            last_error: None,
            handle: Some(handle),
            views: Some(views),
        })
    }

    pub fn state(&self) -> EncoderState {
        self.state
    }

    /// Most recent error returned by a failing call.
    pub fn last_error(&self) -> Option<&EncoderError> {
        self.last_error.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.state == EncoderState::Running
    }

    pub fn is_closed(&self) -> bool {
        self.state == EncoderState::Closed
    }

    pub fn is_errored(&self) -> bool {
        self.state == EncoderState::Errored
    }

    /// Encode one block of samples.
    ///
    /// `left` supplies the sample count; `None` encodes zero samples, which
    /// flushes the engine's pending frames. `right` must match `left` in
    /// length. Returns an owned copy of exactly the bytes the engine produced
    /// for this call.
    pub fn encode(&mut self, left: Option<&[f32]>, right: Option<&[f32]>) -> Result<Vec<u8>> {
        let (handle, views) = self.running()?;

        let mut samples = 0;
        if let Some(left) = left {
            samples = left.len();
            if let Some(right) = right {
                if right.len() != samples {
                    return Err(self.fail(EncoderError::ChannelLengthMismatch {
                        left: samples,
                        right: right.len(),
                    }));
                }
            }
        }

        let code = self.encode_call(handle, &views, left, right, samples);
        let bytes = code.and_then(|code| {
            if code < 0 {
                return Err(EncoderError::from_code(code));
            }
            let size = views
                .registers
                .get(self.engine.memory(), Register::OutputBufferSize)?;
            let size = usize::try_from(size).map_err(|_| {
                etercast_engine::EngineError::InvalidRegister {
                    register: Register::OutputBufferSize,
                    value: size,
                }
            })?;
            Ok(views.output.prefix(self.engine.memory(), size)?.to_vec())
        });

        match bytes {
            Ok(bytes) => {
                tracing::trace!(
                    "Encoder {} consumed {} samples, produced {} bytes",
                    handle,
                    samples,
                    bytes.len()
                );
                Ok(bytes)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Encode a mono block (or the left channel of a stereo session).
    pub fn encode_mono(&mut self, samples: &[f32]) -> Result<Vec<u8>> {
        self.encode(Some(samples), None)
    }

    pub fn encode_stereo(&mut self, left: &[f32], right: &[f32]) -> Result<Vec<u8>> {
        self.encode(Some(left), Some(right))
    }

    /// Emit the frames still buffered inside the engine.
    pub fn flush(&mut self) -> Result<Vec<u8>> {
        self.encode(None, None)
    }

    /// Release the engine-side encoder. Not idempotent: closing a session
    /// that is not running is a protocol violation.
    pub fn close(&mut self) -> Result<()> {
        let (handle, _) = self.running()?;

        let result = match self.engine.destroy(handle) {
            Ok(code) if code < 0 => Err(EncoderError::from_code(code)),
            Ok(_) => Ok(()),
            Err(err) => Err(err.into()),
        };
        // The engine may have freed the buffers even on failure.
        self.views = None;
        self.handle = None;

        match result {
            Ok(()) => {
                self.state = EncoderState::Closed;
                tracing::debug!("Encoder {} closed", handle);
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Borrow the bytes produced by the last `encode` call.
    ///
    /// The slice lives in engine memory and is overwritten by the next call.
    /// Fails with [`EncoderError::AlreadyClosed`] when the session is not
    /// running; unlike `encode`, this does not change the session state.
    pub fn last_output(&self) -> Result<&[u8]> {
        let views = match (self.state, self.views.as_ref()) {
            (EncoderState::Running, Some(views)) => views,
            _ => return Err(EncoderError::AlreadyClosed),
        };
        let memory = self.engine.memory();
        let size = views.registers.get(memory, Register::OutputBufferSize)?;
        Ok(views.output.prefix(memory, usize::try_from(size).unwrap_or(0))?)
    }

    /// Snapshot of the register block, or `None` once views are invalid.
    pub fn registers(&self) -> Option<RegisterBlock> {
        let views = self.views.as_ref().filter(|_| self.is_running())?;
        views.registers.snapshot(self.engine.memory()).ok()
    }

    fn register(&self, register: Register) -> Option<i32> {
        let views = self.views.as_ref().filter(|_| self.is_running())?;
        views.registers.get(self.engine.memory(), register).ok()
    }

    /// Bytes produced by the last `encode` call.
    pub fn output_buffer_size(&self) -> Option<i32> {
        self.register(Register::OutputBufferSize)
    }

    pub fn output_buffer_max_size(&self) -> Option<i32> {
        self.register(Register::OutputBufferMaxSize)
    }

    pub fn output_sample_rate(&self) -> Option<i32> {
        self.register(Register::OutputSampleRate)
    }

    /// kbps in CBR mode, the VBR quality level otherwise.
    pub fn output_quality(&self) -> Option<i32> {
        self.register(Register::OutputQuality)
    }

    pub fn input_samples(&self) -> Option<i32> {
        self.register(Register::InputSamples)
    }

    pub fn input_sample_rate(&self) -> Option<i32> {
        self.register(Register::InputSampleRate)
    }

    /// 1 (mono) or 2 (stereo).
    pub fn input_channels(&self) -> Option<i32> {
        self.register(Register::InputChannels)
    }

    /// The engine this session runs on.
    ///
    /// To host successive sessions on one engine, pass `&mut engine` to
    /// [`Encoder::new`] instead of the engine itself.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Handle and views of a running session, or the protocol violation.
    fn running(&mut self) -> Result<(EngineHandle, BufferViews)> {
        match (self.state, self.handle, self.views) {
            (EncoderState::Running, Some(handle), Some(views)) => Ok((handle, views)),
            _ => Err(self.fail(EncoderError::AlreadyClosed)),
        }
    }

    fn encode_call(
        &mut self,
        handle: EngineHandle,
        views: &BufferViews,
        left: Option<&[f32]>,
        right: Option<&[f32]>,
        samples: usize,
    ) -> Result<i32> {
        let memory = self.engine.memory_mut();
        if let Some(left) = left {
            views.left.write(memory, left)?;
            if let Some(right) = right {
                views.right.write(memory, right)?;
            }
        }
        // Oversized blocks are the engine's to reject (TooManyInputSamples).
        let count = i32::try_from(samples).unwrap_or(i32::MAX);
        Ok(self.engine.encode_frame(handle, count)?)
    }

    /// Enter `Errored`, record the error, and hand it back.
    fn fail(&mut self, err: EncoderError) -> EncoderError {
        tracing::warn!("Encoder {:?} -> Errored: {}", self.state, err);
        self.state = EncoderState::Errored;
        self.views = None;
        self.last_error = Some(err.clone());
        err
    }
}

impl<E: CodecEngine> Drop for Encoder<E> {
    fn drop(&mut self) {
        if self.state == EncoderState::Running {
            if let Some(handle) = self.handle {
                tracing::warn!(
                    "Encoder {} dropped without close; engine-side state leaked",
                    handle
                );
            }
        }
    }
}
