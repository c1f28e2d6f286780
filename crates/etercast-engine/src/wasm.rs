//! wasmtime host for a compiled `mp3.wasm` engine image.
//!
//! The image imports four `wasi_unstable` functions it never meaningfully
//! calls (it does no file I/O). They are linked as inert stubs that only
//! emit a trace event.

use std::path::Path;

use wasmtime::{Engine, Instance, Linker, Memory, Module, Store, TypedFunc};

use crate::error::{EngineError, Result};
use crate::{CodecEngine, EngineHandle};

const WASI_MODULE: &str = "wasi_unstable";

/// Engine backed by a wasmtime instance of `mp3.wasm`.
pub struct WasmEngine {
    store: Store<()>,
    memory: Memory,
    create: TypedFunc<(), u32>,
    init: TypedFunc<(u32, i32, i32, i32, i32, i32), i32>,
    encode: TypedFunc<(u32, i32), i32>,
    destroy: TypedFunc<u32, i32>,
}

impl WasmEngine {
    /// Compile and instantiate an engine image from raw bytes.
    pub fn from_bytes(wasm: &[u8]) -> Result<Self> {
        let engine = Engine::default();
        let module = Module::new(&engine, wasm)?;
        let mut linker = Linker::new(&engine);
        link_wasi_stubs(&mut linker)?;

        let mut store = Store::new(&engine, ());
        let instance = linker.instantiate(&mut store, &module)?;
        let memory = instance
            .get_memory(&mut store, "memory")
            .ok_or_else(|| EngineError::MissingExport("memory".into()))?;

        let create = typed(&instance, &mut store, "mp3_create")?;
        let init = typed(&instance, &mut store, "mp3_init")?;
        let encode = typed(&instance, &mut store, "mp3_encode")?;
        let destroy = typed(&instance, &mut store, "mp3_destroy")?;

        tracing::debug!(
            "Instantiated mp3.wasm ({} bytes linear memory)",
            memory.data_size(&store)
        );

        Ok(Self {
            store,
            memory,
            create,
            init,
            encode,
            destroy,
        })
    }

    /// Read and instantiate an engine image from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let wasm = std::fs::read(path.as_ref())?;
        Self::from_bytes(&wasm)
    }
}

fn typed<Params, Results>(
    instance: &Instance,
    store: &mut Store<()>,
    name: &str,
) -> Result<TypedFunc<Params, Results>>
where
    Params: wasmtime::WasmParams,
    Results: wasmtime::WasmResults,
{
    if instance.get_func(&mut *store, name).is_none() {
        return Err(EngineError::MissingExport(name.into()));
    }
    Ok(instance.get_typed_func::<Params, Results>(&mut *store, name)?)
}

fn link_wasi_stubs(linker: &mut Linker<()>) -> Result<()> {
    linker.func_wrap(WASI_MODULE, "fd_close", |_fd: i32| -> i32 {
        tracing::trace!("wasi stub: fd_close");
        0
    })?;
    linker.func_wrap(
        WASI_MODULE,
        "fd_seek",
        |_fd: i32, _offset: i64, _whence: i32, _newoffset: i32| -> i32 {
            tracing::trace!("wasi stub: fd_seek");
            0
        },
    )?;
    linker.func_wrap(
        WASI_MODULE,
        "fd_write",
        |_fd: i32, _iovs: i32, _iovs_len: i32, _nwritten: i32| -> i32 {
            tracing::trace!("wasi stub: fd_write");
            0
        },
    )?;
    linker.func_wrap(WASI_MODULE, "proc_exit", |_code: i32| {
        tracing::trace!("wasi stub: proc_exit");
    })?;
    Ok(())
}

impl CodecEngine for WasmEngine {
    fn allocate(&mut self) -> Result<Option<EngineHandle>> {
        let address = self.create.call(&mut self.store, ())?;
        Ok(EngineHandle::new(address))
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
        Ok(self.init.call(
            &mut self.store,
            (
                handle.address(),
                sample_rate,
                num_channels,
                quality,
                samples,
                mode,
            ),
        )?)
    }

    fn encode_frame(&mut self, handle: EngineHandle, sample_count: i32) -> Result<i32> {
        Ok(self
            .encode
            .call(&mut self.store, (handle.address(), sample_count))?)
    }

    fn destroy(&mut self, handle: EngineHandle) -> Result<i32> {
        Ok(self.destroy.call(&mut self.store, handle.address())?)
    }

    fn memory(&self) -> &[u8] {
        self.memory.data(&self.store)
    }

    fn memory_mut(&mut self) -> &mut [u8] {
        self.memory.data_mut(&mut self.store)
    }
}
