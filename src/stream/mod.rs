//! Byte streams with blocking and handler-driven calling conventions
//!
//! Every operation is issued once, as a runtime task driving the transport.
//! The task hands its result to a [`Completion`](pending::Completion):
//! - the blocking forms (`read`, `write`, `copy_to`) suspend the caller on a
//!   one-shot channel scoped to the call and resume it with the result
//! - the async forms (`async_read`, `async_write`, `async_copy_to`) return at
//!   once and report through the handler registered for that kind, or through
//!   the error handler on failure
//!
//! A stream allows one pending operation per kind; a second one of the same
//! kind is rejected with `OperationInProgress` instead of being queued.

mod copy;
mod handlers;
mod pending;

pub use handlers::Handler;

use crate::{
    buffer::Buffer,
    config::StreamOptions,
    error::{CopyError, ErrorEvent, OpKind, Result, StreamError},
    io::{BoxedIO, IOStream, pipe},
};
use bytes::BytesMut;
use copy::CopyOperation;
use handlers::Handlers;
use pending::{Completion, InFlight, OpFlags};
use std::{
    fmt::{self, Debug},
    future::Future,
    sync::{
        Arc, Weak,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt, ReadHalf, WriteHalf},
    sync::Mutex,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Byte count meaning "one default-sized chunk" for `read`, and "no limit"
/// for `copy_to`.
pub const DEFAULT_BYTES: i32 = -1;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy)]
enum ReadRequest {
    /// A single transport read of at most n bytes.
    UpTo(usize),
    /// Read until n bytes are collected or the transport reports end-of-data.
    Exact(usize),
}

struct Inner {
    id: u64,
    options: StreamOptions,
    reader: Mutex<ReadHalf<BoxedIO>>,
    writer: Mutex<WriteHalf<BoxedIO>>,
    flags: Arc<OpFlags>,
    handlers: Arc<Handlers>,
    closed: AtomicBool,
    token: CancellationToken,
}

impl Inner {
    // Races a transport operation against close.
    async fn guarded<T>(&self, op: impl Future<Output = std::io::Result<T>>) -> Result<T> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(StreamError::Closed),
            ret = op => ret.map_err(StreamError::from),
        }
    }

    async fn read_transport(&self, req: ReadRequest) -> std::io::Result<BytesMut> {
        let (want, fill) = match req {
            ReadRequest::UpTo(n) => (n, false),
            ReadRequest::Exact(n) => (n, true),
        };
        if want == 0 {
            return Ok(BytesMut::new());
        }
        let mut reader = self.reader.lock().await;
        let mut limited = (&mut *reader).take(want as u64);
        // grows as data arrives, so a huge request on a short transport stays small
        let mut buf = BytesMut::with_capacity(want.min(self.options.chunk_size));
        loop {
            let n = limited.read_buf(&mut buf).await?;
            if n == 0 || !fill || buf.len() >= want {
                break;
            }
        }
        Ok(buf)
    }

    async fn write_transport(&self, data: Buffer) -> std::io::Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        let mut writer = self.writer.lock().await;
        writer.write_all(&data).await?;
        writer.flush().await
    }
}

// Shared by all user-facing handles. Dropping the last one closes the stream
// so operation tasks stuck on an idle transport finish and release it.
struct Owner(Arc<Inner>);

impl Drop for Owner {
    fn drop(&mut self) {
        if !self.0.closed.swap(true, Ordering::AcqRel) {
            trace!(stream = self.0.id, "last handle dropped");
            self.0.token.cancel();
        }
    }
}

/// A stateful byte endpoint over any [`IOStream`] transport.
///
/// `Stream` is a cheap handle; clones share the transport, in-flight state
/// and handlers. All operations must be called from within a tokio runtime.
/// Once every handle is gone, pending operations complete with `Closed`.
#[derive(Clone)]
pub struct Stream {
    inner: Arc<Inner>,
    owner: Arc<Owner>,
}

/// Non-owning handle, for handlers that need to reach their own stream
/// without keeping it alive.
#[derive(Clone)]
pub struct WeakStream(Weak<Owner>);

impl WeakStream {
    pub fn upgrade(&self) -> Option<Stream> {
        self.0.upgrade().map(|owner| Stream {
            inner: owner.0.clone(),
            owner,
        })
    }
}

impl Stream {
    pub fn new<T: IOStream + 'static>(io: T) -> Self {
        Self::with_options(io, StreamOptions::default())
    }

    pub fn with_options<T: IOStream + 'static>(io: T, options: StreamOptions) -> Self {
        Self::from_boxed(Box::new(io), options)
    }

    pub fn from_boxed(io: BoxedIO, options: StreamOptions) -> Self {
        let (reader, writer) = tokio::io::split(io);
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        trace!(stream = id, "created, chunk size {}", options.chunk_size);
        let inner = Arc::new(Inner {
            id,
            options,
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
            flags: Default::default(),
            handlers: Default::default(),
            closed: AtomicBool::new(false),
            token: CancellationToken::new(),
        });
        Self {
            owner: Arc::new(Owner(inner.clone())),
            inner,
        }
    }

    /// Two streams connected through an in-memory pipe.
    pub fn pair(options: StreamOptions) -> (Stream, Stream) {
        let (a, b) = pipe(options.chunk_size.saturating_mul(8));
        (
            Self::with_options(a, options.clone()),
            Self::with_options(b, options),
        )
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn options(&self) -> &StreamOptions {
        &self.inner.options
    }

    pub fn downgrade(&self) -> WeakStream {
        WeakStream(Arc::downgrade(&self.owner))
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    pub fn is_reading(&self) -> bool {
        self.inner.flags.is_busy(OpKind::Read)
    }

    pub fn is_writing(&self) -> bool {
        self.inner.flags.is_busy(OpKind::Write)
    }

    pub fn is_copying(&self) -> bool {
        self.inner.flags.is_busy(OpKind::Copy)
    }

    /// Read from the stream, suspending the calling task until done.
    ///
    /// - `-1` performs a single transport read of at most one chunk
    /// - `n > 0` reads until `n` bytes arrived or the transport ends
    /// - `0` returns an empty buffer without touching the transport
    ///
    /// An empty buffer for a non-zero request means end-of-data.
    pub async fn read(&self, bytes: i32) -> Result<Buffer> {
        let req = self.read_request(bytes)?;
        let guard = self.begin(OpKind::Read)?;
        let (done, suspended) = Completion::suspend();
        self.spawn_read(guard, req, done);
        suspended.wait().await
    }

    /// Issue a read and return immediately. The data goes to the `on_read`
    /// handler registered at this moment; failures go to `on_error`.
    pub fn async_read(&self, bytes: i32) {
        let done = Completion::dispatch(
            OpKind::Read,
            self.inner.handlers.read(),
            self.inner.handlers.clone(),
        );
        match self.read_request(bytes) {
            Ok(req) => match self.begin(OpKind::Read) {
                Ok(guard) => self.spawn_read(guard, req, done),
                Err(e) => done.complete(Err(e)),
            },
            Err(e) => done.complete(Err(e)),
        }
    }

    /// Write `data`, suspending until the transport accepted and flushed it.
    pub async fn write(&self, data: Buffer) -> Result<()> {
        let guard = self.begin(OpKind::Write)?;
        let (done, suspended) = Completion::suspend();
        self.spawn_write(guard, data, done);
        suspended.wait().await
    }

    /// Issue a write and return immediately; completion is reported to
    /// `on_write` or `on_error`. The buffer is owned by the stream until then.
    pub fn async_write(&self, data: Buffer) {
        let done = Completion::dispatch(
            OpKind::Write,
            self.inner.handlers.write(),
            self.inner.handlers.clone(),
        );
        match self.begin(OpKind::Write) {
            Ok(guard) => self.spawn_write(guard, data, done),
            Err(e) => done.complete(Err(e)),
        }
    }

    /// Copy up to `bytes` bytes (`-1` for everything) into `target` and
    /// return the count. Stops early, without error, at end-of-data.
    ///
    /// For its whole run the copy also occupies this stream's read slot and
    /// the target's write slot, so reads here and writes there are rejected
    /// with `OperationInProgress` until it completes.
    pub async fn copy_to(&self, target: &Stream, bytes: i64) -> Result<u64, CopyError> {
        let limit = copy_limit(bytes)?;
        let guards = self.begin_copy(target)?;
        let (done, suspended) = Completion::suspend();
        self.spawn_copy(guards, target, limit, done);
        suspended.wait().await
    }

    /// Issue a copy and return immediately; the count goes to `on_copy_to`,
    /// a failure with its partial count to `on_error`.
    pub fn async_copy_to(&self, target: &Stream, bytes: i64) {
        let done = Completion::dispatch(
            OpKind::Copy,
            self.inner.handlers.copy(),
            self.inner.handlers.clone(),
        );
        match copy_limit(bytes) {
            Ok(limit) => match self.begin_copy(target) {
                Ok(guards) => self.spawn_copy(guards, target, limit, done),
                Err(e) => done.complete(Err(e.into())),
            },
            Err(e) => done.complete(Err(e.into())),
        }
    }

    pub fn on_read<F>(&self, handler: F)
    where
        F: Fn(Buffer) + Send + Sync + 'static,
    {
        if self.inner.handlers.set_read(Arc::new(handler)) {
            trace!(stream = self.id(), "read handler replaced");
        }
    }

    pub fn on_write<F>(&self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        if self.inner.handlers.set_write(Arc::new(move |()| handler())) {
            trace!(stream = self.id(), "write handler replaced");
        }
    }

    pub fn on_copy_to<F>(&self, handler: F)
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        if self.inner.handlers.set_copy(Arc::new(handler)) {
            trace!(stream = self.id(), "copy handler replaced");
        }
    }

    pub fn on_error<F>(&self, handler: F)
    where
        F: Fn(ErrorEvent) + Send + Sync + 'static,
    {
        if self.inner.handlers.set_error(Arc::new(handler)) {
            trace!(stream = self.id(), "error handler replaced");
        }
    }

    /// Close the stream. Pending operations complete with `Closed`, later
    /// ones are rejected with it, and the transport's write side is shut
    /// down. A failing shutdown is only logged. Closing twice is a no-op.
    pub async fn close(&self) -> Result<()> {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        debug!(stream = self.id(), "closing");
        self.inner.token.cancel();
        let mut writer = self.inner.writer.lock().await;
        if let Err(e) = writer.shutdown().await {
            warn!(stream = self.id(), "shutdown failed: {}", e);
        }
        Ok(())
    }

    fn read_request(&self, bytes: i32) -> Result<ReadRequest> {
        match bytes {
            DEFAULT_BYTES => Ok(ReadRequest::UpTo(self.inner.options.chunk_size)),
            n if n < DEFAULT_BYTES => Err(StreamError::invalid_argument(format!(
                "read size {} below {}",
                n, DEFAULT_BYTES
            ))),
            n => Ok(ReadRequest::Exact(n as usize)),
        }
    }

    fn begin(&self, op: OpKind) -> Result<InFlight> {
        if self.is_closed() {
            return Err(StreamError::Closed);
        }
        self.inner.flags.acquire(op)
    }

    fn begin_copy(&self, target: &Stream) -> Result<[InFlight; 3]> {
        let copy = self.begin(OpKind::Copy)?;
        let read = self.begin(OpKind::Read)?;
        let write = target.begin(OpKind::Write)?;
        Ok([copy, read, write])
    }

    fn spawn_read(&self, guard: InFlight, req: ReadRequest, done: Completion<Buffer>) {
        let inner = self.inner.clone();
        trace!(stream = inner.id, "read issued: {:?}", req);
        tokio::spawn(async move {
            let ret = inner
                .guarded(inner.read_transport(req))
                .await
                .map(Buffer::from);
            // release the slot first so the completion target may read again
            drop(guard);
            trace!(stream = inner.id, "read completed: {:?}", ret);
            done.complete(ret);
        });
    }

    fn spawn_write(&self, guard: InFlight, data: Buffer, done: Completion<()>) {
        let inner = self.inner.clone();
        trace!(stream = inner.id, "write issued: {} bytes", data.len());
        tokio::spawn(async move {
            let ret = inner.guarded(inner.write_transport(data)).await;
            drop(guard);
            trace!(stream = inner.id, "write completed: {:?}", ret);
            done.complete(ret);
        });
    }

    fn spawn_copy(
        &self,
        guards: [InFlight; 3],
        target: &Stream,
        limit: Option<u64>,
        done: Completion<u64, CopyError>,
    ) {
        let id = self.id();
        trace!(
            stream = id,
            "copy issued to {}, limit {:?}",
            target.id(),
            limit
        );
        let mut op = CopyOperation::new(self, target);
        if let Some(max) = limit {
            op = op.max_bytes(max);
        }
        tokio::spawn(async move {
            let ret = op.execute().await;
            drop(guards);
            trace!(stream = id, "copy completed: {:?}", ret);
            done.complete(ret);
        });
    }
}

fn copy_limit(bytes: i64) -> Result<Option<u64>> {
    match bytes {
        n if n == DEFAULT_BYTES as i64 => Ok(None),
        n if n < 0 => Err(StreamError::invalid_argument(format!(
            "copy limit {} below {}",
            n, DEFAULT_BYTES
        ))),
        n => Ok(Some(n as u64)),
    }
}

impl Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("id", &self.inner.id)
            .field("closed", &self.is_closed())
            .field("reading", &self.is_reading())
            .field("writing", &self.is_writing())
            .field("copying", &self.is_copying())
            .finish()
    }
}
