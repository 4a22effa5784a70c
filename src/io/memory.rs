use bytes::{Buf, Bytes};
use std::io::Cursor;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// Shared view of the bytes written into a [`MemoryStream`].
#[derive(Debug, Clone, Default)]
pub struct MemorySink(Arc<Mutex<Vec<u8>>>);

impl MemorySink {
    pub fn contents(&self) -> Vec<u8> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn append(&self, data: &[u8]) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(data);
    }
}

/// In-memory transport: reads drain a fixed content and then report
/// end-of-data, writes are collected into a [`MemorySink`].
#[derive(Debug)]
pub struct MemoryStream {
    data: Cursor<Bytes>,
    sink: MemorySink,
    shutdown: bool,
}

impl MemoryStream {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self::with_sink(data, MemorySink::default())
    }

    /// A stream whose writes land in an existing sink.
    pub fn with_sink(data: impl Into<Bytes>, sink: MemorySink) -> Self {
        Self {
            data: Cursor::new(data.into()),
            sink,
            shutdown: false,
        }
    }

    pub fn empty() -> Self {
        Self::new(Bytes::new())
    }

    pub fn sink(&self) -> MemorySink {
        self.sink.clone()
    }

    /// Bytes not read yet.
    pub fn remaining(&self) -> usize {
        self.data.remaining()
    }
}

impl AsyncRead for MemoryStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.data).poll_read(cx, buf)
    }
}

impl AsyncWrite for MemoryStream {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<Result<usize, std::io::Error>> {
        if self.shutdown {
            return Poll::Ready(Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "memory stream shut down",
            )));
        }
        self.sink.append(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), std::io::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Result<(), std::io::Error>> {
        self.shutdown = true;
        Poll::Ready(Ok(()))
    }
}
