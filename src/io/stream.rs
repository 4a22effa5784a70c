use tokio::io::{AsyncRead, AsyncWrite, DuplexStream};

/// A type-erased transport a [`Stream`](crate::Stream) drives.
///
/// Any `AsyncRead + AsyncWrite` endpoint qualifies: files, sockets, pipes or
/// in-memory buffers. The stream layer only relies on these two traits, so
/// transports never see handlers, in-flight flags or buffers.
pub trait IOStream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T> IOStream for T where T: AsyncRead + AsyncWrite + Send + Unpin {}

pub type BoxedIO = Box<dyn IOStream>;

/// Two connected in-memory transports; bytes written into one are read from
/// the other. `capacity` bounds the bytes in flight per direction.
pub fn pipe(capacity: usize) -> (DuplexStream, DuplexStream) {
    tokio::io::duplex(capacity)
}
