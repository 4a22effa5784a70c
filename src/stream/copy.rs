use super::{Inner, ReadRequest, Stream};
use crate::{buffer::Buffer, codec, error::CopyError};
use std::sync::Arc;
use tracing::{debug, trace};

/// Copy loop between two streams, built only from their read and write
/// operations:
/// - reads at most `chunk_size` bytes per step, never more than the bytes
///   still allowed under `max_bytes`
/// - waits for each write before issuing the next read
/// - stops on end-of-data or when the limit is reached
/// - on failure reports the bytes already written alongside the error
///
/// The operation drives both transports directly; the caller holds the
/// source's read slot and the target's write slot while it runs.
pub(crate) struct CopyOperation {
    src: Arc<Inner>,
    dst: Arc<Inner>,
    max_bytes: Option<u64>,
    chunk_size: usize,
    trace_chunks: bool,
}

impl CopyOperation {
    pub fn new(src: &Stream, dst: &Stream) -> Self {
        let options = src.options();
        Self {
            chunk_size: options.chunk_size,
            trace_chunks: options.trace_chunks,
            src: src.inner.clone(),
            dst: dst.inner.clone(),
            max_bytes: None,
        }
    }

    /// Set maximum bytes to copy
    pub fn max_bytes(mut self, max: u64) -> Self {
        self.max_bytes = Some(max);
        self
    }

    #[cfg(test)]
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    pub async fn execute(self) -> Result<u64, CopyError> {
        let mut total_copied = 0u64;
        loop {
            let remaining = self.max_bytes.map(|max| max.saturating_sub(total_copied));
            let to_read = match remaining {
                Some(0) => break, // Reached limit
                Some(r) => r.min(self.chunk_size as u64) as usize,
                None => self.chunk_size,
            };

            let chunk: Buffer = self
                .src
                .guarded(self.src.read_transport(ReadRequest::UpTo(to_read)))
                .await
                .map_err(|e| CopyError::new(total_copied, e))?
                .into();
            if chunk.is_empty() {
                break; // EOF
            }

            let len = chunk.len() as u64;
            if self.trace_chunks {
                trace!(
                    src = self.src.id,
                    dst = self.dst.id,
                    "chunk {}",
                    codec::hex::encode(&chunk)
                );
            }
            self.dst
                .guarded(self.dst.write_transport(chunk))
                .await
                .map_err(|e| CopyError::new(total_copied, e))?;
            total_copied += len;
        }
        debug!(
            src = self.src.id,
            dst = self.dst.id,
            "copied {} bytes",
            total_copied
        );
        Ok(total_copied)
    }
}
