use crate::{
    buffer::Buffer,
    error::{Result, StreamError},
};

/// Lowercase hex rendering of `data`.
pub fn encode(data: &Buffer) -> String {
    ::hex::encode(data)
}

/// Parse hex text (either case) into a buffer.
pub fn decode(text: &str) -> Result<Buffer> {
    ::hex::decode(text)
        .map(Buffer::from)
        .map_err(|e| StreamError::invalid_argument(format!("hex: {}", e)))
}
