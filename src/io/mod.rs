//! Transport layer for streams
//!
//! This module provides:
//! - `IOStream` trait for type-erased async transports
//! - `MemoryStream` for in-memory transports with an observable write sink
//! - `pipe()` for connected in-memory transport pairs

mod memory;
mod stream;

pub use memory::{MemorySink, MemoryStream};
pub use stream::{BoxedIO, IOStream, pipe};
