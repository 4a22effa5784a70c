//! StreamKit-RS Library
//!
//! Byte streams over arbitrary async transports, usable either by awaiting
//! each operation or by registering handlers and issuing operations that
//! report back through them, plus a bounded stream-to-stream copy.

pub mod buffer;
pub mod cli;
pub mod codec;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod io;
pub mod stream;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export commonly used types for convenience
pub use buffer::Buffer;
pub use config::{Config, StreamOptions};
pub use error::{CopyError, ErrorEvent, OpKind, StreamError};
pub use stream::{DEFAULT_BYTES, Stream, WeakStream};
