use std::fmt::{self, Display};

/// Kind of a stream operation. Each kind owns one in-flight slot per stream
/// and one handler slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Read,
    Write,
    Copy,
}

impl Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
            Self::Copy => write!(f, "copy"),
        }
    }
}

#[derive(Debug)]
pub enum StreamError {
    /// Byte count or limit below the `-1` sentinel, or malformed codec input.
    InvalidArgument(String),
    /// An operation of the same kind is already pending on the stream.
    OperationInProgress(OpKind),
    /// Transport failure.
    Io(std::io::Error),
    /// The stream was closed before or while the operation ran.
    Closed,
}

impl StreamError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::OperationInProgress(_))
    }
}

impl Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            Self::OperationInProgress(kind) => write!(f, "{} operation already in progress", kind),
            Self::Io(e) => write!(f, "io failure: {}", e),
            Self::Closed => write!(f, "stream closed"),
        }
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StreamError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Failure of a copy, together with the bytes already delivered to the
/// target before it happened.
#[derive(Debug)]
pub struct CopyError {
    pub copied: u64,
    pub error: StreamError,
}

impl CopyError {
    pub fn new(copied: u64, error: StreamError) -> Self {
        Self { copied, error }
    }
}

impl Display for CopyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "copy failed after {} bytes: {}", self.copied, self.error)
    }
}

impl std::error::Error for CopyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

// Errors raised before any byte moved.
impl From<StreamError> for CopyError {
    fn from(error: StreamError) -> Self {
        Self { copied: 0, error }
    }
}

/// Payload of the `onerror` handler.
#[derive(Debug)]
pub struct ErrorEvent {
    pub op: OpKind,
    pub error: StreamError,
    /// Bytes copied before the failure; only set for copy operations.
    pub copied: Option<u64>,
}

impl Display for ErrorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.copied {
            Some(n) => write!(f, "{} failed after {} bytes: {}", self.op, n, self.error),
            None => write!(f, "{} failed: {}", self.op, self.error),
        }
    }
}

/// Converts an operation failure into the event delivered to `onerror`.
pub trait IntoErrorEvent {
    fn into_event(self, op: OpKind) -> ErrorEvent;
}

impl IntoErrorEvent for StreamError {
    fn into_event(self, op: OpKind) -> ErrorEvent {
        ErrorEvent {
            op,
            error: self,
            copied: None,
        }
    }
}

impl IntoErrorEvent for CopyError {
    fn into_event(self, op: OpKind) -> ErrorEvent {
        ErrorEvent {
            op,
            error: self.error,
            copied: Some(self.copied),
        }
    }
}

pub type Result<T, E = StreamError> = std::result::Result<T, E>;
