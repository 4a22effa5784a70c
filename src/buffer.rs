use bytes::{Bytes, BytesMut};
use std::fmt::{self, Debug};
use std::ops::Deref;

/// Immutable, fixed-length run of bytes exchanged by stream operations.
///
/// Cloning is cheap and shares the underlying storage, so a buffer handed to
/// `write` can be kept by the caller only through an explicit clone.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Buffer(Bytes);

impl Buffer {
    pub fn new() -> Self {
        Self(Bytes::new())
    }

    pub fn copy_from_slice(data: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(data))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl Deref for Buffer {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Bytes> for Buffer {
    fn from(b: Bytes) -> Self {
        Self(b)
    }
}

impl From<BytesMut> for Buffer {
    fn from(b: BytesMut) -> Self {
        Self(b.freeze())
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(v: Vec<u8>) -> Self {
        Self(Bytes::from(v))
    }
}

impl From<&'static [u8]> for Buffer {
    fn from(s: &'static [u8]) -> Self {
        Self(Bytes::from_static(s))
    }
}

impl<const N: usize> From<&'static [u8; N]> for Buffer {
    fn from(s: &'static [u8; N]) -> Self {
        Self(Bytes::from_static(s))
    }
}

impl From<&'static str> for Buffer {
    fn from(s: &'static str) -> Self {
        Self(Bytes::from_static(s.as_bytes()))
    }
}

impl From<Buffer> for Bytes {
    fn from(b: Buffer) -> Self {
        b.0
    }
}

impl PartialEq<[u8]> for Buffer {
    fn eq(&self, other: &[u8]) -> bool {
        self.0 == other
    }
}

impl PartialEq<&[u8]> for Buffer {
    fn eq(&self, other: &&[u8]) -> bool {
        self.0 == *other
    }
}

impl<const N: usize> PartialEq<[u8; N]> for Buffer {
    fn eq(&self, other: &[u8; N]) -> bool {
        self.0 == other[..]
    }
}

impl<const N: usize> PartialEq<&[u8; N]> for Buffer {
    fn eq(&self, other: &&[u8; N]) -> bool {
        self.0 == other[..]
    }
}

// Long buffers are abbreviated to keep log lines readable.
const DEBUG_PREVIEW: usize = 32;

impl Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = self.len().min(DEBUG_PREVIEW);
        write!(f, "Buffer({}, {}", self.len(), hex::encode(&self.0[..shown]))?;
        if shown < self.len() {
            write!(f, "..")?;
        }
        write!(f, ")")
    }
}
