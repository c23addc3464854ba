use std::io::{self, BufRead, Read};

use bytes::{buf::Reader, Buf};
use hyper::body::Bytes;

/// The request body, read once from the wire and kept for the rest of the request.
///
/// The bytes are immutable. Each consumer asks for its own [`BodyReader`], so reading never
/// disturbs another consumer's position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedBody(Bytes);

impl CachedBody {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }
    /// A fresh cursor positioned at the start of the body.
    pub fn reader(&self) -> BodyReader {
        BodyReader(self.0.clone().reader())
    }
    pub fn bytes(&self) -> &Bytes {
        &self.0
    }
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CachedBody {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// An independent read cursor over a [`CachedBody`].
#[derive(Debug)]
pub struct BodyReader(Reader<Bytes>);

impl BodyReader {
    /// The bytes not read yet.
    pub fn remaining(&self) -> &[u8] {
        self.0.get_ref().chunk()
    }
}

impl Read for BodyReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl BufRead for BodyReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.0.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.0.consume(amt)
    }
}
