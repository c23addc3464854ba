use std::{
    error::Error,
    fmt,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use http_body_util::{combinators::BoxBody, BodyExt, Empty, Full};
use hyper::body::{Body, Bytes, Frame};

use crate::{utils::never, BoxError};

mod cached;
pub use cached::*;
pub mod converter;

/// The request body of the gateway.
///
/// A body is either streaming from the wire, or dumped: fully buffered in memory and replayable.
#[derive(Debug)]
pub struct GwBody {
    pub(crate) body: BoxBody<Bytes, BoxError>,
    pub(crate) dump: Option<Bytes>,
}

impl Default for GwBody {
    fn default() -> Self {
        Self::empty()
    }
}

impl Body for GwBody {
    type Data = Bytes;
    type Error = BoxError;

    fn poll_frame(mut self: std::pin::Pin<&mut Self>, cx: &mut std::task::Context<'_>) -> std::task::Poll<Option<Result<hyper::body::Frame<Self::Data>, Self::Error>>> {
        let mut pinned = std::pin::pin!(&mut self.body);
        pinned.as_mut().poll_frame(cx)
    }

    fn is_end_stream(&self) -> bool {
        self.body.is_end_stream()
    }

    fn size_hint(&self) -> hyper::body::SizeHint {
        self.body.size_hint()
    }
}

impl GwBody {
    pub fn new<E>(body: impl Body<Data = Bytes, Error = E> + Send + Sync + 'static) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            body: BoxBody::new(body.map_err(BoxError::from)),
            dump: None,
        }
    }
    pub fn new_boxed_error(body: impl Body<Data = Bytes, Error = BoxError> + Send + Sync + 'static) -> Self {
        Self {
            body: BoxBody::new(body),
            dump: None,
        }
    }
    pub fn empty() -> Self {
        Self {
            body: BoxBody::new(Empty::new().map_err(never)),
            dump: Some(Bytes::new()),
        }
    }
    /// A body whose read already failed, polling it yields `failure` once.
    pub fn failed(failure: BodyReadFailure) -> Self {
        Self {
            body: BoxBody::new(FailedBody(Some(failure))),
            dump: None,
        }
    }
    pub fn full(data: impl Into<Bytes>) -> Self {
        let bytes = data.into();
        Self {
            body: BoxBody::new(Full::new(bytes.clone()).map_err(never)),
            dump: Some(bytes),
        }
    }
    pub fn is_dumped(&self) -> bool {
        self.dump.is_some()
    }
    /// Read the whole body into memory, the returned body is replayable.
    ///
    /// # Errors
    /// If reading the inner body fails, the inner body is consumed anyway.
    pub async fn dump(self) -> Result<Self, BoxError> {
        if self.dump.is_some() {
            return Ok(self);
        }
        let bytes = self.body.collect().await?.to_bytes();
        Ok(Self::full(bytes))
    }
    pub fn dump_clone(&self) -> Option<Self> {
        self.dump.as_ref().map(|bytes| Self::full(bytes.clone()))
    }
    pub fn get_dumped(&self) -> Option<&Bytes> {
        self.dump.as_ref()
    }
}

/// The request body could not be read, it is gone for the rest of the request.
#[derive(Debug, Clone)]
pub struct BodyReadFailure(Arc<dyn Error + Send + Sync>);

impl BodyReadFailure {
    pub fn new(error: BoxError) -> Self {
        Self(Arc::from(error))
    }
}

impl fmt::Display for BodyReadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for BodyReadFailure {}

struct FailedBody(Option<BodyReadFailure>);

impl Body for FailedBody {
    type Data = Bytes;
    type Error = BoxError;

    fn poll_frame(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        Poll::Ready(self.get_mut().0.take().map(|failure| Err(BoxError::from(failure))))
    }

    fn is_end_stream(&self) -> bool {
        self.0.is_none()
    }
}
