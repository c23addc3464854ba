use std::{
    any::Any,
    io::Read,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use futures_util::StreamExt;
use http_body_util::{BodyExt, StreamBody};
use hyper::{
    body::{Bytes, Frame},
    header::CONTENT_TYPE,
    Request,
};
use mime::Mime;
use routectx_kernel::{
    body::{
        converter::{BodyConverter, BodyConverters, InputMessage, TargetType},
        CachedBody,
    },
    injector::EstablishRouteScope,
    BoxResult, ContextError, GwBody, GwRequest, GwRequestExt,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).with_test_writer().try_init();
}

/// A body streaming `chunks`, counting every frame pulled from the wire.
fn counted_body(chunks: &[&'static str], reads: Arc<AtomicUsize>) -> GwBody {
    let frames: Vec<Result<Frame<Bytes>, std::io::Error>> = chunks.iter().map(|chunk| Ok(Frame::data(Bytes::from_static(chunk.as_bytes())))).collect();
    let stream = futures_util::stream::iter(frames).inspect(move |_| {
        reads.fetch_add(1, Ordering::SeqCst);
    });
    GwBody::new(StreamBody::new(stream))
}

fn matched_request(body: GwBody) -> GwRequest {
    let mut req = Request::builder().uri("/orders").header(CONTENT_TYPE, "text/plain").body(body).expect("valid request");
    req.inject(&EstablishRouteScope::new()).expect("fail to inject");
    req
}

struct TextConverter;

impl BodyConverter for TextConverter {
    fn can_read(&self, target: &TargetType, content_type: Option<&Mime>) -> bool {
        target.is::<String>() && content_type.map_or(true, |m| m.type_() == mime::TEXT)
    }
    fn read(&self, _target: &TargetType, message: InputMessage<'_>) -> BoxResult<Box<dyn Any + Send>> {
        let mut text = String::new();
        message.into_body().read_to_string(&mut text)?;
        Ok(Box::new(text))
    }
}

struct LengthConverter;

impl BodyConverter for LengthConverter {
    fn can_read(&self, target: &TargetType, _content_type: Option<&Mime>) -> bool {
        target.is::<usize>()
    }
    fn read(&self, _target: &TargetType, message: InputMessage<'_>) -> BoxResult<Box<dyn Any + Send>> {
        Ok(Box::new(message.into_body().remaining().len()))
    }
}

struct BrokenConverter;

impl BodyConverter for BrokenConverter {
    fn can_read(&self, target: &TargetType, _content_type: Option<&Mime>) -> bool {
        target.is::<u64>()
    }
    fn read(&self, _target: &TargetType, _message: InputMessage<'_>) -> BoxResult<Box<dyn Any + Send>> {
        Err("truncated payload".into())
    }
}

#[tokio::test]
async fn test_cache_body_reads_once() {
    init_tracing();
    let reads = Arc::new(AtomicUsize::new(0));
    let mut req = matched_request(counted_body(&["hello ", "gateway"], reads.clone()));

    let first = req.cache_body().await.expect("fail to cache body");
    assert_eq!(reads.load(Ordering::SeqCst), 2);
    let second = req.cache_body().await.expect("fail to cache body");
    assert_eq!(reads.load(Ordering::SeqCst), 2);
    assert_eq!(first, second);
    assert_eq!(first.bytes(), &Bytes::from_static(b"hello gateway"));
    assert_eq!(req.cached_body(), Some(first));

    // the backend still receives the whole body
    let forwarded = std::mem::take(req.body_mut()).collect().await.expect("replayable").to_bytes();
    assert_eq!(forwarded, Bytes::from_static(b"hello gateway"));
}

#[tokio::test]
async fn test_cache_body_survives_restore() {
    init_tracing();
    let mut req = matched_request(GwBody::full("kept"));
    let snapshot = req.attributes_mut().snapshot();
    req.cache_body().await.expect("fail to cache body");
    req.attributes_mut().restore(snapshot);
    assert_eq!(req.cached_body(), Some(CachedBody::new("kept")));
}

#[tokio::test]
async fn test_cache_body_read_failure() {
    init_tracing();
    let frames: Vec<Result<Frame<Bytes>, std::io::Error>> = vec![
        Ok(Frame::data(Bytes::from_static(b"partial"))),
        Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset")),
    ];
    let mut req = matched_request(GwBody::new(StreamBody::new(futures_util::stream::iter(frames))));
    let result = req.cache_body().await;
    assert!(matches!(result, Err(ContextError::BodyRead(_))));
    assert!(req.cached_body().is_none());
}

#[tokio::test]
async fn test_cache_body_read_failure_is_final() {
    init_tracing();
    let frames: Vec<Result<Frame<Bytes>, std::io::Error>> = vec![
        Ok(Frame::data(Bytes::from_static(b"partial"))),
        Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset")),
    ];
    let mut req = matched_request(GwBody::new(StreamBody::new(futures_util::stream::iter(frames))));
    assert!(matches!(req.cache_body().await, Err(ContextError::BodyRead(_))));
    match req.cache_body().await {
        Err(ContextError::BodyRead(e)) => assert!(e.to_string().contains("connection reset")),
        other => panic!("expected the read failure again, got {other:?}"),
    }
    assert!(req.cached_body().is_none());
    assert!(!req.body().is_dumped());
    // the backend sees the failure, not an empty body
    assert!(req.into_body().collect().await.is_err());
}

#[tokio::test]
async fn test_cache_body_requires_route_scope() {
    init_tracing();
    let reads = Arc::new(AtomicUsize::new(0));
    let mut req = Request::builder().uri("/orders").body(counted_body(&["untouched"], reads.clone())).expect("valid request");
    assert!(matches!(req.cache_body().await, Err(ContextError::MissingGatewayAttributes)));
    assert_eq!(reads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_read_body_many_types() {
    init_tracing();
    let reads = Arc::new(AtomicUsize::new(0));
    let mut req = matched_request(counted_body(&["twelve bytes"], reads.clone()));
    req.inject(&BodyConverters::builder().converter(TextConverter).converter(LengthConverter).converter(BrokenConverter).build()).expect("fail to inject");

    let text = req.cache_and_read_body::<String>().await.expect("fail to read");
    assert_eq!(text.as_deref(), Some("twelve bytes"));
    let len = req.cache_and_read_body::<usize>().await.expect("fail to read");
    assert_eq!(len, Some(12));
    assert_eq!(reads.load(Ordering::SeqCst), 1);

    // no converter for this type is not an error
    let body = req.cached_body().expect("cached");
    assert_eq!(req.read_body::<Vec<u8>>(&body).expect("no error"), None);
    assert!(matches!(req.read_body::<u64>(&body), Err(ContextError::BodyConvert(_))));
}

#[tokio::test]
async fn test_read_body_without_converters() {
    init_tracing();
    let mut req = matched_request(GwBody::full("text"));
    let body = req.cache_body().await.expect("fail to cache body");
    assert!(matches!(req.read_body::<String>(&body), Err(ContextError::MissingExtension("BodyConverters"))));
}
