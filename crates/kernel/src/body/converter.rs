//! Pluggable body converters.
//!
//! A [`BodyConverter`] decodes the cached body into some type. Converters are consulted in the order
//! they were registered in [`BodyConverters`], the first one which [can read](BodyConverter::can_read)
//! the requested type under the request's content type wins.
use std::{
    any::{Any, TypeId},
    fmt,
    sync::Arc,
};

use hyper::{header::CONTENT_TYPE, HeaderMap};
use mime::Mime;

use crate::{error::ContextError, injector::Inject, BoxResult, GwRequest};

use super::{BodyReader, CachedBody};

/// The type a body should be decoded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetType {
    id: TypeId,
    name: &'static str,
}

impl TargetType {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }
    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
    pub const fn id(&self) -> TypeId {
        self.id
    }
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

/// What a converter reads from: the request headers and a cursor at the start of the cached body.
#[derive(Debug)]
pub struct InputMessage<'a> {
    headers: &'a HeaderMap,
    body: BodyReader,
}

impl<'a> InputMessage<'a> {
    pub fn new(headers: &'a HeaderMap, body: BodyReader) -> Self {
        Self { headers, body }
    }
    pub fn headers(&self) -> &'a HeaderMap {
        self.headers
    }
    pub fn body(&mut self) -> &mut BodyReader {
        &mut self.body
    }
    pub fn into_body(self) -> BodyReader {
        self.body
    }
}

pub trait BodyConverter: Send + Sync + 'static {
    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
    /// Whether this converter can decode `target`.
    ///
    /// `content_type` is `None` when the request declares no (or an unparsable) content type, which
    /// leaves the decision to the converter.
    fn can_read(&self, target: &TargetType, content_type: Option<&Mime>) -> bool;
    /// Decode the body into a value of `target`'s type.
    /// # Errors
    /// If the body can't be decoded.
    fn read(&self, target: &TargetType, message: InputMessage<'_>) -> BoxResult<Box<dyn Any + Send>>;
}

/// The parsed content type of a request, `None` if absent or not a valid mime type.
pub fn content_type(headers: &HeaderMap) -> Option<Mime> {
    headers.get(CONTENT_TYPE)?.to_str().ok()?.parse::<Mime>().ok()
}

/// An ordered, shared list of converters, attached to requests as an extension.
#[derive(Clone)]
pub struct BodyConverters {
    converters: Arc<[Arc<dyn BodyConverter>]>,
}

impl Default for BodyConverters {
    fn default() -> Self {
        Self { converters: Arc::from(Vec::new()) }
    }
}

impl fmt::Debug for BodyConverters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.converters.iter().map(|c| c.name())).finish()
    }
}

impl BodyConverters {
    pub fn builder() -> BodyConvertersBuilder {
        BodyConvertersBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// Find the first converter able to read `target` under `content_type`.
    pub fn select(&self, target: &TargetType, content_type: Option<&Mime>) -> Option<&Arc<dyn BodyConverter>> {
        self.converters.iter().find(|c| c.can_read(target, content_type))
    }

    /// Decode `body` into `T`.
    ///
    /// Returns `Ok(None)` if no converter can read `T` under the content type in `headers`.
    ///
    /// # Errors
    /// If the selected converter fails, or hands back a value which is not a `T`.
    pub fn read<T: Any>(&self, headers: &HeaderMap, body: &CachedBody) -> Result<Option<T>, ContextError> {
        let target = TargetType::of::<T>();
        let content_type = content_type(headers);
        let Some(converter) = self.select(&target, content_type.as_ref()) else {
            tracing::debug!(target_type = target.name(), content_type = ?content_type, "no body converter matched");
            return Ok(None);
        };
        tracing::trace!(converter = converter.name(), target_type = target.name(), "reading body");
        let value = converter.read(&target, InputMessage::new(headers, body.reader())).map_err(ContextError::BodyConvert)?;
        match value.downcast::<T>() {
            Ok(value) => Ok(Some(*value)),
            Err(_) => Err(ContextError::ConverterTypeMismatch { expected: target.name() }),
        }
    }
}

impl Inject for BodyConverters {
    fn inject(&self, req: &mut GwRequest) -> BoxResult<()> {
        req.extensions_mut().insert(self.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct BodyConvertersBuilder {
    converters: Vec<Arc<dyn BodyConverter>>,
}

impl fmt::Debug for BodyConvertersBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.converters.iter().map(|c| c.name())).finish()
    }
}

impl BodyConvertersBuilder {
    /// Append a converter, it will be consulted after every converter added before it.
    pub fn converter(mut self, converter: impl BodyConverter) -> Self {
        self.converters.push(Arc::new(converter));
        self
    }
    pub fn shared(mut self, converter: Arc<dyn BodyConverter>) -> Self {
        self.converters.push(converter);
        self
    }
    pub fn build(self) -> BodyConverters {
        BodyConverters {
            converters: self.converters.into(),
        }
    }
}

#[cfg(test)]
mod test {
    use std::{
        io::Read,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use hyper::header::HeaderValue;

    use super::*;

    #[derive(Debug, PartialEq)]
    struct Order {
        raw: String,
        format: &'static str,
    }

    struct FixedConverter {
        format: &'static str,
        readable: bool,
        reads: Arc<AtomicUsize>,
    }

    impl BodyConverter for FixedConverter {
        fn name(&self) -> &str {
            self.format
        }
        fn can_read(&self, target: &TargetType, _content_type: Option<&Mime>) -> bool {
            self.readable && target.is::<Order>()
        }
        fn read(&self, _target: &TargetType, message: InputMessage<'_>) -> BoxResult<Box<dyn Any + Send>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            let mut raw = String::new();
            message.into_body().read_to_string(&mut raw)?;
            Ok(Box::new(Order { raw, format: self.format }))
        }
    }

    struct MediaTypeConverter;

    impl BodyConverter for MediaTypeConverter {
        fn can_read(&self, target: &TargetType, content_type: Option<&Mime>) -> bool {
            target.is::<String>() && content_type.map_or(true, |m| m.subtype() == mime::PLAIN)
        }
        fn read(&self, _target: &TargetType, message: InputMessage<'_>) -> BoxResult<Box<dyn Any + Send>> {
            Ok(Box::new(String::from_utf8(message.into_body().remaining().to_vec())?))
        }
    }

    struct LyingConverter;

    impl BodyConverter for LyingConverter {
        fn can_read(&self, _target: &TargetType, _content_type: Option<&Mime>) -> bool {
            true
        }
        fn read(&self, _target: &TargetType, _message: InputMessage<'_>) -> BoxResult<Box<dyn Any + Send>> {
            Ok(Box::new(0u8))
        }
    }

    #[test]
    fn test_first_readable_converter_wins() {
        let json_reads = Arc::new(AtomicUsize::new(0));
        let xml_reads = Arc::new(AtomicUsize::new(0));
        let converters = BodyConverters::builder()
            .converter(FixedConverter {
                format: "json",
                readable: false,
                reads: json_reads.clone(),
            })
            .converter(FixedConverter {
                format: "xml",
                readable: true,
                reads: xml_reads.clone(),
            })
            .build();
        let body = CachedBody::new("<order/>");
        let order = converters.read::<Order>(&HeaderMap::new(), &body).expect("fail to read");
        assert_eq!(
            order,
            Some(Order {
                raw: "<order/>".to_string(),
                format: "xml"
            })
        );
        assert_eq!(json_reads.load(Ordering::SeqCst), 0);
        assert_eq!(xml_reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_no_match_is_empty() {
        let converters = BodyConverters::builder()
            .converter(FixedConverter {
                format: "json",
                readable: false,
                reads: Default::default(),
            })
            .build();
        let body = CachedBody::new("{}");
        assert_eq!(converters.read::<Order>(&HeaderMap::new(), &body).expect("no error"), None);
        assert_eq!(BodyConverters::default().read::<Order>(&HeaderMap::new(), &body).expect("no error"), None);
    }

    #[test]
    fn test_content_type_constraint() {
        let converters = BodyConverters::builder().converter(MediaTypeConverter).build();
        let body = CachedBody::new("plain words");
        let mut headers = HeaderMap::new();
        assert_eq!(converters.read::<String>(&headers, &body).expect("no error").as_deref(), Some("plain words"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
        assert_eq!(converters.read::<String>(&headers, &body).expect("no error").as_deref(), Some("plain words"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        assert_eq!(converters.read::<String>(&headers, &body).expect("no error"), None);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("not a mime"));
        assert!(content_type(&headers).is_none());
        assert_eq!(converters.read::<String>(&headers, &body).expect("no error").as_deref(), Some("plain words"));
    }

    #[test]
    fn test_converter_type_mismatch() {
        let converters = BodyConverters::builder().converter(LyingConverter).build();
        let result = converters.read::<String>(&HeaderMap::new(), &CachedBody::new("x"));
        assert!(matches!(result, Err(ContextError::ConverterTypeMismatch { .. })));
    }
}
