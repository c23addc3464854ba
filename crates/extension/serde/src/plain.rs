use std::{any::Any, io::Read};

use mime::Mime;
use routectx_kernel::{
    body::converter::{BodyConverter, InputMessage, TargetType},
    BoxResult,
};

/// Hand out the raw body as `Vec<u8>`, whatever the content type.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesConverter;

impl BodyConverter for BytesConverter {
    fn name(&self) -> &str {
        "bytes"
    }

    fn can_read(&self, target: &TargetType, _content_type: Option<&Mime>) -> bool {
        target.is::<Vec<u8>>()
    }

    fn read(&self, _target: &TargetType, message: InputMessage<'_>) -> BoxResult<Box<dyn Any + Send>> {
        Ok(Box::new(message.into_body().remaining().to_vec()))
    }
}

/// Read the body as utf-8 text.
///
/// Declared charsets other than utf-8 are refused.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringConverter;

impl BodyConverter for StringConverter {
    fn name(&self) -> &str {
        "string"
    }

    fn can_read(&self, target: &TargetType, content_type: Option<&Mime>) -> bool {
        target.is::<String>() && content_type.and_then(|m| m.get_param(mime::CHARSET)).map_or(true, |charset| charset == mime::UTF_8)
    }

    fn read(&self, _target: &TargetType, message: InputMessage<'_>) -> BoxResult<Box<dyn Any + Send>> {
        let mut text = String::new();
        message.into_body().read_to_string(&mut text)?;
        Ok(Box::new(text))
    }
}

#[cfg(test)]
mod test {
    use hyper::HeaderMap;
    use routectx_kernel::body::{converter::BodyConverters, CachedBody};

    use super::*;

    #[test]
    fn test_plain() {
        let converters = BodyConverters::builder().converter(BytesConverter).converter(StringConverter).build();
        let body = CachedBody::new("plain text");
        let headers = HeaderMap::new();
        assert_eq!(converters.read::<String>(&headers, &body).expect("fail to read").as_deref(), Some("plain text"));
        assert_eq!(converters.read::<Vec<u8>>(&headers, &body).expect("fail to read"), Some(b"plain text".to_vec()));
        assert_eq!(converters.read::<u32>(&headers, &body).expect("no error"), None);
    }

    #[test]
    fn test_charset() {
        let converter = StringConverter;
        let target = TargetType::of::<String>();
        assert!(converter.can_read(&target, Some(&mime::TEXT_PLAIN_UTF_8)));
        assert!(converter.can_read(&target, Some(&mime::APPLICATION_JSON)));
        assert!(!converter.can_read(&target, Some(&"text/plain; charset=latin1".parse().expect("valid mime"))));
    }
}
