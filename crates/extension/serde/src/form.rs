use std::any::Any;

use mime::Mime;
use routectx_kernel::{
    body::{
        converter::{BodyConverter, InputMessage, TargetType},
        BodyReader,
    },
    BoxResult,
};
use serde::de::DeserializeOwned;

use crate::Registry;

fn decode<T: DeserializeOwned + Send + 'static>(body: BodyReader) -> BoxResult<Box<dyn Any + Send>> {
    let value: T = serde_urlencoded::from_reader(body)?;
    Ok(Box::new(value))
}

/// Decode `application/x-www-form-urlencoded` bodies into registered types.
///
/// `Vec<(String, String)>` is always registered, keeping every pair in order.
#[derive(Debug, Clone)]
pub struct FormConverter {
    registry: Registry,
}

impl Default for FormConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl FormConverter {
    pub fn new() -> Self {
        Self { registry: Registry::default() }.register::<Vec<(String, String)>>()
    }
    pub fn register<T: DeserializeOwned + Send + 'static>(mut self) -> Self {
        self.registry.insert(TargetType::of::<T>(), decode::<T>);
        self
    }
}

impl BodyConverter for FormConverter {
    fn name(&self) -> &str {
        "form"
    }

    fn can_read(&self, target: &TargetType, content_type: Option<&Mime>) -> bool {
        self.registry.contains(target) && content_type.map_or(true, |m| m.type_() == mime::APPLICATION && m.subtype() == mime::WWW_FORM_URLENCODED)
    }

    fn read(&self, target: &TargetType, message: InputMessage<'_>) -> BoxResult<Box<dyn Any + Send>> {
        self.registry.decode(target, message.into_body())
    }
}
