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
    let value: T = serde_json::from_reader(body)?;
    Ok(Box::new(value))
}

/// `application/json` and `application/*+json`.
fn is_json(content_type: &Mime) -> bool {
    content_type.type_() == mime::APPLICATION && (content_type.subtype() == mime::JSON || content_type.suffix() == Some(mime::JSON))
}

/// Decode json bodies into registered types.
///
/// [`serde_json::Value`] is always registered.
#[derive(Debug, Clone)]
pub struct JsonConverter {
    registry: Registry,
}

impl Default for JsonConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonConverter {
    pub fn new() -> Self {
        Self { registry: Registry::default() }.register::<serde_json::Value>()
    }
    pub fn register<T: DeserializeOwned + Send + 'static>(mut self) -> Self {
        self.registry.insert(TargetType::of::<T>(), decode::<T>);
        self
    }
}

impl BodyConverter for JsonConverter {
    fn name(&self) -> &str {
        "json"
    }

    fn can_read(&self, target: &TargetType, content_type: Option<&Mime>) -> bool {
        self.registry.contains(target) && content_type.map_or(true, is_json)
    }

    fn read(&self, target: &TargetType, message: InputMessage<'_>) -> BoxResult<Box<dyn Any + Send>> {
        self.registry.decode(target, message.into_body())
    }
}
