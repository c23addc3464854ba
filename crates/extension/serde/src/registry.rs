use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
};

use routectx_kernel::{
    body::{converter::TargetType, BodyReader},
    BoxResult,
};

pub(crate) type Decode = fn(BodyReader) -> BoxResult<Box<dyn Any + Send>>;

/// Decoders by target type, filled at startup.
#[derive(Clone, Default)]
pub(crate) struct Registry {
    decoders: HashMap<TypeId, (&'static str, Decode)>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.decoders.values().map(|(name, _)| name)).finish()
    }
}

impl Registry {
    pub fn insert(&mut self, target: TargetType, decode: Decode) {
        self.decoders.insert(target.id(), (target.name(), decode));
    }

    pub fn contains(&self, target: &TargetType) -> bool {
        self.decoders.contains_key(&target.id())
    }

    pub fn decode(&self, target: &TargetType, body: BodyReader) -> BoxResult<Box<dyn Any + Send>> {
        match self.decoders.get(&target.id()) {
            Some((_, decode)) => decode(body),
            None => Err(format!("no decoder registered for `{}`", target.name()).into()),
        }
    }
}
