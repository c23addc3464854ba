//! String keyed, typed request attributes.
//!
//! [`Attributes`] is the per-request attribute store living in the request extensions. Routing phases
//! may reset or restore it, so values that must survive are also written to the [`GatewayAttributes`]
//! map, which is itself stored as one attribute.
use std::{any::Any, borrow::Cow, collections::HashMap, fmt, marker::PhantomData, sync::Arc};

mod gateway;
pub use gateway::*;
mod keys;
pub use keys::*;
mod uri_variables;
pub use uri_variables::*;

/// A type erased attribute value.
pub type AttrValue = Arc<dyn Any + Send + Sync>;

/// A typed attribute key.
///
/// The value type is bound to the key, so reading an attribute never needs a cast at the call site.
/// A stored value of another type reads as absent.
pub struct AttrKey<T> {
    name: Cow<'static, str>,
    marker: PhantomData<fn() -> T>,
}

impl<T> AttrKey<T> {
    pub const fn new(name: &'static str) -> Self {
        debug_assert!(!name.is_empty(), "attribute key name must not be empty");
        Self {
            name: Cow::Borrowed(name),
            marker: PhantomData,
        }
    }
    /// Create a key whose name is only known at runtime.
    pub fn dynamic(name: impl Into<String>) -> Self {
        let name = name.into();
        debug_assert!(!name.is_empty(), "attribute key name must not be empty");
        Self {
            name: Cow::Owned(name),
            marker: PhantomData,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub(crate) fn owned_name(&self) -> Cow<'static, str> {
        self.name.clone()
    }
}

impl<T> Clone for AttrKey<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for AttrKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AttrKey").field(&self.name).finish()
    }
}

pub(crate) fn downcast<T: Any + Clone>(value: &AttrValue) -> Option<T> {
    value.downcast_ref::<T>().cloned()
}

/// The per-request attribute store.
#[derive(Clone, Default)]
pub struct Attributes {
    map: HashMap<Cow<'static, str>, AttrValue>,
}

impl fmt::Debug for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.map.keys()).finish()
    }
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn get<T: Any + Clone>(&self, key: &AttrKey<T>) -> Option<T> {
        self.map.get(key.name()).and_then(downcast)
    }
    pub fn get_ref<T: Any>(&self, key: &AttrKey<T>) -> Option<&T> {
        self.map.get(key.name()).and_then(|value| value.downcast_ref::<T>())
    }
    pub fn get_raw(&self, name: &str) -> Option<&AttrValue> {
        self.map.get(name)
    }
    pub fn put<T: Any + Send + Sync>(&mut self, key: &AttrKey<T>, value: T) {
        self.map.insert(key.owned_name(), Arc::new(value));
    }
    pub fn put_raw(&mut self, name: impl Into<Cow<'static, str>>, value: AttrValue) {
        self.map.insert(name.into(), value);
    }
    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        self.map.remove(name)
    }
    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(|k| &**k)
    }
    pub fn len(&self) -> usize {
        self.map.len()
    }
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
    /// Drop every attribute, leaving a fresh store.
    pub fn reset(&mut self) {
        self.map.clear();
    }
    /// Take a copy of the store, to be [restored](Attributes::restore) after a routing phase.
    ///
    /// The copy shares values with the store, a [`GatewayAttributes`] handle in the snapshot still points
    /// to the same map.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }
    /// Replace the whole store with a snapshot.
    pub fn restore(&mut self, snapshot: Self) {
        *self = snapshot;
    }
}
