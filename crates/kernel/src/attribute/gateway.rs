use std::{
    any::Any,
    borrow::Cow,
    collections::HashMap,
    fmt,
    sync::{Arc, RwLock},
};

use super::{downcast, AttrKey, AttrValue, Attributes, GATEWAY_ATTRIBUTES};

/// Route scoped attributes.
///
/// The map is created once per route match and stored in [`Attributes`] under [`GATEWAY_ATTRIBUTES`].
/// Clones share the same map, so it outlives resets and restores of the attribute store as long as the
/// handle itself is kept.
#[derive(Clone, Default)]
pub struct GatewayAttributes {
    inner: Arc<RwLock<HashMap<Cow<'static, str>, AttrValue>>>,
}

impl fmt::Debug for GatewayAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let g = self.inner.read().expect("never poisoned");
        f.debug_set().entries(g.keys()).finish()
    }
}

impl GatewayAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the gateway attributes in an attribute store.
    ///
    /// Returns `None` if no route has been matched yet, this never creates the map.
    pub fn of(attributes: &Attributes) -> Option<Self> {
        attributes.get(&GATEWAY_ATTRIBUTES)
    }

    /// Create a fresh map and store it in the attribute store, replacing any previous one.
    pub fn establish(attributes: &mut Attributes) -> Self {
        let gateway_attributes = Self::new();
        attributes.put(&GATEWAY_ATTRIBUTES, gateway_attributes.clone());
        gateway_attributes
    }

    pub fn get<T: Any + Clone>(&self, key: &AttrKey<T>) -> Option<T> {
        let g = self.inner.read().expect("never poisoned");
        g.get(key.name()).and_then(downcast)
    }

    pub fn get_raw(&self, name: &str) -> Option<AttrValue> {
        let g = self.inner.read().expect("never poisoned");
        g.get(name).cloned()
    }

    pub fn put<T: Any + Send + Sync>(&self, key: &AttrKey<T>, value: T) {
        self.put_raw(key.owned_name(), Arc::new(value));
    }

    pub fn put_raw(&self, name: impl Into<Cow<'static, str>>, value: AttrValue) {
        let mut g = self.inner.write().expect("never poisoned");
        g.insert(name.into(), value);
    }

    pub fn remove(&self, name: &str) -> Option<AttrValue> {
        let mut g = self.inner.write().expect("never poisoned");
        g.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.read().expect("never poisoned").contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("never poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.inner.write().expect("never poisoned").clear();
    }

    /// Whether two handles point to the same map.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
