use std::{
    collections::HashMap,
    ops::{Deref, DerefMut},
};

/// Path template variables resolved by route matching, name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct UriTemplateVariables(HashMap<String, String>);

impl UriTemplateVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Merge another set of variables into this one, incoming values win on collision.
    pub fn merge(&mut self, incoming: UriTemplateVariables) {
        self.0.extend(incoming.0);
    }

    pub fn into_inner(self) -> HashMap<String, String> {
        self.0
    }
}

impl Deref for UriTemplateVariables {
    type Target = HashMap<String, String>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for UriTemplateVariables {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<HashMap<String, String>> for UriTemplateVariables {
    fn from(value: HashMap<String, String>) -> Self {
        Self(value)
    }
}

impl<K, V> FromIterator<(K, V)> for UriTemplateVariables
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
