use std::{fmt, ops::Deref, sync::Arc};

/// Name of the gateway instance serving the request.
///
/// Set when the route scope is opened, its absence means the request never went through a gateway.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GatewayName(pub Arc<str>);

impl GatewayName {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }
}

impl Deref for GatewayName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for GatewayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GatewayName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for GatewayName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
