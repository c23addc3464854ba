use std::{fmt, ops::Deref, sync::Arc};

use crate::BoxError;

/// The error a circuit breaker caught while executing the route, handed to the fallback.
#[derive(Clone)]
pub struct CircuitBreakerError(pub Arc<dyn std::error::Error + Send + Sync + 'static>);

impl CircuitBreakerError {
    pub fn new(error: impl Into<BoxError>) -> Self {
        Self(Arc::from(error.into()))
    }
}

impl Deref for CircuitBreakerError {
    type Target = dyn std::error::Error + Send + Sync + 'static;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl fmt::Debug for CircuitBreakerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CircuitBreakerError").field(&self.0.to_string()).finish()
    }
}

impl fmt::Display for CircuitBreakerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
