use crate::{attribute::GatewayAttributes, extension::GatewayName, BoxResult, GwRequest, GwRequestExt};

pub trait Inject {
    /// Inject the request with some data.
    /// # Errors
    /// If the injection fails.
    fn inject(&self, req: &mut GwRequest) -> BoxResult<()>;
}

/// Open a route scope on the request: a fresh [`GatewayAttributes`] map, stored in the attribute store.
///
/// This is what the routing dispatch does once a route matched. Any previous route scope is replaced.
#[derive(Debug, Clone, Default)]
pub struct EstablishRouteScope {
    gateway_name: Option<GatewayName>,
}

impl EstablishRouteScope {
    pub fn new() -> Self {
        Self::default()
    }
    /// Also record which gateway serves the request.
    pub fn with_gateway_name(mut self, name: impl Into<GatewayName>) -> Self {
        self.gateway_name = Some(name.into());
        self
    }
}

impl Inject for EstablishRouteScope {
    fn inject(&self, req: &mut GwRequest) -> BoxResult<()> {
        GatewayAttributes::establish(req.attributes_mut());
        tracing::trace!(gateway = ?self.gateway_name, "route scope established");
        if let Some(gateway_name) = &self.gateway_name {
            req.extensions_mut().insert(gateway_name.clone());
        }
        Ok(())
    }
}

impl<A: Inject, B: Inject> Inject for (A, B) {
    fn inject(&self, req: &mut GwRequest) -> BoxResult<()> {
        self.0.inject(req)?;
        self.1.inject(req)
    }
}
