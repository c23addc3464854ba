use hyper::service::Service;
use tower_layer::Layer;

use crate::{
    body::converter::BodyConverters,
    injector::{EstablishRouteScope, Inject},
    GwRequest,
};

/// Inject data into every request before it reaches the inner service.
///
/// Injection errors are logged and the request continues, later context operations will report what
/// is missing.
#[derive(Debug, Clone)]
pub struct InjectorLayer<I> {
    inject: I,
}

#[derive(Debug, Clone)]
pub struct Injector<I, S> {
    inject: I,
    inner: S,
}

impl<I> InjectorLayer<I> {
    pub fn new(inject: I) -> Self {
        Self { inject }
    }
}

impl InjectorLayer<(EstablishRouteScope, BodyConverters)> {
    /// Open a route scope on every request and attach the body converters.
    pub fn route_scope(scope: EstablishRouteScope, converters: BodyConverters) -> Self {
        Self::new((scope, converters))
    }
}

impl<I, S> Injector<I, S> {
    pub fn new(inject: I, inner: S) -> Self {
        Self { inject, inner }
    }
}

impl<S, I> Layer<S> for InjectorLayer<I>
where
    I: Clone,
{
    type Service = Injector<I, S>;

    fn layer(&self, inner: S) -> Self::Service {
        Injector::new(self.inject.clone(), inner)
    }
}

impl<I, S> Service<GwRequest> for Injector<I, S>
where
    I: Inject,
    S: Service<GwRequest>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn call(&self, mut req: GwRequest) -> Self::Future {
        if let Err(e) = self.inject.inject(&mut req) {
            tracing::error!(error = %e, uri = %req.uri(), "fail to inject request context");
        }
        self.inner.call(req)
    }
}

#[cfg(test)]
mod test {
    use std::convert::Infallible;

    use hyper::{service::service_fn, Request, Response, StatusCode};

    use super::*;
    use crate::{attribute::AttrKey, GwBody, GwRequestExt};

    const MARK: AttrKey<&'static str> = AttrKey::new("test.mark");

    #[tokio::test]
    async fn test_route_scope_injected() {
        let inner = service_fn(|mut req: GwRequest| async move {
            let ok = req.gateway_name().is_ok() && req.extensions().get::<BodyConverters>().is_some() && req.put_attribute(&MARK, "seen").is_ok();
            let status = if ok { StatusCode::OK } else { StatusCode::INTERNAL_SERVER_ERROR };
            Ok::<_, Infallible>(Response::builder().status(status).body(GwBody::empty()).expect("valid response"))
        });
        let layer = InjectorLayer::route_scope(EstablishRouteScope::new().with_gateway_name("edge"), BodyConverters::default());
        let service = layer.layer(inner);
        let req = Request::builder().uri("/scoped").body(GwBody::empty()).expect("valid request");
        let resp = service.call(req).await.expect("infallible");
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_without_scope() {
        let inner = service_fn(|mut req: GwRequest| async move {
            let status = if req.put_attribute(&MARK, "seen").is_err() { StatusCode::OK } else { StatusCode::INTERNAL_SERVER_ERROR };
            Ok::<_, Infallible>(Response::builder().status(status).body(GwBody::empty()).expect("valid response"))
        });
        let service = InjectorLayer::new(BodyConverters::default()).layer(inner);
        let req = Request::builder().uri("/unscoped").body(GwBody::empty()).expect("valid request");
        assert_eq!(service.call(req).await.expect("infallible").status(), StatusCode::OK);
    }
}
