//! # Routectx kernel crate.
//!
//! Request scoped context for the routing pipeline of a gateway.
//!
//! Every filter, predicate and handler working on a [`GwRequest`] shares:
//! - an [attribute store](attribute::Attributes), which routing phases are free to reset,
//! - a [gateway scoped map](attribute::GatewayAttributes) that survives those resets,
//! - the [cached body](body::CachedBody), read from the wire once and decoded as often as needed,
//! - the [uri template variables](attribute::UriTemplateVariables) resolved by route matching.
//!
//! All of it is reached through [`GwRequestExt`].

#![deny(clippy::unwrap_used, clippy::dbg_macro, clippy::unimplemented, clippy::todo, clippy::missing_safety_doc)]
#![warn(
    clippy::missing_errors_doc,
    clippy::indexing_slicing,
    clippy::inline_always,
    clippy::fn_params_excessive_bools,
    missing_debug_implementations
)]
/// attribute store, gateway scoped attributes and well-known keys
pub mod attribute;
/// request body, body cache and converters
pub mod body;
/// errors of the request context
pub mod error;
/// typed extensions for request
pub mod extension;
/// extractors for request
pub mod extractor;
/// helper layers
pub mod helper_layers;
/// injectors for request
pub mod injector;
/// util functions and structs
pub mod utils;

use std::{any::Any, borrow::Cow, future::Future, sync::Arc};

use attribute::{
    AttrKey, AttrValue, Attributes, GatewayAttributes, UriTemplateVariables, CACHED_REQUEST_BODY, CIRCUITBREAKER_EXECUTION_EXCEPTION, GATEWAY_REQUEST_URL, GATEWAY_ROUTE_ID,
    PRESERVE_HOST_HEADER, URI_TEMPLATE_VARIABLES, WEIGHT,
};
pub use body::GwBody;
use body::{converter::BodyConverters, BodyReadFailure, CachedBody};
pub use error::ContextError;
use extension::{CircuitBreakerError, GatewayName, RequestUrl, RouteId, RouteWeight};
pub use extractor::{Extract, OptionalExtract};
use hyper::{Request, Uri};
pub use injector::Inject;
pub use tower_layer::Layer;
use utils::template;

pub type BoxResult<T> = Result<T, BoxError>;
/// A boxed error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Alias for a request with a boxed body.
pub type GwRequest = Request<GwBody>;

/// Provides the request context operations for [`Request`](hyper::Request).
///
/// Writes through [`put_attribute`](GwRequestExt::put_attribute) land in both the attribute store and
/// the gateway scoped map, reads check the attribute store first and fall back to the map.
pub trait GwRequestExt {
    fn attributes(&self) -> Option<&Attributes>;
    fn attributes_mut(&mut self) -> &mut Attributes;
    fn gateway_attributes(&self) -> Option<GatewayAttributes>;
    /// # Errors
    /// If the attribute store lacks the key and no route scope was established.
    fn attribute<T: Any + Clone>(&self, key: &AttrKey<T>) -> Result<Option<T>, ContextError>;
    /// # Errors
    /// If no route scope was established, nothing is written then.
    fn put_attribute<T: Any + Send + Sync>(&mut self, key: &AttrKey<T>, value: T) -> Result<(), ContextError>;

    fn route_id(&self) -> Option<RouteId>;
    fn set_route_id(&mut self, route_id: impl Into<Arc<str>>);
    fn request_url(&self) -> Option<RequestUrl>;
    fn set_request_url(&mut self, url: Uri);
    fn route_weight(&self) -> Option<RouteWeight>;
    fn set_route_weight(&mut self, weight: RouteWeight);
    fn circuit_breaker_error(&self) -> Option<CircuitBreakerError>;
    /// # Errors
    /// If no route scope was established.
    fn set_circuit_breaker_error(&mut self, error: impl Into<BoxError>) -> Result<(), ContextError>;
    fn preserve_host_header(&self) -> bool;
    /// # Errors
    /// If no route scope was established.
    fn set_preserve_host_header(&mut self, preserve: bool) -> Result<(), ContextError>;
    /// # Errors
    /// If the request never entered a gateway.
    fn gateway_name(&self) -> Result<GatewayName, ContextError>;

    fn uri_template_variables(&self) -> UriTemplateVariables;
    fn put_uri_template_variables(&mut self, variables: UriTemplateVariables);
    /// # Errors
    /// If the template references a variable with no value.
    fn expand<'t>(&self, template: &'t str) -> Result<Cow<'t, str>, ContextError>;
    /// # Errors
    /// If any template references a variable with no value.
    fn expand_multiple<I, S>(&self, templates: I) -> Result<Vec<String>, ContextError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>;

    fn cached_body(&self) -> Option<CachedBody>;
    /// # Errors
    /// If reading the body fails, or no route scope was established.
    fn cache_body(&mut self) -> impl Future<Output = Result<CachedBody, ContextError>> + Send;
    /// # Errors
    /// If there are no [`BodyConverters`] on the request or the selected converter fails.
    fn read_body<T: Any + Send>(&self, body: &CachedBody) -> Result<Option<T>, ContextError>;
    /// # Errors
    /// See [`cache_body`](GwRequestExt::cache_body) and [`read_body`](GwRequestExt::read_body).
    fn cache_and_read_body<T: Any + Send>(&mut self) -> impl Future<Output = Result<Option<T>, ContextError>> + Send;

    fn extract<M: Extract>(&self) -> M;
    fn try_extract<M: OptionalExtract>(&self) -> Option<M>;
    /// # Errors
    /// If the injection fails.
    fn inject<I: Inject>(&mut self, i: &I) -> BoxResult<()>;
}

/// Attribute store first, then the gateway scoped map if there is one.
fn lookup<T: Any + Clone>(req: &GwRequest, key: &AttrKey<T>) -> Option<T> {
    req.attributes().and_then(|attributes| attributes.get(key)).or_else(|| req.gateway_attributes()?.get(key))
}

/// Write to the attribute store, and to the gateway scoped map when there is one.
fn put_scoped<T: Any + Send + Sync>(req: &mut GwRequest, key: &AttrKey<T>, value: T) {
    let value: AttrValue = Arc::new(value);
    if let Some(gateway_attributes) = req.gateway_attributes() {
        gateway_attributes.put_raw(key.owned_name(), value.clone());
    }
    req.attributes_mut().put_raw(key.owned_name(), value);
}

impl GwRequestExt for GwRequest {
    fn attributes(&self) -> Option<&Attributes> {
        self.extensions().get::<Attributes>()
    }

    /// Create the attribute store if it does not exist.
    fn attributes_mut(&mut self) -> &mut Attributes {
        self.extensions_mut().get_or_insert_default::<Attributes>()
    }

    fn gateway_attributes(&self) -> Option<GatewayAttributes> {
        self.attributes().and_then(GatewayAttributes::of)
    }

    fn attribute<T: Any + Clone>(&self, key: &AttrKey<T>) -> Result<Option<T>, ContextError> {
        if let Some(value) = self.attributes().and_then(|attributes| attributes.get(key)) {
            return Ok(Some(value));
        }
        let gateway_attributes = self.gateway_attributes().ok_or(ContextError::MissingGatewayAttributes)?;
        Ok(gateway_attributes.get(key))
    }

    fn put_attribute<T: Any + Send + Sync>(&mut self, key: &AttrKey<T>, value: T) -> Result<(), ContextError> {
        let gateway_attributes = self.gateway_attributes().ok_or(ContextError::MissingGatewayAttributes)?;
        let value: AttrValue = Arc::new(value);
        gateway_attributes.put_raw(key.owned_name(), value.clone());
        self.attributes_mut().put_raw(key.owned_name(), value);
        Ok(())
    }

    fn route_id(&self) -> Option<RouteId> {
        self.extensions().get::<RouteId>().cloned().or_else(|| lookup(self, &GATEWAY_ROUTE_ID))
    }

    fn set_route_id(&mut self, route_id: impl Into<Arc<str>>) {
        let route_id = RouteId::new(route_id);
        tracing::trace!(route_id = %route_id, "route matched");
        put_scoped(self, &GATEWAY_ROUTE_ID, route_id.clone());
        self.extensions_mut().insert(route_id);
    }

    fn request_url(&self) -> Option<RequestUrl> {
        self.extensions().get::<RequestUrl>().cloned().or_else(|| lookup(self, &GATEWAY_REQUEST_URL))
    }

    fn set_request_url(&mut self, url: Uri) {
        let url = RequestUrl::new(url);
        put_scoped(self, &GATEWAY_REQUEST_URL, url.clone());
        self.extensions_mut().insert(url);
    }

    fn route_weight(&self) -> Option<RouteWeight> {
        self.extensions().get::<RouteWeight>().cloned().or_else(|| lookup(self, &WEIGHT))
    }

    fn set_route_weight(&mut self, weight: RouteWeight) {
        put_scoped(self, &WEIGHT, weight.clone());
        self.extensions_mut().insert(weight);
    }

    fn circuit_breaker_error(&self) -> Option<CircuitBreakerError> {
        lookup(self, &CIRCUITBREAKER_EXECUTION_EXCEPTION)
    }

    fn set_circuit_breaker_error(&mut self, error: impl Into<BoxError>) -> Result<(), ContextError> {
        self.put_attribute(&CIRCUITBREAKER_EXECUTION_EXCEPTION, CircuitBreakerError::new(error))
    }

    fn preserve_host_header(&self) -> bool {
        lookup(self, &PRESERVE_HOST_HEADER).unwrap_or(false)
    }

    fn set_preserve_host_header(&mut self, preserve: bool) -> Result<(), ContextError> {
        self.put_attribute(&PRESERVE_HOST_HEADER, preserve)
    }

    fn gateway_name(&self) -> Result<GatewayName, ContextError> {
        self.extensions().get::<GatewayName>().cloned().ok_or(ContextError::MissingExtension("GatewayName"))
    }

    fn uri_template_variables(&self) -> UriTemplateVariables {
        self.attributes().and_then(|attributes| attributes.get(&URI_TEMPLATE_VARIABLES)).unwrap_or_default()
    }

    /// Merge newly resolved variables into the existing ones, new values win.
    fn put_uri_template_variables(&mut self, variables: UriTemplateVariables) {
        let attributes = self.attributes_mut();
        let merged = match attributes.get(&URI_TEMPLATE_VARIABLES) {
            Some(mut existing) => {
                existing.merge(variables);
                existing
            }
            None => variables,
        };
        tracing::trace!(variables = ?merged, "uri template variables updated");
        attributes.put(&URI_TEMPLATE_VARIABLES, merged);
    }

    fn expand<'t>(&self, template: &'t str) -> Result<Cow<'t, str>, ContextError> {
        if !template::is_template(template) {
            return Ok(Cow::Borrowed(template));
        }
        let empty = UriTemplateVariables::new();
        let variables = self.attributes().and_then(|attributes| attributes.get_ref(&URI_TEMPLATE_VARIABLES)).unwrap_or(&empty);
        Ok(template::expand(template, variables)?)
    }

    fn expand_multiple<I, S>(&self, templates: I) -> Result<Vec<String>, ContextError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        templates.into_iter().map(|template| self.expand(template.as_ref()).map(Cow::into_owned)).collect()
    }

    fn cached_body(&self) -> Option<CachedBody> {
        lookup(self, &CACHED_REQUEST_BODY)
    }

    #[tracing::instrument(skip_all, fields(uri = %self.uri()))]
    async fn cache_body(&mut self) -> Result<CachedBody, ContextError> {
        if let Some(cached) = self.cached_body() {
            tracing::trace!(len = cached.len(), "request body already cached");
            return Ok(cached);
        }
        if let Some(failure) = self.extensions().get::<BodyReadFailure>() {
            return Err(ContextError::BodyRead(Box::new(failure.clone())));
        }
        if self.gateway_attributes().is_none() {
            return Err(ContextError::MissingGatewayAttributes);
        }
        let bytes = match self.body().get_dumped().cloned() {
            Some(bytes) => bytes,
            None => {
                let interrupted = BodyReadFailure::new("request body read was interrupted".into());
                let body = std::mem::replace(self.body_mut(), GwBody::failed(interrupted));
                let dumped = match body.dump().await {
                    Ok(dumped) => dumped,
                    Err(e) => {
                        tracing::warn!(error = %e, "fail to read request body");
                        let failure = BodyReadFailure::new(e);
                        *self.body_mut() = GwBody::failed(failure.clone());
                        self.extensions_mut().insert(failure.clone());
                        return Err(ContextError::BodyRead(Box::new(failure)));
                    }
                };
                let bytes = dumped.get_dumped().cloned().unwrap_or_default();
                *self.body_mut() = dumped;
                tracing::debug!(len = bytes.len(), "request body read from the wire");
                bytes
            }
        };
        let cached = CachedBody::new(bytes);
        self.put_attribute(&CACHED_REQUEST_BODY, cached.clone())?;
        Ok(cached)
    }

    fn read_body<T: Any + Send>(&self, body: &CachedBody) -> Result<Option<T>, ContextError> {
        let converters = self.extensions().get::<BodyConverters>().ok_or(ContextError::MissingExtension("BodyConverters"))?;
        converters.read::<T>(self.headers(), body)
    }

    async fn cache_and_read_body<T: Any + Send>(&mut self) -> Result<Option<T>, ContextError> {
        let body = self.cache_body().await?;
        self.read_body::<T>(&body)
    }

    /// Extract a value from the request.
    fn extract<M: Extract>(&self) -> M {
        M::extract(self)
    }

    /// Try to extract a value from the request.
    fn try_extract<M: OptionalExtract>(&self) -> Option<M> {
        OptionalExtract::extract(self)
    }

    /// Inject some data into the request.
    fn inject<I: Inject>(&mut self, i: &I) -> BoxResult<()> {
        i.inject(self)
    }
}
