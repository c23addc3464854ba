use crate::{
    body::CachedBody,
    extension::{CircuitBreakerError, RequestUrl, RouteId, RouteWeight},
};

use super::{AttrKey, GatewayAttributes, UriTemplateVariables};

macro_rules! qualify {
    ($name:literal) => {
        concat!("routectx.", $name)
    };
}

/// Cached raw request body.
pub const CACHED_REQUEST_BODY: AttrKey<CachedBody> = AttrKey::new(qualify!("cachedRequestBody"));
/// Error caught by a circuit breaker, kept for the fallback.
pub const CIRCUITBREAKER_EXECUTION_EXCEPTION: AttrKey<CircuitBreakerError> = AttrKey::new(qualify!("circuitBreakerExecutionException"));
/// The gateway scoped attribute map.
pub const GATEWAY_ATTRIBUTES: AttrKey<GatewayAttributes> = AttrKey::new(qualify!("gatewayAttributes"));
/// Target url of the matched route.
pub const GATEWAY_REQUEST_URL: AttrKey<RequestUrl> = AttrKey::new(qualify!("gatewayRequestUrl"));
/// Id of the matched route.
pub const GATEWAY_ROUTE_ID: AttrKey<RouteId> = AttrKey::new(qualify!("gatewayRouteId"));
/// Whether the original `Host` header should be sent to the backend.
pub const PRESERVE_HOST_HEADER: AttrKey<bool> = AttrKey::new(qualify!("preserveHostHeader"));
pub const WEIGHT: AttrKey<RouteWeight> = AttrKey::new(qualify!("routeWeight"));
/// Resolved path template variables.
pub const URI_TEMPLATE_VARIABLES: AttrKey<UriTemplateVariables> = AttrKey::new(qualify!("uriTemplateVariables"));
