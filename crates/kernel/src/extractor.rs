use crate::{
    attribute::{GatewayAttributes, UriTemplateVariables},
    body::CachedBody,
    extension::{GatewayName, RequestUrl, RouteId, RouteWeight},
    GwRequest, GwRequestExt,
};

/// Something that can always be extracted from a request.
pub trait Extract: Sized + Send + Sync {
    fn extract(req: &GwRequest) -> Self;
}

/// Something that may be absent from a request.
pub trait OptionalExtract: Sized + Send + Sync {
    fn extract(req: &GwRequest) -> Option<Self>;
}

impl<T: OptionalExtract> Extract for Option<T> {
    fn extract(req: &GwRequest) -> Self {
        <T as OptionalExtract>::extract(req)
    }
}

impl Extract for UriTemplateVariables {
    fn extract(req: &GwRequest) -> Self {
        req.uri_template_variables()
    }
}

impl OptionalExtract for GatewayAttributes {
    fn extract(req: &GwRequest) -> Option<Self> {
        req.gateway_attributes()
    }
}

impl OptionalExtract for CachedBody {
    fn extract(req: &GwRequest) -> Option<Self> {
        req.cached_body()
    }
}

impl OptionalExtract for RouteId {
    fn extract(req: &GwRequest) -> Option<Self> {
        req.route_id()
    }
}

impl OptionalExtract for RequestUrl {
    fn extract(req: &GwRequest) -> Option<Self> {
        req.request_url()
    }
}

impl OptionalExtract for RouteWeight {
    fn extract(req: &GwRequest) -> Option<Self> {
        req.route_weight()
    }
}

impl OptionalExtract for GatewayName {
    fn extract(req: &GwRequest) -> Option<Self> {
        req.extensions().get::<GatewayName>().cloned()
    }
}
