//! Typed request extensions.
//!
//! Route metadata is kept here as native extensions next to its attribute store copy, so code that
//! only knows `http::Extensions` sees it as well.
mod gateway_name;
pub use gateway_name::*;
mod route_id;
pub use route_id::*;
mod request_url;
pub use request_url::*;
mod route_weight;
pub use route_weight::*;
mod circuit_breaker;
pub use circuit_breaker::*;
