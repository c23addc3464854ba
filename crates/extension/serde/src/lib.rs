//! Stock body converters for routectx, built on serde.
//!
//! ```rust
//! # use routectx_ext_serde::{standard_converters, JsonConverter};
//! #[derive(serde::Deserialize)]
//! struct Order {
//!     id: u64,
//! }
//! let converters = standard_converters().converter(JsonConverter::new().register::<Order>()).build();
//! assert_eq!(converters.len(), 4);
//! ```
#![deny(clippy::unwrap_used, clippy::dbg_macro, clippy::unimplemented, clippy::todo)]
#![warn(missing_debug_implementations)]

use routectx_kernel::body::converter::{BodyConverters, BodyConvertersBuilder};

mod registry;
pub(crate) use registry::Registry;
mod plain;
pub use plain::{BytesConverter, StringConverter};
#[cfg(feature = "json")]
mod json;
#[cfg(feature = "json")]
pub use json::JsonConverter;
#[cfg(feature = "form")]
mod form;
#[cfg(feature = "form")]
pub use form::FormConverter;

/// Bytes and text converters, followed by json into [`serde_json::Value`] when the `json` feature is on.
///
/// Converters registering application types can be appended to the returned builder.
pub fn standard_converters() -> BodyConvertersBuilder {
    let builder = BodyConverters::builder().converter(BytesConverter).converter(StringConverter);
    #[cfg(feature = "json")]
    let builder = builder.converter(JsonConverter::new());
    builder
}
