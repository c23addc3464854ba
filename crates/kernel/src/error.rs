use std::fmt;

use crate::BoxError;

/// Errors raised by the request context.
///
/// Body and converter failures are fatal for the request: the underlying stream may have been
/// partially consumed, so callers should not retry them.
#[derive(Debug)]
pub enum ContextError {
    /// Reading the body from the wire failed.
    BodyRead(BoxError),
    /// A body converter failed while decoding the cached body.
    BodyConvert(BoxError),
    /// The gateway scoped attributes were never established for this request.
    MissingGatewayAttributes,
    /// A request extension the operation depends on is absent.
    MissingExtension(&'static str),
    /// A converter accepted the target type but produced a value of another type.
    ConverterTypeMismatch { expected: &'static str },
    /// Expanding a uri template failed.
    Template(TemplateError),
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextError::BodyRead(e) => write!(f, "fail to read request body: {e}"),
            ContextError::BodyConvert(e) => write!(f, "fail to convert request body: {e}"),
            ContextError::MissingGatewayAttributes => write!(f, "gateway attributes not established, has the route been matched?"),
            ContextError::MissingExtension(name) => write!(f, "request extension `{name}` not found"),
            ContextError::ConverterTypeMismatch { expected } => write!(f, "converter produced a value which is not `{expected}`"),
            ContextError::Template(e) => write!(f, "fail to expand template: {e}"),
        }
    }
}

impl std::error::Error for ContextError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ContextError::BodyRead(e) | ContextError::BodyConvert(e) => Some(e.as_ref()),
            ContextError::Template(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TemplateError> for ContextError {
    fn from(value: TemplateError) -> Self {
        ContextError::Template(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// The template references a variable with no resolved value.
    UnresolvedVariable(String),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::UnresolvedVariable(name) => write!(f, "no value for uri template variable '{name}'"),
        }
    }
}

impl std::error::Error for TemplateError {}
