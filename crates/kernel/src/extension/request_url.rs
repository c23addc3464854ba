use std::ops::Deref;

use hyper::Uri;

/// The url the matched route forwards this request to.
#[derive(Debug, Clone, PartialEq, Eq)]
#[repr(transparent)]
pub struct RequestUrl(pub Uri);

impl RequestUrl {
    pub const fn new(uri: Uri) -> Self {
        Self(uri)
    }
    pub fn into_inner(self) -> Uri {
        self.0
    }
}

impl Deref for RequestUrl {
    type Target = Uri;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Uri> for RequestUrl {
    fn from(value: Uri) -> Self {
        Self(value)
    }
}
