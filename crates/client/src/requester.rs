//! The request abstraction destinations are written against.

use std::future::Future;
use std::sync::Arc;

use crate::error::Result;
use crate::request::RequestBuilder;
use crate::response::Response;

/// Something that can send a [`RequestBuilder`] and return a buffered [`Response`].
///
/// Implementations must turn non-2xx responses into errors (see
/// [`Response::error_for_status`]) and may apply their own timeout/retry
/// policy transparently. Callers treat each call as at-most-once.
pub trait RequestClient: Send + Sync {
    /// Send the request.
    fn execute(&self, request: RequestBuilder) -> impl Future<Output = Result<Response>> + Send;
}

impl<T: RequestClient> RequestClient for &T {
    fn execute(&self, request: RequestBuilder) -> impl Future<Output = Result<Response>> + Send {
        (**self).execute(request)
    }
}

impl<T: RequestClient> RequestClient for Arc<T> {
    fn execute(&self, request: RequestBuilder) -> impl Future<Output = Result<Response>> + Send {
        (**self).execute(request)
    }
}
