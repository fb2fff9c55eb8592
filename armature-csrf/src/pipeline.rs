// Middleware seam between the transport and application handlers

use crate::error::Error;
use crate::http::{HttpRequest, HttpResponse};
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;

/// Boxed future produced by a downstream handler
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<HttpResponse, Error>> + Send>>;

/// Type alias for the next handler in the middleware chain
pub type Next = Box<dyn FnOnce(HttpRequest) -> HandlerFuture + Send>;

/// Middleware trait for processing requests before they reach the handler
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Process the request and optionally pass to next middleware
    async fn handle(&self, req: HttpRequest, next: Next) -> Result<HttpResponse, Error>;
}

/// Box an async handler into a [`Next`] continuation.
pub fn next<F, Fut>(handler: F) -> Next
where
    F: FnOnce(HttpRequest) -> Fut + Send + 'static,
    Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
{
    Box::new(move |req| -> HandlerFuture { Box::pin(handler(req)) })
}
