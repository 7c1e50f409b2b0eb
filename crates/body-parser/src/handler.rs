use crate::body::BoxError;
use crate::{OptionReqBody, RequestContext};
use async_trait::async_trait;
use bytes::Bytes;
use http::Response;
use std::sync::Arc;

pub type HandlerResult = Result<Response<Bytes>, BoxError>;

/// A stage of the request pipeline.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn invoke(&self, req: &mut RequestContext, req_body: OptionReqBody) -> HandlerResult;
}

#[async_trait]
impl RequestHandler for Box<dyn RequestHandler> {
    async fn invoke(&self, req: &mut RequestContext, req_body: OptionReqBody) -> HandlerResult {
        self.as_ref().invoke(req, req_body).await
    }
}

#[async_trait]
impl<H: RequestHandler + ?Sized> RequestHandler for Arc<H> {
    async fn invoke(&self, req: &mut RequestContext, req_body: OptionReqBody) -> HandlerResult {
        self.as_ref().invoke(req, req_body).await
    }
}

/// A wrapper that can wrap a handler to another
pub trait Wrapper<H> {
    /// the wrapper's output
    type Out;

    /// wrap the handler to another
    fn wrap(&self, handler: H) -> Self::Out;
}
