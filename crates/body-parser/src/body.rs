//! Request body types shared by the pipeline stages.
//!
//! A [`ReqBody`] is either bytes already held in memory or a boxed stream. Stages receive it wrapped in an
//! [`OptionReqBody`], a cheap shared handle: the body parser buffers the stream through it and puts an in-memory
//! copy back, so the next stage can read the very same bytes again.

use crate::error::ParseError;
use bytes::Bytes;
use http_body::Body as HttpBody;
use http_body::{Frame, SizeHint};
use http_body_util::BodyExt;
use http_body_util::combinators::UnsyncBoxBody;
use std::error::Error;
use std::fmt;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::Mutex;

pub type BoxError = Box<dyn Error + Send + Sync>;

pub struct ReqBody {
    inner: Kind,
}

enum Kind {
    Once(Option<Bytes>),
    Stream(UnsyncBoxBody<Bytes, BoxError>),
}

impl ReqBody {
    pub fn empty() -> Self {
        Self { inner: Kind::Once(None) }
    }

    pub fn once(bytes: Bytes) -> Self {
        if bytes.is_empty() { Self::empty() } else { Self { inner: Kind::Once(Some(bytes)) } }
    }

    pub fn stream<B>(body: B) -> Self
    where
        B: HttpBody<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        Self { inner: Kind::Stream(UnsyncBoxBody::new(body.map_err(Into::into))) }
    }
}

impl fmt::Debug for ReqBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Kind::Once(bytes) => f.debug_tuple("ReqBody::Once").field(bytes).finish(),
            Kind::Stream(_) => f.write_str("ReqBody::Stream"),
        }
    }
}

impl From<Bytes> for ReqBody {
    fn from(bytes: Bytes) -> Self {
        Self::once(bytes)
    }
}

impl From<String> for ReqBody {
    fn from(value: String) -> Self {
        Self::once(Bytes::from(value))
    }
}

impl From<&'static str> for ReqBody {
    fn from(value: &'static str) -> Self {
        Self::once(Bytes::from_static(value.as_bytes()))
    }
}

impl From<()> for ReqBody {
    fn from((): ()) -> Self {
        Self::empty()
    }
}

impl HttpBody for ReqBody {
    type Data = Bytes;
    type Error = BoxError;

    fn poll_frame(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        match &mut self.get_mut().inner {
            Kind::Once(option_bytes) => Poll::Ready(option_bytes.take().map(|bytes| Ok(Frame::data(bytes)))),
            Kind::Stream(box_body) => Pin::new(box_body).poll_frame(cx),
        }
    }

    fn is_end_stream(&self) -> bool {
        match &self.inner {
            Kind::Once(option_bytes) => option_bytes.is_none(),
            Kind::Stream(box_body) => box_body.is_end_stream(),
        }
    }

    fn size_hint(&self) -> SizeHint {
        match &self.inner {
            Kind::Once(None) => SizeHint::with_exact(0),
            Kind::Once(Some(bytes)) => SizeHint::with_exact(bytes.len() as u64),
            Kind::Stream(box_body) => box_body.size_hint(),
        }
    }
}

/// A shared handle to the request body, passed along the pipeline.
///
/// Consuming the body through [`OptionReqBody::apply`] or [`OptionReqBody::bytes`] leaves the handle empty; any
/// later read fails with [`ParseError::BodyConsumed`]. [`OptionReqBody::buffer`] reads without consuming.
#[derive(Clone, Debug)]
pub struct OptionReqBody {
    inner: Arc<Mutex<Option<ReqBody>>>,
}

impl From<ReqBody> for OptionReqBody {
    fn from(body: ReqBody) -> Self {
        OptionReqBody { inner: Arc::new(Mutex::new(Some(body))) }
    }
}

impl OptionReqBody {
    pub async fn can_consume(&self) -> bool {
        let guard = self.inner.lock().await;
        guard.is_some()
    }

    pub async fn apply<T, F, Fut>(&self, f: F) -> Fut::Output
    where
        F: FnOnce(ReqBody) -> Fut,
        Fut: Future<Output = Result<T, ParseError>>,
    {
        let req_body = self.inner.lock().await.take();
        match req_body {
            Some(req_body) => f(req_body).await,
            None => Err(ParseError::BodyConsumed),
        }
    }

    /// Reads the whole body, consuming it.
    pub async fn bytes(&self) -> Result<Bytes, ParseError> {
        self.apply(collect).await
    }

    /// Reads the whole body into memory and puts a buffered copy back, so the body can be read again.
    pub async fn buffer(&self) -> Result<Bytes, ParseError> {
        let mut guard = self.inner.lock().await;
        let req_body = guard.take().ok_or(ParseError::BodyConsumed)?;

        let bytes = collect(req_body).await?;
        *guard = Some(ReqBody::once(bytes.clone()));

        Ok(bytes)
    }
}

async fn collect(req_body: ReqBody) -> Result<Bytes, ParseError> {
    req_body.collect().await.map(|collected| collected.to_bytes()).map_err(|e| ParseError::io(io::Error::other(e)))
}
