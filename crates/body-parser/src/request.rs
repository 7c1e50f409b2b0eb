//! Request handling module that provides access to HTTP request information and the parsed body.
//!
//! This module contains the core types for working with HTTP requests in the pipeline:
//! - `RequestContext`: Provides access to the request head and the values stages attach to it
//! - `ParsedBody`: The raw value a body parser produced for the request

use crate::body::{OptionReqBody, ReqBody, BoxError};
use crate::params::Params;
use bytes::Bytes;
use http::request::Parts;
use http::{Extensions, HeaderMap, Method, Request, Uri, Version};
use http_body::Body as HttpBody;
use serde_json::Value;

/// The raw value returned by the parser that decoded the request body.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBody(pub Value);

/// Represents the context of an HTTP request as it travels through the pipeline.
///
/// The body is handed to stages separately, as an [`OptionReqBody`]; the context carries the request head and the
/// typed values stages attach for later ones, such as the [`ParsedBody`] and [`Params`] written by the body parser.
#[derive(Debug)]
pub struct RequestContext {
    parts: Parts,
}

impl RequestContext {
    /// Splits a request into its context and its body
    pub fn from_request<B>(request: Request<B>) -> (Self, OptionReqBody)
    where
        B: HttpBody<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = request.into_parts();
        (Self { parts }, OptionReqBody::from(ReqBody::stream(body)))
    }

    /// Returns the HTTP method of the request
    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    /// Returns the URI of the request
    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    /// Returns the HTTP version of the request
    pub fn version(&self) -> Version {
        self.parts.version
    }

    /// Returns the HTTP headers of the request
    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    pub fn extensions(&self) -> &Extensions {
        &self.parts.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.parts.extensions
    }

    /// Returns the raw value decoded from the body, if a body parser handled this request
    pub fn parsed_body(&self) -> Option<&Value> {
        self.parts.extensions.get::<ParsedBody>().map(|parsed| &parsed.0)
    }

    /// Returns the symbolized parameters decoded from the body, if a body parser handled this request
    pub fn params(&self) -> Option<&Params> {
        self.parts.extensions.get::<Params>()
    }

    pub fn into_parts(self) -> Parts {
        self.parts
    }
}

impl From<Parts> for RequestContext {
    #[inline]
    fn from(parts: Parts) -> Self {
        Self { parts }
    }
}
