//! A request body parsing stage for the micro web framework.
//!
//! The [`BodyParser`] middleware sits in front of a [`RequestHandler`]. It picks a [`Parser`] by the media type of
//! the request's `Content-Type`, decodes the body, and attaches the result to the [`RequestContext`] twice: as the
//! raw [`ParsedBody`] and as symbol-keyed [`Params`]. The next handler always runs, and can still read the body.
//!
//! # Example
//!
//! ```
//! use async_trait::async_trait;
//! use bytes::Bytes;
//! use http::{Request, Response};
//! use http_body_util::Full;
//! use micro_body_parser::{BodyParser, HandlerResult, OptionReqBody, RequestContext, RequestHandler, Wrapper};
//!
//! struct Greet;
//!
//! #[async_trait]
//! impl RequestHandler for Greet {
//!     async fn invoke(&self, req: &mut RequestContext, _body: OptionReqBody) -> HandlerResult {
//!         let name = req.params().and_then(|params| params.get("name")?.as_str()).unwrap_or("stranger");
//!         Ok(Response::new(Bytes::from(format!("hello {name}"))))
//!     }
//! }
//!
//! # tokio_test();
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn tokio_test() {
//! let handler = BodyParser::new(["json"]).unwrap().wrap(Greet);
//!
//! let request = Request::post("/greet")
//!     .header(http::header::CONTENT_TYPE, "application/json; charset=utf-8")
//!     .body(Full::new(Bytes::from_static(br#"{"name": "alice"}"#)))
//!     .unwrap();
//! let (mut req, body) = RequestContext::from_request(request);
//!
//! let response = handler.invoke(&mut req, body).await.unwrap();
//! assert_eq!(response.body(), "hello alice");
//! # }
//! ```

mod body;
mod config;
mod error;
mod handler;
mod media_type;
mod middleware;
mod params;
mod request;

pub mod parser;

pub use body::BoxError;
pub use body::OptionReqBody;
pub use body::ReqBody;
pub use config::BodyParserConfig;
pub use error::BuildError;
pub use error::ParseError;
pub use handler::HandlerResult;
pub use handler::RequestHandler;
pub use handler::Wrapper;
pub use media_type::media_type;
pub use middleware::BodyParser;
pub use middleware::BodyParserHandler;
pub use params::FALLBACK_KEY;
pub use params::Param;
pub use params::Params;
pub use params::Symbol;
pub use parser::Parser;
pub use parser::ParserCatalog;
pub use parser::ParserSpec;
pub use request::ParsedBody;
pub use request::RequestContext;
