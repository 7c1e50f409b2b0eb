//! The body parsing stage of the request pipeline.
//!
//! [`BodyParser`] is built once from the configured parsers and wraps the next handler into a
//! [`BodyParserHandler`]. For every request the handler:
//!
//! 1. reads the whole body, leaving a buffered copy behind for the next stage; an empty or already consumed body
//!    skips parsing
//! 2. resolves the media type of the `Content-Type` header and looks up its parser; no parser skips parsing
//! 3. parses the body, then stores the raw value as [`ParsedBody`] and its symbolized form as [`Params`]
//! 4. invokes the next handler and returns its result untouched
//!
//! Unknown content types pass through silently, but a malformed body of a known type aborts the request with a
//! [`ParseError`], left for the host to turn into a 4xx response.

use crate::config::BodyParserConfig;
use crate::error::{BuildError, ParseError};
use crate::handler::{HandlerResult, RequestHandler, Wrapper};
use crate::media_type::media_type;
use crate::params::Params;
use crate::parser::{ParserCatalog, ParserRegistry, ParserSpec};
use crate::request::ParsedBody;
use crate::{OptionReqBody, RequestContext};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, trace};

/// Creates body parsing handlers sharing one parser registry.
#[derive(Debug, Clone)]
pub struct BodyParser {
    registry: Arc<ParserRegistry>,
}

impl BodyParser {
    /// Builds a body parser resolving names against the built-in catalog
    pub fn new<I>(specs: I) -> Result<Self, BuildError>
    where
        I: IntoIterator,
        I::Item: Into<ParserSpec>,
    {
        Self::with_catalog(ParserCatalog::builtin(), specs)
    }

    pub fn with_catalog<I>(catalog: &ParserCatalog, specs: I) -> Result<Self, BuildError>
    where
        I: IntoIterator,
        I::Item: Into<ParserSpec>,
    {
        let registry = ParserRegistry::build(catalog, specs)?;
        Ok(Self::from_registry(registry))
    }

    pub fn from_config(config: &BodyParserConfig, catalog: &ParserCatalog) -> Result<Self, BuildError> {
        Self::with_catalog(catalog, config.parsers())
    }

    pub fn from_registry(registry: ParserRegistry) -> Self {
        Self { registry: Arc::new(registry) }
    }

    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    /// Parses `body` with the parser registered for the request's media type, and attaches the result to `req`.
    ///
    /// Returns `Ok(false)` when the body is empty or no parser is registered for the media type; `req` is left
    /// untouched then, as it is when parsing fails.
    pub fn parse(&self, req: &mut RequestContext, body: &[u8]) -> Result<bool, ParseError> {
        if body.is_empty() {
            trace!("empty request body, skip parsing");
            return Ok(false);
        }

        let Some(media_type) = media_type(req.headers()) else {
            trace!("no content type, skip parsing");
            return Ok(false);
        };

        let Some(parser) = self.registry.get(&media_type) else {
            trace!(media_type = %media_type, "no body parser registered, skip parsing");
            return Ok(false);
        };

        let parsed = parser.parse(body).inspect_err(|e| {
            debug!(media_type = %media_type, parser = parser.name(), cause = %e, "failed to parse request body");
        })?;

        let params = Params::from_parsed(&parsed);
        let extensions = req.extensions_mut();
        extensions.insert(ParsedBody(parsed));
        extensions.insert(params);

        Ok(true)
    }
}

impl<H: RequestHandler> Wrapper<H> for BodyParser {
    type Out = BodyParserHandler<H>;

    fn wrap(&self, handler: H) -> Self::Out {
        BodyParserHandler { handler, body_parser: self.clone() }
    }
}

/// A request handler that parses the request body before invoking the wrapped handler.
#[derive(Debug)]
pub struct BodyParserHandler<H> {
    handler: H,
    body_parser: BodyParser,
}

#[async_trait]
impl<H: RequestHandler> RequestHandler for BodyParserHandler<H> {
    async fn invoke(&self, req: &mut RequestContext, req_body: OptionReqBody) -> HandlerResult {
        if self.body_parser.registry.is_empty() {
            return self.handler.invoke(req, req_body).await;
        }

        match req_body.buffer().await {
            Ok(bytes) => {
                self.body_parser.parse(req, &bytes)?;
            }
            Err(ParseError::BodyConsumed) => trace!("request body already consumed, skip parsing"),
            Err(e) => return Err(e.into()),
        }

        self.handler.invoke(req, req_body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BoxError;
    use crate::parser::tests::EchoParser;
    use crate::{Param, ReqBody};
    use bytes::Bytes;
    use http::{Request, Response};
    use http_body::Frame;
    use http_body_util::StreamBody;
    use serde_json::json;
    use std::sync::Mutex;

    /// The next stage: re-reads the body and records what it saw
    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<Seen>>,
    }

    #[derive(Debug, Clone)]
    struct Seen {
        body: Bytes,
        parsed_body: Option<serde_json::Value>,
        params: Option<Params>,
    }

    impl Recorder {
        fn last(&self) -> Seen {
            self.seen.lock().unwrap().last().cloned().expect("next stage was not invoked")
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl RequestHandler for Recorder {
        async fn invoke(&self, req: &mut RequestContext, req_body: OptionReqBody) -> HandlerResult {
            let body = match req_body.bytes().await {
                Ok(body) => body,
                Err(ParseError::BodyConsumed) => Bytes::new(),
                Err(e) => return Err(e.into()),
            };
            self.seen.lock().unwrap().push(Seen {
                body,
                parsed_body: req.parsed_body().cloned(),
                params: req.params().cloned(),
            });
            Ok(Response::new(Bytes::from_static(b"ok")))
        }
    }

    fn request(content_type: Option<&str>, body: &'static str) -> (RequestContext, OptionReqBody) {
        let mut builder = Request::builder().method(http::Method::POST).uri("/books");
        if let Some(content_type) = content_type {
            builder = builder.header(http::header::CONTENT_TYPE, content_type);
        }
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        (RequestContext::from(parts), OptionReqBody::from(ReqBody::from(body)))
    }

    async fn call(
        handler: &BodyParserHandler<Arc<Recorder>>,
        content_type: Option<&str>,
        body: &'static str,
    ) -> (RequestContext, HandlerResult) {
        let (mut req, req_body) = request(content_type, body);
        let result = handler.invoke(&mut req, req_body).await;
        (req, result)
    }

    fn json_handler() -> (BodyParserHandler<Arc<Recorder>>, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let handler = BodyParser::new(["json"]).unwrap().wrap(Arc::clone(&recorder));
        (handler, recorder)
    }

    #[tokio::test]
    async fn test_parse_json() {
        let (handler, recorder) = json_handler();

        let (req, result) = call(&handler, Some("application/json"), r#"{"a": {"b": 1}}"#).await;

        assert_eq!(result.unwrap().body(), &Bytes::from_static(b"ok"));
        assert_eq!(req.parsed_body(), Some(&json!({"a": {"b": 1}})));

        let seen = recorder.last();
        assert_eq!(seen.parsed_body, Some(json!({"a": {"b": 1}})));

        let params = seen.params.unwrap();
        let expected: Params = [("a", Param::Map([("b", 1_i64)].into_iter().collect()))].into_iter().collect();
        assert_eq!(params, expected);
    }

    #[tokio::test]
    async fn test_body_is_readable_again() {
        let (handler, recorder) = json_handler();

        let (_req, result) = call(&handler, Some("application/json"), r#"{"name": "alice"}"#).await;
        result.unwrap();

        assert_eq!(recorder.last().body, Bytes::from_static(br#"{"name": "alice"}"#));
    }

    #[tokio::test]
    async fn test_streamed_body() {
        let (handler, recorder) = json_handler();

        let chunks: Vec<Result<_, BoxError>> =
            vec![Ok(Frame::data(Bytes::from_static(b"[1, "))), Ok(Frame::data(Bytes::from_static(b"2]")))];
        let request = Request::builder()
            .method(http::Method::POST)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(StreamBody::new(futures::stream::iter(chunks)))
            .unwrap();
        let (mut req, req_body) = RequestContext::from_request(request);

        handler.invoke(&mut req, req_body).await.unwrap();

        let seen = recorder.last();
        assert_eq!(seen.body, Bytes::from_static(b"[1, 2]"));
        assert_eq!(seen.parsed_body, Some(json!([1, 2])));
        assert_eq!(seen.params.unwrap().fallback(), Some(&Param::from(&json!([1, 2]))));
    }

    #[tokio::test]
    async fn test_charset_parameter() {
        let (handler, recorder) = json_handler();

        call(&handler, Some("application/json; charset=utf-8"), r#"{"a": 1}"#).await.1.unwrap();
        assert_eq!(recorder.last().parsed_body, Some(json!({"a": 1})));

        call(&handler, Some("Application/Vnd.Api+JSON"), r#"{"b": 2}"#).await.1.unwrap();
        assert_eq!(recorder.last().parsed_body, Some(json!({"b": 2})));
    }

    #[tokio::test]
    async fn test_empty_body() {
        let (handler, recorder) = json_handler();

        let (req, result) = call(&handler, Some("application/json"), "").await;

        result.unwrap();
        assert!(req.parsed_body().is_none());
        assert!(req.params().is_none());
        assert_eq!(recorder.calls(), 1);
        assert!(recorder.last().body.is_empty());
    }

    #[tokio::test]
    async fn test_unmatched_content_type() {
        let (handler, recorder) = json_handler();

        for content_type in [Some("text/plain"), Some("multipart/form-data; boundary=x"), Some(""), None] {
            let (req, result) = call(&handler, content_type, "not json at all").await;

            result.unwrap();
            assert!(req.parsed_body().is_none());
            assert!(req.params().is_none());
            assert_eq!(recorder.last().body, Bytes::from_static(b"not json at all"));
        }

        assert_eq!(recorder.calls(), 4);
    }

    #[tokio::test]
    async fn test_body_consumed_upstream() {
        let (handler, recorder) = json_handler();

        let cases = [
            (http::Method::GET, Some("text/plain")),
            (http::Method::GET, None),
            (http::Method::POST, Some("application/json")),
        ];
        for (method, content_type) in cases {
            let mut builder = Request::builder().method(method).uri("/books");
            if let Some(content_type) = content_type {
                builder = builder.header(http::header::CONTENT_TYPE, content_type);
            }
            let (mut req, req_body) = RequestContext::from_request(builder.body(ReqBody::from(r#"{"a": 1}"#)).unwrap());
            req_body.bytes().await.unwrap();

            handler.invoke(&mut req, req_body).await.unwrap();

            assert!(req.parsed_body().is_none());
            assert!(req.params().is_none());
            assert!(recorder.last().body.is_empty());
        }

        assert_eq!(recorder.calls(), 3);
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let (handler, recorder) = json_handler();

        let (req, result) = call(&handler, Some("application/json"), r#"{"a": "#).await;

        let err = result.unwrap_err();
        let parse_error = err.downcast_ref::<ParseError>().expect("parse error");
        assert!(matches!(parse_error, ParseError::Malformed { .. }));
        assert_eq!(parse_error.status_code(), http::StatusCode::BAD_REQUEST);

        assert!(req.parsed_body().is_none());
        assert!(req.params().is_none());
        assert_eq!(recorder.calls(), 0);
    }

    #[tokio::test]
    async fn test_no_parsers() {
        let recorder = Arc::new(Recorder::default());
        let handler = BodyParser::new(Vec::<ParserSpec>::new()).unwrap().wrap(Arc::clone(&recorder));

        let (req, result) = call(&handler, Some("application/json"), r#"{"a": 1}"#).await;

        result.unwrap();
        assert!(req.parsed_body().is_none());
        assert!(req.params().is_none());
        assert_eq!(recorder.last().body, Bytes::from_static(br#"{"a": 1}"#));
    }

    #[tokio::test]
    async fn test_form_and_custom_parsers() {
        let catalog =
            ParserCatalog::default().register("text", || Arc::new(EchoParser::new("text", &["text/plain"])));
        let recorder = Arc::new(Recorder::default());
        let handler =
            BodyParser::with_catalog(&catalog, ["json", "form", "text"]).unwrap().wrap(Arc::clone(&recorder));

        call(&handler, Some("application/x-www-form-urlencoded"), "name=alice&zip=10001").await.1.unwrap();
        let params = recorder.last().params.unwrap();
        assert_eq!(params["name"].as_str(), Some("alice"));
        assert_eq!(params["zip"].as_str(), Some("10001"));

        call(&handler, Some("text/plain"), "hello").await.1.unwrap();
        let seen = recorder.last();
        assert_eq!(seen.parsed_body, Some(json!("hello")));
        assert_eq!(seen.params.unwrap().fallback().and_then(Param::as_str), Some("hello"));
    }

    #[test]
    fn test_parse_directly() {
        let body_parser = BodyParser::new(["json"]).unwrap();
        let (mut req, _) = request(Some("application/json"), "");

        assert!(!body_parser.parse(&mut req, b"").unwrap());
        assert!(body_parser.parse(&mut req, b"{\"x\": true}").unwrap());
        assert_eq!(req.params().unwrap()["x"].as_bool(), Some(true));
    }

    #[test]
    fn test_build_errors() {
        assert!(matches!(BodyParser::new(["json", "xml"]), Err(BuildError::UnknownParser { .. })));
        assert!(matches!(
            BodyParser::new([ParserSpec::instance(EchoParser::new("broken", &[]))]),
            Err(BuildError::InvalidParser { .. })
        ));
    }
}
