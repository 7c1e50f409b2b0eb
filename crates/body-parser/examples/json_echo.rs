use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response, StatusCode};
use http_body_util::Full;
use micro_body_parser::{
    BodyParser, BodyParserConfig, HandlerResult, OptionReqBody, ParseError, ParserCatalog, RequestContext,
    RequestHandler, Wrapper,
};
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

struct Echo;

#[async_trait]
impl RequestHandler for Echo {
    async fn invoke(&self, req: &mut RequestContext, req_body: OptionReqBody) -> HandlerResult {
        let raw = req_body.bytes().await?;
        info!(raw = %String::from_utf8_lossy(&raw), "raw body still readable");

        let body = match req.params() {
            Some(params) => serde_json::to_string(params)?,
            None => "no params".to_string(),
        };
        Ok(Response::new(Bytes::from(body)))
    }
}

async fn send(handler: &impl RequestHandler, content_type: &str, body: &'static str) {
    let request = Request::post("/echo")
        .header(http::header::CONTENT_TYPE, content_type)
        .body(Full::new(Bytes::from_static(body.as_bytes())))
        .expect("valid request");
    let (mut req, req_body) = RequestContext::from_request(request);

    match handler.invoke(&mut req, req_body).await {
        Ok(response) => info!(content_type, response = %String::from_utf8_lossy(response.body()), "handled"),
        Err(e) => {
            let status = e.downcast_ref::<ParseError>().map_or(StatusCode::INTERNAL_SERVER_ERROR, ParseError::status_code);
            error!(content_type, %status, cause = %e, "request failed");
        }
    }
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::TRACE).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let config: BodyParserConfig =
        serde_json::from_str(r#"{"parsers": ["json", "form"]}"#).expect("valid body parser config");
    let body_parser = match BodyParser::from_config(&config, ParserCatalog::builtin()) {
        Ok(body_parser) => body_parser,
        Err(e) => {
            error!(cause = %e, "build body parser error");
            return;
        }
    };
    info!(registry = ?body_parser.registry(), "body parser ready");

    let handler = body_parser.wrap(Echo);

    send(&handler, "application/json; charset=utf-8", r#"{"user": {"name": "alice", "roles": ["admin"]}}"#).await;
    send(&handler, "application/x-www-form-urlencoded", "name=bob&zip=10001").await;
    send(&handler, "text/plain", "left untouched").await;
    send(&handler, "application/json", r#"{"broken": "#).await;
}
