use crate::error::ParseError;
use crate::parser::Parser;
use serde_json::{Map, Value};

const MIME_TYPES: &[&str] = &["application/x-www-form-urlencoded"];

/// Parses url-encoded form bodies into a flat mapping of strings, registered in the catalog as `form`.
///
/// When a field is repeated, the last value wins.
#[derive(Debug, Default, Clone, Copy)]
pub struct FormParser;

impl Parser for FormParser {
    fn mime_types(&self) -> &[&str] {
        MIME_TYPES
    }

    fn parse(&self, body: &[u8]) -> Result<Value, ParseError> {
        if let Err(e) = std::str::from_utf8(body) {
            return Err(ParseError::invalid_body(format!("form body is not utf-8: {e}")));
        }

        let pairs = serde_urlencoded::from_bytes::<Vec<(String, String)>>(body)
            .map_err(|e| ParseError::malformed(mime::APPLICATION_WWW_FORM_URLENCODED, e))?;

        let map = pairs.into_iter().map(|(key, value)| (key, Value::String(value))).collect::<Map<_, _>>();
        Ok(Value::Object(map))
    }

    fn name(&self) -> &str {
        "form"
    }
}
