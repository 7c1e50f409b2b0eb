use crate::error::ParseError;
use crate::parser::Parser;
use serde_json::Value;

const MIME_TYPES: &[&str] = &["application/json", "application/vnd.api+json"];

/// Parses JSON request bodies, registered in the catalog as `json`
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonParser;

impl Parser for JsonParser {
    fn mime_types(&self) -> &[&str] {
        MIME_TYPES
    }

    fn parse(&self, body: &[u8]) -> Result<Value, ParseError> {
        serde_json::from_slice(body).map_err(|e| ParseError::malformed(mime::APPLICATION_JSON, e))
    }

    fn name(&self) -> &str {
        "json"
    }
}
