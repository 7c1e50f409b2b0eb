//! Body parsers and the ways to refer to them.
//!
//! A [`Parser`] decodes the raw bytes of a request body into a [`serde_json::Value`]. The middleware is configured
//! with a list of [`ParserSpec`]s, each one naming a parser registered in a [`ParserCatalog`], a parser type built
//! with no arguments, or a ready parser instance.

mod catalog;
mod form;
mod json;
mod registry;

pub use catalog::ParserCatalog;
pub use form::FormParser;
pub use json::JsonParser;
pub use registry::ParserRegistry;

use crate::error::{BuildError, ParseError};
use mime::Mime;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Decodes request bodies of the mime types it declares.
///
/// One instance is shared by every request matching its mime types, so parsers must not keep per-request state.
pub trait Parser: Send + Sync {
    /// The mime types this parser handles, e.g. `application/json`
    fn mime_types(&self) -> &[&str];

    /// Decodes a non-empty request body.
    fn parse(&self, body: &[u8]) -> Result<Value, ParseError>;

    /// A readable name, used in logs and errors
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl fmt::Debug for dyn Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser").field("name", &self.name()).field("mime_types", &self.mime_types()).finish()
    }
}

pub type ParserFactory = fn() -> Arc<dyn Parser>;

/// One entry of the body parser configuration.
#[derive(Clone)]
pub enum ParserSpec {
    /// A name registered in the [`ParserCatalog`]
    Name(String),
    /// A parser type, instantiated with no arguments
    Type { name: &'static str, factory: ParserFactory },
    /// A parser used as-is
    Instance(Arc<dyn Parser>),
}

impl ParserSpec {
    pub fn name(name: impl Into<String>) -> Self {
        ParserSpec::Name(name.into())
    }

    pub fn of<P: Parser + Default + 'static>() -> Self {
        ParserSpec::Type { name: std::any::type_name::<P>(), factory: create::<P> }
    }

    pub fn instance<P: Parser + 'static>(parser: P) -> Self {
        ParserSpec::Instance(Arc::new(parser))
    }

    /// Resolves this spec into a validated parser.
    pub fn resolve(&self, catalog: &ParserCatalog) -> Result<Arc<dyn Parser>, BuildError> {
        let parser = match self {
            ParserSpec::Name(name) => catalog.create(name)?,
            ParserSpec::Type { factory, .. } => factory(),
            ParserSpec::Instance(parser) => Arc::clone(parser),
        };

        ensure_parser(parser.as_ref())?;
        Ok(parser)
    }
}

impl fmt::Debug for ParserSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParserSpec::Name(name) => f.debug_tuple("Name").field(name).finish(),
            ParserSpec::Type { name, .. } => f.debug_tuple("Type").field(name).finish(),
            ParserSpec::Instance(parser) => f.debug_tuple("Instance").field(&parser.name()).finish(),
        }
    }
}

impl From<&str> for ParserSpec {
    fn from(name: &str) -> Self {
        ParserSpec::Name(name.to_owned())
    }
}

impl From<String> for ParserSpec {
    fn from(name: String) -> Self {
        ParserSpec::Name(name)
    }
}

impl From<Arc<dyn Parser>> for ParserSpec {
    fn from(parser: Arc<dyn Parser>) -> Self {
        ParserSpec::Instance(parser)
    }
}

fn create<P: Parser + Default + 'static>() -> Arc<dyn Parser> {
    Arc::new(P::default())
}

/// Checks that a parser declares at least one mime type, and that each one is a bare `type/subtype`.
fn ensure_parser(parser: &dyn Parser) -> Result<(), BuildError> {
    let mime_types = parser.mime_types();
    if mime_types.is_empty() {
        return Err(BuildError::invalid_parser(parser.name(), "no mime types declared"));
    }

    for mime_type in mime_types {
        let mime = mime_type
            .trim()
            .parse::<Mime>()
            .map_err(|e| BuildError::invalid_parser(parser.name(), format!("invalid mime type `{mime_type}`: {e}")))?;

        if mime.params().next().is_some() {
            return Err(BuildError::invalid_parser(
                parser.name(),
                format!("mime type `{mime_type}` must not carry parameters"),
            ));
        }
    }

    Ok(())
}
