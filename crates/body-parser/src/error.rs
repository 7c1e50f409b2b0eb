use http::StatusCode;
use std::io;
use thiserror::Error;

/// Errors raised while building the parser registry.
///
/// Both variants are fatal: a middleware with a broken parser configuration must not serve requests.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("unknown body parser: `{name}`")]
    UnknownParser { name: String },

    #[error("invalid body parser `{parser}`: {reason}")]
    InvalidParser { parser: String, reason: String },
}

impl BuildError {
    pub fn unknown_parser<S: ToString>(name: S) -> Self {
        Self::UnknownParser { name: name.to_string() }
    }

    pub fn invalid_parser<P: ToString, R: ToString>(parser: P, reason: R) -> Self {
        Self::InvalidParser { parser: parser.to_string(), reason: reason.to_string() }
    }
}

/// Errors raised while reading or decoding a request body.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed `{media_type}` body: {reason}")]
    Malformed { media_type: String, reason: String },

    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("body has been consumed")]
    BodyConsumed,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn malformed<M: ToString, R: ToString>(media_type: M, reason: R) -> Self {
        Self::Malformed { media_type: media_type.to_string(), reason: reason.to_string() }
    }

    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// The status a host should answer with when this error aborts a request.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ParseError::Malformed { .. } | ParseError::InvalidBody { .. } => StatusCode::BAD_REQUEST,
            ParseError::BodyConsumed | ParseError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
