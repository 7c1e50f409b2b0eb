use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("invalid constraint for `{name}`: {source}")]
    InvalidConstraint {
        name: String,
        #[source]
        source: regex::Error,
    },
}

impl RouteError {
    pub fn invalid_constraint<S: ToString>(name: S, source: regex::Error) -> Self {
        Self::InvalidConstraint { name: name.to_string(), source }
    }
}
