use crate::error::RouteError;
use regex::Regex;
use std::fmt;

/// A matcher restricting the value a path variable may take.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// The whole value must match the pattern
    Pattern { pattern: String, regex: Regex },
    /// The value must be equal to the string
    Exact(String),
}

impl Constraint {
    pub fn pattern(name: &str, pattern: impl Into<String>) -> Result<Self, RouteError> {
        let pattern = pattern.into();
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| RouteError::invalid_constraint(name, e))?;
        Ok(Constraint::Pattern { pattern, regex })
    }

    pub fn exact(value: impl Into<String>) -> Self {
        Constraint::Exact(value.into())
    }

    pub fn is_match(&self, value: &str) -> bool {
        match self {
            Constraint::Pattern { regex, .. } => regex.is_match(value),
            Constraint::Exact(expected) => expected == value,
        }
    }
}

/// Renders the matcher the way it would be written: `/\d+/` for a pattern, `"en"` for an exact value.
impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Pattern { pattern, .. } => write!(f, "/{pattern}/"),
            Constraint::Exact(value) => write!(f, "{value:?}"),
        }
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Constraint::Pattern { pattern: a, .. }, Constraint::Pattern { pattern: b, .. }) => a == b,
            (Constraint::Exact(a), Constraint::Exact(b)) => a == b,
            _ => false,
        }
    }
}
