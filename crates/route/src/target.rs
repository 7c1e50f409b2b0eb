//! What a route points at, and how it is shown to humans.

use http::StatusCode;
use std::fmt;

/// A redirect answered by the router itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    destination: String,
    code: StatusCode,
}

impl Redirect {
    pub fn new(destination: impl Into<String>, code: StatusCode) -> Self {
        Self { destination: destination.into(), code }
    }

    /// A `301 Moved Permanently` redirect
    pub fn permanent(destination: impl Into<String>) -> Self {
        Self::new(destination, StatusCode::MOVED_PERMANENTLY)
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn code(&self) -> StatusCode {
        self.code
    }
}

impl fmt::Display for Redirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (HTTP {})", self.destination, self.code.as_u16())
    }
}

/// The handler target of a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A named action, e.g. `books.show`
    Action(String),
    /// An anonymous callable
    Proc,
    /// An endpoint type, by its name when it has one
    Type(Option<&'static str>),
    /// An inline block
    Block,
    /// A redirect
    Redirect(Redirect),
    /// An endpoint instance, shown as its type
    Instance(&'static str),
}

impl Target {
    pub fn action(name: impl Into<String>) -> Self {
        Target::Action(name.into())
    }

    pub fn of_type<T: ?Sized>() -> Self {
        Target::Type(Some(std::any::type_name::<T>()))
    }

    pub fn instance<T: ?Sized>(endpoint: &T) -> Self {
        Target::Instance(std::any::type_name_of_val(endpoint))
    }

    pub fn redirect(redirect: Redirect) -> Self {
        Target::Redirect(redirect)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Action(name) => f.write_str(name),
            Target::Proc => f.write_str("(proc)"),
            Target::Type(Some(name)) => f.write_str(name),
            Target::Type(None) => f.write_str("(class)"),
            Target::Block => f.write_str("(block)"),
            Target::Redirect(redirect) => fmt::Display::fmt(redirect, f),
            Target::Instance(type_name) => fmt::Display::fmt(&Target::Type(Some(*type_name)), f),
        }
    }
}

impl From<&str> for Target {
    fn from(name: &str) -> Self {
        Target::Action(name.to_owned())
    }
}

impl From<String> for Target {
    fn from(name: String) -> Self {
        Target::Action(name)
    }
}

impl From<Redirect> for Target {
    fn from(redirect: Redirect) -> Self {
        Target::Redirect(redirect)
    }
}
