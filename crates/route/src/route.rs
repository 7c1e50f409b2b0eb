//! The immutable description of a single route.

use crate::constraint::Constraint;
use crate::target::Target;
use http::Method;
use indexmap::IndexMap;

const ROUTE_CONSTRAINT_SEPARATOR: &str = ", ";

/// A route known to the router: method, path, target, optional name and constraints.
///
/// Routes are built once through [`Route::builder`] and never change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    http_method: Method,
    path: String,
    to: Target,
    as_name: Option<String>,
    constraints: IndexMap<String, Constraint>,
}

impl Route {
    pub fn builder(http_method: Method, path: impl Into<String>, to: impl Into<Target>) -> RouteBuilder {
        RouteBuilder {
            http_method,
            path: path.into(),
            to: to.into(),
            as_name: None,
            constraints: IndexMap::new(),
        }
    }

    pub fn http_method(&self) -> &Method {
        &self.http_method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn to(&self) -> &Target {
        &self.to
    }

    /// The name the route is known by, if any
    pub fn as_name(&self) -> Option<&str> {
        self.as_name.as_deref()
    }

    pub fn constraints(&self) -> &IndexMap<String, Constraint> {
        &self.constraints
    }

    pub fn is_head(&self) -> bool {
        self.http_method == Method::HEAD
    }

    pub fn has_constraints(&self) -> bool {
        !self.constraints.is_empty()
    }

    /// Renders the target for humans, see [`Target`]'s `Display`
    pub fn inspect_to(&self) -> String {
        self.to.to_string()
    }

    /// Renders the constraints as `name: matcher` pairs, in declaration order
    pub fn inspect_constraints(&self) -> String {
        self.constraints
            .iter()
            .map(|(name, constraint)| format!("{name}: {constraint}"))
            .collect::<Vec<_>>()
            .join(ROUTE_CONSTRAINT_SEPARATOR)
    }
}

#[derive(Debug)]
pub struct RouteBuilder {
    http_method: Method,
    path: String,
    to: Target,
    as_name: Option<String>,
    constraints: IndexMap<String, Constraint>,
}

impl RouteBuilder {
    pub fn as_name(mut self, name: impl Into<String>) -> Self {
        self.as_name = Some(name.into());
        self
    }

    pub fn constraint(mut self, name: impl Into<String>, constraint: Constraint) -> Self {
        self.constraints.insert(name.into(), constraint);
        self
    }

    pub fn build(self) -> Route {
        let RouteBuilder { http_method, path, to, as_name, constraints } = self;
        Route { http_method, path, to, as_name, constraints }
    }
}
