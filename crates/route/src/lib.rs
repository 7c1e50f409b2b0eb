//! Route descriptors for the micro web framework.
//!
//! A [`Route`] is the value the router keeps for each registered route. It is read when matching requests and
//! when listing routes for humans, through [`Route::inspect_to`] and [`Route::inspect_constraints`].

mod constraint;
mod error;
mod route;
mod target;

pub use constraint::Constraint;
pub use error::RouteError;
pub use route::Route;
pub use route::RouteBuilder;
pub use target::Redirect;
pub use target::Target;
