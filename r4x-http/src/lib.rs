//! HTTP side of the r4x gateway: which location a request hits and how its
//! command arguments are built.
//!
//! - [`CommandTemplate`] is one command argument compiled from a template
//!   string such as `user:{path.id}`.
//! - [`Location`] binds a path pattern to the templates of one command.
//! - [`Routes`] picks the location for a request path.
//! - [`RequestContext`] is the per-request view the templates read from.

pub mod context;
pub mod location;
pub mod query;
pub mod template;

pub use context::RequestContext;
pub use location::{Location, LocationError, Routes};
pub use template::{CommandTemplate, Fragment, TemplateError};
