//! Request routing for the libris catalog.
//!
//! A [`RouteTable`] is an ordered list of path patterns, each with a set of
//! default parameters. A [`Dispatcher`] strips the query string from the
//! request target, finds the first matching route, and turns its
//! `controller` and `action` parameters into a registered [`Controller`] and
//! one of its actions.
//!
//! ```
//! use libris_router::{RouteParams, RouteTable};
//!
//! let mut routes = RouteTable::new();
//! routes.add("{controller}/{action}/{id:\\d+}", RouteParams::new()).unwrap();
//!
//! let params = routes.match_path("books/edit/7").unwrap();
//! assert_eq!(params.get("controller"), Some("books"));
//! assert_eq!(params.get("id"), Some("7"));
//! ```

mod dispatch;
mod error;
mod inflect;
mod path;
mod request;
mod response;
mod router;

pub use dispatch::{
    ActionResult, BoxFuture, Controller, ControllerFactory, DispatchTarget, Dispatcher, Halt,
    ACTION_SUFFIX,
};
pub use error::{DispatchError, Result, RouterError};
pub use inflect::{camel_case, studly_caps};
pub use path::RoutePattern;
pub use request::{strip_query_string, Method, Request, RouteParams};
pub use response::Response;
pub use router::{Route, RouteTable};
