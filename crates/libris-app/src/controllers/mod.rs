//! Controllers and the route table that reaches them.
//!
//! Each controller is built per request from the matched route parameters
//! and maps camelCase action names to its handler methods.

pub mod authors;
pub mod books;
pub mod home;
pub mod login;
pub mod profile;
pub mod readers;
pub mod signup;

use libris_router::{Dispatcher, RouteParams, RouteTable};

use crate::context::Ctx;
use crate::error::{AppError, Result};

pub use authors::Authors;
pub use books::Books;
pub use home::Home;
pub use login::Login;
pub use profile::Profile;
pub use readers::Readers;
pub use signup::Signup;

/// Builds the route table. Specific routes come before the generic ones.
pub fn routes() -> Result<RouteTable> {
    let mut routes = RouteTable::new();
    routes
        .add("", RouteParams::from([("controller", "home"), ("action", "index")]))?
        .add("login", RouteParams::from([("controller", "login"), ("action", "new")]))?
        .add("logout", RouteParams::from([("controller", "login"), ("action", "destroy")]))?
        .add("signup", RouteParams::from([("controller", "signup"), ("action", "new")]))?
        .add("{controller}/{action}", RouteParams::new())?
        .add("{controller}/{action}/{id:\\d+}", RouteParams::new())?;
    Ok(routes)
}

/// Builds the dispatcher with every controller registered.
pub fn dispatcher() -> Result<Dispatcher<Ctx>> {
    Ok(Dispatcher::new(routes()?)
        .controller("Home", Home::new)
        .controller("Authors", Authors::new)
        .controller("Books", Books::new)
        .controller("Login", Login::new)
        .controller("Signup", Signup::new)
        .controller("Profile", Profile::new)
        .controller("Readers", Readers::new))
}

/// Reads the numeric `id` route parameter.
fn route_id(params: &RouteParams) -> Result<i64> {
    params.parse("id").ok_or(AppError::MissingId)
}
