//! Resolving matched routes to controller actions.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::DispatchError;
use crate::inflect::{camel_case, studly_caps};
use crate::request::{strip_query_string, RouteParams};
use crate::response::Response;
use crate::router::RouteTable;

/// A boxed future for controller actions.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Suffix of the internal action naming scheme. URLs may never address it.
pub const ACTION_SUFFIX: &str = "Action";

/// Why an action stopped before producing its own page.
#[derive(Debug)]
pub enum Halt {
    /// Send this response and stop, e.g. a redirect issued by a guard.
    Respond(Response),
    /// The action failed.
    Failed(Box<dyn std::error::Error + Send + Sync>),
}

impl Halt {
    /// Wraps an error as a failed action.
    #[must_use]
    pub fn failed(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Failed(err.into())
    }
}

impl From<Response> for Halt {
    fn from(response: Response) -> Self {
        Self::Respond(response)
    }
}

/// Result of running a controller action.
pub type ActionResult = std::result::Result<Response, Halt>;

/// A controller: a set of named actions run against a request context `C`.
///
/// Implementations map camelCase action names to their own handler methods
/// and return `None` for names they do not know.
///
/// ```ignore
/// impl Controller<Ctx> for Books {
///     fn call<'a>(&'a self, action: &str, cx: &'a mut Ctx) -> Option<BoxFuture<'a, ActionResult>> {
///         let fut: BoxFuture<'a, ActionResult> = match action {
///             "index" => Box::pin(self.index(cx)),
///             "edit" => Box::pin(self.edit(cx)),
///             _ => return None,
///         };
///         Some(fut)
///     }
/// }
/// ```
pub trait Controller<C>: Send + Sync {
    /// Starts the named action.
    fn call<'a>(&'a self, action: &str, cx: &'a mut C) -> Option<BoxFuture<'a, ActionResult>>;
}

/// Builds a controller instance from the matched route parameters.
pub type ControllerFactory<C> = Arc<dyn Fn(RouteParams) -> Box<dyn Controller<C>> + Send + Sync>;

/// A route resolved to a concrete controller and action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchTarget {
    /// Controller type name, qualified by its namespace if any.
    pub controller: String,
    /// Action name in camelCase.
    pub action: String,
    /// Parameters of the matched route.
    pub params: RouteParams,
}

impl DispatchTarget {
    /// The action's internal method name, e.g. `editAction`.
    #[must_use]
    pub fn method_name(&self) -> String {
        format!("{}{ACTION_SUFFIX}", self.action)
    }
}

/// Dispatches request paths to registered controllers.
///
/// The route table and registry are read-only once built, so a dispatcher
/// can be shared between request tasks behind an `Arc`.
pub struct Dispatcher<C> {
    routes: RouteTable,
    controllers: HashMap<String, ControllerFactory<C>>,
}

impl<C: Send + 'static> Dispatcher<C> {
    /// Creates a dispatcher over a route table.
    #[must_use]
    pub fn new(routes: RouteTable) -> Self {
        Self {
            routes,
            controllers: HashMap::new(),
        }
    }

    /// Registers a controller under its type name, e.g. `Books` or
    /// `Admin::Users` for a namespaced one.
    #[must_use]
    pub fn controller<F, T>(mut self, name: &str, factory: F) -> Self
    where
        F: Fn(RouteParams) -> T + Send + Sync + 'static,
        T: Controller<C> + 'static,
    {
        let factory: ControllerFactory<C> =
            Arc::new(move |params| Box::new(factory(params)) as Box<dyn Controller<C>>);
        self.controllers.insert(name.to_string(), factory);
        self
    }

    /// Returns the route table.
    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Returns whether a controller is registered under `name`.
    #[must_use]
    pub fn has_controller(&self, name: &str) -> bool {
        self.controllers.contains_key(name)
    }

    /// Resolves a raw request path to a controller and action without running
    /// anything.
    pub fn resolve(&self, raw_path: &str) -> Result<DispatchTarget, DispatchError> {
        let path = strip_query_string(raw_path);

        let (route, params) =
            self.routes
                .find(path)
                .ok_or_else(|| DispatchError::RouteNotFound {
                    path: path.to_string(),
                })?;
        debug!(path, pattern = route.pattern.pattern(), "route matched");

        let controller = params
            .get("controller")
            .ok_or(DispatchError::MissingParameter("controller"))?;
        let controller = match params.get("namespace") {
            Some(namespace) => format!("{namespace}::{}", studly_caps(controller)),
            None => studly_caps(controller),
        };
        if !self.controllers.contains_key(&controller) {
            return Err(DispatchError::ControllerNotFound(controller));
        }

        let action = params
            .get("action")
            .ok_or(DispatchError::MissingParameter("action"))?;
        let action = camel_case(action);
        if action
            .to_ascii_lowercase()
            .ends_with(&ACTION_SUFFIX.to_ascii_lowercase())
        {
            return Err(DispatchError::InvalidActionName { controller, action });
        }

        Ok(DispatchTarget {
            controller,
            action,
            params,
        })
    }

    /// Resolves `raw_path` and runs the action against `cx`.
    ///
    /// A [`Halt::Respond`] from the action is a normal outcome and is
    /// returned as the response.
    pub async fn dispatch(&self, raw_path: &str, cx: &mut C) -> Result<Response, DispatchError> {
        let target = self.resolve(raw_path).inspect_err(|err| {
            warn!(raw_path, error = %err, "dispatch failed");
        })?;

        let factory = self
            .controllers
            .get(&target.controller)
            .ok_or_else(|| DispatchError::ControllerNotFound(target.controller.clone()))?;
        let instance = factory(target.params.clone());

        debug!(
            controller = %target.controller,
            method = %target.method_name(),
            "invoking action"
        );

        let Some(action) = instance.call(&target.action, cx) else {
            warn!(controller = %target.controller, action = %target.action, "unknown action");
            return Err(DispatchError::ActionNotFound {
                controller: target.controller,
                action: target.action,
            });
        };

        match action.await {
            Ok(response) => Ok(response),
            Err(Halt::Respond(response)) => Ok(response),
            Err(Halt::Failed(source)) => Err(DispatchError::Action(source)),
        }
    }
}
