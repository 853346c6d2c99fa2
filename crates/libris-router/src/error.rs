//! Error types for routing and dispatch.

use thiserror::Error;

/// Errors raised while building the route table.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The route pattern could not be compiled.
    #[error("invalid route pattern: {0}")]
    InvalidPattern(String),
}

/// Errors raised while dispatching a request to a controller action.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No route in the table matched the request path.
    #[error("no route matched: {path:?}")]
    RouteNotFound { path: String },

    /// The matched route resolved to a controller nobody registered.
    #[error("controller class {0} not found")]
    ControllerNotFound(String),

    /// The action name addressed the internal method naming directly.
    #[error(
        "method {action} in controller {controller} cannot be called directly - \
         remove the Action suffix to call this method"
    )]
    InvalidActionName { controller: String, action: String },

    /// The controller exists but has no such action.
    #[error("action {action} not found in controller {controller}")]
    ActionNotFound { controller: String, action: String },

    /// The matched route did not provide a required parameter.
    #[error("matched route has no {0} parameter")]
    MissingParameter(&'static str),

    /// The action ran and failed.
    #[error("action failed: {0}")]
    Action(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl DispatchError {
    /// HTTP status code conventionally used to report this error.
    ///
    /// Everything that means "this URL does not address an action" is a 404;
    /// configuration mistakes and failed actions are a 500.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::RouteNotFound { .. }
            | Self::ControllerNotFound(_)
            | Self::InvalidActionName { .. }
            | Self::ActionNotFound { .. } => 404,
            Self::MissingParameter(_) | Self::Action(_) => 500,
        }
    }
}

/// Result type alias for route table operations.
pub type Result<T> = std::result::Result<T, RouterError>;
