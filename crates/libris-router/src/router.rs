//! The ordered route table.

use crate::error::Result;
use crate::path::RoutePattern;
use crate::request::RouteParams;

/// A single route: a compiled pattern plus fixed parameters.
#[derive(Debug, Clone)]
pub struct Route {
    /// Path pattern.
    pub pattern: RoutePattern,
    /// Parameters every match of this route starts from.
    pub defaults: RouteParams,
}

impl Route {
    /// Compiles a new route.
    pub fn new(pattern: &str, defaults: RouteParams) -> Result<Self> {
        Ok(Self {
            pattern: RoutePattern::new(pattern)?,
            defaults,
        })
    }

    /// Matches a stripped path, merging captures over the defaults.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<RouteParams> {
        let captured = self.pattern.match_path(path)?;
        let mut params = self.defaults.clone();
        params.merge(captured);
        Some(params)
    }
}

/// An ordered list of routes scanned first to last.
///
/// This is a priority list rather than a trie: the first route whose pattern
/// matches wins, so specific routes must be added before general ones.
/// Duplicate or unreachable routes are accepted silently.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Creates an empty route table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a route.
    ///
    /// # Example
    ///
    /// ```
    /// use libris_router::{RouteParams, RouteTable};
    ///
    /// let mut routes = RouteTable::new();
    /// routes
    ///     .add("", RouteParams::from([("controller", "home"), ("action", "index")]))
    ///     .unwrap();
    /// routes.add("{controller}/{action}", RouteParams::new()).unwrap();
    ///
    /// let params = routes.match_path("").unwrap();
    /// assert_eq!(params.get("controller"), Some("home"));
    /// ```
    pub fn add(&mut self, pattern: &str, defaults: RouteParams) -> Result<&mut Self> {
        self.routes.push(Route::new(pattern, defaults)?);
        Ok(self)
    }

    /// Returns the parameters of the first route matching `path`.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<RouteParams> {
        self.find(path).map(|(_, params)| params)
    }

    /// Returns the first route matching `path` along with its parameters.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<(&Route, RouteParams)> {
        self.routes
            .iter()
            .find_map(|route| route.match_path(path).map(|params| (route, params)))
    }

    /// Returns the routes in match order.
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Returns the number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns whether the table has no routes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
