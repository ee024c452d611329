//! Route table module
//!
//! An ordered list of (path rule, action) pairs. The first matching rule wins;
//! a request that matches nothing falls through to the table's fallback action.

/// Path matching rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathRule {
    /// Exact path match
    Exact(String),
}

impl PathRule {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(exact) => path == exact,
        }
    }
}

/// What to do with a matched request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAction {
    /// JSON listing of the image directory
    ListImages,
    /// Serve files from the served root
    Static,
}

#[derive(Debug, Clone)]
pub struct Route {
    pub name: &'static str,
    pub rule: PathRule,
    pub action: RouteAction,
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
    fallback: RouteAction,
}

impl RouteTable {
    pub const fn new(fallback: RouteAction) -> Self {
        Self {
            routes: Vec::new(),
            fallback,
        }
    }

    /// Append a route; routes are tried in insertion order
    #[must_use]
    pub fn route(mut self, name: &'static str, rule: PathRule, action: RouteAction) -> Self {
        self.routes.push(Route { name, rule, action });
        self
    }

    /// Table serving static files with a single exact-match listing endpoint
    pub fn gallery(list_path: &str) -> Self {
        Self::new(RouteAction::Static).route(
            "list-images",
            PathRule::Exact(list_path.to_string()),
            RouteAction::ListImages,
        )
    }

    /// Find the action for a request path (query and fragment already stripped)
    pub fn resolve(&self, path: &str) -> RouteAction {
        self.routes
            .iter()
            .find(|route| route.rule.matches(path))
            .map_or(self.fallback, |route| route.action)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}
