/// Client route table and navigation guard
///
/// Paths use `:name` for dynamic segments. When several routes match, the
/// one with more static segments wins, so `/projects/create` never resolves
/// to a project detail page.

use std::collections::HashMap;

use crate::session::SessionStore;

pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteName {
    Login,
    Register,
    Dashboard,
    ProjectCreate,
    ProjectDetail,
    ProjectEdit,
    TaskCreate,
    TaskEdit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub name: RouteName,
    pub path: &'static str,
    pub requires_auth: bool,
}

const fn route(name: RouteName, path: &'static str, requires_auth: bool) -> Route {
    Route {
        name,
        path,
        requires_auth,
    }
}

pub static ROUTES: [Route; 8] = [
    route(RouteName::Login, "/login", false),
    route(RouteName::Register, "/register", false),
    route(RouteName::Dashboard, "/", true),
    route(RouteName::ProjectDetail, "/projects/:id", true),
    route(RouteName::ProjectCreate, "/projects/create", true),
    route(RouteName::ProjectEdit, "/projects/:id/edit", true),
    route(RouteName::TaskCreate, "/tasks/create", true),
    route(RouteName::TaskEdit, "/tasks/:id/edit", true),
];

/// A resolved path with its captured parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub route: &'static Route,
    pub params: HashMap<&'static str, String>,
}

impl RouteMatch {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Proceed(RouteMatch),
    Redirect(&'static str),
    NotFound,
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Number of static segments when `pattern` matches, `None` otherwise
fn match_route(
    pattern: &'static str,
    path: &[&str],
) -> Option<(usize, HashMap<&'static str, String>)> {
    let pattern = segments(pattern);
    if pattern.len() != path.len() {
        return None;
    }

    let mut params = HashMap::new();
    let mut static_segments = 0;

    for (expected, actual) in pattern.into_iter().zip(path) {
        match expected.strip_prefix(':') {
            Some(name) => {
                params.insert(name, (*actual).to_string());
            }
            None if expected == *actual => static_segments += 1,
            None => return None,
        }
    }

    Some((static_segments, params))
}

/// Resolves a path (query string and fragment ignored) against [`ROUTES`]
pub fn resolve(path: &str) -> Option<RouteMatch> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let path = segments(path);

    ROUTES
        .iter()
        .filter_map(|route| {
            match_route(route.path, &path).map(|(score, params)| (score, route, params))
        })
        .max_by_key(|(score, _, _)| *score)
        .map(|(_, route, params)| RouteMatch { route, params })
}

/// Decides a navigation given whether a token is held
pub fn navigate(path: &str, authenticated: bool) -> Navigation {
    match resolve(path) {
        None => Navigation::NotFound,
        Some(matched) if matched.route.requires_auth && !authenticated => {
            tracing::debug!(path, "Navigation requires authentication, redirecting");
            Navigation::Redirect(LOGIN_PATH)
        }
        Some(matched) => Navigation::Proceed(matched),
    }
}

/// [`navigate`] against the current session
pub fn guard(session: &SessionStore, path: &str) -> Navigation {
    navigate(path, session.is_authenticated())
}
