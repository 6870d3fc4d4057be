//! # Route Table
//!
//! Maps back-office paths to their access rules. Protected routes collect
//! the guards of every enclosing layout first, then their own, so a view
//! nested under `/dashboard` is covered by the layout's redirect even when
//! its own guard is `Passive`.
//!
//! Patterns are `/`-separated; a `:name` segment captures one path segment.
//! Routes match in registration order.

use expd_core::ValidationError;

use crate::guard::{Guard, GuardOutcome, GuardVariant};
use crate::session::Session;

/// Path of the sign-in screen.
pub const SIGN_IN_PATH: &str = "/auth/sign-in";

/// Query parameter carrying the post-login return path.
pub const REDIRECT_PARAM: &str = "redirect";

/// Reference screens backed by one CRUD resource each.
const RESOURCE_SCREENS: &[&str] = &[
    "assignments",
    "vehicles",
    "vehicle-states",
    "vehicle-brands",
    "vehicle-models",
    "insurers",
    "repairers",
    "clients",
    "invoices",
    "payments",
];

/// Who may open a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// Anyone.
    Public,
    /// Signed-in operators, enforced by the given guard.
    Protected(GuardVariant),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

#[derive(Debug, Clone)]
struct Route {
    name: String,
    segments: Vec<Segment>,
    access: RouteAccess,
}

#[derive(Debug, Clone)]
struct Layout {
    prefix: Vec<String>,
    guard: GuardVariant,
}

/// A matched route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    /// Route name, e.g. `vehicles.show`.
    pub name: String,
    /// Captured `:param` segments in pattern order.
    pub params: Vec<(String, String)>,
    /// Guards to pass, outermost layout first. Empty for public routes.
    pub guards: Vec<GuardVariant>,
}

impl ResolvedRoute {
    /// Captured value of `:name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Outcome of opening a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Every guard passed.
    Render(ResolvedRoute),
    /// The session is still undecided.
    Loading(String),
    /// Go to sign-in.
    Redirect(String),
    /// A passive guard blocked the view.
    Nothing,
    /// No route matches.
    NotFound,
}

/// Registered routes and layouts.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    layouts: Vec<Layout>,
    routes: Vec<Route>,
}

impl RouteTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route.
    pub fn route(
        mut self,
        name: impl Into<String>,
        pattern: &str,
        access: RouteAccess,
    ) -> Result<Self, ValidationError> {
        let segments = parse_pattern(pattern)?;
        self.routes.push(Route {
            name: name.into(),
            segments,
            access,
        });
        Ok(self)
    }

    /// Guard every protected route under `prefix` with `guard`.
    pub fn layout(mut self, prefix: &str, guard: GuardVariant) -> Result<Self, ValidationError> {
        let prefix = parse_pattern(prefix)?
            .into_iter()
            .map(|s| match s {
                Segment::Static(s) => Ok(s),
                Segment::Param(p) => Err(ValidationError::InvalidPath(format!(
                    "layout prefix cannot capture :{p}"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.layouts.push(Layout { prefix, guard });
        Ok(self)
    }

    /// The back-office tree: public auth screens, a redirecting
    /// `/dashboard` layout, and admin-only user management behind a strict
    /// guard.
    pub fn default_tree() -> Self {
        let mut routes = vec![
            ("sign-in".to_string(), SIGN_IN_PATH.to_string(), RouteAccess::Public),
            (
                "forgot-password".to_string(),
                "/auth/forgot-password".to_string(),
                RouteAccess::Public,
            ),
            (
                "home".to_string(),
                "/".to_string(),
                RouteAccess::Protected(GuardVariant::Redirecting),
            ),
        ];
        let passive = RouteAccess::Protected(GuardVariant::Passive);
        for (name, pattern) in [
            ("dashboard", "/dashboard"),
            ("statistics", "/dashboard/statistics"),
            ("profile", "/dashboard/profile"),
        ] {
            routes.push((name.to_string(), pattern.to_string(), passive));
        }
        for screen in RESOURCE_SCREENS {
            routes.push((format!("{screen}.index"), format!("/dashboard/{screen}"), passive));
            routes.push((format!("{screen}.create"), format!("/dashboard/{screen}/new"), passive));
            routes.push((format!("{screen}.show"), format!("/dashboard/{screen}/:id"), passive));
        }
        let strict = RouteAccess::Protected(GuardVariant::Strict);
        routes.push(("users.index".into(), "/dashboard/users".into(), strict));
        routes.push(("users.show".into(), "/dashboard/users/:id".into(), strict));

        let mut table = Self::new();
        table.layouts.push(Layout {
            prefix: vec!["dashboard".into()],
            guard: GuardVariant::Redirecting,
        });
        for (name, pattern, access) in routes {
            if let Ok(segments) = parse_pattern(&pattern) {
                table.routes.push(Route {
                    name,
                    segments,
                    access,
                });
            }
        }
        table
    }

    /// Match `path` (query and fragment ignored).
    pub fn resolve(&self, path: &str) -> Option<ResolvedRoute> {
        let parts = path_segments(path);
        self.routes.iter().find_map(|route| {
            let params = match_segments(&route.segments, &parts)?;
            let guards = match route.access {
                RouteAccess::Public => Vec::new(),
                RouteAccess::Protected(own) => self
                    .layouts
                    .iter()
                    .filter(|l| has_prefix(&parts, &l.prefix))
                    .map(|l| l.guard)
                    .chain(std::iter::once(own))
                    .collect(),
            };
            Some(ResolvedRoute {
                name: route.name.clone(),
                params,
                guards,
            })
        })
    }

    /// Open `path`: resolve the route, then pass each guard outermost first.
    /// The first guard that does not render decides.
    pub async fn navigate(&self, session: &Session, path: &str) -> Navigation {
        let Some(route) = self.resolve(path) else {
            return Navigation::NotFound;
        };
        for variant in &route.guards {
            match Guard::new(*variant).resolve(session, path).await {
                GuardOutcome::Render => continue,
                GuardOutcome::Loading(text) => return Navigation::Loading(text),
                GuardOutcome::Redirect { to } => return Navigation::Redirect(to),
                GuardOutcome::Nothing => return Navigation::Nothing,
            }
        }
        Navigation::Render(route)
    }
}

/// Sign-in URL returning to `requested_path` after login.
pub fn sign_in_redirect(requested_path: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(requested_path.as_bytes()).collect();
    format!("{SIGN_IN_PATH}?{REDIRECT_PARAM}={encoded}")
}

/// Post-login return path from a sign-in query string (leading `?`
/// optional). Only same-origin absolute paths are accepted.
pub fn return_path(query: &str) -> Option<String> {
    let query = query.trim_start_matches('?');
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == REDIRECT_PARAM)
        .map(|(_, v)| v.into_owned())
        .filter(|p| is_local_path(p))
}

fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.contains('\\')
}

fn parse_pattern(pattern: &str) -> Result<Vec<Segment>, ValidationError> {
    if !pattern.starts_with('/') {
        return Err(ValidationError::InvalidPath(pattern.to_string()));
    }
    pattern
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| match s.strip_prefix(':') {
            Some("") => Err(ValidationError::InvalidPath(pattern.to_string())),
            Some(name) => Ok(Segment::Param(name.to_string())),
            None => Ok(Segment::Static(s.to_string())),
        })
        .collect()
}

fn path_segments(path: &str) -> Vec<&str> {
    let end = path.find(|c| c == '?' || c == '#').unwrap_or(path.len());
    path[..end].split('/').filter(|s| !s.is_empty()).collect()
}

fn has_prefix(parts: &[&str], prefix: &[String]) -> bool {
    parts.len() >= prefix.len() && prefix.iter().zip(parts).all(|(p, part)| p == part)
}

fn match_segments(pattern: &[Segment], parts: &[&str]) -> Option<Vec<(String, String)>> {
    if pattern.len() != parts.len() {
        return None;
    }
    let mut params = Vec::new();
    for (segment, part) in pattern.iter().zip(parts) {
        match segment {
            Segment::Static(s) if s == part => {}
            Segment::Static(_) => return None,
            Segment::Param(name) => params.push((name.clone(), (*part).to_string())),
        }
    }
    Some(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn detail_route_captures_id() {
        let table = RouteTable::default_tree();
        let route = table.resolve("/dashboard/vehicles/42").unwrap();
        assert_eq!(route.name, "vehicles.show");
        assert_eq!(route.param("id"), Some("42"));
        assert_eq!(
            route.guards,
            vec![GuardVariant::Redirecting, GuardVariant::Passive]
        );
    }

    #[test]
    fn static_segment_wins_over_param_registered_later() {
        let table = RouteTable::default_tree();
        assert_eq!(table.resolve("/dashboard/invoices/new").unwrap().name, "invoices.create");
    }

    #[test]
    fn query_and_trailing_slash_ignored() {
        let table = RouteTable::default_tree();
        let route = table.resolve("/dashboard/vehicle-states/?page=2").unwrap();
        assert_eq!(route.name, "vehicle-states.index");
    }

    #[test]
    fn public_routes_have_no_guards() {
        let table = RouteTable::default_tree();
        let route = table.resolve("/auth/sign-in?redirect=%2Fdashboard").unwrap();
        assert_eq!(route.name, "sign-in");
        assert!(route.guards.is_empty());
    }

    #[test]
    fn users_are_strict() {
        let table = RouteTable::default_tree();
        let route = table.resolve("/dashboard/users").unwrap();
        assert_eq!(route.guards.last(), Some(&GuardVariant::Strict));
    }

    #[test]
    fn unknown_path_does_not_resolve() {
        assert!(RouteTable::default_tree().resolve("/dashboard/garages").is_none());
    }

    #[test]
    fn pattern_must_be_absolute() {
        let err = RouteTable::new()
            .route("x", "dashboard", RouteAccess::Public)
            .unwrap_err();
        assert_eq!(err, ValidationError::InvalidPath("dashboard".into()));
    }

    #[test]
    fn layout_cannot_capture() {
        assert!(RouteTable::new()
            .layout("/tenants/:id", GuardVariant::Redirecting)
            .is_err());
    }

    #[test]
    fn custom_layout_applies_to_nested_routes_only() {
        let table = RouteTable::new()
            .layout("/admin", GuardVariant::Strict)
            .unwrap()
            .route("admin", "/admin/settings", RouteAccess::Protected(GuardVariant::Passive))
            .unwrap()
            .route("about", "/about", RouteAccess::Protected(GuardVariant::Redirecting))
            .unwrap();
        assert_eq!(
            table.resolve("/admin/settings").unwrap().guards,
            vec![GuardVariant::Strict, GuardVariant::Passive]
        );
        assert_eq!(
            table.resolve("/about").unwrap().guards,
            vec![GuardVariant::Redirecting]
        );
    }

    #[test]
    fn redirect_encodes_requested_path() {
        assert_eq!(
            sign_in_redirect("/dashboard/vehicles?page=2"),
            "/auth/sign-in?redirect=%2Fdashboard%2Fvehicles%3Fpage%3D2"
        );
    }

    #[test]
    fn return_path_rejects_foreign_targets() {
        assert_eq!(return_path("?redirect=https%3A%2F%2Fevil.example"), None);
        assert_eq!(return_path("redirect=%2F%2Fevil.example"), None);
        assert_eq!(return_path("other=1"), None);
        assert_eq!(
            return_path("redirect=%2Fdashboard&x=1"),
            Some("/dashboard".to_string())
        );
    }

    proptest! {
        #[test]
        fn redirect_round_trips(path in "/[a-z0-9/_ ?=&%-]{0,40}") {
            prop_assume!(!path.starts_with("//"));
            let url = sign_in_redirect(&path);
            let query = url.split_once('?').map(|(_, q)| q).unwrap_or_default();
            prop_assert_eq!(return_path(query), Some(path));
        }
    }
}
