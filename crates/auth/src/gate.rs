//! Route-level access decisions.
//!
//! A [`RouteGuard`] holds a table of path patterns. Segments starting with `:` match any single
//! segment and a trailing `*` matches the rest of the path. The most specific matching pattern
//! decides: an exact pattern beats a wildcard, and a longer wildcard beats a shorter one. Paths no
//! pattern covers are public.

use crate::constants::{LOGIN_PATH, UNAUTHORIZED_PATH};
use crate::service::default_app_path;
use portal_types::Role;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    /// Not signed in. `from` is the requested path.
    RedirectToLogin { from: String },
    RedirectToUnauthorized,
}

impl GateDecision {
    /// Where a browser should be sent, if anywhere.
    pub fn location(&self) -> Option<&'static str> {
        match self {
            GateDecision::Allow => None,
            GateDecision::RedirectToLogin { .. } => Some(LOGIN_PATH),
            GateDecision::RedirectToUnauthorized => Some(UNAUTHORIZED_PATH),
        }
    }
}

/// The core rule: anonymous users go to login, and an allowlist, when present, must name the
/// user's role.
pub fn decide(role: Option<Role>, allowlist: Option<&[Role]>, path: &str) -> GateDecision {
    match (role, allowlist) {
        (None, _) => GateDecision::RedirectToLogin {
            from: path.to_owned(),
        },
        (Some(role), Some(allowed)) if !allowed.is_empty() && !allowed.contains(&role) => {
            GateDecision::RedirectToUnauthorized
        }
        _ => GateDecision::Allow,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Any signed-in role.
    Authenticated,
    Roles(Vec<Role>),
}

#[derive(Clone, Debug)]
struct RouteRule {
    segments: Vec<String>,
    wildcard: bool,
    access: Access,
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

impl RouteRule {
    fn parse(pattern: &str, access: Access) -> Self {
        let mut segments: Vec<String> = segments(pattern).map(str::to_owned).collect();
        let wildcard = segments.last().is_some_and(|s| s == "*");
        if wildcard {
            segments.pop();
        }
        Self {
            segments,
            wildcard,
            access,
        }
    }

    fn matches(&self, path: &[&str]) -> bool {
        let len_ok = if self.wildcard {
            path.len() >= self.segments.len()
        } else {
            path.len() == self.segments.len()
        };
        len_ok
            && self
                .segments
                .iter()
                .zip(path)
                .all(|(pattern, actual)| pattern.starts_with(':') || pattern == actual)
    }

    /// Exact patterns rank above every wildcard; then longer patterns rank higher.
    fn rank(&self) -> (bool, usize) {
        (!self.wildcard, self.segments.len())
    }
}

#[derive(Clone, Debug, Default)]
pub struct RouteGuard {
    rules: Vec<RouteRule>,
}

impl RouteGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, pattern: &str, access: Access) -> Self {
        self.rules.push(RouteRule::parse(pattern, access));
        self
    }

    pub fn roles(self, pattern: &str, roles: &[Role]) -> Self {
        self.rule(pattern, Access::Roles(roles.to_vec()))
    }

    /// The access level governing `path`, or `None` when no pattern covers it.
    pub fn access_for(&self, path: &str) -> Option<&Access> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let parts: Vec<&str> = segments(path).collect();
        self.rules
            .iter()
            .filter(|rule| rule.matches(&parts))
            .max_by_key(|rule| rule.rank())
            .map(|rule| &rule.access)
    }

    pub fn check(&self, path: &str, role: Option<Role>) -> GateDecision {
        match self.access_for(path) {
            None | Some(Access::Public) => GateDecision::Allow,
            Some(Access::Authenticated) => decide(role, None, path),
            Some(Access::Roles(allowed)) => decide(role, Some(allowed), path),
        }
    }
}

const ALL_ROLES: &[Role] = &[Role::Admin, Role::Doctor, Role::Patient];
const STAFF: &[Role] = &[Role::Admin, Role::Doctor];
const ADMIN: &[Role] = &[Role::Admin];

/// The signed-in area of the portal.
pub fn app_routes() -> RouteGuard {
    RouteGuard::new()
        .rule("/app/*", Access::Authenticated)
        .roles("/app/search", ALL_ROLES)
        .roles("/app/dashboard", ADMIN)
        .roles("/app/doctor-dashboard", &[Role::Doctor])
        .roles("/app/patient-dashboard", &[Role::Patient])
        .roles("/app/patients/:id", ALL_ROLES)
        .roles("/app/appointments", ALL_ROLES)
        .roles("/app/appointments/:id", ALL_ROLES)
        .roles("/app/medical-records", ALL_ROLES)
        .roles("/app/medical-records/:id", ALL_ROLES)
        .roles("/app/prescriptions", ALL_ROLES)
        .roles("/app/prescriptions/:id", ALL_ROLES)
        .roles("/app/services", ALL_ROLES)
        .roles("/app/patients", STAFF)
        .roles("/app/doctors", ADMIN)
        .roles("/app/hospitals", ADMIN)
        .roles("/app/locations", ADMIN)
}

/// The REST API. Per-record permissions are enforced by the data layer; this table only keeps
/// anonymous callers out and reserves the staff-only endpoints.
pub fn api_routes() -> RouteGuard {
    RouteGuard::new()
        .rule("/api/*", Access::Authenticated)
        .rule("/api/auth/*", Access::Public)
        .rule("/api/session/*", Access::Public)
        .roles("/api/dashboard", ADMIN)
        .roles("/api/users", STAFF)
}

/// Where `/app` itself sends the user.
pub fn index_redirect(role: Option<Role>) -> &'static str {
    role.map(default_app_path).unwrap_or(LOGIN_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decide_follows_the_three_outcomes() {
        assert_eq!(
            decide(None, Some(ADMIN), "/app/dashboard"),
            GateDecision::RedirectToLogin {
                from: "/app/dashboard".into()
            }
        );
        assert_eq!(
            decide(Some(Role::Patient), Some(ADMIN), "/app/dashboard"),
            GateDecision::RedirectToUnauthorized
        );
        assert_eq!(decide(Some(Role::Admin), Some(ADMIN), "/x"), GateDecision::Allow);
        assert_eq!(decide(Some(Role::Patient), None, "/x"), GateDecision::Allow);
    }

    #[test]
    fn specific_rule_beats_enclosing_one() {
        let routes = app_routes();
        assert_eq!(
            routes.check("/app/patients", Some(Role::Patient)),
            GateDecision::RedirectToUnauthorized
        );
        assert_eq!(
            routes.check("/app/patients/P001", Some(Role::Patient)),
            GateDecision::Allow
        );
        assert_eq!(
            routes.check("/app/hospitals", Some(Role::Doctor)),
            GateDecision::RedirectToUnauthorized
        );
    }

    #[test]
    fn unlisted_app_paths_need_any_sign_in() {
        let routes = app_routes();
        assert_eq!(routes.check("/app/profile", Some(Role::Patient)), GateDecision::Allow);
        assert_eq!(
            routes.check("/app/profile", None),
            GateDecision::RedirectToLogin {
                from: "/app/profile".into()
            }
        );
        assert_eq!(routes.check("/about", None), GateDecision::Allow);
    }

    #[test]
    fn api_table() {
        let routes = api_routes();
        assert_eq!(routes.check("/api/auth/login", None), GateDecision::Allow);
        assert_eq!(routes.check("/api/session", None), GateDecision::Allow);
        assert_eq!(routes.check("/api/session/route", None), GateDecision::Allow);
        assert!(matches!(
            routes.check("/api/hospitals?x=1", None),
            GateDecision::RedirectToLogin { .. }
        ));
        assert_eq!(
            routes.check("/api/dashboard", Some(Role::Doctor)),
            GateDecision::RedirectToUnauthorized
        );
        assert_eq!(routes.check("/api/users", Some(Role::Doctor)), GateDecision::Allow);
        assert_eq!(routes.check("/health", None), GateDecision::Allow);
    }

    #[test]
    fn index_goes_to_role_landing_page() {
        assert_eq!(index_redirect(None), "/login");
        assert_eq!(index_redirect(Some(Role::Admin)), "/app/dashboard");
        assert_eq!(index_redirect(Some(Role::Patient)), "/app/patient-dashboard");
    }
}
