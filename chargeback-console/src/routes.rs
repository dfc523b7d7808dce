//! Route composition for the console navigation
//!
//! The navigable route set is a pure function of the deployment's feature
//! flags: always-present sections, plus sections gated on the multi-tenancy
//! (capsule) and cost-reporting modules. A section is excluded only when its
//! flag is explicitly `false`.

use chargeback_core::FeatureFlags;
use serde::Serialize;

/// Flag gating the multi-tenancy sections (teams, projects, users)
pub const CAPSULE_FLAG: &str = "capsuleEnabled";
/// Flag gating the cost-reporting section
pub const COST_FLAG: &str = "costEnabled";

/// The login surface; the only path the guard ever redirects to
pub const LOGIN_PATH: &str = "/login";
/// Default landing section
pub const DASHBOARD_PATH: &str = "/dashboard";

/// One navigable section of the console
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDescriptor {
    /// Path the router matches on
    pub path: &'static str,
    /// Navigation title
    pub title: &'static str,
    /// Stable section identifier for the rendering layer
    pub section: &'static str,
    /// Feature flag gating this route, if any
    pub gated_by: Option<&'static str>,
}

impl RouteDescriptor {
    const fn always(path: &'static str, title: &'static str, section: &'static str) -> Self {
        Self {
            path,
            title,
            section,
            gated_by: None,
        }
    }

    const fn gated(
        path: &'static str,
        title: &'static str,
        section: &'static str,
        flag: &'static str,
    ) -> Self {
        Self {
            path,
            title,
            section,
            gated_by: Some(flag),
        }
    }
}

/// Routes present in every deployment
const STATIC_ROUTES: [RouteDescriptor; 2] = [
    RouteDescriptor::always(DASHBOARD_PATH, "Dashboard", "dashboard"),
    RouteDescriptor::always("/nodes", "Cluster Nodes", "nodes"),
];

/// Routes gated on the multi-tenancy module
const CAPSULE_ROUTES: [RouteDescriptor; 3] = [
    RouteDescriptor::gated("/teams", "Teams", "teams", CAPSULE_FLAG),
    RouteDescriptor::gated("/projects", "Projects", "projects", CAPSULE_FLAG),
    RouteDescriptor::gated("/users", "Users", "users", CAPSULE_FLAG),
];

/// Routes gated on the cost-reporting module
const COST_ROUTES: [RouteDescriptor; 1] =
    [RouteDescriptor::gated("/cost", "Cost Reports", "cost", COST_FLAG)];

/// Trailing always-present routes
const TAIL_ROUTES: [RouteDescriptor; 2] = [
    RouteDescriptor::always("/audit", "Audit Log", "audit"),
    RouteDescriptor::always("/settings", "Settings", "settings"),
];

/// Build the navigable route set for the given feature flags.
///
/// Pure and independent of any rendering concern. The caller is expected to
/// have passed the route guard already; feature gating is irrelevant to an
/// anonymous visitor.
pub fn compose_routes(flags: &FeatureFlags) -> Vec<RouteDescriptor> {
    let mut routes = Vec::new();
    routes.extend(STATIC_ROUTES);

    if flags.is_enabled(CAPSULE_FLAG) {
        routes.extend(CAPSULE_ROUTES);
    }
    if flags.is_enabled(COST_FLAG) {
        routes.extend(COST_ROUTES);
    }

    routes.extend(TAIL_ROUTES);
    routes
}

/// Paths of a composed route set, for assertions and diagnostics
pub fn route_paths(routes: &[RouteDescriptor]) -> Vec<&'static str> {
    routes.iter().map(|route| route.path).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permissive_default_includes_every_section() {
        let routes = compose_routes(&FeatureFlags::all_enabled());
        assert_eq!(
            route_paths(&routes),
            vec![
                "/dashboard",
                "/nodes",
                "/teams",
                "/projects",
                "/users",
                "/cost",
                "/audit",
                "/settings",
            ]
        );
    }

    #[test]
    fn capsule_disabled_drops_tenancy_sections_but_keeps_cost() {
        // costEnabled absent means enabled
        let flags = FeatureFlags::all_enabled().with_flag(CAPSULE_FLAG, false);
        let routes = compose_routes(&flags);
        let paths = route_paths(&routes);

        assert!(!paths.contains(&"/teams"));
        assert!(!paths.contains(&"/projects"));
        assert!(!paths.contains(&"/users"));
        assert!(paths.contains(&"/cost"));
        assert!(paths.contains(&"/dashboard"));
    }

    #[test]
    fn cost_disabled_drops_only_cost_reports() {
        let flags = FeatureFlags::all_enabled().with_flag(COST_FLAG, false);
        let paths = route_paths(&compose_routes(&flags));

        assert!(!paths.contains(&"/cost"));
        assert!(paths.contains(&"/teams"));
        assert!(paths.contains(&"/audit"));
    }

    #[test]
    fn unknown_flags_do_not_affect_composition() {
        let flags = FeatureFlags::all_enabled().with_flag("somethingElseEnabled", false);
        assert_eq!(
            compose_routes(&flags),
            compose_routes(&FeatureFlags::all_enabled())
        );
    }

    #[test]
    fn gated_routes_carry_their_flag() {
        let routes = compose_routes(&FeatureFlags::all_enabled());
        let teams = routes.iter().find(|r| r.path == "/teams").unwrap();
        assert_eq!(teams.gated_by, Some(CAPSULE_FLAG));

        let dashboard = routes.iter().find(|r| r.path == "/dashboard").unwrap();
        assert_eq!(dashboard.gated_by, None);
    }
}
