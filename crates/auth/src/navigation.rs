//! Navigation entries and the protected route table.

use serde::Serialize;

use crate::authorize::is_module_allowed;
use crate::guard::RouteGuard;
use crate::{ModuleKey, Role, User};

/// One sidebar entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavEntry {
    pub path: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub required_module: Option<ModuleKey>,
}

impl NavEntry {
    const fn new(
        path: &'static str,
        label: &'static str,
        icon: &'static str,
        required_module: Option<ModuleKey>,
    ) -> Self {
        Self {
            path,
            label,
            icon,
            required_module,
        }
    }
}

/// Sidebar entries in display order. Operations shares the flight module.
pub const NAV_ENTRIES: [NavEntry; 8] = [
    NavEntry::new("/", "Dashboard", "📊", None),
    NavEntry::new("/hrms", "HRMS", "👥", Some(ModuleKey::Hrms)),
    NavEntry::new("/operations", "Operations", "⚙️", Some(ModuleKey::FlightManagement)),
    NavEntry::new("/flights", "Flight Management", "✈️", Some(ModuleKey::FlightManagement)),
    NavEntry::new("/marketing", "Marketing", "📢", Some(ModuleKey::Campaigns)),
    NavEntry::new("/crm", "CRM", "💼", Some(ModuleKey::Clients)),
    NavEntry::new("/tasks", "Tasks", "✅", None),
    NavEntry::new("/announcements", "Announcements", "📣", None),
];

/// Appended for admins and superadmins by a direct role check.
pub const ADMIN_ENTRY: NavEntry = NavEntry::new("/admin/users", "User Management", "👤", None);

/// Entries the user should see, in order.
///
/// Nothing is visible without a user. Entries without a module are visible
/// to any authenticated user; the rest go through [`is_module_allowed`].
pub fn visible_entries(entries: &[NavEntry], user: Option<&User>) -> Vec<NavEntry> {
    let Some(user) = user else {
        return Vec::new();
    };

    let mut visible: Vec<NavEntry> = entries
        .iter()
        .filter(|entry| match entry.required_module {
            None => true,
            module => is_module_allowed(Some(user), module),
        })
        .copied()
        .collect();

    if matches!(user.role, Role::Admin | Role::Superadmin) {
        visible.push(ADMIN_ENTRY);
    }
    visible
}

/// A routable view and the guard protecting it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct RouteSpec {
    pub path: &'static str,
    pub guard: RouteGuard,
}

impl RouteSpec {
    const fn session(path: &'static str) -> Self {
        Self {
            path,
            guard: RouteGuard::new(crate::AccessRequirement::session()),
        }
    }

    const fn module(path: &'static str, module: ModuleKey) -> Self {
        Self {
            path,
            guard: RouteGuard::requiring_module(module),
        }
    }
}

/// Default location of the public login page.
pub const LOGIN_PATH: &str = "/login";

/// Every protected route. All of them need a session; some add a module or role.
///
/// User administration is superadmin-only even though the sidebar shows its
/// entry to admins too.
pub static ROUTES: [RouteSpec; 10] = [
    RouteSpec::session("/"),
    RouteSpec::module("/hrms", ModuleKey::Hrms),
    RouteSpec::module("/operations", ModuleKey::FlightManagement),
    RouteSpec::module("/flights", ModuleKey::FlightManagement),
    RouteSpec::module("/marketing", ModuleKey::Campaigns),
    RouteSpec::module("/crm", ModuleKey::Clients),
    RouteSpec::module("/accounting", ModuleKey::Accounting),
    RouteSpec::session("/tasks"),
    RouteSpec::session("/announcements"),
    RouteSpec {
        path: "/admin/users",
        guard: RouteGuard::requiring_role(Role::Superadmin),
    },
];

/// How a requested path should be handled before guarding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RouteMatch {
    /// The public login page; no guard applies.
    Login,
    Protected(&'static RouteSpec),
    /// Unknown path; the caller replaces it with this route (the dashboard).
    Fallback(&'static RouteSpec),
}

/// Strip trailing slashes; the empty path is the dashboard root.
pub fn normalize_path(path: &str) -> &str {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

/// Whether `path` names one of the protected routes.
pub fn is_protected_path(path: &str) -> bool {
    let normalized = normalize_path(path);
    ROUTES.iter().any(|r| r.path == normalized)
}

/// Match a path against the route table, with the login page mounted at
/// `login_path`. Trailing slashes are ignored on both.
pub fn match_route(path: &str, login_path: &str) -> RouteMatch {
    let normalized = normalize_path(path);

    if normalized == normalize_path(login_path) && !is_protected_path(login_path) {
        return RouteMatch::Login;
    }
    match ROUTES.iter().find(|r| r.path == normalized) {
        Some(route) => RouteMatch::Protected(route),
        None => RouteMatch::Fallback(&ROUTES[0]),
    }
}
