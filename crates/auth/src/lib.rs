//! `charterdesk-auth` — client-side authorization for the dashboard.
//!
//! Decides whether a user can reach a module, a role-gated view or a
//! navigation entry. Pure policy over an immutable session snapshot; no
//! storage or transport concerns live here.

pub mod authorize;
pub mod claims;
pub mod guard;
pub mod modules;
pub mod navigation;
pub mod roles;
pub mod session;
pub mod user;

pub use authorize::{
    authorize, explain_authorization, is_module_allowed, is_role_allowed, AccessRequirement,
    AuthorizationExplanation, AuthzError,
};
pub use claims::{validate_claims, SessionClaims, SessionError};
pub use guard::{GuardState, RouteGuard};
pub use modules::{ModuleKey, UnknownModule};
pub use navigation::{
    is_protected_path, match_route, normalize_path, visible_entries, NavEntry, RouteMatch,
    RouteSpec, LOGIN_PATH, NAV_ENTRIES,
};
pub use roles::{Role, UnknownRole};
pub use session::{
    InMemorySessionProvider, ListenerId, Session, SessionListener, SessionProvider, SessionState,
    StoredSession,
};
pub use user::User;
