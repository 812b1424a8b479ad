//! Route guard for protected views.
//!
//! One guard per protected view, evaluated on every render. The guard holds
//! no memory between evaluations: each mount starts over from
//! [`GuardState::CheckingSession`].

use serde::Serialize;

use crate::authorize::{is_module_allowed, is_role_allowed, AccessRequirement};
use crate::session::SessionState;
use crate::{ModuleKey, Role};

/// Where a guarded view stands for the current render.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GuardState {
    /// Session check still in flight.
    CheckingSession,
    /// No valid token or no user; the caller redirects to login.
    DeniedNoSession,
    DeniedRole { required: Role },
    DeniedModule { required: ModuleKey },
    Granted,
}

impl GuardState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GuardState::CheckingSession)
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, GuardState::Granted)
    }

    /// In-place message for the access-denied view, if this state shows one.
    ///
    /// A missing session redirects instead, so it has no message.
    pub fn denial_message(&self) -> Option<String> {
        match self {
            GuardState::DeniedRole { required } => Some(format!(
                "You don't have permission to access this page. Required role: {required}"
            )),
            GuardState::DeniedModule { required } => {
                Some(format!("You don't have access to the {required} module."))
            }
            _ => None,
        }
    }
}

/// Guard configuration for one protected view.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouteGuard {
    requirement: AccessRequirement,
}

impl RouteGuard {
    pub const fn new(requirement: AccessRequirement) -> Self {
        Self { requirement }
    }

    pub const fn requiring_module(module: ModuleKey) -> Self {
        Self::new(AccessRequirement::module(module))
    }

    pub const fn requiring_role(role: Role) -> Self {
        Self::new(AccessRequirement::role(role))
    }

    pub fn requirement(&self) -> &AccessRequirement {
        &self.requirement
    }

    /// Run the guard against the current session snapshot.
    pub fn evaluate(&self, session: &SessionState) -> GuardState {
        if session.is_loading() {
            return GuardState::CheckingSession;
        }

        let user = match session.user() {
            Some(user) if session.has_token() => user,
            _ => return GuardState::DeniedNoSession,
        };

        if let Some(required) = self.requirement.required_role {
            if !is_role_allowed(Some(user), Some(required)) {
                tracing::debug!(user_id = %user.id, %required, "route denied: role");
                return GuardState::DeniedRole { required };
            }
        }

        if let Some(required) = self.requirement.required_module {
            if !is_module_allowed(Some(user), Some(required)) {
                tracing::debug!(user_id = %user.id, %required, "route denied: module");
                return GuardState::DeniedModule { required };
            }
        }

        GuardState::Granted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::SessionClaims;
    use crate::session::Session;
    use crate::User;
    use charterdesk_core::UserId;
    use chrono::{Duration, Utc};
    use std::sync::Arc;

    fn signed_in(role: Role, modules: &[ModuleKey]) -> SessionState {
        let id = UserId::new("u-1").unwrap();
        let user = User::new(id.clone(), "Kim", "kim@example.com", role)
            .with_modules(modules.iter().copied());
        let claims = SessionClaims {
            sub: id,
            issued_at: None,
            expires_at: Utc::now() + Duration::hours(1),
        };
        SessionState::Authenticated(Arc::new(Session::new("tok", claims, user).unwrap()))
    }

    #[test]
    fn loading_session_keeps_checking() {
        let guard = RouteGuard::requiring_module(ModuleKey::Hrms);
        let state = guard.evaluate(&SessionState::Loading);
        assert_eq!(state, GuardState::CheckingSession);
        assert!(!state.is_terminal());
    }

    #[test]
    fn anonymous_is_denied_without_a_message() {
        let state = RouteGuard::default().evaluate(&SessionState::Anonymous);
        assert_eq!(state, GuardState::DeniedNoSession);
        assert!(state.denial_message().is_none());
    }

    #[test]
    fn accounting_view_denies_hrms_only_user() {
        let guard = RouteGuard::requiring_module(ModuleKey::Accounting);
        let state = guard.evaluate(&signed_in(Role::User, &[ModuleKey::Hrms]));

        assert_eq!(
            state,
            GuardState::DeniedModule {
                required: ModuleKey::Accounting
            }
        );
        assert_eq!(
            state.denial_message().unwrap(),
            "You don't have access to the accounting module."
        );
    }

    #[test]
    fn role_is_checked_before_module() {
        let guard = RouteGuard::new(AccessRequirement {
            required_role: Some(Role::Superadmin),
            required_module: Some(ModuleKey::Hrms),
        });
        let state = guard.evaluate(&signed_in(Role::Admin, &[]));
        assert_eq!(
            state,
            GuardState::DeniedRole {
                required: Role::Superadmin
            }
        );
        assert!(state.denial_message().unwrap().ends_with("Required role: superadmin"));
    }

    #[test]
    fn superadmin_passes_every_guard() {
        let session = signed_in(Role::Superadmin, &[]);
        for guard in [
            RouteGuard::requiring_role(Role::Admin),
            RouteGuard::requiring_module(ModuleKey::Accounting),
            RouteGuard::default(),
        ] {
            assert!(guard.evaluate(&session).is_granted());
        }
    }

    #[test]
    fn evaluation_has_no_memory() {
        let guard = RouteGuard::requiring_module(ModuleKey::Hrms);
        let granted = signed_in(Role::User, &[ModuleKey::Hrms]);
        assert!(guard.evaluate(&granted).is_granted());
        assert_eq!(guard.evaluate(&SessionState::Anonymous), GuardState::DeniedNoSession);
        assert!(guard.evaluate(&granted).is_granted());
    }

    #[test]
    fn state_serializes_with_tag() {
        let json = serde_json::to_value(GuardState::DeniedModule {
            required: ModuleKey::Clients,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"state": "DENIED_MODULE", "required": "clients"}));
    }
}
