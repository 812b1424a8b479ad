use serde::Serialize;
use thiserror::Error;

use charterdesk_core::UserId;

use crate::{ModuleKey, Role, User};

/// What a protected view or navigation target demands of the viewer.
///
/// Both axes are independent; `None` means "no requirement on this axis".
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRequirement {
    pub required_role: Option<Role>,
    pub required_module: Option<ModuleKey>,
}

impl AccessRequirement {
    /// Only an authenticated session is needed.
    pub const fn session() -> Self {
        Self {
            required_role: None,
            required_module: None,
        }
    }

    pub const fn role(role: Role) -> Self {
        Self {
            required_role: Some(role),
            required_module: None,
        }
    }

    pub const fn module(module: ModuleKey) -> Self {
        Self {
            required_role: None,
            required_module: Some(module),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("no active session")]
    NoSession,

    #[error("forbidden: role '{0}' required")]
    RoleRequired(Role),

    #[error("forbidden: module '{0}' not assigned")]
    ModuleRequired(ModuleKey),
}

/// Can `user` reach capabilities gated by `module`?
///
/// - absent user: never
/// - superadmin: always
/// - otherwise: no requirement, or the module is assigned
///
/// Pure; evaluate on every call since the session can change between renders.
pub fn is_module_allowed(user: Option<&User>, module: Option<ModuleKey>) -> bool {
    let Some(user) = user else {
        return false;
    };
    if user.role.is_superadmin() {
        return true;
    }
    match module {
        None => true,
        Some(module) => user.allowed_modules.contains(&module),
    }
}

/// Does `user` satisfy the role requirement?
///
/// Superadmin satisfies every requirement. There is no role hierarchy beyond
/// that: an admin does not satisfy a `user` requirement.
pub fn is_role_allowed(user: Option<&User>, required: Option<Role>) -> bool {
    let Some(required) = required else {
        return true;
    };
    match user {
        Some(user) => user.role == required || user.role.is_superadmin(),
        None => false,
    }
}

/// Authorize a user against a requirement.
///
/// Checks run in guard order: session, then role, then module.
pub fn authorize(user: Option<&User>, requirement: &AccessRequirement) -> Result<(), AuthzError> {
    let Some(user) = user else {
        return Err(AuthzError::NoSession);
    };
    if let Some(role) = requirement.required_role {
        if !is_role_allowed(Some(user), Some(role)) {
            return Err(AuthzError::RoleRequired(role));
        }
    }
    if let Some(module) = requirement.required_module {
        if !is_module_allowed(Some(user), Some(module)) {
            return Err(AuthzError::ModuleRequired(module));
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an authorization decision.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub requirement: AccessRequirement,
    pub granted: bool,
    /// Human-readable reason for the decision.
    pub reason: String,
    /// Absent when there is no session.
    pub principal: Option<PrincipalState>,
    pub denial_reason: Option<DenialReason>,
}

/// Snapshot of the user being checked.
#[derive(Debug, Clone, Serialize)]
pub struct PrincipalState {
    pub user_id: UserId,
    pub role: Role,
    pub assigned_modules: Vec<ModuleKey>,
    pub effective_modules: Vec<ModuleKey>,
    pub is_superadmin: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DenialReason {
    pub kind: DenialKind,
    pub message: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    NoSession,
    MissingRole,
    MissingModule,
}

/// Explain why an authorization decision was made (or would be made).
///
/// Agrees with [`authorize`] on every input; it only adds context.
pub fn explain_authorization(
    user: Option<&User>,
    requirement: &AccessRequirement,
) -> AuthorizationExplanation {
    let principal = user.map(|u| PrincipalState {
        user_id: u.id.clone(),
        role: u.role,
        assigned_modules: u.allowed_modules.iter().copied().collect(),
        effective_modules: u.effective_modules(),
        is_superadmin: u.role.is_superadmin(),
    });

    match authorize(user, requirement) {
        Ok(()) => {
            let reason = match user {
                Some(u) if u.role.is_superadmin() => {
                    "Superadmin bypasses all role and module checks".to_string()
                }
                _ if *requirement == AccessRequirement::session() => {
                    "Authenticated session; no role or module required".to_string()
                }
                _ => "User holds every required role and module".to_string(),
            };
            AuthorizationExplanation {
                requirement: *requirement,
                granted: true,
                reason,
                principal,
                denial_reason: None,
            }
        }
        Err(err) => {
            let denial = match &err {
                AuthzError::NoSession => DenialReason {
                    kind: DenialKind::NoSession,
                    message: "No valid session token or user profile".to_string(),
                    suggestions: vec!["Sign in again; the session may have expired".to_string()],
                },
                AuthzError::RoleRequired(role) => DenialReason {
                    kind: DenialKind::MissingRole,
                    message: format!("Required role: {role}"),
                    suggestions: vec![
                        format!("Ask a superadmin to change this user's role to '{role}'"),
                    ],
                },
                AuthzError::ModuleRequired(module) => DenialReason {
                    kind: DenialKind::MissingModule,
                    message: format!("Module '{module}' is not assigned"),
                    suggestions: vec![format!(
                        "Ask an administrator to assign the {} module ({})",
                        module.display_name(),
                        module.description()
                    )],
                },
            };
            AuthorizationExplanation {
                requirement: *requirement,
                granted: false,
                reason: err.to_string(),
                principal,
                denial_reason: Some(denial),
            }
        }
    }
}
