//! Session user snapshot.
//!
//! The backend owns the user lifecycle; the dashboard only holds an immutable
//! copy for the duration of a session (refreshed on login or explicit refetch).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use charterdesk_core::{Entity, UserId};

use crate::modules::{lenient_module_set, ModuleKey};
use crate::Role;

/// Authenticated dashboard user.
///
/// # Invariants
/// - `Superadmin` implicitly holds every module, whatever `allowed_modules`
///   contains. Use [`User::has_module`] rather than reading the set directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, deserialize_with = "lenient_module_set")]
    pub allowed_modules: BTreeSet<ModuleKey>,
}

impl User {
    pub fn new(id: UserId, name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            role,
            allowed_modules: BTreeSet::new(),
        }
    }

    pub fn with_modules(mut self, modules: impl IntoIterator<Item = ModuleKey>) -> Self {
        self.allowed_modules.extend(modules);
        self
    }

    /// Module membership with the superadmin rule applied.
    pub fn has_module(&self, module: ModuleKey) -> bool {
        self.role.is_superadmin() || self.allowed_modules.contains(&module)
    }

    /// Modules this user can actually reach, in declaration order.
    pub fn effective_modules(&self) -> Vec<ModuleKey> {
        ModuleKey::all()
            .iter()
            .copied()
            .filter(|m| self.has_module(*m))
            .collect()
    }

    /// Uppercased first letter of the name, for avatar badges.
    pub fn initial(&self) -> Option<char> {
        self.name.chars().next().map(|c| c.to_ascii_uppercase())
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
