//! Functional areas of the dashboard.
//!
//! The module set is closed: it is defined once here and referenced by both
//! the authorization resolver and the navigation/route configuration.

use core::str::FromStr;
use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// A named functional area gating route and navigation visibility.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModuleKey {
    Hrms,
    Operations,
    FlightManagement,
    Campaigns,
    Clients,
    Accounting,
    TaskTracker,
    Announcements,
}

const ALL: [ModuleKey; 8] = [
    ModuleKey::Hrms,
    ModuleKey::Operations,
    ModuleKey::FlightManagement,
    ModuleKey::Campaigns,
    ModuleKey::Clients,
    ModuleKey::Accounting,
    ModuleKey::TaskTracker,
    ModuleKey::Announcements,
];

impl ModuleKey {
    /// Every module, in declaration order.
    pub fn all() -> &'static [ModuleKey] {
        &ALL
    }

    /// Wire key as issued by the backend (`"flightManagement"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleKey::Hrms => "hrms",
            ModuleKey::Operations => "operations",
            ModuleKey::FlightManagement => "flightManagement",
            ModuleKey::Campaigns => "campaigns",
            ModuleKey::Clients => "clients",
            ModuleKey::Accounting => "accounting",
            ModuleKey::TaskTracker => "taskTracker",
            ModuleKey::Announcements => "announcements",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ModuleKey::Hrms => "HRMS",
            ModuleKey::Operations => "Operations",
            ModuleKey::FlightManagement => "Flight Management",
            ModuleKey::Campaigns => "Marketing",
            ModuleKey::Clients => "CRM",
            ModuleKey::Accounting => "Accounting",
            ModuleKey::TaskTracker => "Task Tracker",
            ModuleKey::Announcements => "Announcements",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ModuleKey::Hrms => "Human Resource Management System",
            ModuleKey::Operations => "Operations Management",
            ModuleKey::FlightManagement => "Flight operations and scheduling",
            ModuleKey::Campaigns => "Marketing campaigns and analytics",
            ModuleKey::Clients => "Client relationship management",
            ModuleKey::Accounting => "Financial records and accounting",
            ModuleKey::TaskTracker => "Task tracking and management",
            ModuleKey::Announcements => "System announcements",
        }
    }
}

impl core::fmt::Display for ModuleKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown module key '{0}'")]
pub struct UnknownModule(pub String);

impl FromStr for ModuleKey {
    type Err = UnknownModule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL.iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownModule(s.to_string()))
    }
}

/// Deserialize a module list, dropping keys this build does not know.
///
/// The backend may grow new modules before the dashboard does; an unknown key
/// must not invalidate the whole user snapshot.
pub(crate) fn lenient_module_set<'de, D>(deserializer: D) -> Result<BTreeSet<ModuleKey>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<String>> = Option::deserialize(deserializer)?;
    let mut modules = BTreeSet::new();
    for key in raw.unwrap_or_default() {
        match key.parse::<ModuleKey>() {
            Ok(module) => {
                modules.insert(module);
            }
            Err(err) => tracing::warn!(%err, "dropping unknown module from allowedModules"),
        }
    }
    Ok(modules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_keys_round_trip_through_serde_and_from_str() {
        for module in ModuleKey::all() {
            let json = serde_json::to_string(module).unwrap();
            assert_eq!(json, format!("\"{}\"", module.as_str()));
            assert_eq!(module.as_str().parse::<ModuleKey>().unwrap(), *module);
        }
    }

    #[test]
    fn marketing_and_crm_use_their_backend_keys() {
        assert_eq!(ModuleKey::Campaigns.as_str(), "campaigns");
        assert_eq!(ModuleKey::Campaigns.display_name(), "Marketing");
        assert_eq!(ModuleKey::Clients.display_name(), "CRM");
        assert_eq!(ModuleKey::Hrms.description(), "Human Resource Management System");
    }

    #[test]
    fn unknown_key_is_an_error() {
        let err = "payroll".parse::<ModuleKey>().unwrap_err();
        assert_eq!(err.to_string(), "unknown module key 'payroll'");
    }

    #[test]
    fn all_lists_eight_distinct_modules() {
        let set: BTreeSet<_> = ModuleKey::all().iter().collect();
        assert_eq!(set.len(), 8);
    }
}
