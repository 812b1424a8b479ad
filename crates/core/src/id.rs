//! Strongly-typed identifiers used across the domain.
//!
//! The backend issues opaque string identifiers (document ids), so these
//! newtypes wrap a `String` rather than a UUID. Blank identifiers are rejected
//! at construction.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a flight record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlightId(String);

/// Identifier of a dashboard user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

macro_rules! impl_string_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Build an identifier from its textual form.
            ///
            /// Surrounding whitespace is trimmed; blank input is rejected.
            pub fn new(raw: impl Into<String>) -> Result<Self, DomainError> {
                let raw = raw.into();
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(DomainError::invalid_id(format!("{}: blank", $name)));
                }
                if trimmed.len() == raw.len() {
                    Ok(Self(raw))
                } else {
                    Ok(Self(trimmed.to_string()))
                }
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

impl_string_newtype!(FlightId, "FlightId");
impl_string_newtype!(UserId, "UserId");

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn blank_identifiers_are_rejected() {
        assert!(FlightId::new("").is_err());
        assert!(FlightId::new("   ").is_err());
        assert!(matches!(
            "".parse::<UserId>(),
            Err(DomainError::InvalidId(msg)) if msg.contains("UserId")
        ));
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let id = FlightId::new("  65f0c1  ").unwrap();
        assert_eq!(id.as_str(), "65f0c1");
        assert_eq!(id.to_string(), "65f0c1");
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = UserId::new("u-1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"u-1\"");
        let back: UserId = serde_json::from_str("\"u-1\"").unwrap();
        assert_eq!(back, id);
    }

    proptest! {
        #[test]
        fn parse_is_stable_for_non_blank_tokens(raw in "[a-f0-9]{1,24}") {
            let id = FlightId::new(raw.clone()).unwrap();
            prop_assert_eq!(id.as_str(), raw.as_str());
            prop_assert_eq!(id.to_string().parse::<FlightId>().unwrap(), id);
        }
    }
}
