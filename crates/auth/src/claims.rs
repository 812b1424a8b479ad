use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use charterdesk_core::UserId;

/// Session token claims (transport-agnostic).
///
/// This is the subset of the backend-issued token the dashboard relies on once
/// the token has been decoded by whatever layer holds it. Timestamps travel as
/// unix seconds (`iat`/`exp`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject / user identifier.
    #[serde(rename = "id", alias = "sub")]
    pub sub: UserId,

    /// Issued-at timestamp, when the token carries one.
    #[serde(rename = "iat", default, with = "chrono::serde::ts_seconds_option")]
    pub issued_at: Option<DateTime<Utc>>,

    /// Expiration timestamp.
    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("session token is missing")]
    MissingToken,

    #[error("session token has expired")]
    Expired,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("token subject {token} does not match user {user}")]
    SubjectMismatch { token: UserId, user: UserId },

    #[error("stored user profile is unreadable: {0}")]
    MalformedUser(String),
}

/// Deterministically validate session claims against `now`.
///
/// A token is live while `now < expires_at`. Signature verification is the
/// backend's job; the dashboard only decides whether to keep a stored session.
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), SessionError> {
    if let Some(issued_at) = claims.issued_at {
        if claims.expires_at <= issued_at {
            return Err(SessionError::InvalidTimeWindow);
        }
    }
    if now >= claims.expires_at {
        return Err(SessionError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn claims(iat: Option<i64>, exp: i64) -> SessionClaims {
        SessionClaims {
            sub: UserId::new("u-1").unwrap(),
            issued_at: iat.map(|s| Utc.timestamp_opt(s, 0).unwrap()),
            expires_at: Utc.timestamp_opt(exp, 0).unwrap(),
        }
    }

    #[test]
    fn live_token_is_accepted() {
        let c = claims(Some(1_000), 2_000);
        assert_eq!(validate_claims(&c, Utc.timestamp_opt(1_500, 0).unwrap()), Ok(()));
    }

    #[test]
    fn expiry_instant_itself_is_expired() {
        let c = claims(None, 2_000);
        assert_eq!(
            validate_claims(&c, Utc.timestamp_opt(2_000, 0).unwrap()),
            Err(SessionError::Expired)
        );
    }

    #[test]
    fn inverted_window_is_rejected() {
        let c = claims(Some(2_000), 2_000);
        assert_eq!(
            validate_claims(&c, Utc.timestamp_opt(0, 0).unwrap()),
            Err(SessionError::InvalidTimeWindow)
        );
    }

    #[test]
    fn decodes_unix_second_claims() {
        let c: SessionClaims =
            serde_json::from_str(r#"{"id":"65f0aa","iat":1700000000,"exp":1700086400}"#).unwrap();
        assert_eq!(c.sub.as_str(), "65f0aa");
        assert_eq!(c.expires_at - c.issued_at.unwrap(), Duration::days(1));

        let without_iat: SessionClaims =
            serde_json::from_str(r#"{"sub":"65f0aa","exp":1700086400}"#).unwrap();
        assert!(without_iat.issued_at.is_none());
    }
}
