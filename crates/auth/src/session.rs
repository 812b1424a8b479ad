//! Session snapshot and provider.
//!
//! Consumers never touch token storage directly: they read an immutable
//! [`SessionState`] from a [`SessionProvider`] and subscribe to changes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use charterdesk_core::Entity;

use crate::authorize::is_module_allowed;
use crate::claims::{validate_claims, SessionClaims, SessionError};
use crate::{ModuleKey, User};

/// An authenticated session: token, its decoded claims, and the user profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    claims: SessionClaims,
    user: User,
}

impl Session {
    /// Assemble a session, checking that the pieces belong together.
    pub fn new(
        token: impl Into<String>,
        claims: SessionClaims,
        user: User,
    ) -> Result<Self, SessionError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(SessionError::MissingToken);
        }
        if claims.sub != user.id {
            return Err(SessionError::SubjectMismatch {
                token: claims.sub,
                user: user.id,
            });
        }
        Ok(Self { token, claims, user })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn claims(&self) -> &SessionClaims {
        &self.claims
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), SessionError> {
        validate_claims(&self.claims, now)
    }
}

/// What the provider currently knows about the session.
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    /// The initial session check has not finished yet.
    #[default]
    Loading,
    /// Checked: nobody is signed in.
    Anonymous,
    Authenticated(Arc<Session>),
}

impl SessionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.session().map(Session::user)
    }

    pub fn has_token(&self) -> bool {
        self.session().is_some_and(|s| !s.token().is_empty())
    }
}

/// Whatever the previous visit left in client storage.
///
/// Every piece is optional; `user` stays raw JSON so an unreadable profile
/// clears the session instead of failing the restore.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: Option<String>,
    pub claims: Option<SessionClaims>,
    pub user: Option<serde_json::Value>,
}

/// Opaque handle returned by [`SessionProvider::on_session_change`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type SessionListener = Arc<dyn Fn(&SessionState) + Send + Sync>;

/// Narrow read interface over the current session.
pub trait SessionProvider {
    /// Current snapshot. Cheap to clone; never partially updated.
    fn state(&self) -> SessionState;

    /// Register a callback invoked after every session change.
    ///
    /// Callbacks run in the order the changes were applied. They may read the
    /// provider or manage listeners, but must not change the session.
    fn on_session_change(&self, listener: SessionListener) -> ListenerId;

    /// Drop a previously registered callback. Unknown ids are ignored.
    fn remove_listener(&self, id: ListenerId);

    fn current_user(&self) -> Option<User> {
        self.state().user().cloned()
    }

    fn is_loading(&self) -> bool {
        self.state().is_loading()
    }

    /// Module check bound to the current user.
    fn is_module_allowed(&self, module: Option<ModuleKey>) -> bool {
        let state = self.state();
        is_module_allowed(state.user(), module)
    }
}

/// Process-local session provider.
#[derive(Default)]
pub struct InMemorySessionProvider {
    state: RwLock<SessionState>,
    listeners: RwLock<Vec<(ListenerId, SessionListener)>>,
    /// Held across store-and-notify so listeners see changes in stored order.
    transition: Mutex<()>,
    next_listener: AtomicU64,
}

impl InMemorySessionProvider {
    /// Starts in [`SessionState::Loading`] until [`restore`](Self::restore) runs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the initial session from storage.
    ///
    /// Keeps the stored session only when token, claims and a readable user
    /// are all present and the claims are live at `now`; otherwise the
    /// session is cleared. Either way loading is over afterwards. The error,
    /// if any, says why a stored session was discarded.
    pub fn restore(
        &self,
        stored: Option<StoredSession>,
        now: DateTime<Utc>,
    ) -> Result<SessionState, SessionError> {
        let result = stored
            .map(|stored| Self::rebuild(stored, now))
            .transpose();

        let next = match &result {
            Ok(Some(session)) => SessionState::Authenticated(Arc::new(session.clone())),
            Ok(None) | Err(_) => SessionState::Anonymous,
        };
        if let Err(err) = &result {
            tracing::info!(%err, "discarding stored session");
        }
        self.replace(next.clone());
        result.map(|_| next)
    }

    fn rebuild(stored: StoredSession, now: DateTime<Utc>) -> Result<Session, SessionError> {
        let token = stored.token.ok_or(SessionError::MissingToken)?;
        let claims = stored.claims.ok_or(SessionError::MissingToken)?;
        let raw_user = stored
            .user
            .ok_or_else(|| SessionError::MalformedUser("missing".to_string()))?;
        let user: User = serde_json::from_value(raw_user)
            .map_err(|e| SessionError::MalformedUser(e.to_string()))?;

        let session = Session::new(token, claims, user)?;
        session.validate(now)?;
        Ok(session)
    }

    pub fn login(&self, session: Session, now: DateTime<Utc>) -> Result<(), SessionError> {
        session.validate(now)?;
        let refreshed = self
            .current_user()
            .is_some_and(|current| current.same_identity(session.user()));
        if refreshed {
            tracing::info!(user_id = %session.user().id, "session refreshed");
        } else {
            tracing::info!(user_id = %session.user().id, role = %session.user().role, "session started");
        }
        self.replace(SessionState::Authenticated(Arc::new(session)));
        Ok(())
    }

    pub fn logout(&self) {
        if let Some(user) = self.current_user() {
            tracing::info!(user_id = %user.id, "session ended");
        }
        self.replace(SessionState::Anonymous);
    }

    fn replace(&self, next: SessionState) {
        let _transition = self.transition.lock().unwrap_or_else(PoisonError::into_inner);
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = next.clone();

        // Invoke outside the state lock so listeners may read or re-subscribe.
        let listeners: Vec<SessionListener> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(&next);
        }
    }
}

impl SessionProvider for InMemorySessionProvider {
    fn state(&self) -> SessionState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn on_session_change(&self, listener: SessionListener) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(existing, _)| *existing != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;
    use charterdesk_core::UserId;
    use chrono::{Duration, TimeZone};
    use std::sync::atomic::AtomicUsize;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn claims(expires_in: Duration) -> SessionClaims {
        SessionClaims {
            sub: UserId::new("u-1").unwrap(),
            issued_at: Some(now() - Duration::hours(1)),
            expires_at: now() + expires_in,
        }
    }

    fn user_json() -> serde_json::Value {
        serde_json::json!({
            "_id": "u-1",
            "name": "Sam",
            "email": "sam@example.com",
            "role": "user",
            "allowedModules": ["hrms"]
        })
    }

    fn stored(expires_in: Duration) -> StoredSession {
        StoredSession {
            token: Some("header.payload.sig".to_string()),
            claims: Some(claims(expires_in)),
            user: Some(user_json()),
        }
    }

    #[test]
    fn starts_loading() {
        let provider = InMemorySessionProvider::new();
        assert!(provider.is_loading());
        assert!(provider.current_user().is_none());
    }

    #[test]
    fn restores_live_session() {
        let provider = InMemorySessionProvider::new();
        let state = provider.restore(Some(stored(Duration::hours(2))), now()).unwrap();

        assert!(state.has_token());
        assert!(!provider.is_loading());
        assert_eq!(provider.current_user().unwrap().name, "Sam");
        assert!(provider.is_module_allowed(Some(ModuleKey::Hrms)));
        assert!(!provider.is_module_allowed(Some(ModuleKey::Accounting)));
    }

    #[test]
    fn expired_session_is_cleared() {
        let provider = InMemorySessionProvider::new();
        let err = provider.restore(Some(stored(-Duration::minutes(1))), now()).unwrap_err();

        assert_eq!(err, SessionError::Expired);
        assert!(matches!(provider.state(), SessionState::Anonymous));
    }

    #[test]
    fn unreadable_user_is_cleared() {
        let provider = InMemorySessionProvider::new();
        let mut s = stored(Duration::hours(2));
        s.user = Some(serde_json::json!({"name": 42}));

        assert!(matches!(
            provider.restore(Some(s), now()),
            Err(SessionError::MalformedUser(_))
        ));
        assert!(provider.current_user().is_none());
    }

    #[test]
    fn nothing_stored_means_anonymous() {
        let provider = InMemorySessionProvider::new();
        let state = provider.restore(None, now()).unwrap();
        assert!(matches!(state, SessionState::Anonymous));
        assert!(!provider.is_module_allowed(None));
    }

    #[test]
    fn session_rejects_blank_token_and_foreign_subject() {
        let user: User = serde_json::from_value(user_json()).unwrap();
        assert_eq!(
            Session::new(" ", claims(Duration::hours(1)), user.clone()),
            Err(SessionError::MissingToken)
        );

        let mut foreign = claims(Duration::hours(1));
        foreign.sub = UserId::new("u-2").unwrap();
        assert!(matches!(
            Session::new("t", foreign, user),
            Err(SessionError::SubjectMismatch { .. })
        ));
    }

    #[test]
    fn listeners_observe_login_and_logout() {
        let provider = InMemorySessionProvider::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let id = provider.on_session_change(Arc::new(move |_state| {
            seen.fetch_add(1, Ordering::SeqCst);
        }));

        let user = User::new(UserId::new("u-1").unwrap(), "Sam", "s@x", Role::Admin);
        let session = Session::new("tok", claims(Duration::hours(1)), user).unwrap();
        provider.login(session, now()).unwrap();
        provider.logout();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        provider.remove_listener(id);
        provider.logout();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn concurrent_changes_notify_in_stored_order() {
        let provider = Arc::new(InMemorySessionProvider::new());
        let last_seen = Arc::new(Mutex::new(None::<bool>));
        let sink = Arc::clone(&last_seen);
        provider.on_session_change(Arc::new(move |state| {
            *sink.lock().unwrap() = Some(state.user().is_some());
        }));

        let workers: Vec<_> = (0..8)
            .map(|i| {
                let provider = Arc::clone(&provider);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        if i % 2 == 0 {
                            let user = User::new(UserId::new("u-1").unwrap(), "Sam", "s@x", Role::User);
                            let session = Session::new("tok", claims(Duration::hours(1)), user).unwrap();
                            provider.login(session, now()).unwrap();
                        } else {
                            provider.logout();
                        }
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let stored_signed_in = provider.current_user().is_some();
        assert_eq!(*last_seen.lock().unwrap(), Some(stored_signed_in));
    }

    #[test]
    fn login_with_expired_token_is_refused() {
        let provider = InMemorySessionProvider::new();
        let user = User::new(UserId::new("u-1").unwrap(), "Sam", "s@x", Role::User);
        let session = Session::new("tok", claims(-Duration::seconds(1)), user).unwrap();

        assert_eq!(provider.login(session, now()), Err(SessionError::Expired));
        assert!(provider.is_loading());
    }
}
