//! Session state: who is logged in, and who wants to know when that changes.
//!
//! [`SessionStore`] is the only writer of the [`Session`]. Every transition
//! replaces the whole value, then runs the registered observers in
//! subscription order. Async consumers that only care about the latest state
//! can hold a [`watch`] receiver instead.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::auth::{AuthService, Credentials, SignupRequest};
use crate::error::Result;

/// The authenticated user's profile as reported by the auth service
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub access_token: Option<String>,
    pub token_type: Option<String>,
}

impl Identity {
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            username: None,
            full_name: None,
            access_token: None,
            token_type: None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or(&self.email)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("full_name", &self.full_name)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("token_type", &self.token_type)
            .finish()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated {
        identity: Identity,
        since: DateTime<Utc>,
    },
}

impl Session {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated { identity, .. } => Some(identity),
        }
    }

    /// When the current login happened
    pub fn since(&self) -> Option<DateTime<Utc>> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated { since, .. } => Some(*since),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated { .. })
    }
}

/// Handle returned by [`SessionStore::subscribe`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Arc<dyn Fn(&Session) + Send + Sync>;

struct Inner {
    auth: Arc<dyn AuthService>,
    state: watch::Sender<Session>,
    observers: Mutex<Vec<(SubscriptionId, Observer)>>,
    next_id: AtomicU64,
}

/// Single source of truth for the current session. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    pub fn new(auth: Arc<dyn AuthService>) -> Self {
        Self {
            inner: Arc::new(Inner {
                auth,
                state: watch::Sender::new(Session::Anonymous),
                observers: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Authenticate against the auth service and adopt the identity it returns.
    ///
    /// Blank fields are rejected before any request is made. On failure the
    /// session is left untouched.
    pub async fn login(&self, credentials: Credentials) -> Result<Identity> {
        credentials.validate()?;

        tracing::info!(email = %credentials.email, "Logging in");
        let identity = match self.inner.auth.authenticate(&credentials).await {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(email = %credentials.email, error = %e, "Login rejected");
                return Err(e);
            }
        };

        self.transition(Session::Authenticated {
            identity: identity.clone(),
            since: Utc::now(),
        });
        tracing::info!(email = %identity.email, "Session authenticated");
        Ok(identity)
    }

    /// Register a new account. Does not log in.
    pub async fn signup(&self, request: SignupRequest) -> Result<()> {
        request.validate()?;

        tracing::info!(email = %request.email, username = %request.username, "Signing up");
        if let Err(e) = self.inner.auth.register(&request).await {
            tracing::warn!(email = %request.email, error = %e, "Signup rejected");
            return Err(e);
        }
        tracing::info!(email = %request.email, "Signup accepted");
        Ok(())
    }

    /// Drop the current identity. Observers are notified even when already anonymous.
    pub fn logout(&self) {
        let previous = self.transition(Session::Anonymous);
        match previous.identity() {
            Some(identity) => tracing::info!(email = %identity.email, "Logged out"),
            None => tracing::debug!("Logout while already anonymous"),
        }
    }

    fn transition(&self, next: Session) -> Session {
        let previous = self.inner.state.send_replace(next);
        let current = self.session();

        // Snapshot so observers may (un)subscribe from inside their callback.
        let observers: Vec<Observer> = self
            .observers()
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        tracing::trace!(observers = observers.len(), authenticated = current.is_authenticated(), "Notifying session observers");
        for observer in observers {
            observer(&current);
        }
        previous
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn current_user(&self) -> Option<Identity> {
        self.inner.state.borrow().identity().cloned()
    }

    pub fn session(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    // ========================================================================
    // Observation
    // ========================================================================

    /// Register a callback run synchronously after every transition.
    pub fn subscribe(&self, observer: impl Fn(&Session) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers().push((id, Arc::new(observer)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    /// Latest-value channel for async consumers.
    pub fn watch(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    fn observers(&self) -> std::sync::MutexGuard<'_, Vec<(SubscriptionId, Observer)>> {
        self.inner
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CatalogError, ErrorKind};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct FakeAuth {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AuthService for FakeAuth {
        async fn authenticate(&self, credentials: &Credentials) -> Result<Identity> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if credentials.password == "wrong" {
                return Err(CatalogError::auth("Incorrect email or password"));
            }
            Ok(Identity {
                username: Some("tester".into()),
                ..Identity::with_email(credentials.email.clone())
            })
        }

        async fn register(&self, _request: &SignupRequest) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn store() -> (SessionStore, Arc<FakeAuth>) {
        let auth = Arc::new(FakeAuth::default());
        (SessionStore::new(auth.clone()), auth)
    }

    #[tokio::test]
    async fn blank_credentials_never_reach_the_auth_service() {
        let (store, auth) = store();
        for (email, password) in [("", ""), ("a@b.com", ""), ("", "x"), ("   ", "x")] {
            let err = store.login(Credentials::new(email, password)).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
        assert_eq!(auth.calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.current_user(), None);
    }

    #[tokio::test]
    async fn login_adopts_identity_and_notifies_each_observer_once() {
        let (store, _auth) = store();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let f = first.clone();
        store.subscribe(move |_| {
            f.fetch_add(1, Ordering::SeqCst);
        });
        let s = second.clone();
        store.subscribe(move |_| {
            s.fetch_add(1, Ordering::SeqCst);
        });

        let before = Utc::now();
        let identity = store.login(Credentials::new("a@b.com", "x")).await.unwrap();

        assert_eq!(identity.email, "a@b.com");
        assert_eq!(store.current_user(), Some(identity));
        assert!(store.session().since().is_some_and(|t| t >= before));
        store.logout();
        assert_eq!(store.session().since(), None);
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rejected_login_leaves_session_alone() {
        let (store, _auth) = store();
        let notified = Arc::new(AtomicUsize::new(0));
        let n = notified.clone();
        store.subscribe(move |_| {
            n.fetch_add(1, Ordering::SeqCst);
        });

        let err = store.login(Credentials::new("a@b.com", "wrong")).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Auth);
        assert_eq!(err.to_string(), "Incorrect email or password");
        assert!(!store.is_authenticated());
        assert_eq!(notified.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn observers_run_in_subscription_order() {
        let (store, _auth) = store();
        let order = Arc::new(Mutex::new(Vec::new()));
        for label in ["router", "model", "logger"] {
            let order = order.clone();
            store.subscribe(move |session| {
                order.lock().unwrap().push((label, session.is_authenticated()));
            });
        }

        store.login(Credentials::new("a@b.com", "x")).await.unwrap();

        assert_eq!(
            *order.lock().unwrap(),
            vec![("router", true), ("model", true), ("logger", true)]
        );
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let (store, _auth) = store();
        store.logout();
        assert_eq!(store.current_user(), None);

        store.login(Credentials::new("a@b.com", "x")).await.unwrap();
        store.logout();
        assert_eq!(store.current_user(), None);
        store.logout();
        assert_eq!(store.current_user(), None);
    }

    #[tokio::test]
    async fn unsubscribed_observers_are_not_called() {
        let (store, _auth) = store();
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let id = store.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        store.logout();
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.logout();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn watchers_see_the_latest_session() {
        let (store, _auth) = store();
        let mut rx = store.watch();
        store.login(Credentials::new("a@b.com", "x")).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(
            rx.borrow().identity().map(|i| i.email.as_str()),
            Some("a@b.com")
        );
    }

    #[tokio::test]
    async fn signup_requires_every_field_and_keeps_session_anonymous() {
        let (store, auth) = store();
        let err = store
            .signup(SignupRequest::new("a@b.com", "", "x"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(auth.calls.load(Ordering::SeqCst), 0);

        store
            .signup(SignupRequest::new("a@b.com", "ab", "x"))
            .await
            .unwrap();
        assert_eq!(auth.calls.load(Ordering::SeqCst), 1);
        assert!(!store.is_authenticated());
    }

    #[test]
    fn identity_debug_hides_token() {
        let identity = Identity {
            access_token: Some("secret".into()),
            ..Identity::with_email("a@b.com")
        };
        let debug = format!("{identity:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }
}
