//! Access gate and in-app view selection
//!
//! Routing is a pure transition function, [`evaluate`], applied to the current
//! location whenever the location or the session changes. A protected route is
//! never rendered while the session is anonymous: [`ViewRouter::can_render`]
//! is the guard views consult before showing anything.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::model::{ActiveView, Session, SessionStore, SubscriptionId};

/// Top-level application locations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Root,
    Login,
    Signup,
    Home,
}

impl Route {
    /// Parse a path. Query strings and trailing slashes are ignored; unknown
    /// paths resolve to the root entry point.
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        match path.trim_end_matches('/') {
            "/login" | "login" => Route::Login,
            "/signup" | "signup" => Route::Signup,
            "/home" | "home" => Route::Home,
            _ => Route::Root,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Root => "/",
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::Home => "/home",
        }
    }

    pub fn is_protected(self) -> bool {
        matches!(self, Route::Home)
    }
}

/// Outcome of evaluating a location against the session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Render(Route),
    Redirect(Route),
}

pub fn evaluate(route: Route, authenticated: bool) -> Decision {
    match (route, authenticated) {
        (Route::Root, true) => Decision::Redirect(Route::Home),
        (Route::Root, false) => Decision::Redirect(Route::Login),
        (route, false) if route.is_protected() => Decision::Redirect(Route::Login),
        (Route::Login, true) => Decision::Redirect(Route::Home),
        (route, _) => Decision::Render(route),
    }
}

/// Follow redirects until a route renders.
fn settle(mut route: Route, authenticated: bool) -> Route {
    // Every redirect chain ends within two hops.
    for _ in 0..4 {
        match evaluate(route, authenticated) {
            Decision::Render(target) => return target,
            Decision::Redirect(target) => route = target,
        }
    }
    route
}

/// Pick the catalog view for a tag; unknown tags show the dashboard.
pub fn select_view(tag: &str) -> ActiveView {
    ActiveView::from_tag(tag)
}

#[derive(Debug)]
struct RouterState {
    location: Route,
}

/// The router's session observer. Unsubscribed when the last router clone drops.
struct SessionLink {
    session: SessionStore,
    subscription: SubscriptionId,
}

impl Drop for SessionLink {
    fn drop(&mut self) {
        self.session.unsubscribe(self.subscription);
        tracing::debug!("Router detached");
    }
}

/// Keeps the current location consistent with the session.
#[derive(Clone)]
pub struct ViewRouter {
    state: Arc<Mutex<RouterState>>,
    link: Arc<SessionLink>,
}

impl ViewRouter {
    /// Start at the root entry point and follow the session from now on.
    pub fn attach(session: SessionStore) -> Self {
        let initial = settle(Route::Root, session.is_authenticated());
        let state = Arc::new(Mutex::new(RouterState { location: initial }));

        let observed = Arc::clone(&state);
        let subscription = session.subscribe(move |current: &Session| {
            let mut state = observed.lock().unwrap_or_else(PoisonError::into_inner);
            let from = state.location;
            let to = settle(from, current.is_authenticated());
            if from != to {
                tracing::info!(from = from.path(), to = to.path(), "Session change redirected");
            }
            state.location = to;
        });

        tracing::debug!(location = initial.path(), "Router attached");
        Self {
            state,
            link: Arc::new(SessionLink {
                session,
                subscription,
            }),
        }
    }

    pub fn location(&self) -> Route {
        self.lock().location
    }

    /// Go to `path`, landing wherever the gate sends it.
    pub fn navigate(&self, path: &str) -> Route {
        let requested = Route::parse(path);
        let landed = settle(requested, self.link.session.is_authenticated());
        if requested != landed {
            tracing::debug!(requested = requested.path(), landed = landed.path(), "Navigation redirected");
        }
        self.lock().location = landed;
        landed
    }

    /// Whether `route` may show content for the current session.
    pub fn can_render(&self, route: Route) -> bool {
        evaluate(route, self.link.session.is_authenticated()) == Decision::Render(route)
    }

    fn lock(&self) -> MutexGuard<'_, RouterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
