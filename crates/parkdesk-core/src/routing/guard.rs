use tokio::sync::watch;
use tracing::debug;

use super::{Partition, Route};
use crate::auth::Session;

/// Where the guard sends the active view for a given session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    StayOnLoading,
    GoToProtectedRoot,
    GoToPublicAuthRoot,
}

impl RouteDecision {
    pub fn for_session(session: &Session) -> Self {
        match session {
            Session::Unknown => RouteDecision::StayOnLoading,
            Session::Authenticated(_) => RouteDecision::GoToProtectedRoot,
            Session::Unauthenticated => RouteDecision::GoToPublicAuthRoot,
        }
    }

    /// Route to navigate to, or `None` to stay put.
    pub fn target(&self) -> Option<Route> {
        match self {
            RouteDecision::StayOnLoading => None,
            RouteDecision::GoToProtectedRoot => Some(Route::PROTECTED_ROOT),
            RouteDecision::GoToPublicAuthRoot => Some(Route::PUBLIC_AUTH_ROOT),
        }
    }
}

/// Gate a navigation request from the presentation layer.
///
/// Returns the route that should actually be shown.
pub fn authorize(session: &Session, requested: Route) -> Route {
    match (session, requested.partition()) {
        (Session::Unknown, _) => Route::Loading,
        (_, Partition::Shared) => requested,
        (Session::Authenticated(_), Partition::Protected) => requested,
        (Session::Authenticated(_), Partition::Public) => Route::PROTECTED_ROOT,
        (Session::Unauthenticated, Partition::Public) => requested,
        (Session::Unauthenticated, Partition::Protected) => Route::PUBLIC_AUTH_ROOT,
    }
}

/// Something that can change the visible screen.
pub trait Navigator {
    /// Swap the current screen without adding a history entry.
    fn replace(&mut self, route: Route);

    /// Open a screen on top of the current one.
    fn push(&mut self, route: Route);

    /// Drop all history and show only `route`.
    fn reset(&mut self, route: Route);
}

/// In-memory screen stack.
#[derive(Debug, Clone)]
pub struct NavigationStack {
    stack: Vec<Route>,
}

impl Default for NavigationStack {
    fn default() -> Self {
        Self {
            stack: vec![Route::Loading],
        }
    }
}

impl NavigationStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Route> {
        self.stack.last()
    }

    pub fn history(&self) -> &[Route] {
        &self.stack
    }

    /// Pop the top screen. The last remaining screen cannot be popped.
    pub fn back(&mut self) -> Option<Route> {
        if self.stack.len() > 1 {
            self.stack.pop()
        } else {
            None
        }
    }
}

impl Navigator for NavigationStack {
    fn replace(&mut self, route: Route) {
        self.stack.pop();
        self.stack.push(route);
    }

    fn push(&mut self, route: Route) {
        self.stack.push(route);
    }

    fn reset(&mut self, route: Route) {
        self.stack.clear();
        self.stack.push(route);
    }
}

impl<N: Navigator + ?Sized> Navigator for &mut N {
    fn replace(&mut self, route: Route) {
        (**self).replace(route);
    }

    fn push(&mut self, route: Route) {
        (**self).push(route);
    }

    fn reset(&mut self, route: Route) {
        (**self).reset(route);
    }
}

/// Observes the session and keeps the navigator in the right partition.
///
/// Navigation only happens when the decision changes, and it resets the history so
/// no screen from before the auth change can be reached with `back`.
pub struct RouterGuard<N: Navigator> {
    sessions: watch::Receiver<Session>,
    navigator: N,
    applied: Option<RouteDecision>,
}

impl<N: Navigator> RouterGuard<N> {
    pub fn new(sessions: watch::Receiver<Session>, navigator: N) -> Self {
        Self {
            sessions,
            navigator,
            applied: None,
        }
    }

    /// Decide for the latest session and navigate if the decision changed.
    pub fn evaluate(&mut self) -> RouteDecision {
        let decision = RouteDecision::for_session(&self.sessions.borrow_and_update());

        if self.applied != Some(decision) {
            if let Some(target) = decision.target() {
                debug!(?decision, route = %target, "Redirecting");
                self.navigator.reset(target);
            }
            self.applied = Some(decision);
        }
        decision
    }

    /// Wait for the next session change and evaluate it.
    ///
    /// Returns `None` once the session manager is gone.
    pub async fn next_decision(&mut self) -> Option<RouteDecision> {
        self.sessions.changed().await.ok()?;
        Some(self.evaluate())
    }

    /// Evaluate now and on every change until the session manager is dropped.
    pub async fn run(mut self) -> N {
        self.evaluate();
        while self.next_decision().await.is_some() {}
        self.navigator
    }

    /// Last decision acted on.
    pub fn applied(&self) -> Option<RouteDecision> {
        self.applied
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut N {
        &mut self.navigator
    }

    pub fn into_navigator(self) -> N {
        self.navigator
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Token;

    fn authed() -> Session {
        Session::Authenticated(Token::new("tok").unwrap())
    }

    #[test]
    fn test_decision_rules() {
        assert_eq!(
            RouteDecision::for_session(&Session::Unknown),
            RouteDecision::StayOnLoading
        );
        assert_eq!(
            RouteDecision::for_session(&authed()),
            RouteDecision::GoToProtectedRoot
        );
        assert_eq!(
            RouteDecision::for_session(&Session::Unauthenticated),
            RouteDecision::GoToPublicAuthRoot
        );
        assert_eq!(RouteDecision::StayOnLoading.target(), None);
    }

    #[test]
    fn test_authorize_protected_route() {
        assert_eq!(authorize(&authed(), Route::Bookings), Route::Bookings);
        assert_eq!(
            authorize(&Session::Unauthenticated, Route::Bookings),
            Route::Login
        );
        assert_eq!(authorize(&Session::Unknown, Route::Bookings), Route::Loading);
    }

    #[test]
    fn test_authorize_public_route() {
        assert_eq!(authorize(&Session::Unauthenticated, Route::Signup), Route::Signup);
        assert_eq!(authorize(&authed(), Route::Signup), Route::Dashboard);
        assert_eq!(authorize(&authed(), Route::NotFound), Route::NotFound);
        assert_eq!(authorize(&Session::Unknown, Route::Login), Route::Loading);
    }

    #[test]
    fn test_never_protected_without_session() {
        let all = [
            Route::Loading,
            Route::Login,
            Route::Signup,
            Route::Dashboard,
            Route::Bookings,
            Route::ParkingAreas,
            Route::AddArea,
            Route::EditArea { area_id: "a".into() },
            Route::ManageSlots,
            Route::OccupancyReport,
            Route::RevenueReport,
            Route::Profile,
            Route::NotFound,
        ];
        for session in [Session::Unknown, Session::Unauthenticated] {
            for route in all.iter().cloned() {
                assert!(!authorize(&session, route).requires_auth());
            }
            let target = RouteDecision::for_session(&session).target();
            assert!(target.map(|r| !r.requires_auth()).unwrap_or(true));
        }
    }

    #[test]
    fn test_navigation_stack_replace_and_push() {
        let mut nav = NavigationStack::new();
        assert_eq!(nav.current(), Some(&Route::Loading));

        nav.replace(Route::Login);
        assert_eq!(nav.history(), &[Route::Login]);

        nav.push(Route::Signup);
        assert_eq!(nav.back(), Some(Route::Signup));
        assert_eq!(nav.back(), None);
        assert_eq!(nav.current(), Some(&Route::Login));
    }

    #[test]
    fn test_guard_replaces_loading_screen() {
        let (tx, rx) = watch::channel(Session::Unknown);
        let mut guard = RouterGuard::new(rx, NavigationStack::new());

        assert_eq!(guard.evaluate(), RouteDecision::StayOnLoading);
        assert_eq!(guard.navigator().history(), &[Route::Loading]);

        tx.send_replace(Session::Unauthenticated);
        assert_eq!(guard.evaluate(), RouteDecision::GoToPublicAuthRoot);
        // Loading screen is gone from history
        assert_eq!(guard.navigator().history(), &[Route::Login]);

        tx.send_replace(authed());
        assert_eq!(guard.evaluate(), RouteDecision::GoToProtectedRoot);
        assert_eq!(guard.navigator().history(), &[Route::Dashboard]);
    }

    #[test]
    fn test_guard_does_not_renavigate_on_same_decision() {
        let (tx, rx) = watch::channel(authed());
        let mut guard = RouterGuard::new(rx, NavigationStack::new());
        guard.evaluate();

        guard.navigator_mut().push(Route::Bookings);
        tx.send_replace(Session::Authenticated(Token::new("refreshed").unwrap()));
        guard.evaluate();

        assert_eq!(
            guard.navigator().history(),
            &[Route::Dashboard, Route::Bookings]
        );
    }

    #[test]
    fn test_sign_out_from_pushed_screen_clears_history() {
        let (tx, rx) = watch::channel(authed());
        let mut guard = RouterGuard::new(rx, NavigationStack::new());
        guard.evaluate();
        guard.navigator_mut().push(Route::Bookings);

        tx.send_replace(Session::Unauthenticated);
        guard.evaluate();

        assert_eq!(guard.navigator().history(), &[Route::Login]);
        assert_eq!(guard.navigator_mut().back(), None);
    }

    #[test]
    fn test_sign_in_from_signup_screen_clears_history() {
        let (tx, rx) = watch::channel(Session::Unauthenticated);
        let mut guard = RouterGuard::new(rx, NavigationStack::new());
        guard.evaluate();
        guard.navigator_mut().push(Route::Signup);

        tx.send_replace(authed());
        guard.evaluate();

        assert_eq!(guard.navigator().history(), &[Route::Dashboard]);
    }

    #[test]
    fn test_navigation_stack_reset() {
        let mut nav = NavigationStack::new();
        nav.push(Route::Dashboard);
        nav.push(Route::Bookings);

        nav.reset(Route::Login);
        assert_eq!(nav.history(), &[Route::Login]);
    }

    #[tokio::test]
    async fn test_guard_run_follows_changes_until_sender_dropped() {
        let (tx, rx) = watch::channel(Session::Unknown);
        let handle = tokio::spawn(RouterGuard::new(rx, NavigationStack::new()).run());

        tx.send_replace(Session::Unauthenticated);
        tokio::task::yield_now().await;
        drop(tx);

        let nav = handle.await.unwrap();
        assert_eq!(nav.current(), Some(&Route::Login));
    }
}
