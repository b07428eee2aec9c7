//! Session state machine.
//!
//! `SessionManager` is the single authority for the current `Session`. It resolves the
//! session from the credential store once at startup, then moves it only on sign-in and
//! sign-out. State-changing operations are serialized, and every change is published on
//! a watch channel for the router guard and the presentation layer.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use super::{AuthError, CredentialStore};
use crate::models::{Credentials, SignupRequest};

pub use super::credentials::Token;

/// Current authentication state of the client.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    /// Not determined yet; only valid before startup resolution.
    #[default]
    Unknown,
    Authenticated(Token),
    Unauthenticated,
}

/// Token-free view of a `Session`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Unknown,
    Authenticated,
    Unauthenticated,
}

impl Session {
    pub fn status(&self) -> SessionStatus {
        match self {
            Session::Unknown => SessionStatus::Unknown,
            Session::Authenticated(_) => SessionStatus::Authenticated,
            Session::Unauthenticated => SessionStatus::Unauthenticated,
        }
    }

    pub fn token(&self) -> Option<&Token> {
        match self {
            Session::Authenticated(token) => Some(token),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }
}

/// Remote collaborator that exchanges credentials for a token.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// `POST /login`. Returns the issued token.
    async fn login(&self, credentials: &Credentials) -> Result<Token, AuthError>;

    /// `POST /signup`.
    async fn signup(&self, request: &SignupRequest) -> Result<(), AuthError>;
}

/// Result of an operation that always lands in a well-defined state.
///
/// `diagnostic` carries a non-fatal error the caller may want to report, such as a
/// credential store that could not be read or cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub session: Session,
    pub diagnostic: Option<AuthError>,
}

impl Transition {
    fn clean(session: Session) -> Self {
        Self {
            session,
            diagnostic: None,
        }
    }
}

pub struct SessionManager {
    store: Arc<dyn CredentialStore>,
    authenticator: Arc<dyn Authenticator>,
    /// Held for the whole of resolve / sign_in / sign_out.
    op_lock: Mutex<()>,
    state: watch::Sender<Session>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn CredentialStore>, authenticator: Arc<dyn Authenticator>) -> Self {
        let (state, _) = watch::channel(Session::Unknown);
        Self {
            store,
            authenticator,
            op_lock: Mutex::new(()),
            state,
        }
    }

    /// Snapshot of the current session.
    pub fn current(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.state.borrow().status()
    }

    /// Bearer token, if signed in.
    pub fn token(&self) -> Option<Token> {
        self.state.borrow().token().cloned()
    }

    /// Receiver notified on every session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Derive the session from the credential store.
    ///
    /// Only the first call reads the store; later calls return the current session.
    /// A store failure fails closed to `Unauthenticated` and is returned as a diagnostic.
    pub async fn resolve(&self) -> Transition {
        let _guard = self.op_lock.lock().await;

        let current = self.current();
        if current != Session::Unknown {
            debug!(status = ?current.status(), "Session already resolved");
            return Transition::clean(current);
        }

        let transition = match self.store.get().await {
            Ok(Some(token)) => {
                debug!("Stored token found");
                Transition::clean(Session::Authenticated(token))
            }
            Ok(None) => {
                debug!("No stored token");
                Transition::clean(Session::Unauthenticated)
            }
            Err(e) => {
                warn!(error = %e, "Credential store unreadable, starting signed out");
                Transition {
                    session: Session::Unauthenticated,
                    diagnostic: Some(e),
                }
            }
        };

        self.publish(transition.session.clone());
        info!(status = ?transition.session.status(), "Session resolved");
        transition
    }

    /// Authenticate against the remote API and persist the issued token.
    ///
    /// On any failure the session is left exactly as it was.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        credentials.validate()?;

        let _guard = self.op_lock.lock().await;

        let token = match self.authenticator.login(credentials).await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, email = %credentials.email, "Login failed");
                return Err(e);
            }
        };

        // The store is the source of truth across restarts; never claim a session it
        // does not hold.
        if let Err(e) = self.store.set(&token).await {
            warn!(error = %e, "Failed to persist token, sign-in aborted");
            return Err(e);
        }

        let session = Session::Authenticated(token);
        self.publish(session.clone());
        info!(email = %credentials.email, "Login successful");
        Ok(session)
    }

    /// Forget the stored token and sign out.
    ///
    /// Always ends `Unauthenticated`; a store that could not be cleared is reported
    /// as a diagnostic.
    pub async fn sign_out(&self) -> Transition {
        let _guard = self.op_lock.lock().await;

        let diagnostic = match self.store.clear().await {
            Ok(()) => None,
            Err(e) => {
                warn!(error = %e, "Failed to clear stored token");
                Some(e)
            }
        };

        self.publish(Session::Unauthenticated);
        info!("Signed out");
        Transition {
            session: Session::Unauthenticated,
            diagnostic,
        }
    }

    /// Register a new account. Does not sign in.
    pub async fn sign_up(&self, request: &SignupRequest) -> Result<(), AuthError> {
        request.validate()?;

        match self.authenticator.signup(request).await {
            Ok(()) => {
                info!(email = %request.email, "Signup successful");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, email = %request.email, "Signup failed");
                Err(e)
            }
        }
    }

    fn publish(&self, session: Session) {
        self.state.send_if_modified(|current| {
            if *current == session {
                false
            } else {
                *current = session;
                true
            }
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
