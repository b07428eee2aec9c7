//! Authentication module for managing the client session.
//!
//! This module provides:
//! - `CredentialStore`: durable storage for the single session token
//! - `SessionManager`: the state machine that owns the current `Session`
//! - `Authenticator`: the remote collaborator that exchanges credentials for a token
//!
//! The session starts out `Unknown`, is resolved from the credential store once at
//! startup, and afterwards only changes on explicit sign-in or sign-out.

pub mod credentials;
pub mod error;
pub mod session;

pub use credentials::{
    CredentialStore, FileCredentialStore, KeyringCredentialStore, MemoryCredentialStore,
    StoreKind,
};
pub use error::AuthError;
pub use session::{Authenticator, Session, SessionManager, SessionStatus, Token, Transition};
