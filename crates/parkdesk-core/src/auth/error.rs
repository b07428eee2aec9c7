use thiserror::Error;

/// Errors surfaced by the session lifecycle.
///
/// None of these are fatal: storage failures fail closed to `Unauthenticated`, and
/// everything else leaves the session where it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Credential storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Authentication rejected: {0}")]
    AuthenticationRejected(String),

    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("Registration rejected: {0}")]
    RegistrationRejected(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AuthError {
    /// Whether retrying the same call later might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthError::NetworkFailure(_) | AuthError::StorageUnavailable(_))
    }

    /// Short message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::StorageUnavailable(_) => {
                "Could not access saved login. You may need to sign in again.".to_string()
            }
            AuthError::AuthenticationRejected(_) => "Invalid email or password".to_string(),
            AuthError::NetworkFailure(_) => {
                "Unable to connect to server. Check your internet connection.".to_string()
            }
            AuthError::RegistrationRejected(reason) => format!("Signup failed: {}", reason),
            AuthError::InvalidInput(reason) => reason.clone(),
        }
    }
}
