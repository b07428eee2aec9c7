use thiserror::Error;

use crate::auth::AuthError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid path segment {0}")]
    InvalidPath(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            400 | 422 => ApiError::BadRequest(truncated),
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            409 => ApiError::Conflict(truncated),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// Whether the failure is on the transport/server side rather than a refusal.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ApiError::RateLimited
                | ApiError::ServerError(_)
                | ApiError::NetworkError(_)
                | ApiError::InvalidResponse(_)
        )
    }

    /// Classify a failed `POST /login`.
    pub fn into_login_error(self) -> AuthError {
        if self.is_transient() {
            return AuthError::NetworkFailure(self.to_string());
        }
        match self {
            ApiError::Unauthorized => {
                AuthError::AuthenticationRejected("Invalid email or password".to_string())
            }
            other => AuthError::AuthenticationRejected(other.to_string()),
        }
    }

    /// Classify a failed `POST /signup`.
    pub fn into_signup_error(self) -> AuthError {
        if self.is_transient() {
            AuthError::NetworkFailure(self.to_string())
        } else {
            AuthError::RegistrationRejected(self.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, "bad"),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::CONFLICT, "taken"),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, ""),
            ApiError::ServerError(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::IM_A_TEAPOT, ""),
            ApiError::InvalidResponse(_)
        ));
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(600);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(500)));
        assert!(truncated.ends_with("(truncated, 600 total bytes)"));

        // Never splits a multi-byte character
        let accented = "é".repeat(300);
        assert!(ApiError::truncate_body(&accented).contains("truncated"));
    }

    #[test]
    fn test_login_error_mapping() {
        assert!(matches!(
            ApiError::Unauthorized.into_login_error(),
            AuthError::AuthenticationRejected(_)
        ));
        assert!(matches!(
            ApiError::BadRequest("missing email".into()).into_login_error(),
            AuthError::AuthenticationRejected(_)
        ));
        assert!(matches!(
            ApiError::ServerError("down".into()).into_login_error(),
            AuthError::NetworkFailure(_)
        ));
        assert!(matches!(
            ApiError::RateLimited.into_login_error(),
            AuthError::NetworkFailure(_)
        ));
    }

    #[test]
    fn test_signup_error_mapping() {
        assert!(matches!(
            ApiError::Conflict("email taken".into()).into_signup_error(),
            AuthError::RegistrationRejected(_)
        ));
        assert!(matches!(
            ApiError::ServerError("down".into()).into_signup_error(),
            AuthError::NetworkFailure(_)
        ));
    }
}
