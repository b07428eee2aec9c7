use std::fmt;

use serde::{Deserialize, Serialize};

use crate::auth::AuthError;

/// Minimum accepted password length at signup.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Body of `POST /login`.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password: password.into(),
        }
    }

    /// Client-side checks run before anything is sent.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err(AuthError::InvalidInput(
                "Email and password are required.".to_string(),
            ));
        }
        validate_email(&self.email)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /signup`.
#[derive(Clone, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl SignupRequest {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into().trim().to_string(),
            email: email.into().trim().to_string(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), AuthError> {
        if self.name.is_empty() || self.email.is_empty() || self.password.is_empty() {
            return Err(AuthError::InvalidInput("All fields are required.".to_string()));
        }
        validate_email(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::InvalidInput(format!(
                "Password must be at least {} characters.",
                MIN_PASSWORD_LENGTH
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(AuthError::InvalidInput(
            "Please enter a valid email address.".to_string(),
        )),
    }
}

/// The signed-in administrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_require_both_fields() {
        assert!(matches!(
            Credentials::new("", "pw").validate(),
            Err(AuthError::InvalidInput(_))
        ));
        assert!(matches!(
            Credentials::new("a@b.com", "").validate(),
            Err(AuthError::InvalidInput(_))
        ));
        assert!(Credentials::new("a@b.com", "pw").validate().is_ok());
    }

    #[test]
    fn test_credentials_email_format() {
        assert!(Credentials::new("not-an-email", "pw").validate().is_err());
        assert!(Credentials::new("@b.com", "pw").validate().is_err());
        assert!(Credentials::new("a@", "pw").validate().is_err());
        // Surrounding whitespace is trimmed
        assert!(Credentials::new("  a@b.com ", "pw").validate().is_ok());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let rendered = format!("{:?}", Credentials::new("a@b.com", "hunter2"));
        assert!(rendered.contains("a@b.com"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_signup_validation() {
        assert!(SignupRequest::new("", "a@b.com", "secret1").validate().is_err());
        assert!(SignupRequest::new("Ana", "a@b.com", "short").validate().is_err());
        assert!(SignupRequest::new("Ana", "ab.com", "secret1").validate().is_err());
        assert!(SignupRequest::new("Ana", "a@b.com", "secret1").validate().is_ok());
    }

    #[test]
    fn test_serialized_login_body() {
        let json = serde_json::to_value(Credentials::new("a@b.com", "pw")).unwrap();
        assert_eq!(json, serde_json::json!({"email": "a@b.com", "password": "pw"}));
    }
}
