//! API client for communicating with the ParkDesk REST API.
//!
//! This module provides the `ApiClient` struct, which authenticates admins
//! and fetches bookings, parking areas, slots and reports.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client, Method, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::auth::{AuthError, Authenticator, Token};
use crate::models::{
    AreaDetails, Booking, BookingCategory, Credentials, ManagedSlot, NewArea, OccupancyItem,
    ParkingArea, ParkingSlot, Profile, RevenueItem, SignupRequest,
};

use super::sources::{BookingSource, ParkingSource, ProfileSource, ReportSource};
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

fn default_success() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SignupResponse {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

/// Envelope wrapping every admin resource response.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default = "default_success")]
    success: bool,
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

impl<T> Envelope<T> {
    fn into_data(self, what: &str) -> Result<T, ApiError> {
        if !self.success {
            return Err(ApiError::Rejected(
                self.message
                    .unwrap_or_else(|| format!("Failed to fetch {}", what)),
            ));
        }
        self.data
            .ok_or_else(|| ApiError::InvalidResponse(format!("Missing data in {} response", what)))
    }
}

/// API client for the ParkDesk backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client rooted at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url.trim())
            .with_context(|| format!("Invalid API base URL '{}'", base_url))?;
        if base_url.cannot_be_a_base() {
            bail!("API base URL '{}' cannot hold a path", base_url);
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: &Token) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token.as_str().to_string()),
        }
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Build an endpoint URL. Each segment is percent-encoded on its own, so an id
    /// can never reach a different path.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        if let Some(bad) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            return Err(ApiError::InvalidPath(format!("'{}'", bad)));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidPath(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))
                    .context("Token contains characters not allowed in a header")?,
            );
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// POST a JSON body and return the raw response text.
    async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<String, ApiError> {
        let url = self.endpoint(&[path])?;
        debug!(url = %url, "POST");

        let response = self
            .client
            .post(url)
            .header(header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Ok(response.text().await?)
    }

    /// Send a bearer-authenticated request, retrying on 429 with exponential backoff.
    async fn request(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response> {
        let url = self.endpoint(segments)?;
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let mut request = self
                .client
                .request(method.clone(), url.clone())
                .headers(self.auth_headers()?);
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request
                .send()
                .await
                .with_context(|| format!("Failed to send {} request to {}", method, url))?;

            if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
                retries += 1;
                if retries > MAX_RATE_LIMIT_RETRIES {
                    return Err(ApiError::RateLimited.into());
                }
                warn!(url = %url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                backoff_ms *= 2; // Exponential backoff
                continue;
            }

            return Ok(Self::check_response(response).await?);
        }
    }

    /// GET an envelope and unwrap its data.
    async fn get<T: DeserializeOwned>(&self, segments: &[&str], what: &str) -> Result<T> {
        let response = self.request(Method::GET, segments, None).await?;
        let envelope: Envelope<T> = response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response", what))?;
        Ok(envelope.into_data(what)?)
    }

    /// Send a change. An empty or non-envelope 2xx body counts as success.
    async fn send<B: Serialize>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
        what: &str,
    ) -> Result<()> {
        let body = serde_json::to_value(body).context("Failed to encode request body")?;
        let response = self.request(method, segments, Some(&body)).await?;
        let text = response.text().await?;

        match serde_json::from_str::<Envelope<serde_json::Value>>(&text) {
            Ok(envelope) if !envelope.success => Err(ApiError::Rejected(
                envelope
                    .message
                    .unwrap_or_else(|| format!("Failed to {}", what)),
            )
            .into()),
            Ok(_) => Ok(()),
            Err(_) => {
                debug!(what, bytes = text.len(), "Write response has no envelope");
                Ok(())
            }
        }
    }
}

// ============================================================================
// Authentication
// ============================================================================

#[async_trait]
impl Authenticator for ApiClient {
    async fn login(&self, credentials: &Credentials) -> Result<Token, AuthError> {
        let body = self
            .post_json("login", credentials)
            .await
            .map_err(ApiError::into_login_error)?;

        let parsed: LoginResponse = serde_json::from_str(&body).map_err(|e| {
            AuthError::NetworkFailure(format!("Failed to parse login response: {}", e))
        })?;

        if !parsed.success {
            return Err(AuthError::AuthenticationRejected(
                parsed
                    .message
                    .unwrap_or_else(|| "Login failed".to_string()),
            ));
        }

        parsed.token.and_then(Token::new).ok_or_else(|| {
            AuthError::AuthenticationRejected(
                parsed
                    .message
                    .unwrap_or_else(|| "Server did not issue a token".to_string()),
            )
        })
    }

    async fn signup(&self, request: &SignupRequest) -> Result<(), AuthError> {
        let body = self
            .post_json("signup", request)
            .await
            .map_err(ApiError::into_signup_error)?;

        // Some backends answer 201 with an empty body
        if body.trim().is_empty() {
            return Ok(());
        }

        let parsed: SignupResponse = serde_json::from_str(&body).map_err(|e| {
            AuthError::NetworkFailure(format!("Failed to parse signup response: {}", e))
        })?;

        if parsed.success {
            Ok(())
        } else {
            Err(AuthError::RegistrationRejected(
                parsed
                    .message
                    .unwrap_or_else(|| "Failed to create account.".to_string()),
            ))
        }
    }
}

// ============================================================================
// Admin resources
// ============================================================================

#[async_trait]
impl ProfileSource for ApiClient {
    async fn fetch_profile(&self) -> Result<Profile> {
        self.get(&["profile"], "profile").await
    }
}

#[async_trait]
impl BookingSource for ApiClient {
    async fn fetch_bookings(&self, category: BookingCategory) -> Result<Vec<Booking>> {
        let segments: Vec<&str> = category.path().split('/').collect();
        let bookings: Vec<Booking> = self.get(&segments, "bookings").await?;
        debug!(category = %category, count = bookings.len(), "Fetched bookings");
        Ok(bookings)
    }
}

#[async_trait]
impl ParkingSource for ApiClient {
    async fn fetch_areas(&self) -> Result<Vec<ParkingArea>> {
        self.get(&["areas"], "parking areas").await
    }

    async fn fetch_slots(&self, area_id: &str) -> Result<Vec<ParkingSlot>> {
        self.get(&["areas", area_id, "slots"], "parking slots").await
    }

    async fn fetch_area(&self, area_id: &str) -> Result<AreaDetails> {
        self.get(&["areas", area_id], "area").await
    }

    async fn create_area(&self, area: &NewArea) -> Result<()> {
        area.validate()?;
        self.send(Method::POST, &["admin", "areas"], area, "add parking area")
            .await?;
        info!(name = %area.name, "Parking area added");
        Ok(())
    }

    async fn update_area(&self, area_id: &str, details: &AreaDetails) -> Result<()> {
        details.validate()?;
        self.send(Method::PUT, &["areas", area_id], details, "update area")
            .await?;
        info!(area_id, "Parking area updated");
        Ok(())
    }

    async fn fetch_managed_slots(&self) -> Result<Vec<ManagedSlot>> {
        self.get(&["slots"], "slots").await
    }

    async fn set_slot_active(&self, slot_id: &str, active: bool) -> Result<()> {
        self.send(
            Method::PATCH,
            &["slots", slot_id],
            &json!({ "isActive": active }),
            "update slot status",
        )
        .await?;
        info!(slot_id, active, "Slot status updated");
        Ok(())
    }
}

#[async_trait]
impl ReportSource for ApiClient {
    async fn fetch_occupancy(&self) -> Result<Vec<OccupancyItem>> {
        self.get(&["reports", "occupancy"], "occupancy report").await
    }

    async fn fetch_revenue(&self) -> Result<Vec<RevenueItem>> {
        self.get(&["reports", "revenue"], "revenue report").await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new("https://parking.example.com/api/", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_endpoint_joining() {
        let c = client();
        assert_eq!(c.base_url(), "https://parking.example.com/api");
        assert_eq!(
            c.endpoint(&["login"]).unwrap().as_str(),
            "https://parking.example.com/api/login"
        );
        assert_eq!(
            c.endpoint(&["bookings", "all"]).unwrap().as_str(),
            "https://parking.example.com/api/bookings/all"
        );
    }

    #[test]
    fn test_endpoint_escapes_ids() {
        let c = client();
        assert_eq!(
            c.endpoint(&["areas", "a/b", "slots"]).unwrap().as_str(),
            "https://parking.example.com/api/areas/a%2Fb/slots"
        );
        assert_eq!(
            c.endpoint(&["areas", "../profile", "slots"]).unwrap().as_str(),
            "https://parking.example.com/api/areas/..%2Fprofile/slots"
        );
        assert!(matches!(
            c.endpoint(&["areas", "..", "slots"]),
            Err(ApiError::InvalidPath(_))
        ));
        assert!(matches!(
            c.endpoint(&["areas", "", "slots"]),
            Err(ApiError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_base_url_must_be_http_like() {
        assert!(ApiClient::new("not a url", Duration::from_secs(5)).is_err());
        assert!(ApiClient::new("mailto:admin@b.com", Duration::from_secs(5)).is_err());
        let bare = ApiClient::new("http://localhost:8080", Duration::from_secs(5)).unwrap();
        assert_eq!(
            bare.endpoint(&["login"]).unwrap().as_str(),
            "http://localhost:8080/login"
        );
    }

    #[test]
    fn test_auth_headers() {
        let c = client();
        assert!(c.auth_headers().unwrap().is_empty());

        let authed = c.with_token(&Token::new("tok123").unwrap());
        let headers = authed.auth_headers().unwrap();
        assert_eq!(headers[header::AUTHORIZATION], "Bearer tok123");
    }

    #[test]
    fn test_envelope_into_data() {
        let ok: Envelope<Vec<u32>> = serde_json::from_str(r#"{"success":true,"data":[1,2]}"#).unwrap();
        assert_eq!(ok.into_data("numbers").unwrap(), vec![1, 2]);

        let rejected: Envelope<Vec<u32>> =
            serde_json::from_str(r#"{"success":false,"message":"No access"}"#).unwrap();
        match rejected.into_data("numbers") {
            Err(ApiError::Rejected(msg)) => assert_eq!(msg, "No access"),
            other => panic!("unexpected result: {:?}", other),
        }

        let missing: Envelope<Vec<u32>> = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(matches!(
            missing.into_data("numbers"),
            Err(ApiError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_login_response_defaults() {
        let parsed: LoginResponse = serde_json::from_str(r#"{"token":"abc"}"#).unwrap();
        assert!(parsed.success);
        assert_eq!(parsed.token.as_deref(), Some("abc"));
        assert!(parsed.message.is_none());
    }
}
