//! API client for the BuyBnB listings service.
//!
//! `ApiClient::request` is the gateway every authenticated call goes
//! through; `login` is the one call made without a token.

use std::sync::Arc;

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::auth::SessionStore;
use crate::models::{Credentials, LoginResponse, Property, UserRecord};

use super::{ApiError, ApiResponse, HttpRequest, Transport};

// ============================================================================
// Constants
// ============================================================================

const LOGIN_PATH: &str = "/login";
const PROPERTIES_PATH: &str = "/api/properties";
const PROFILE_PATH: &str = "/profile";

/// Message used when a rejected login carries no body.
const LOGIN_FAILED_FALLBACK: &str = "Login failed";

/// Method, headers, query and body for a gateway request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    /// Leave the session alone when this request gets a 401
    pub keep_session_on_unauthorized: bool,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Serialize `body` as the JSON request body.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        let bytes =
            serde_json::to_vec(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        self.body = Some(bytes);
        Ok(self)
    }

    /// Add a header. Caller headers override the gateway defaults.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Fail with `ApiError::Unauthorized` on a 401 without ending the session.
    /// For background requests the user did not ask for.
    pub fn keep_session(mut self) -> Self {
        self.keep_session_on_unauthorized = true;
        self
    }
}

/// Gateway to the external API.
/// Clone is cheap - the transport and session store are shared.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn Transport>,
        session: Arc<SessionStore>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Join `path` onto the base address with exactly one slash, then append query pairs.
    fn url(&self, path: &str, query: &[(String, String)]) -> Result<Url, ApiError> {
        let joined = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let mut url =
            Url::parse(&joined).map_err(|e| ApiError::InvalidRequest(format!("{}: {}", joined, e)))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers
    }

    fn bearer(token: &str) -> Result<HeaderValue, ApiError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ApiError::InvalidRequest("token is not a valid header value".to_string()))?;
        value.set_sensitive(true);
        Ok(value)
    }

    /// Send a request with the session's credentials attached.
    ///
    /// A 401 response signs the session out, redirects to the sign-in page
    /// and fails with `ApiError::Unauthorized`; callers must not retry.
    /// Every other response is returned as-is.
    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<ApiResponse, ApiError> {
        let url = self.url(path, &options.query)?;

        let mut headers = Self::default_headers();
        if let Some(token) = self.session.token() {
            headers.insert(header::AUTHORIZATION, Self::bearer(&token)?);
        }
        for (name, value) in options.headers.iter() {
            headers.insert(name.clone(), value.clone());
        }

        debug!(method = %options.method, url = %url, "Sending request");
        let response = self
            .transport
            .send(HttpRequest {
                method: options.method,
                url: url.clone(),
                headers,
                body: options.body,
            })
            .await?;

        if response.status == StatusCode::UNAUTHORIZED {
            if options.keep_session_on_unauthorized {
                debug!(url = %url, "Request unauthorized, session kept");
            } else {
                warn!(url = %url, "Request unauthorized, ending session");
                self.session.expire();
            }
            return Err(ApiError::Unauthorized);
        }

        debug!(status = %response.status, url = %url, "Response received");
        Ok(response)
    }

    /// Exchange credentials for a token and user record.
    ///
    /// Sent without a token. The result is meant for `SessionStore::login`.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let url = self.url(LOGIN_PATH, &[])?;
        let body =
            serde_json::to_vec(credentials).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

        let response = self
            .transport
            .send(HttpRequest {
                method: Method::POST,
                url,
                headers: Self::default_headers(),
                body: Some(body),
            })
            .await?;

        if !response.is_success() {
            warn!(status = %response.status, "Login rejected");
            let message = response.text();
            let message = if message.is_empty() {
                LOGIN_FAILED_FALLBACK.to_string()
            } else {
                message
            };
            return Err(ApiError::LoginRejected(message));
        }

        response.json()
    }

    /// Fail on non-success statuses, mapping them to typed errors.
    fn check_response(response: ApiResponse) -> Result<ApiResponse, ApiError> {
        if response.is_success() {
            Ok(response)
        } else {
            Err(ApiError::from_status(response.status, &response.text()))
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let response = self.request(path, options).await?;
        Self::check_response(response)?.json()
    }

    /// List properties, optionally restricted to one city.
    pub async fn fetch_properties(&self, city: Option<&str>) -> Result<Vec<Property>, ApiError> {
        let mut options = RequestOptions::get();
        if let Some(city) = city {
            options = options.query("city", city);
        }
        let properties: Vec<Property> = self.get_json(PROPERTIES_PATH, options).await?;
        debug!(city = ?city, count = properties.len(), "Fetched properties");
        Ok(properties)
    }

    /// Number of listings in `city`. A rejected token fails this call
    /// without signing the user out.
    pub async fn count_properties(&self, city: &str) -> Result<usize, ApiError> {
        let options = RequestOptions::get().query("city", city).keep_session();
        let properties: Vec<Property> = self.get_json(PROPERTIES_PATH, options).await?;
        Ok(properties.len())
    }

    /// The signed-in user's profile.
    pub async fn fetch_profile(&self) -> Result<UserRecord, ApiError> {
        self.get_json(PROFILE_PATH, RequestOptions::get()).await
    }
}
