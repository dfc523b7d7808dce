//! HTTP boundary to the billing API
//!
//! The console consumes three endpoints: the auth-status oracle, the login
//! endpoint and the feature-flag listing. Everything behind [`ApiBackend`] is
//! an async network call; callers decide how failures degrade (the session
//! controller and feature-flag service both fall back rather than crash).

use crate::{ConsoleError, ConsoleResult};
use chargeback_core::{
    ApiErrorBody, AuthStatus, ChargebackError, ErrorContext, FeatureFlags, LoginRequest,
    LoginResponse,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

const AUTH_STATUS_PATH: &str = "/api/v1/auth/status";
const LOGIN_PATH: &str = "/api/v1/auth/login";
const FEATURES_PATH: &str = "/api/v1/features";

/// The remote calls the controller depends on.
///
/// Production uses [`HttpApiClient`]; tests inject in-memory fakes.
#[async_trait]
pub trait ApiBackend: Send + Sync {
    /// Ask whether this deployment requires authentication at all
    async fn auth_status(&self) -> ConsoleResult<AuthStatus>;

    /// Exchange credentials for a token. Non-2xx responses surface the
    /// server's `error` message as [`ConsoleError::InvalidCredentials`].
    async fn login(&self, request: &LoginRequest) -> ConsoleResult<LoginResponse>;

    /// Fetch the deployment's feature flags
    async fn fetch_features(&self) -> ConsoleResult<FeatureFlags>;
}

/// HTTP client for the billing API
pub struct HttpApiClient {
    base_url: String,
    http: reqwest::Client,
    timeout: Duration,
}

impl HttpApiClient {
    /// Build a client with the configured base URL and a bounded request
    /// timeout. A timed-out request is treated the same as a failed fetch.
    pub fn new(config: &chargeback_core::ApiConfig) -> ConsoleResult<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| request_error("build_client", e, timeout))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn error(&self, operation: &str, error: reqwest::Error) -> ConsoleError {
        request_error(operation, error, self.timeout)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ConsoleResult<T> {
        let url = self.url(path);
        debug!(url = %url, "GET");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| self.error(path, e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ConsoleError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.json().await.map_err(|e| self.error(path, e))?;
        Ok(body)
    }
}

#[async_trait]
impl ApiBackend for HttpApiClient {
    async fn auth_status(&self) -> ConsoleResult<AuthStatus> {
        self.get_json(AUTH_STATUS_PATH).await
    }

    async fn login(&self, request: &LoginRequest) -> ConsoleResult<LoginResponse> {
        let url = self.url(LOGIN_PATH);
        debug!(url = %url, username = %request.username, "POST login");

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.error(LOGIN_PATH, e))?;

        let status = response.status();
        if status.is_success() {
            let body = response
                .json()
                .await
                .map_err(|e| self.error(LOGIN_PATH, e))?;
            return Ok(body);
        }

        // The API reports login failures as { "error": "..." }; fall back to
        // the raw body if the shape is unexpected.
        let message = match response.text().await {
            Ok(text) => serde_json::from_str::<ApiErrorBody>(&text)
                .map(|body| body.error)
                .unwrap_or(text),
            Err(_) => String::new(),
        };

        if status.is_client_error() {
            Err(ConsoleError::invalid_credentials(message))
        } else {
            Err(ConsoleError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn fetch_features(&self) -> ConsoleResult<FeatureFlags> {
        self.get_json(FEATURES_PATH).await
    }
}

/// Map a transport failure onto the core error taxonomy
fn request_error(operation: &str, error: reqwest::Error, timeout: Duration) -> ConsoleError {
    let core = if error.is_timeout() {
        ChargebackError::Timeout {
            operation: operation.to_string(),
            duration_ms: timeout.as_millis() as u64,
            context: ErrorContext::new("api")
                .with_operation(operation)
                .with_suggestion("Check that the billing API is reachable"),
        }
    } else {
        ChargebackError::Network {
            message: error.to_string(),
            source: Some(Box::new(error)),
            context: ErrorContext::new("api")
                .with_operation(operation)
                .with_suggestion("Check that the billing API is reachable"),
        }
    };
    ConsoleError::Core(core)
}
