//! Chargeback Console - Session and access-gating controller
//!
//! This crate implements the client-side controller of the Chargeback admin
//! console. The billing engine itself is an external collaborator reachable
//! only over its HTTP API; what lives here is the logic that decides, on
//! every page load and navigation:
//!
//! - whether the current visitor is authenticated,
//! - whether authentication is even required for this deployment,
//! - which stored token is still valid,
//! - and which top-level sections are visible per server-reported feature flags.
//!
//! ## Architecture
//!
//! - **Token store** ([`store`]): durable persistence of the session credential
//! - **API client** ([`api`]): the HTTP boundary to the billing API
//! - **Session controller** ([`session`]): owns the authoritative [`AuthState`]
//! - **Feature flags** ([`features`]): one-shot fetch with permissive fallback
//! - **Route guard** ([`guard`]) and **route composition** ([`routes`]): pure
//!   gating decisions consumed by the rendering layer
//!
//! The controller is an explicit, constructed instance passed by reference to
//! whatever rendering layer consumes it; there is no ambient global state.

pub mod api;
pub mod features;
pub mod guard;
pub mod routes;
pub mod session;
pub mod store;

pub use api::{ApiBackend, HttpApiClient};
pub use features::FeatureFlagService;
pub use guard::{GuardDecision, RouteGuard};
pub use routes::{compose_routes, RouteDescriptor};
pub use session::SessionController;
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};

use chargeback_core::{AuthState, ConsoleConfig};
use std::sync::Arc;

/// Application-level error type
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error("Core error: {0}")]
    Core(#[from] chargeback_core::ChargebackError),

    /// Login rejected by the billing API. The message is the server's
    /// literal `error` field, suitable for direct display to the user.
    #[error("{message}")]
    InvalidCredentials { message: String },

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Token store error: {message}")]
    Store { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;

impl ConsoleError {
    /// Create an invalid-credentials error carrying the server's message
    pub fn invalid_credentials<S: Into<String>>(message: S) -> Self {
        Self::InvalidCredentials {
            message: message.into(),
        }
    }

    /// Create a token store error
    pub fn store<S: Into<String>>(message: S) -> Self {
        Self::Store {
            message: message.into(),
        }
    }
}

/// The assembled console controller: session handling plus feature flags,
/// wired from one configuration.
///
/// Construction is explicit dependency injection; tests swap the API backend
/// and token store for in-memory fakes through [`Console::with_backend`].
pub struct Console {
    session: SessionController,
    features: FeatureFlagService,
}

impl Console {
    /// Build a console against the configured billing API, persisting the
    /// session credential under the configured state directory.
    pub fn new(config: &ConsoleConfig) -> ConsoleResult<Self> {
        let api: Arc<dyn ApiBackend> = Arc::new(HttpApiClient::new(&config.api)?);
        let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(&config.storage.state_dir)?);
        Ok(Self::with_backend(api, store))
    }

    /// Build a console from explicit collaborators
    pub fn with_backend(api: Arc<dyn ApiBackend>, store: Arc<dyn TokenStore>) -> Self {
        Self {
            session: SessionController::new(api.clone(), store),
            features: FeatureFlagService::new(api),
        }
    }

    /// The session controller owning the authoritative [`AuthState`]
    pub fn session(&self) -> &SessionController {
        &self.session
    }

    /// The cached feature-flag service
    pub fn features(&self) -> &FeatureFlagService {
        &self.features
    }

    /// Convenience: run the auth check and derive the guard decision for a
    /// protected route in one step.
    pub async fn guard_decision(&self) -> GuardDecision {
        let state: AuthState = self.session.check_auth().await;
        RouteGuard::decide(&state)
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use super::{
        compose_routes, ApiBackend, Console, ConsoleError, ConsoleResult, FeatureFlagService,
        GuardDecision, RouteGuard, SessionController, TokenStore,
    };
    pub use chargeback_core::{AuthState, ConsoleConfig, FeatureFlags, Session};
}
