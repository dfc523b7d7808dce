//! Session Controller - login, logout and auth-status resolution
//!
//! Owns the authoritative in-memory [`AuthState`], derived from the token
//! store and the remote auth-status oracle. No other component mutates the
//! state; the route guard and rendering layer only observe it.

use crate::api::ApiBackend;
use crate::store::TokenStore;
use crate::ConsoleResult;
use chargeback_core::{AuthState, ChargebackError, ErrorContext, LoginRequest, Session};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Orchestrates login, logout and "am I currently authenticated" queries.
///
/// All operations resolve to a defined [`AuthState`]; nothing here is fatal.
/// `Checking` is observable only while [`SessionController::check_auth`] is
/// in flight, and the guard treats it as a blocking state.
pub struct SessionController {
    api: Arc<dyn ApiBackend>,
    store: Arc<dyn TokenStore>,
    state: RwLock<AuthState>,
}

impl SessionController {
    /// Create a controller over the given API backend and token store
    pub fn new(api: Arc<dyn ApiBackend>, store: Arc<dyn TokenStore>) -> Self {
        Self {
            api,
            store,
            state: RwLock::new(AuthState::Unknown),
        }
    }

    /// The current state as last resolved
    pub async fn state(&self) -> AuthState {
        self.state.read().await.clone()
    }

    /// Resolve the current authentication state.
    ///
    /// Queries the auth-status oracle first: a deployment with authentication
    /// disabled short-circuits to [`AuthState::AuthNotRequired`] without
    /// consulting the token store. Otherwise the stored session decides:
    /// valid → `Authenticated`, expired → actively cleared and `Anonymous`,
    /// absent → `Anonymous`.
    ///
    /// Always resolves to a terminal state, and is idempotent absent an
    /// intervening login, logout or expiry. The resolved state is written
    /// only after the network call completes, so a caller that drops this
    /// future discards the result instead of applying a stale one; the
    /// controller then stays at `Checking`, which the guard treats as
    /// blocking, until the next check.
    pub async fn check_auth(&self) -> AuthState {
        let previous = {
            let mut state = self.state.write().await;
            let previous = state.clone();
            *state = AuthState::Checking;
            previous
        };

        let resolved = self.resolve_auth(previous).await;

        *self.state.write().await = resolved.clone();
        debug!(state = %resolved, "Auth check resolved");
        resolved
    }

    async fn resolve_auth(&self, previous: AuthState) -> AuthState {
        let auth_required = match self.api.auth_status().await {
            Ok(status) => status.auth_enabled,
            Err(e) => {
                // An unreachable oracle never grants AuthNotRequired on its
                // own; only a previously established answer carries over.
                warn!(error = %e, "Auth status check failed");
                if previous == AuthState::AuthNotRequired {
                    return AuthState::AuthNotRequired;
                }
                true
            }
        };

        if !auth_required {
            debug!("Deployment does not require authentication");
            return AuthState::AuthNotRequired;
        }

        self.state_from_store()
    }

    /// Derive a terminal state from the token store alone
    fn state_from_store(&self) -> AuthState {
        match self.store.load() {
            Ok(Some(session)) => {
                if session.is_valid(Utc::now()) {
                    AuthState::Authenticated(session)
                } else {
                    // Clear the stale entry so expiry is not re-detected on
                    // every subsequent check.
                    info!(username = %session.username, "Stored session expired; clearing");
                    if let Err(e) = self.store.clear() {
                        warn!(error = %e, "Failed to clear expired session");
                    }
                    AuthState::Anonymous
                }
            }
            Ok(None) => AuthState::Anonymous,
            Err(e) => {
                warn!(error = %e, "Failed to read token store");
                AuthState::Anonymous
            }
        }
    }

    /// Exchange credentials for a session.
    ///
    /// On success the session is persisted and the state transitions to
    /// `Authenticated`. On failure the state is left unchanged and the error
    /// (carrying the server's message for invalid credentials) is returned to
    /// the caller; there is no automatic retry.
    pub async fn login(&self, username: &str, password: &str) -> ConsoleResult<Session> {
        info!(username = %username, "Login attempt");

        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        let response = self.api.login(&request).await.inspect_err(|e| {
            debug!(username = %username, error = %e, "Login rejected");
        })?;

        let session =
            Session::from_epoch_seconds(response.token, response.username, response.expires_at)
                .ok_or_else(|| {
                    ChargebackError::Validation {
                        message: "login response carried an unrepresentable expiry".to_string(),
                        field: Some("expiresAt".to_string()),
                        context: ErrorContext::new("session").with_operation("login"),
                    }
                })?;
        self.store.save(&session)?;
        *self.state.write().await = AuthState::Authenticated(session.clone());

        info!(username = %session.username, "Login succeeded");
        Ok(session)
    }

    /// Discard the session.
    ///
    /// Local-only: clears the token store and transitions to `Anonymous`
    /// regardless of network availability. No server round trip is required.
    pub async fn logout(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear token store during logout");
        }
        *self.state.write().await = AuthState::Anonymous;
        info!("Logged out");
    }
}
