//! Core session, auth-state and feature-flag types
//!
//! These types are owned by the session controller in `chargeback-console`;
//! they live here so the wire contract and the persisted state share one
//! definition.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The authenticated identity and credential material for one logged-in
/// user context.
///
/// A session is created at successful login, never silently renewed, and
/// destroyed at logout or expiry detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque bearer token issued by the billing API
    pub token: String,
    /// Username the token was issued for
    pub username: String,
    /// Server-declared absolute expiry
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session
    pub fn new(token: String, username: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            token,
            username,
            expires_at,
        }
    }

    /// Create a session from the wire representation (epoch seconds).
    ///
    /// `None` if the epoch value is not representable as a timestamp;
    /// callers treat such a session as corrupt.
    pub fn from_epoch_seconds(token: String, username: String, expires_at: i64) -> Option<Self> {
        let expires_at = Utc.timestamp_opt(expires_at, 0).single()?;
        Some(Self::new(token, username, expires_at))
    }

    /// A session is valid only while a non-empty token is present and the
    /// expiry is still in the future.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.token.is_empty() && now < self.expires_at
    }

    /// Expiry as epoch seconds (the wire and persisted representation)
    pub fn expires_epoch(&self) -> i64 {
        self.expires_at.timestamp()
    }
}

/// Session information for external consumption
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub username: String,
    pub expires_at: DateTime<Utc>,
    pub is_valid: bool,
    pub remaining_seconds: i64,
}

impl From<&Session> for SessionInfo {
    fn from(session: &Session) -> Self {
        let now = Utc::now();
        Self {
            username: session.username.clone(),
            expires_at: session.expires_at,
            is_valid: session.is_valid(now),
            remaining_seconds: (session.expires_at - now).num_seconds().max(0),
        }
    }
}

/// The controller's current belief about whether the session is valid.
///
/// Transitions are driven only by the session controller; no other component
/// may mutate it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AuthState {
    /// Initial state before the first status check completes
    #[default]
    Unknown,
    /// A status check is in flight; renders neither content nor a redirect
    Checking,
    /// A valid session is present
    Authenticated(Session),
    /// No valid session; the visitor must log in
    Anonymous,
    /// The deployment does not require authentication at all
    AuthNotRequired,
}

impl AuthState {
    /// Whether this state is a resolved outcome of a status check
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AuthState::Unknown | AuthState::Checking)
    }

    /// Whether protected content may be rendered in this state
    pub fn allows_access(&self) -> bool {
        matches!(
            self,
            AuthState::Authenticated(_) | AuthState::AuthNotRequired
        )
    }

    /// Borrow the session if one is established
    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthState::Authenticated(session) => Some(session),
            _ => None,
        }
    }
}

impl std::fmt::Display for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthState::Unknown => write!(f, "unknown"),
            AuthState::Checking => write!(f, "checking"),
            AuthState::Authenticated(_) => write!(f, "authenticated"),
            AuthState::Anonymous => write!(f, "anonymous"),
            AuthState::AuthNotRequired => write!(f, "auth_not_required"),
        }
    }
}

/// Deployment-level feature flags: a flat mapping of module name to
/// enabled/disabled.
///
/// Absence of a key means enabled. Flags are fetched once per process and
/// cached; the absence of information is never more restrictive than
/// explicit configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureFlags {
    flags: BTreeMap<String, bool>,
}

impl FeatureFlags {
    /// The permissive default: no flag set, so every module is enabled
    pub fn all_enabled() -> Self {
        Self::default()
    }

    /// A module is disabled only if its flag is explicitly `false`
    pub fn is_enabled(&self, module: &str) -> bool {
        self.flags.get(module).copied().unwrap_or(true)
    }

    /// Set a flag explicitly
    pub fn set(&mut self, module: &str, enabled: bool) {
        self.flags.insert(module.to_string(), enabled);
    }

    /// Builder-style flag setter for tests and defaults
    pub fn with_flag(mut self, module: &str, enabled: bool) -> Self {
        self.set(module, enabled);
        self
    }

    /// Modules that are explicitly disabled, for diagnostics
    pub fn disabled_modules(&self) -> Vec<&str> {
        self.flags
            .iter()
            .filter(|(_, enabled)| !**enabled)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

// ========================================
// Wire contract with the billing API
// ========================================

/// `GET /api/v1/auth/status` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether this deployment requires authentication at all
    #[serde(rename = "authEnabled")]
    pub auth_enabled: bool,
}

/// `POST /api/v1/auth/login` request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// `POST /api/v1/auth/login` success response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    /// Epoch seconds
    #[serde(rename = "expiresAt")]
    pub expires_at: i64,
}

/// Error body returned by the billing API on non-2xx responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn session_validity_requires_future_expiry_and_token() {
        let now = Utc::now();
        let valid = Session::new("t1".into(), "alice".into(), now + Duration::hours(1));
        assert!(valid.is_valid(now));

        let expired = Session::new("t1".into(), "alice".into(), now - Duration::hours(1));
        assert!(!expired.is_valid(now));

        let empty_token = Session::new(String::new(), "alice".into(), now + Duration::hours(1));
        assert!(!empty_token.is_valid(now));
    }

    #[test]
    fn session_info_reports_remaining_lifetime() {
        let session = Session::new("t1".into(), "alice".into(), Utc::now() + Duration::hours(1));
        let info = SessionInfo::from(&session);
        assert!(info.is_valid);
        assert!(info.remaining_seconds > 3500 && info.remaining_seconds <= 3600);

        let stale = Session::new("t1".into(), "alice".into(), Utc::now() - Duration::hours(1));
        let info = SessionInfo::from(&stale);
        assert!(!info.is_valid);
        assert_eq!(info.remaining_seconds, 0);
    }

    #[test]
    fn auth_state_classification() {
        assert!(!AuthState::Unknown.is_terminal());
        assert!(!AuthState::Checking.is_terminal());
        assert!(AuthState::Anonymous.is_terminal());
        assert!(!AuthState::Anonymous.allows_access());
        assert!(AuthState::AuthNotRequired.allows_access());
        assert_eq!(AuthState::AuthNotRequired.session(), None);

        let session = Session::new("t1".into(), "alice".into(), Utc::now() + Duration::hours(1));
        let state = AuthState::Authenticated(session.clone());
        assert_eq!(state.session(), Some(&session));
    }

    #[test]
    fn feature_flags_default_to_enabled() {
        let flags = FeatureFlags::all_enabled();
        assert!(flags.is_enabled("capsuleEnabled"));
        assert!(flags.is_enabled("somethingNobodyDeclared"));

        let flags = flags.with_flag("costEnabled", false);
        assert!(!flags.is_enabled("costEnabled"));
        assert!(flags.is_enabled("capsuleEnabled"));
        assert_eq!(flags.disabled_modules(), vec!["costEnabled"]);
    }

    #[test]
    fn feature_flags_deserialize_from_flat_map() {
        let flags: FeatureFlags =
            serde_json::from_str(r#"{"capsuleEnabled": false, "costEnabled": true}"#).unwrap();
        assert!(!flags.is_enabled("capsuleEnabled"));
        assert!(flags.is_enabled("costEnabled"));
    }

    #[test]
    fn login_response_uses_wire_field_names() {
        let response: LoginResponse =
            serde_json::from_str(r#"{"token":"t1","username":"alice","expiresAt":1700000000}"#)
                .unwrap();
        assert_eq!(response.expires_at, 1_700_000_000);

        let session =
            Session::from_epoch_seconds(response.token, response.username, response.expires_at)
                .unwrap();
        assert_eq!(session.expires_epoch(), 1_700_000_000);
    }

    #[test]
    fn out_of_range_epoch_is_rejected() {
        assert!(Session::from_epoch_seconds("t1".into(), "alice".into(), i64::MAX).is_none());
        assert!(Session::from_epoch_seconds("t1".into(), "alice".into(), i64::MIN).is_none());
        assert!(Session::from_epoch_seconds("t1".into(), "alice".into(), 1_700_000_000).is_some());
    }
}
