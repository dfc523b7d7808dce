//! Route Guard - gating protected content on the resolved auth state
//!
//! The guard renders protected content, redirects to the login surface, or
//! blocks on a neutral placeholder while the auth check is still in flight.
//! Blocking on `Checking` avoids a flash of the login page for visitors who
//! are already authenticated.

use crate::routes::{DASHBOARD_PATH, LOGIN_PATH};
use crate::session::SessionController;
use chargeback_core::AuthState;

/// What the rendering layer should do with a guarded route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// The auth check has not resolved yet: render a neutral placeholder,
    /// neither the protected content nor a redirect.
    Pending,
    /// Render the wrapped protected content
    Render,
    /// Send the visitor to the login surface. `replace_history` keeps the
    /// guarded path out of back-navigation history so the back button cannot
    /// bounce into stale protected content.
    RedirectToLogin { replace_history: bool },
}

impl GuardDecision {
    /// Redirect target for [`GuardDecision::RedirectToLogin`]
    pub fn redirect_path(&self) -> Option<&'static str> {
        match self {
            GuardDecision::RedirectToLogin { .. } => Some(LOGIN_PATH),
            _ => None,
        }
    }
}

/// Gating layer deciding whether to render protected content
pub struct RouteGuard;

impl RouteGuard {
    /// Derive the guard decision from the controller's current state.
    ///
    /// Pure: the guard never mutates [`AuthState`], it only observes it.
    /// This decision precedes any feature gating; an anonymous visitor is
    /// redirected before the conditional route set is even evaluated.
    pub fn decide(state: &AuthState) -> GuardDecision {
        match state {
            AuthState::Unknown | AuthState::Checking => GuardDecision::Pending,
            AuthState::Authenticated(_) | AuthState::AuthNotRequired => GuardDecision::Render,
            AuthState::Anonymous => GuardDecision::RedirectToLogin {
                replace_history: true,
            },
        }
    }

    /// Login-surface short-circuit: where to send a visitor who opened the
    /// login page.
    ///
    /// If authentication is not required, or a still-valid token already
    /// exists, the form is skipped and the visitor goes straight to the
    /// dashboard. This shares [`SessionController::check_auth`] rather than
    /// duplicating its logic.
    pub async fn login_redirect(controller: &SessionController) -> Option<&'static str> {
        if controller.check_auth().await.allows_access() {
            Some(DASHBOARD_PATH)
        } else {
            None
        }
    }
}
