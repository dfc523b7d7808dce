//! Feature Flag Service - one-shot fetch with permissive fallback
//!
//! Flags are fetched once per application load and cached for the process
//! lifetime. A failed fetch falls back to all-enabled: if the flag service is
//! unreachable, users still see the default feature set rather than a broken,
//! empty shell. Feature flags never affect the authentication outcome.

use crate::api::ApiBackend;
use chargeback_core::FeatureFlags;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// Caching front for the deployment's feature flags
pub struct FeatureFlagService {
    api: Arc<dyn ApiBackend>,
    cache: OnceCell<FeatureFlags>,
}

impl FeatureFlagService {
    pub fn new(api: Arc<dyn ApiBackend>) -> Self {
        Self {
            api,
            cache: OnceCell::new(),
        }
    }

    /// The deployment's feature flags.
    ///
    /// The first call performs the fetch; every later call returns the cached
    /// result, including the permissive fallback if the fetch failed. There is
    /// no scheduled retry and no invalidation within a session.
    pub async fn flags(&self) -> FeatureFlags {
        self.cache
            .get_or_init(|| async {
                match self.api.fetch_features().await {
                    Ok(flags) => {
                        debug!(disabled = ?flags.disabled_modules(), "Fetched feature flags");
                        flags
                    }
                    Err(e) => {
                        warn!(error = %e, "Feature flag fetch failed; assuming all modules enabled");
                        FeatureFlags::all_enabled()
                    }
                }
            })
            .await
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConsoleError, ConsoleResult};
    use chargeback_core::{AuthStatus, LoginRequest, LoginResponse};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend that counts fetches and can be scripted to fail
    struct CountingApi {
        flags: Option<FeatureFlags>,
        fetches: AtomicUsize,
    }

    impl CountingApi {
        fn with_flags(flags: FeatureFlags) -> Self {
            Self {
                flags: Some(flags),
                fetches: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                flags: None,
                fetches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl ApiBackend for CountingApi {
        async fn auth_status(&self) -> ConsoleResult<AuthStatus> {
            Ok(AuthStatus { auth_enabled: true })
        }

        async fn login(&self, _request: &LoginRequest) -> ConsoleResult<LoginResponse> {
            Err(ConsoleError::invalid_credentials("not scripted"))
        }

        async fn fetch_features(&self) -> ConsoleResult<FeatureFlags> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            match &self.flags {
                Some(flags) => Ok(flags.clone()),
                None => Err(ConsoleError::Api {
                    status: 503,
                    message: "unavailable".to_string(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn flags_are_fetched_once_and_cached() {
        let api = Arc::new(CountingApi::with_flags(
            FeatureFlags::all_enabled().with_flag("costEnabled", false),
        ));
        let service = FeatureFlagService::new(api.clone());

        let first = service.flags().await;
        let second = service.flags().await;
        assert_eq!(first, second);
        assert!(!first.is_enabled("costEnabled"));
        assert_eq!(api.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_fetch_falls_back_to_all_enabled() {
        let api = Arc::new(CountingApi::failing());
        let service = FeatureFlagService::new(api.clone());

        let flags = service.flags().await;
        assert_eq!(flags, FeatureFlags::all_enabled());

        // The fallback is cached too; no retry-on-schedule
        let _ = service.flags().await;
        assert_eq!(api.fetches.load(Ordering::SeqCst), 1);
    }
}
