//! Authentication tokens and an optional shared cache
//!
//! Every operation takes the token it needs as an argument. Callers issuing
//! concurrent operations can share one token through [`TokenCache`], which
//! refreshes at most once at a time and never hands out a token that is about
//! to expire.

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tokio::sync::Mutex;

/// Bearer token returned by [`crate::Service::authenticate`]
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    value: String,
    created: DateTime<Utc>,
    expires: DateTime<Utc>,
}

impl Token {
    /// Build a token from its parts
    pub fn new(value: impl Into<String>, created: DateTime<Utc>, expires: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            created,
            expires,
        }
    }

    /// Raw token value
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Creation instant
    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    /// Expiry instant
    pub fn expires(&self) -> DateTime<Utc> {
        self.expires
    }

    /// Non-empty and `now < expires`
    ///
    /// `created` is informational: it is the remote clock's instant and may be
    /// slightly ahead of the local one.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.value.trim().is_empty() && now < self.expires
    }

    /// Error unless valid at `now`
    pub fn ensure_valid(&self, now: DateTime<Utc>) -> Result<()> {
        if self.is_valid(now) {
            Ok(())
        } else {
            Err(Error::TokenExpired {
                expires: self.expires.to_rfc3339(),
            })
        }
    }

    /// `Authorization` header value for the query, verify and download calls
    pub fn authorization_header(&self) -> String {
        format!("WRAP access_token=\"{}\"", self.value)
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("value", &"<redacted>")
            .field("created", &self.created)
            .field("expires", &self.expires)
            .finish()
    }
}

/// Caller-side token cache with a single-refresh guarantee
///
/// The lock is held across the refresh, so concurrent callers wait for the
/// one refresh in flight and then share its token.
#[derive(Debug)]
pub struct TokenCache {
    current: Mutex<Option<Token>>,
    refresh_margin: Duration,
}

impl TokenCache {
    /// Tokens expiring within `refresh_margin` are refreshed
    pub fn new(refresh_margin: std::time::Duration) -> Self {
        Self {
            current: Mutex::new(None),
            refresh_margin: Duration::from_std(refresh_margin).unwrap_or(Duration::zero()),
        }
    }

    /// Cache configured from [`crate::config::TokenCacheConfig`]
    pub fn from_config(config: &crate::config::TokenCacheConfig) -> Self {
        Self::new(config.refresh_margin)
    }

    /// Cached token if still usable, otherwise the token produced by `refresh`
    ///
    /// # Errors
    ///
    /// Propagates the refresh error, or returns [`Error::TokenExpired`] when the
    /// freshly obtained token is already invalid. The cache is left empty in both
    /// cases.
    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> Result<Token>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Token>>,
    {
        let mut current = self.current.lock().await;

        if let Some(token) = current.as_ref() {
            if token.is_valid(Utc::now() + self.refresh_margin) {
                return Ok(token.clone());
            }
            tracing::debug!(expires = %token.expires, "cached token expiring, refreshing");
        }
        *current = None;

        let token = refresh().await?;
        token.ensure_valid(Utc::now())?;
        tracing::debug!(expires = %token.expires, "token refreshed");
        *current = Some(token.clone());
        Ok(token)
    }

    /// Cached token if still usable, without refreshing
    pub async fn current(&self) -> Option<Token> {
        let current = self.current.lock().await;
        current
            .as_ref()
            .filter(|token| token.is_valid(Utc::now() + self.refresh_margin))
            .cloned()
    }

    /// Drop the cached token, e.g. after the remote rejected it
    pub async fn invalidate(&self) {
        *self.current.lock().await = None;
    }
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::from_config(&crate::config::TokenCacheConfig::default())
    }
}
