//! Access tokens and the session that keeps one fresh

use crate::error::{DriveError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Tokens are refreshed this long before they expire
pub const DEFAULT_REFRESH_MARGIN_SECS: i64 = 300;

/// A bearer token and its expiry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    /// Token valid for `lifetime` from `now`
    pub fn expiring_in(value: impl Into<String>, now: DateTime<Utc>, lifetime: Duration) -> Self {
        Self::new(value, now + lifetime)
    }

    /// Whether the token is still usable at `now` with `margin` to spare
    pub fn is_fresh_at(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        now + margin < self.expires_at
    }
}

/// Issues new access tokens
pub trait TokenSource {
    fn acquire(&mut self) -> Result<AccessToken>;
}

/// Token source for drives that need no authorisation
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

impl TokenSource for NoAuth {
    fn acquire(&mut self) -> Result<AccessToken> {
        Ok(AccessToken::new("", DateTime::<Utc>::MAX_UTC))
    }
}

/// Holds the current token and refreshes it on demand
#[derive(Debug)]
pub struct Session<S: TokenSource> {
    source: S,
    token: Option<AccessToken>,
    refresh_margin: Duration,
}

impl<S: TokenSource> Session<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            token: None,
            refresh_margin: Duration::seconds(DEFAULT_REFRESH_MARGIN_SECS),
        }
    }

    pub fn with_refresh_margin(mut self, margin: Duration) -> Self {
        self.refresh_margin = margin;
        self
    }

    /// A bearer token valid now
    pub fn bearer(&mut self) -> Result<&str> {
        self.bearer_at(Utc::now())
    }

    /// A bearer token valid at `now`, acquiring a new one if the current
    /// token is missing or inside the refresh margin
    pub fn bearer_at(&mut self, now: DateTime<Utc>) -> Result<&str> {
        let fresh = self
            .token
            .as_ref()
            .is_some_and(|t| t.is_fresh_at(now, self.refresh_margin));
        if !fresh {
            let token = self.source.acquire()?;
            if !token.is_fresh_at(now, Duration::zero()) {
                return Err(DriveError::Auth(format!(
                    "token source returned a token that expired at {}",
                    token.expires_at
                )));
            }
            debug!(expires_at = %token.expires_at, "acquired access token");
            self.token = Some(token);
        }
        match &self.token {
            Some(token) => Ok(token.value.as_str()),
            None => Err(DriveError::Auth("no access token".to_string())),
        }
    }

    /// Current token, if any, without refreshing
    pub fn token(&self) -> Option<&AccessToken> {
        self.token.as_ref()
    }

    /// Drop the current token so the next request acquires a new one
    pub fn invalidate(&mut self) {
        self.token = None;
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl Default for Session<NoAuth> {
    fn default() -> Self {
        Self::new(NoAuth)
    }
}
