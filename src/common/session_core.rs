use crate::common::lifecycle::SessionLifecycle;
use crate::common::token::{generate_token, TokenAuthority};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Shared session infrastructure.
/// One token plus the lifecycle controller, handed to every handler.
#[derive(Clone)]
pub struct Session {
    token: String,
    tokens: Arc<TokenAuthority>,
    lifecycle: Arc<SessionLifecycle>,
}

impl Session {
    /// Issue a fresh token valid for `ttl` and wrap it with a new lifecycle.
    pub fn start(ttl: Duration, lifecycle: SessionLifecycle) -> Self {
        let token = generate_token();
        let tokens = Arc::new(TokenAuthority::new());
        tokens.issue(token.clone(), ttl);

        tracing::debug!("Created new session");

        Self::new(token, tokens, Arc::new(lifecycle))
    }

    pub fn new(
        token: String,
        tokens: Arc<TokenAuthority>,
        lifecycle: Arc<SessionLifecycle>,
    ) -> Self {
        Self {
            token,
            tokens,
            lifecycle,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn tokens(&self) -> &Arc<TokenAuthority> {
        &self.tokens
    }

    pub fn lifecycle(&self) -> &Arc<SessionLifecycle> {
        &self.lifecycle
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.tokens.expires_at(&self.token)
    }

    pub fn is_authorized(&self, candidate: &str) -> bool {
        self.tokens.is_valid(candidate)
    }

    /// Called by handlers once their transfer succeeded.
    pub fn complete_transfer(&self) -> bool {
        self.lifecycle.notify_transfer_complete()
    }
}
