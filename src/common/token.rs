//! In-memory expiring token store gating every sensitive route.
//!
//! Expiry is checked lazily on each lookup; nothing sweeps the map. Expired
//! and never-issued tokens look the same to callers.

use base64::{engine::general_purpose, Engine};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Bytes of OS randomness behind each token (128 bits).
const TOKEN_BYTES: usize = 16;

/// Generate a fresh URL-safe token from the OS RNG.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Token -> absolute UTC expiry, behind a lock shared by all handlers.
#[derive(Debug, Default)]
pub struct TokenAuthority {
    tokens: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl TokenAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `token` as valid until `now + ttl`. Re-issuing overwrites.
    pub fn issue(&self, token: impl Into<String>, ttl: Duration) {
        let now = Utc::now();
        let expires_at = now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.issue_until(token, expires_at);
    }

    /// Record `token` with an explicit absolute expiry.
    pub fn issue_until(&self, token: impl Into<String>, expires_at: DateTime<Utc>) {
        let mut tokens = self.write();
        tokens.insert(token.into(), expires_at);
        tracing::debug!(%expires_at, "token issued");
    }

    pub fn is_valid(&self, token: &str) -> bool {
        self.is_valid_at(token, Utc::now())
    }

    /// Valid iff known and `now <= expiry`.
    pub fn is_valid_at(&self, token: &str, now: DateTime<Utc>) -> bool {
        // Copy the expiry out so the guard is released before comparing.
        let expires_at = self.read().get(token).copied();
        match expires_at {
            Some(expires_at) => now <= expires_at,
            None => false,
        }
    }

    pub fn expires_at(&self, token: &str) -> Option<DateTime<Utc>> {
        self.read().get(token).copied()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, DateTime<Utc>>> {
        match self.tokens.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::error!("Token store lock poisoned during read, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, DateTime<Utc>>> {
        match self.tokens.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::error!("Token store lock poisoned during write, recovering");
                poisoned.into_inner()
            }
        }
    }
}
