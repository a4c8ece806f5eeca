use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use subtle::ConstantTimeEq;
use tracing::{debug, info};
use uuid::Uuid;

/// Constant-time string comparison to prevent timing attacks.
/// Use this for the admin password and anything else secret.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Longest session lifetime honoured; larger configured values are capped.
pub const MAX_SESSION_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Opaque admin session tokens with a fixed lifetime.
///
/// Tokens are random v4 UUIDs held only in memory, so a restart logs every
/// admin out. Expired entries are dropped whenever a token is validated.
#[derive(Debug)]
pub struct SessionStore {
    ttl: Duration,
    sessions: Mutex<HashMap<String, Instant>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: ttl.min(MAX_SESSION_TTL),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a fresh token valid for the configured lifetime.
    pub fn issue(&self) -> String {
        let token = Uuid::new_v4().to_string();
        let now = Instant::now();
        let expires_at = now.checked_add(self.ttl).unwrap_or(now);
        let mut sessions = self.lock();
        sessions.insert(token.clone(), expires_at);
        info!("Issued admin session ({} active)", sessions.len());
        token
    }

    /// Whether `token` names a live session.
    pub fn validate(&self, token: &str) -> bool {
        let now = Instant::now();
        let mut sessions = self.lock();

        let before = sessions.len();
        sessions.retain(|_, expires_at| *expires_at > now);
        if sessions.len() < before {
            debug!("Purged {} expired admin sessions", before - sessions.len());
        }

        sessions.contains_key(token)
    }

    /// Forget a token. Returns whether it was live.
    pub fn revoke(&self, token: &str) -> bool {
        let removed = self.lock().remove(token).is_some();
        if removed {
            info!("Revoked admin session");
        }
        removed
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Instant>> {
        // A poisoned map still holds valid tokens and expiries.
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
