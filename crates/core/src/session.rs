//! Session expiry over an injected key-value store.
//!
//! The browser host backs [`KeyValueStore`] with `localStorage`; tests and
//! other hosts use [`MemoryStore`]. All instants are passed in by the caller,
//! so the logic is deterministic and clock-free. Token issuance is not this
//! crate's concern: the monitor only stores whatever token the caller hands
//! it and decides when that token should stop being used.

use chrono::{DateTime, Duration, Utc};

use crate::constants::{
    DEFAULT_ACTIVITY_THROTTLE_MS, DEFAULT_INACTIVITY_LIMIT_SECS, LAST_ACTIVITY_AT_KEY, TOKEN_KEY,
    TOKEN_EXPIRES_AT_KEY,
};

/// Minimal string key-value storage, the shape of web storage APIs.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// In-memory [`KeyValueStore`] for tests and non-browser hosts.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore(std::collections::BTreeMap<String, String>);

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_owned(), value.to_owned());
    }

    fn remove(&mut self, key: &str) {
        self.0.remove(key);
    }
}

/// Drops events that arrive within a minimum interval of the last processed
/// one. Used to thin out high-frequency activity sources such as pointer
/// movement before they touch storage.
#[derive(Debug, Clone)]
pub struct ThrottleGuard {
    min_interval: Duration,
    last_processed: Option<DateTime<Utc>>,
}

impl ThrottleGuard {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_processed: None,
        }
    }

    /// Returns true and records `now` if enough time has passed since the
    /// last processed event. The first event is always processed.
    pub fn should_process(&mut self, now: DateTime<Utc>) -> bool {
        let allowed = match self.last_processed {
            Some(last) => now.signed_duration_since(last) >= self.min_interval,
            None => true,
        };
        if allowed {
            self.last_processed = Some(now);
        }
        allowed
    }
}

/// Outcome of a session check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// A token is present and neither expired nor idle past the limit.
    Active,
    /// The token expired or the inactivity limit was exceeded; the token has
    /// been removed from storage.
    Expired,
    /// No token in storage.
    SignedOut,
}

/// Tunables for the session monitor.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long the session survives without recorded activity.
    pub inactivity_limit: Duration,
    /// Minimum interval between processed activity events.
    pub activity_throttle: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            inactivity_limit: Duration::seconds(DEFAULT_INACTIVITY_LIMIT_SECS),
            activity_throttle: Duration::milliseconds(DEFAULT_ACTIVITY_THROTTLE_MS),
        }
    }
}

/// Tracks token lifetime and user inactivity over an injected store.
#[derive(Debug, Clone)]
pub struct SessionMonitor<S: KeyValueStore> {
    store: S,
    inactivity_limit: Duration,
    throttle: ThrottleGuard,
}

impl<S: KeyValueStore> SessionMonitor<S> {
    pub fn new(store: S, config: SessionConfig) -> Self {
        Self {
            store,
            inactivity_limit: config.inactivity_limit,
            throttle: ThrottleGuard::new(config.activity_throttle),
        }
    }

    /// Stores a token with its expiry instant and stamps `now` as the last
    /// activity.
    pub fn store_token(&mut self, token: &str, expires_at: DateTime<Utc>, now: DateTime<Utc>) {
        self.store.set(TOKEN_KEY, token);
        self.store.set(TOKEN_EXPIRES_AT_KEY, &expires_at.to_rfc3339());
        self.store.set(LAST_ACTIVITY_AT_KEY, &now.to_rfc3339());
    }

    /// The stored token, if any. Presence alone does not mean the session is
    /// live; call [`SessionMonitor::status`] first.
    pub fn token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY)
    }

    /// Records user activity at `now`, subject to the throttle guard.
    ///
    /// Returns whether the event was processed; dropped events leave the
    /// stored last-activity stamp untouched.
    pub fn record_activity(&mut self, now: DateTime<Utc>) -> bool {
        if !self.throttle.should_process(now) {
            return false;
        }
        self.store.set(LAST_ACTIVITY_AT_KEY, &now.to_rfc3339());
        true
    }

    /// Evaluates the session at `now`.
    ///
    /// An expired or idle session clears the token as a side effect, so a
    /// later check reports `SignedOut`.
    pub fn status(&mut self, now: DateTime<Utc>) -> SessionStatus {
        if self.store.get(TOKEN_KEY).is_none() {
            return SessionStatus::SignedOut;
        }

        if let Some(expires_at) = self.read_instant(TOKEN_EXPIRES_AT_KEY) {
            if now >= expires_at {
                tracing::info!("session token expired");
                self.sign_out();
                return SessionStatus::Expired;
            }
        }

        if let Some(last_activity) = self.read_instant(LAST_ACTIVITY_AT_KEY) {
            if now.signed_duration_since(last_activity) > self.inactivity_limit {
                tracing::info!("session expired after inactivity");
                self.sign_out();
                return SessionStatus::Expired;
            }
        }

        SessionStatus::Active
    }

    /// Removes the token and its bookkeeping from storage.
    pub fn sign_out(&mut self) {
        self.store.remove(TOKEN_KEY);
        self.store.remove(TOKEN_EXPIRES_AT_KEY);
        self.store.remove(LAST_ACTIVITY_AT_KEY);
    }

    fn read_instant(&self, key: &str) -> Option<DateTime<Utc>> {
        let raw = self.store.get(key)?;
        match DateTime::parse_from_rfc3339(&raw) {
            Ok(instant) => Some(instant.with_timezone(&Utc)),
            Err(err) => {
                tracing::warn!(key, error = %err, "malformed stored instant");
                None
            }
        }
    }
}
