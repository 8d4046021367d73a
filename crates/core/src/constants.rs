//! Constants used throughout the yoParticipo core crate.
//!
//! This module collects the fixed limits of the intake flow and the session
//! monitor so they stay consistent across validation, tests, and hosts.

/// Earliest birth year the intake form accepts.
pub const MIN_BIRTH_YEAR: i32 = 1900;

/// Date format the intake form produces for the birth-date field.
pub const BIRTH_DATE_FORMAT: &str = "%Y-%m-%d";

/// Storage key for the session token.
pub const TOKEN_KEY: &str = "yp.token";

/// Storage key for the token expiry instant (RFC 3339).
pub const TOKEN_EXPIRES_AT_KEY: &str = "yp.tokenExpiresAt";

/// Storage key for the last recorded user-activity instant (RFC 3339).
pub const LAST_ACTIVITY_AT_KEY: &str = "yp.lastActivityAt";

/// Default inactivity window before a session is considered expired, in
/// seconds. Matches the public site's 30-minute timeout.
pub const DEFAULT_INACTIVITY_LIMIT_SECS: i64 = 30 * 60;

/// Default minimum interval between processed activity events, in
/// milliseconds. Pointer movement fires far more often than once a second;
/// anything inside this window is dropped.
pub const DEFAULT_ACTIVITY_THROTTLE_MS: i64 = 1_000;
