//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::cache::{key_rejection, MAX_VALUE_SIZE};

/// Request body for the SET operation (POST /api/cache)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: Any JSON value, `null` included; stored as-is
/// - `expiration`: Optional TTL in seconds (uses the server default if absent)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: Value,
    /// Optional TTL in seconds
    #[serde(default)]
    pub expiration: Option<i64>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if let Some(reason) = key_rejection(&self.key) {
            return Some(reason);
        }
        if let Some(expiration) = self.expiration {
            if expiration <= 0 {
                return Some("Expiration must be a positive number of seconds".to_string());
            }
        }
        let value_size = serde_json::to_vec(&self.value)
            .map(|bytes| bytes.len())
            .unwrap_or(usize::MAX);
        if value_size > MAX_VALUE_SIZE {
            return Some(format!(
                "Value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            ));
        }
        None
    }

    /// Resolves the TTL for this request, falling back to `default_ttl`.
    ///
    /// Only meaningful after [`SetRequest::validate`] has passed.
    pub fn ttl(&self, default_ttl: Duration) -> Duration {
        match self.expiration {
            Some(seconds) => Duration::from_secs(seconds.max(0).unsigned_abs()),
            None => default_ttl,
        }
    }
}
