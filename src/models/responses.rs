//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies. Cache endpoints
//! wrap their payload in an [`ApiResponse`] envelope carrying the HTTP status
//! and a human-readable message.

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::cache::{CacheStats, ListedEntry};

/// Envelope for every cache endpoint response.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    /// HTTP status code, repeated in the body
    pub status: u16,
    /// Human-readable outcome
    pub message: String,
    /// Endpoint payload, omitted when there is none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Creates a 200 response carrying `data`
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::OK.as_u16(),
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Creates a 200 response with no payload
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK.as_u16(),
            message: message.into(),
            data: None,
        }
    }
}

/// Payload for the GET operation (GET /api/cache/:key)
#[derive(Debug, Clone, Serialize)]
pub struct EntryData {
    pub key: String,
    pub value: Value,
}

/// Payload for the SET operation (POST /api/cache)
#[derive(Debug, Clone, Serialize)]
pub struct SetData {
    pub key: String,
    pub value: Value,
    /// Applied TTL in seconds
    pub expiration: u64,
}

/// One element of the LIST payload (GET /api/cache)
#[derive(Debug, Clone, Serialize)]
pub struct ListedEntryData {
    pub key: String,
    pub value: Value,
    /// Absolute expiry time, serialized as RFC 3339
    pub expiration: DateTime<Utc>,
}

impl From<ListedEntry> for ListedEntryData {
    fn from(entry: ListedEntry) -> Self {
        let expiration = i64::try_from(entry.expires_at)
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            key: entry.key,
            value: entry.value,
            expiration,
        }
    }
}

/// Response body for the stats endpoint (GET /api/stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of capacity evictions
    pub evictions: u64,
    /// Number of expired entries removed
    pub expirations: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// HTTP status code
    pub status: u16,
    /// Error message describing what went wrong
    pub message: String,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
        }
    }
}
