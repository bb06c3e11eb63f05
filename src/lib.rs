//! LRU Cache Server - An in-memory key/value cache over HTTP
//!
//! Entries carry a per-entry TTL, the cache is bounded by LRU eviction, and a
//! background reaper removes expired entries without anyone reading them.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{Cache, CacheStore};
pub use config::Config;
pub use tasks::spawn_reaper;
