//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of the server.
//!
//! # Tasks
//! - Expiry Reaper: Removes entries from the cache once their TTL elapses

mod reaper;

pub use reaper::spawn_reaper;
