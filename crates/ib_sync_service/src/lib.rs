//! Install-base sync service.
//!
//! Owns the runtime side of the sync: S3 and HTTP adapters, the per-GDUN sync
//! task, the cycle driver and the scheduler that repeats it. Pure domain rules
//! (normalization, key layout, payload encoding) live in `ib_sync_core`.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod logging;
pub mod scheduler;
