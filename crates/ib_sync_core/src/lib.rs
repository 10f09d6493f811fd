//! Install-base sync domain primitives.
//!
//! This crate owns identifier normalization, feed kinds, the master-list
//! contract, storage key layout and payload encoding. It intentionally excludes
//! the S3 SDK, HTTP client and async runtime; those live in `ib_sync_service`.

pub mod contract;
pub mod feeds;
pub mod identifier;
pub mod payload;
pub mod storage_keys;
