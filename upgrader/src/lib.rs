//! Rolling upgrade driver
//!
//! Triggers, finishes or rolls back upgrades of services managed by a remote
//! orchestration API, optionally waiting for the target state and rolling
//! back when it is not reached.

pub mod app;
pub mod deploy;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod logs;
pub mod models;
pub mod storage;
pub mod utils;
