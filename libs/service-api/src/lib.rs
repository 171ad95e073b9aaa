//! Wire models for the service orchestration API.

pub mod models;

pub use models::{
    ErrorResponse, InServiceStrategy, LaunchConfig, ServiceSnapshot, UpgradeRequest,
};
