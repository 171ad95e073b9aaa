//! Deployment actions

pub mod fanout;
pub mod image;
pub mod orchestrator;
pub mod wait;
