//! Chargeback Core - Shared data structures and foundations
//!
//! This crate defines the types, configuration, error taxonomy and logging
//! setup shared by the Chargeback console crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use tokio;
pub use tracing;
