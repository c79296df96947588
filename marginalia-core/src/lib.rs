//! Marginalia Core - shared data structures and trait definitions
//!
//! Errors, logging setup, configuration and the user-lookup capability used by
//! the authentication crates

pub mod config;
pub mod error;
pub mod logging;
pub mod traits;
pub mod types;

pub use error::*;
pub use logging::*;
pub use traits::*;
pub use types::*;

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use tracing;
