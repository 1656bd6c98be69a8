//! # qt-core
//!
//! Core crate for the strategy runtime, providing:
//!
//! - **Types** (`types`): wire enums, the trader command layout, tick and
//!   order-response payload schemas
//! - **Contracts** (`contract`): contract reference table
//! - **Configuration** (`config`): JSON config deserialization
//! - **Error types** (`error`): domain-specific `QtError` via thiserror
//! - **Backoff** (`backoff`): exponential reconnect policy
//! - **CPU affinity** (`cpu_affinity`): strategy thread pinning
//! - **Logging** (`logging`): tracing-based structured logging

pub mod backoff;
pub mod config;
pub mod contract;
pub mod cpu_affinity;
pub mod error;
pub mod logging;
pub mod types;

// Re-export types at crate root for convenience.
pub use contract::{Contract, ContractTable};
pub use error::{QtError, Result};
pub use types::*;
