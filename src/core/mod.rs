//! Core domain models shared by the rule store, mappers and encoders.
//!
//! This module contains the canonical metrics model, the error type and
//! process configuration.

pub mod config;
pub mod error;
pub mod otel_compliance;
pub mod types;

// Re-export commonly used types
pub use config::{Config, ConfigBuilder, LogLevel};
pub use error::{BridgeError, Result};
pub use types::{Attributes, CanonicalMetric, DataPoint, ResourceEnvelope};
