//! metricbridge - OTLP normalization for network monitoring records.
//!
//! metricbridge turns raw records from three monitoring vendors into the
//! OpenTelemetry metrics data model and renders them as OTLP JSON or
//! OTLP protobuf.
//!
//! # Features
//!
//! - **Rule-driven naming**: Zabbix item names are decomposed into a base
//!   metric name plus attributes by an ordered, hot-reloadable rule set
//! - **Vendor mappers**: Netscout, Zabbix and SevOne records map onto one
//!   canonical gauge model
//! - **Dual encoding**: the same model renders to OTLP JSON or to an
//!   `ExportMetricsServiceRequest` protobuf payload
//! - **Never stalls the stream**: bad records become an empty sentinel
//!
//! # Architecture
//!
//! - `rules`: rule store and file watcher
//! - `mapper`: per-vendor record mapping
//! - `encode`: JSON and protobuf renderers
//! - `sampling`: admission gate
//! - `pipeline`: sample, map, encode for one record
//! - `core`: canonical model, errors and configuration
//! - `cli`: command-line driver
//!
//! # Example
//!
//! ```
//! use metricbridge_lib::encode::{Encoded, OutputFormat};
//! use metricbridge_lib::mapper::{Mapper, Source};
//! use metricbridge_lib::pipeline::Pipeline;
//! use metricbridge_lib::rules::{shared, RuleStore};
//! use metricbridge_lib::sampling::Sampler;
//!
//! let pipeline = Pipeline::new(
//!     Mapper::new(Source::Zabbix, shared(RuleStore::load(None))),
//!     OutputFormat::Json,
//!     Sampler::always(),
//!     "zabbix.raw".to_string(),
//! );
//!
//! let out = pipeline.process(r#"{"type":0,"name":"CPU Load Average","value":"0.7"}"#);
//! assert!(matches!(out, Some(Encoded::Json(text)) if text.contains("CPU_Load_Average")));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod cli;
pub mod core;
pub mod encode;
pub mod mapper;
pub mod pipeline;
pub mod rules;
pub mod sampling;

// Re-export core types for convenience
pub use crate::core::{BridgeError, Config, Result};
pub use crate::pipeline::Pipeline;
