//! Dual OTLP encoder.
//!
//! A [`ResourceEnvelope`] renders to either OTLP JSON text or an
//! `ExportMetricsServiceRequest` protobuf payload. Both renderings carry
//! the same attributes, names, units, values and timestamps.
//!
//! Malformed envelopes are rejected with [`BridgeError::Encoding`]; callers
//! substitute [`Encoded::sentinel`] instead of propagating the error.

pub mod json;
pub mod proto;

pub use json::encode_json;
pub use proto::{encode_proto, to_request};

use crate::core::{BridgeError, ResourceEnvelope, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Process-wide output encoding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// OTLP/JSON text
    #[default]
    Json,
    /// Binary `ExportMetricsServiceRequest`
    Protobuf,
}

impl OutputFormat {
    /// Lowercase name used in configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Protobuf => "protobuf",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "protobuf" => Ok(OutputFormat::Protobuf),
            other => Err(BridgeError::config(format!(
                "unknown output format '{other}' (expected json or protobuf)"
            ))),
        }
    }
}

/// An encoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoded {
    /// OTLP/JSON document
    Json(String),
    /// Protobuf payload
    Protobuf(Vec<u8>),
}

impl Encoded {
    /// Empty payload emitted in place of a record that failed
    pub fn sentinel(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => Encoded::Json("{}".to_string()),
            OutputFormat::Protobuf => Encoded::Protobuf(Vec::new()),
        }
    }

    /// Format of this payload
    pub fn format(&self) -> OutputFormat {
        match self {
            Encoded::Json(_) => OutputFormat::Json,
            Encoded::Protobuf(_) => OutputFormat::Protobuf,
        }
    }

    /// Raw payload bytes
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Encoded::Json(text) => text.as_bytes(),
            Encoded::Protobuf(bytes) => bytes,
        }
    }

    /// True for the empty failure payload
    pub fn is_sentinel(&self) -> bool {
        match self {
            Encoded::Json(text) => text == "{}",
            Encoded::Protobuf(bytes) => bytes.is_empty(),
        }
    }
}

/// Encode `envelope` in `format`.
pub fn encode(envelope: &ResourceEnvelope, format: OutputFormat) -> Result<Encoded> {
    match format {
        OutputFormat::Json => encode_json(envelope).map(Encoded::Json),
        OutputFormat::Protobuf => encode_proto(envelope).map(Encoded::Protobuf),
    }
}

/// Reject envelopes neither encoding can represent faithfully.
pub(crate) fn validate(envelope: &ResourceEnvelope) -> Result<()> {
    for metric in &envelope.metrics {
        if metric.name.is_empty() {
            return Err(BridgeError::encoding("metric with empty name"));
        }
        if metric.data_points.is_empty() {
            return Err(BridgeError::encoding(format!(
                "metric '{}' has no data points",
                metric.name
            )));
        }
        if let Some(point) = metric.data_points.iter().find(|p| !p.value.is_finite()) {
            return Err(BridgeError::encoding(format!(
                "metric '{}' has non-finite value {}",
                metric.name, point.value
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Attributes, CanonicalMetric, DataPoint};

    fn envelope(value: f64) -> ResourceEnvelope {
        let mut env = ResourceEnvelope::new(Attributes::new());
        env.push_metric(CanonicalMetric::gauge("m", None, DataPoint::new(value, 1)));
        env
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("protobuf".parse::<OutputFormat>().unwrap(), OutputFormat::Protobuf);
        assert!("avro".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default(), OutputFormat::Json);
    }

    #[test]
    fn test_sentinels() {
        assert_eq!(Encoded::sentinel(OutputFormat::Json), Encoded::Json("{}".into()));
        assert_eq!(Encoded::sentinel(OutputFormat::Protobuf), Encoded::Protobuf(vec![]));
        assert!(Encoded::sentinel(OutputFormat::Protobuf).is_sentinel());
        assert_eq!(Encoded::sentinel(OutputFormat::Json).as_bytes(), b"{}");
    }

    #[test]
    fn test_encode_dispatch() {
        let env = envelope(1.0);
        assert_eq!(encode(&env, OutputFormat::Json).unwrap().format(), OutputFormat::Json);
        let proto = encode(&env, OutputFormat::Protobuf).unwrap();
        assert!(!proto.is_sentinel());
    }

    #[test]
    fn test_malformed_envelopes_rejected() {
        for value in [f64::NAN, f64::INFINITY] {
            let err = encode(&envelope(value), OutputFormat::Json).unwrap_err();
            assert!(matches!(err, BridgeError::Encoding(_)));
        }

        let mut empty_name = envelope(1.0);
        empty_name.metrics[0].name.clear();
        assert!(encode(&empty_name, OutputFormat::Protobuf).is_err());

        let mut no_points = envelope(1.0);
        no_points.metrics[0].data_points.clear();
        assert!(encode(&no_points, OutputFormat::Json).is_err());
    }

    #[test]
    fn test_envelope_without_metrics_encodes() {
        let env = ResourceEnvelope::new(Attributes::new());
        assert!(encode(&env, OutputFormat::Json).is_ok());
        assert!(encode(&env, OutputFormat::Protobuf).is_ok());
    }
}
