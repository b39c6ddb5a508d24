//! Error types for metricbridge.

use thiserror::Error;

/// Every failure the engine and the CLI can report.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Rule source unreadable or malformed
    #[error("Rule source error: {0}")]
    ConfigLoad(String),

    #[error("Invalid pattern in rule '{id}': {source}")]
    /// A single rule's pattern failed to compile
    RuleCompile {
        /// Rule identifier
        id: String,
        /// Regex compiler error
        #[source]
        source: regex::Error,
    },

    /// Required record field missing or unparsable
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// Envelope cannot be encoded
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Invalid process configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Sampling rate outside 0.0..=1.0
    #[error("Sampling rate must be between 0.0 and 1.0, got {0}")]
    InvalidSamplingRate(f64),

    /// Unknown record source name
    #[error("Unsupported source: {0}")]
    UnsupportedSource(String),

    /// I/O failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML (de)serialization failure
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for metricbridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

impl BridgeError {
    /// Creates a new rule source error
    pub fn config_load<S: Into<String>>(msg: S) -> Self {
        Self::ConfigLoad(msg.into())
    }

    /// Creates a new mapping error
    pub fn mapping<S: Into<String>>(msg: S) -> Self {
        Self::Mapping(msg.into())
    }

    /// Creates a new encoding error
    pub fn encoding<S: Into<String>>(msg: S) -> Self {
        Self::Encoding(msg.into())
    }

    /// Creates a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Returns true if the pipeline keeps running after this error.
    ///
    /// Per-record failures degrade to a sentinel payload; only process
    /// configuration problems stop startup.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::ConfigLoad(_)
            | Self::RuleCompile { .. }
            | Self::Mapping(_)
            | Self::Encoding(_)
            | Self::Json(_) => true,
            Self::Config(_)
            | Self::InvalidSamplingRate(_)
            | Self::UnsupportedSource(_)
            | Self::Io(_)
            | Self::Yaml(_) => false,
        }
    }

    /// Returns the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::ConfigLoad(_) | Self::RuleCompile { .. } => "rules",
            Self::Mapping(_) | Self::Json(_) => "mapping",
            Self::Encoding(_) => "encoding",
            Self::Config(_) | Self::InvalidSamplingRate(_) | Self::UnsupportedSource(_) => {
                "config"
            },
            Self::Io(_) => "io",
            Self::Yaml(_) => "serialization",
        }
    }
}
