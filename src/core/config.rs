//! Configuration management for metricbridge.
//!
//! This module provides configuration handling with:
//! - YAML file support
//! - Environment variable and CLI overrides (applied by `cli`)
//! - Validation and defaults

use crate::core::{BridgeError, Result};
use crate::encode::OutputFormat;
use crate::mapper::Source;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete configuration for metricbridge
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Record source and output selection
    pub pipeline: PipelineConfig,
    /// Name rule configuration
    pub rules: RulesConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Debug mode
    #[serde(skip)]
    pub debug: bool,
}

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Vendor schema of the incoming records
    pub source: Option<Source>,
    /// Output encoding, fixed for the life of the process
    pub format: OutputFormat,
    /// Topic the records arrive on, echoed as `kafka.topic`
    pub input_topic: String,
    /// Fraction of records admitted (0.0 to 1.0)
    pub sample_rate: f64,
}

/// Name rule configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Rule file; the bundled defaults are used when absent or unreadable
    pub file: Option<PathBuf>,
    /// Reload rules when the file changes
    pub watch: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,
    /// Include targets, thread ids and line numbers
    pub structured: bool,
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Everything, including per-rule decisions
    Trace,
    /// Startup details and per-record outcomes
    Debug,
    /// Lifecycle events
    Info,
    /// Dropped records and recoverable failures
    Warn,
    /// Failures only
    Error,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            source: None,
            format: OutputFormat::Json,
            input_topic: String::new(),
            sample_rate: 1.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: LogLevel::Info,
            structured: false,
        }
    }
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let Some(source) = self.pipeline.source else {
            return Err(BridgeError::config("Missing required configuration: pipeline.source"));
        };

        if self.pipeline.input_topic.trim().is_empty() {
            return Err(BridgeError::config("Missing required configuration: pipeline.input_topic"));
        }

        if !(0.0..=1.0).contains(&self.pipeline.sample_rate) {
            return Err(BridgeError::InvalidSamplingRate(self.pipeline.sample_rate));
        }

        if self.pipeline.format == OutputFormat::Protobuf && !source.supports_protobuf() {
            return Err(BridgeError::config(format!(
                "Source '{}' cannot produce protobuf output",
                source
            )));
        }

        Ok(())
    }

    /// The configured source; only meaningful after `validate`
    pub fn source(&self) -> Result<Source> {
        self.pipeline
            .source
            .ok_or_else(|| BridgeError::config("Missing required configuration: pipeline.source"))
    }
}

impl LogLevel {
    /// Convert to tracing filter string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Configuration builder for programmatic construction
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with defaults
    pub fn new() -> Self {
        ConfigBuilder {
            config: Config::default(),
        }
    }

    /// Load configuration from YAML string
    pub fn from_yaml(mut self, yaml: &str) -> Result<Self> {
        self.config = serde_yaml::from_str(yaml)
            .map_err(|e| BridgeError::config(format!("Failed to parse YAML config: {}", e)))?;
        Ok(self)
    }

    /// Set record source
    pub fn source(mut self, source: Source) -> Self {
        self.config.pipeline.source = Some(source);
        self
    }

    /// Set output format
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.pipeline.format = format;
        self
    }

    /// Set input topic
    pub fn input_topic<S: Into<String>>(mut self, topic: S) -> Self {
        self.config.pipeline.input_topic = topic.into();
        self
    }

    /// Set sampling rate
    pub fn sample_rate(mut self, rate: f64) -> Self {
        self.config.pipeline.sample_rate = rate;
        self
    }

    /// Set rule file
    pub fn rules_file(mut self, path: PathBuf) -> Self {
        self.config.rules.file = Some(path);
        self
    }

    /// Enable rule file watching
    pub fn watch_rules(mut self, watch: bool) -> Self {
        self.config.rules.watch = watch;
        self
    }

    /// Set debug mode
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
