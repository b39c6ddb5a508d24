//! Per-record processing: sample, map, encode.
//!
//! Failures never escape [`Pipeline::process`]. A record that cannot be
//! mapped or encoded is logged and replaced by the format's sentinel so
//! the stream keeps flowing.

use crate::core::{Config, Result};
use crate::encode::{encode, Encoded, OutputFormat};
use crate::mapper::{MapOutcome, Mapper};
use crate::rules::SharedRules;
use crate::sampling::Sampler;
use tracing::{debug, warn};

/// Processes raw records for a single configured source.
#[derive(Clone)]
pub struct Pipeline {
    mapper: Mapper,
    format: OutputFormat,
    sampler: Sampler,
    input_topic: String,
}

impl Pipeline {
    /// Assemble a pipeline from its parts
    pub fn new(mapper: Mapper, format: OutputFormat, sampler: Sampler, input_topic: String) -> Self {
        Self {
            mapper,
            format,
            sampler,
            input_topic,
        }
    }

    /// Build a pipeline from validated configuration
    pub fn from_config(config: &Config, rules: SharedRules) -> Result<Self> {
        let source = config.source()?;
        Ok(Self::new(
            Mapper::new(source, rules),
            config.pipeline.format,
            Sampler::new(config.pipeline.sample_rate)?,
            config.pipeline.input_topic.clone(),
        ))
    }

    /// Output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Mapper in use
    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    /// Process one raw record.
    ///
    /// Returns `None` when the record is sampled out or skipped by the
    /// mapper, otherwise the encoded payload or the sentinel.
    pub fn process(&self, raw: &str) -> Option<Encoded> {
        if !self.sampler.admit() {
            return None;
        }

        if self.format == OutputFormat::Protobuf && !self.mapper.supports_protobuf() {
            warn!(
                source = %self.mapper.source(),
                "Protobuf output requested for a source without binary support"
            );
            return Some(Encoded::sentinel(self.format));
        }

        let envelope = match self.mapper.map(raw, &self.input_topic) {
            MapOutcome::Produced(envelope) => envelope,
            MapOutcome::Skipped => {
                debug!(source = %self.mapper.source(), "Record skipped");
                return None;
            }
            MapOutcome::Failed(e) => {
                warn!(
                    source = %self.mapper.source(),
                    category = e.category(),
                    error = %e,
                    "Failed to map record"
                );
                return Some(Encoded::sentinel(self.format));
            }
        };

        match encode(&envelope, self.format) {
            Ok(encoded) => {
                debug!(
                    metrics = envelope.metrics.len(),
                    points = envelope.point_count(),
                    format = %self.format,
                    "Encoded record"
                );
                Some(encoded)
            }
            Err(e) => {
                warn!(category = e.category(), error = %e, "Failed to encode record");
                Some(Encoded::sentinel(self.format))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ConfigBuilder;
    use crate::mapper::Source;
    use crate::rules::{shared, RuleStore};

    fn pipeline(source: Source, format: OutputFormat, rate: f64) -> Pipeline {
        Pipeline::new(
            Mapper::new(source, shared(RuleStore::load(None))),
            format,
            Sampler::new(rate).unwrap(),
            "in".to_string(),
        )
    }

    #[test]
    fn test_produces_json() {
        let p = pipeline(Source::Zabbix, OutputFormat::Json, 1.0);
        let out = p.process(r#"{"type":0,"name":"CPU Load","value":"1.5","clock":1}"#).unwrap();
        let Encoded::Json(text) = out else {
            panic!("expected JSON output");
        };
        assert!(text.contains("\"CPU_Load\""));
        assert!(text.contains("\"timeUnixNano\":\"1000000000\""));
    }

    #[test]
    fn test_skip_yields_nothing() {
        let p = pipeline(Source::Zabbix, OutputFormat::Json, 1.0);
        assert_eq!(p.process(r#"{"type":4,"name":"log","value":"x"}"#), None);
    }

    #[test]
    fn test_failures_become_sentinels() {
        let json = pipeline(Source::Sevone, OutputFormat::Json, 1.0);
        assert_eq!(json.process("{broken"), Some(Encoded::sentinel(OutputFormat::Json)));
        assert_eq!(
            json.process(r#"{"time":1,"value":"abc"}"#),
            Some(Encoded::sentinel(OutputFormat::Json))
        );

        let proto = pipeline(Source::Sevone, OutputFormat::Protobuf, 1.0);
        assert_eq!(proto.process(r#"{"value":1}"#), Some(Encoded::Protobuf(Vec::new())));
    }

    #[test]
    fn test_protobuf_needs_capable_source() {
        let p = pipeline(Source::Netscout, OutputFormat::Protobuf, 1.0);
        let out = p.process(r#"{"upw_x_count":1}"#).unwrap();
        assert!(out.is_sentinel());

        let p = pipeline(Source::Sevone, OutputFormat::Protobuf, 1.0);
        let out = p.process(r#"{"time":1,"value":2}"#).unwrap();
        assert!(matches!(out, Encoded::Protobuf(ref b) if !b.is_empty()));
    }

    #[test]
    fn test_zero_rate_drops_everything() {
        let p = pipeline(Source::Sevone, OutputFormat::Json, 0.0);
        assert_eq!(p.process(r#"{"time":1,"value":2}"#), None);
        assert_eq!(p.process("garbage"), None);
    }

    #[test]
    fn test_from_config() {
        let config = ConfigBuilder::new()
            .source(Source::Sevone)
            .format(OutputFormat::Protobuf)
            .input_topic("sevone.raw")
            .build()
            .unwrap();
        let p = Pipeline::from_config(&config, shared(RuleStore::empty())).unwrap();
        assert_eq!(p.format(), OutputFormat::Protobuf);
        assert_eq!(p.mapper().source(), Source::Sevone);
    }
}
