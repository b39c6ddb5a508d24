//! Vendor record mappers.
//!
//! Each mapper turns one raw vendor record plus the topic it arrived on
//! into a [`ResourceEnvelope`]. The vendor is chosen once, from
//! configuration, and dispatched through the [`Mapper`] enum.

mod fields;
pub mod netscout;
pub mod sevone;
pub mod zabbix;

pub use netscout::NetscoutMapper;
pub use sevone::SevoneMapper;
pub use zabbix::ZabbixMapper;

use crate::core::{BridgeError, ResourceEnvelope, Result};
use crate::rules::SharedRules;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Supported record sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Netscout nGenius records
    Netscout,
    /// Zabbix item values
    Zabbix,
    /// SevOne indicator readings
    Sevone,
}

impl Source {
    /// Lowercase name used in configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Netscout => "netscout",
            Source::Zabbix => "zabbix",
            Source::Sevone => "sevone",
        }
    }

    /// Whether records from this source may be emitted as protobuf
    pub fn supports_protobuf(&self) -> bool {
        matches!(self, Source::Sevone)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "netscout" => Ok(Source::Netscout),
            "zabbix" => Ok(Source::Zabbix),
            "sevone" => Ok(Source::Sevone),
            other => Err(BridgeError::UnsupportedSource(other.to_string())),
        }
    }
}

/// Result of mapping one record.
#[derive(Debug)]
pub enum MapOutcome {
    /// The record produced an envelope
    Produced(ResourceEnvelope),
    /// The record is intentionally dropped
    Skipped,
    /// The record could not be mapped
    Failed(BridgeError),
}

impl MapOutcome {
    /// The produced envelope, if any
    pub fn into_envelope(self) -> Option<ResourceEnvelope> {
        match self {
            MapOutcome::Produced(envelope) => Some(envelope),
            MapOutcome::Skipped | MapOutcome::Failed(_) => None,
        }
    }

    /// True for an intentional drop
    pub fn is_skipped(&self) -> bool {
        matches!(self, MapOutcome::Skipped)
    }
}

impl From<Result<Option<ResourceEnvelope>>> for MapOutcome {
    fn from(result: Result<Option<ResourceEnvelope>>) -> Self {
        match result {
            Ok(Some(envelope)) => MapOutcome::Produced(envelope),
            Ok(None) => MapOutcome::Skipped,
            Err(e) => MapOutcome::Failed(e),
        }
    }
}

/// Vendor mapper selected from configuration
#[derive(Clone)]
pub enum Mapper {
    /// Netscout mapper
    Netscout(NetscoutMapper),
    /// Zabbix mapper with its rule store
    Zabbix(ZabbixMapper),
    /// SevOne mapper
    Sevone(SevoneMapper),
}

impl Mapper {
    /// Build the mapper for `source`. Only Zabbix reads `rules`.
    pub fn new(source: Source, rules: SharedRules) -> Self {
        match source {
            Source::Netscout => Mapper::Netscout(NetscoutMapper::new()),
            Source::Zabbix => Mapper::Zabbix(ZabbixMapper::new(rules)),
            Source::Sevone => Mapper::Sevone(SevoneMapper::new()),
        }
    }

    /// Source this mapper handles
    pub fn source(&self) -> Source {
        match self {
            Mapper::Netscout(_) => Source::Netscout,
            Mapper::Zabbix(_) => Source::Zabbix,
            Mapper::Sevone(_) => Source::Sevone,
        }
    }

    /// Capability flag for binary output
    pub fn supports_protobuf(&self) -> bool {
        self.source().supports_protobuf()
    }

    /// Parse a raw JSON record and map it.
    pub fn map(&self, raw: &str, input_topic: &str) -> MapOutcome {
        match serde_json::from_str::<Value>(raw) {
            Ok(record) => self.map_value(&record, input_topic),
            Err(e) => MapOutcome::Failed(BridgeError::mapping(format!("invalid JSON record: {e}"))),
        }
    }

    /// Map an already parsed record.
    pub fn map_value(&self, record: &Value, input_topic: &str) -> MapOutcome {
        let result = match self {
            Mapper::Netscout(m) => m.map(record, input_topic).map(Some),
            Mapper::Zabbix(m) => m.map(record, input_topic),
            Mapper::Sevone(m) => m.map(record, input_topic).map(Some),
        };
        result.into()
    }
}
