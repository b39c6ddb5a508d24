//! Canonical metrics model.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::otel_compliance::{SCOPE_NAME, SCOPE_VERSION};

/// Ordered list of string attributes.
///
/// Keys are not deduplicated: OTLP attribute lists are permissive and
/// every pair is rendered in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    /// Creates an empty attribute list
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a key/value pair
    pub fn push<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.0.push((key.into(), value.into()));
    }

    /// Sets `key`, replacing the first existing value in place.
    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value.into(),
            None => self.0.push((key, value.into())),
        }
    }

    /// Appends the trimmed value when it is present and not blank.
    pub fn push_trimmed(&mut self, key: &str, value: Option<&str>) {
        if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
            self.push(key, v);
        }
    }

    /// Appends every pair from `other`, keeping its order
    pub fn extend(&mut self, other: Attributes) {
        self.0.extend(other.0);
    }

    /// Returns the first value recorded for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of pairs, duplicates included
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no pairs were recorded
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k}={v}")?;
        }
        write!(f, "}}")
    }
}

/// A single gauge sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Always rendered as `asDouble`
    pub value: f64,
    /// Nanoseconds since the Unix epoch
    pub timestamp_nanos: u64,
    /// Per-point attributes
    pub attributes: Attributes,
}

impl DataPoint {
    /// Creates a data point without attributes
    pub fn new(value: f64, timestamp_nanos: u64) -> Self {
        Self {
            value,
            timestamp_nanos,
            attributes: Attributes::new(),
        }
    }

    /// Replaces the point attributes
    #[must_use]
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }
}

/// A gauge metric and its samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalMetric {
    /// Metric name
    pub name: String,
    /// Unit, `None` when unknown
    pub unit: Option<String>,
    /// Samples, at least one for a well-formed metric
    pub data_points: Vec<DataPoint>,
}

impl CanonicalMetric {
    /// Creates a gauge metric holding one data point
    pub fn gauge<S: Into<String>>(name: S, unit: Option<String>, point: DataPoint) -> Self {
        Self {
            name: name.into(),
            unit: unit.filter(|u| !u.is_empty()),
            data_points: vec![point],
        }
    }
}

/// One OTLP `ResourceMetrics` unit: resource attributes plus the metrics
/// of a single instrumentation scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceEnvelope {
    /// Attributes describing the emitting resource
    pub resource_attributes: Attributes,
    /// Instrumentation scope name
    pub scope_name: String,
    /// Instrumentation scope version
    pub scope_version: String,
    /// Metrics reported for the resource
    pub metrics: Vec<CanonicalMetric>,
}

impl ResourceEnvelope {
    /// Creates an envelope under the fixed `kafka`/`streams` scope
    pub fn new(resource_attributes: Attributes) -> Self {
        Self {
            resource_attributes,
            scope_name: SCOPE_NAME.to_string(),
            scope_version: SCOPE_VERSION.to_string(),
            metrics: Vec::new(),
        }
    }

    /// Appends a metric
    pub fn push_metric(&mut self, metric: CanonicalMetric) {
        self.metrics.push(metric);
    }

    /// Total data points across all metrics
    pub fn point_count(&self) -> usize {
        self.metrics.iter().map(|m| m.data_points.len()).sum()
    }
}
